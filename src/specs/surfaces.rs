use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::error::OpticsError;
use crate::geometry::{
    self, Biconic, Chebyshev, EvenAsphere, Geometry, GridSag, Nurbs, OddAsphere, Polynomial,
    Standard, Toroidal, Zernike, ZernikeNormalization,
};

use super::Rotation3D;
use super::physical_aperture::PhysicalApertureSpec;
use super::solves::Solve;

/// How a surface interacts with an incident ray, beyond the geometric
/// intersection itself.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum SurfaceType {
    Refracting,
    Reflecting,
    /// An idealized thin lens: `u' = u - y / focal_length`.
    ThinParaxial { focal_length: Float },
    /// A diffraction grating in the surface's local x-y plane.
    Grating {
        /// Lines per mm.
        groove_density: Float,
        order: i32,
    },
    NoOp,
}

/// The zero-based index convention for a [`GeometrySpec::Zernike`]
/// coefficient list.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum ZernikeIndexing {
    Fringe,
    Standard,
    Noll,
}

impl From<ZernikeIndexing> for ZernikeNormalization {
    fn from(value: ZernikeIndexing) -> Self {
        match value {
            ZernikeIndexing::Fringe => ZernikeNormalization::Fringe,
            ZernikeIndexing::Standard => ZernikeNormalization::Standard,
            ZernikeIndexing::Noll => ZernikeNormalization::Noll,
        }
    }
}

/// The declarative description of a surface's shape, convertible into a
/// [`Geometry`] for the ray tracer.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum GeometrySpec {
    Standard {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
    },
    EvenAsphere {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        coefficients: Vec<Float>,
    },
    OddAsphere {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        coefficients: Vec<Float>,
    },
    Polynomial {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        terms: Vec<(u32, u32, Float)>,
    },
    Chebyshev {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        norm_x: Float,
        norm_y: Float,
        terms: Vec<(u32, u32, Float)>,
    },
    Zernike {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        norm_radius: Float,
        indexing: ZernikeIndexing,
        coefficients: Vec<Float>,
    },
    Biconic {
        semi_diameter: Float,
        radius_of_curvature_x: Float,
        radius_of_curvature_y: Float,
        conic_constant_x: Float,
        conic_constant_y: Float,
    },
    Toroidal {
        semi_diameter: Float,
        radius_of_rotation: Float,
        radius_of_curvature_yz: Float,
        conic_constant_yz: Float,
        coefficients: Vec<Float>,
    },
    ForbesQbfs {
        semi_diameter: Float,
        radius_of_curvature: Float,
        conic_constant: Float,
        norm_radius: Float,
        coefficients: Vec<Float>,
    },
    Nurbs {
        degree_u: usize,
        degree_v: usize,
        knots_u: Vec<Float>,
        knots_v: Vec<Float>,
        n_u: usize,
        n_v: usize,
        control_points: Vec<(Float, Float, Float)>,
    },
    GridSag {
        nx: usize,
        ny: usize,
        spacing_x: Float,
        spacing_y: Float,
        values: Vec<Float>,
    },
}

impl GeometrySpec {
    pub fn semi_diameter(&self) -> Float {
        match self {
            GeometrySpec::Standard { semi_diameter, .. }
            | GeometrySpec::EvenAsphere { semi_diameter, .. }
            | GeometrySpec::OddAsphere { semi_diameter, .. }
            | GeometrySpec::Polynomial { semi_diameter, .. }
            | GeometrySpec::Chebyshev { semi_diameter, .. }
            | GeometrySpec::Zernike { semi_diameter, .. }
            | GeometrySpec::Biconic { semi_diameter, .. }
            | GeometrySpec::Toroidal { semi_diameter, .. }
            | GeometrySpec::ForbesQbfs { semi_diameter, .. } => *semi_diameter,
            GeometrySpec::Nurbs { .. } | GeometrySpec::GridSag { .. } => Float::INFINITY,
        }
    }

    pub fn validate(&self) -> Result<(), OpticsError> {
        if self.semi_diameter().is_nan() {
            return Err(OpticsError::UnknownSurfaceType(
                "semi-diameter must be a number".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_geometry(&self) -> Geometry {
        match self.clone() {
            GeometrySpec::Standard {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
            } => Geometry::Standard(Standard {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
            }),
            GeometrySpec::EvenAsphere {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                coefficients,
            } => Geometry::EvenAsphere(EvenAsphere {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                coefficients,
            }),
            GeometrySpec::OddAsphere {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                coefficients,
            } => Geometry::OddAsphere(OddAsphere {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                coefficients,
            }),
            GeometrySpec::Polynomial {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                terms,
            } => Geometry::Polynomial(Polynomial {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                terms,
            }),
            GeometrySpec::Chebyshev {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_x,
                norm_y,
                terms,
            } => Geometry::Chebyshev(Chebyshev {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_x,
                norm_y,
                terms,
            }),
            GeometrySpec::Zernike {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_radius,
                indexing,
                coefficients,
            } => Geometry::Zernike(Zernike {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_radius,
                indexing: indexing.into(),
                coefficients,
            }),
            GeometrySpec::Biconic {
                semi_diameter,
                radius_of_curvature_x,
                radius_of_curvature_y,
                conic_constant_x,
                conic_constant_y,
            } => Geometry::Biconic(Biconic {
                semi_diameter,
                radius_of_curvature_x,
                radius_of_curvature_y,
                conic_constant_x,
                conic_constant_y,
            }),
            GeometrySpec::Toroidal {
                semi_diameter,
                radius_of_rotation,
                radius_of_curvature_yz,
                conic_constant_yz,
                coefficients,
            } => Geometry::Toroidal(Toroidal {
                semi_diameter,
                radius_of_rotation,
                radius_of_curvature_yz,
                conic_constant_yz,
                coefficients,
            }),
            GeometrySpec::ForbesQbfs {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_radius,
                coefficients,
            } => Geometry::ForbesQbfs(geometry::forbes::ForbesQbfs {
                semi_diameter,
                radius_of_curvature,
                conic_constant,
                norm_radius,
                coefficients,
            }),
            GeometrySpec::Nurbs {
                degree_u,
                degree_v,
                knots_u,
                knots_v,
                n_u,
                n_v,
                control_points,
            } => Geometry::Nurbs(Nurbs {
                degree_u,
                degree_v,
                knots_u,
                knots_v,
                n_u,
                n_v,
                control_points: control_points
                    .into_iter()
                    .map(|(x, y, z)| crate::core::math::vec3::Vec3::new(x, y, z))
                    .collect(),
            }),
            GeometrySpec::GridSag {
                nx,
                ny,
                spacing_x,
                spacing_y,
                values,
            } => Geometry::GridSag(GridSag {
                nx,
                ny,
                spacing_x,
                spacing_y,
                values,
            }),
        }
    }
}

/// Specifies a surface in a sequential optical system.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum SurfaceSpec {
    Object,
    Image {
        rotation: Rotation3D,
    },
    Probe {
        rotation: Rotation3D,
    },
    Stop {
        semi_diameter: Float,
        rotation: Rotation3D,
    },
    Surface {
        geometry: GeometrySpec,
        surf_type: SurfaceType,
        physical_aperture: Option<PhysicalApertureSpec>,
        rotation: Rotation3D,
        /// A declarative constraint on this surface's curvature, resolved
        /// once at [`crate::sequential_model::SequentialModel`] construction.
        curvature_solve: Option<Solve>,
    },
}

impl SurfaceSpec {
    pub fn validate(&self) -> Result<(), OpticsError> {
        match self {
            SurfaceSpec::Object | SurfaceSpec::Image { .. } | SurfaceSpec::Probe { .. } => Ok(()),
            SurfaceSpec::Stop { semi_diameter, .. } => {
                if semi_diameter.is_nan() || *semi_diameter <= 0.0 {
                    return Err(OpticsError::UnknownSurfaceType(
                        "stop semi-diameter must be a positive number".into(),
                    ));
                }
                Ok(())
            }
            SurfaceSpec::Surface {
                geometry,
                physical_aperture,
                ..
            } => {
                geometry.validate()?;
                if let Some(aperture) = physical_aperture {
                    aperture.validate()?;
                }
                Ok(())
            }
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, SurfaceSpec::Stop { .. })
    }

    /// This surface's tilt relative to its nominal position on the optical
    /// axis. `Object` carries none and is always untilted.
    pub fn rotation(&self) -> Rotation3D {
        match self {
            SurfaceSpec::Object => Rotation3D::zero(),
            SurfaceSpec::Image { rotation }
            | SurfaceSpec::Probe { rotation }
            | SurfaceSpec::Stop { rotation, .. }
            | SurfaceSpec::Surface { rotation, .. } => *rotation,
        }
    }
}
