//! First-order (paraxial) reduction of a [`SequentialModel`]: effective
//! focal lengths, principal planes, entrance/exit pupils, and the two
//! canonical paraxial rays (marginal and chief) that most real-ray analyses
//! are built from.
//!
//! Each surface's action on a `(y, u)` pair is expressed as a 2x2 ray
//! transfer matrix and composed with [`ndarray`], mirroring the teacher
//! crate's `RayTransferMatrix` approach but over a flat surface list rather
//! than a per-axis submodel.
use ndarray::{Array1, Array2, arr2};

use crate::core::Float;
use crate::error::OpticsError;
use crate::sequential_model::SequentialModel;
use crate::specs::aperture::ApertureSpec;
use crate::specs::fields::{FieldDefinition, FieldSpec};
use crate::specs::surfaces::SurfaceType;

/// The location and radius of a system's entrance or exit pupil, relative to
/// the global frame's z-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pupil {
    pub location: Float,
    pub semi_diameter: Float,
}

/// A traced paraxial ray: height and slope at every surface, in surface
/// order.
#[derive(Debug, Clone)]
pub struct ParaxialRayTrace {
    pub y: Array1<Float>,
    pub u: Array1<Float>,
}

impl ParaxialRayTrace {
    fn z_intercept_after(&self, i: usize) -> Float {
        -self.y[i] / self.u[i]
    }
}

fn refraction_matrix(c: Float, n_pre: Float, n_post: Float) -> Array2<Float> {
    let phi = c * (n_post - n_pre);
    arr2(&[[1.0, 0.0], [-phi / n_post, n_pre / n_post]])
}

fn transfer_matrix(t: Float) -> Array2<Float> {
    arr2(&[[1.0, t], [0.0, 1.0]])
}

/// Traces a paraxial ray `(y0, u0)` forward through every surface of
/// `model` at `wavelength`, returning its height and slope just after each
/// surface (index 0 is the object surface, unchanged from the launch
/// values).
///
/// A reflecting surface is handled by the standard unfolded-system trick:
/// the refractive index carried forward is negated at every reflection
/// (`sign` below) while distances stay positive, so a mirror's power falls
/// out of the same `refraction_matrix` used for a lens -- no separate
/// matrix form is needed for [`SurfaceType::Reflecting`].
pub(crate) fn trace(
    model: &SequentialModel,
    wavelength: Float,
    y0: Float,
    u0: Float,
) -> Result<ParaxialRayTrace, OpticsError> {
    let surfaces = model.surfaces();
    let mut y = Array1::zeros(surfaces.len());
    let mut u = Array1::zeros(surfaces.len());
    y[0] = y0;
    u[0] = u0;

    let mut n_pre: Float = 1.0;
    let mut sign = 1.0;
    for i in 0..surfaces.len() {
        let c = if surfaces[i].paraxial_radius().is_infinite() {
            0.0
        } else {
            1.0 / surfaces[i].paraxial_radius()
        };
        let n_post_material = match model.gaps().get(i) {
            Some(gap) => gap.material.index_at(wavelength).map(|idx| idx.real)?,
            None => n_pre.abs(),
        };
        let post_sign = if matches!(surfaces[i].surf_type, SurfaceType::Reflecting) { -sign } else { sign };
        let n_post = post_sign * n_post_material;
        let m = refraction_matrix(c, n_pre, n_post);
        let v = m.dot(&arr2(&[[y[i]], [u[i]]]));
        y[i] = v[[0, 0]];
        u[i] = v[[1, 0]];
        n_pre = n_post;
        sign = post_sign;

        if let Some(gap) = model.gaps().get(i) {
            if gap.thickness.is_finite() {
                let t = transfer_matrix(gap.thickness);
                let v = t.dot(&arr2(&[[y[i]], [u[i]]]));
                y[i + 1] = v[[0, 0]];
                u[i + 1] = v[[1, 0]];
            } else {
                // An infinite gap (object or image at infinity) carries a
                // ray's height and slope through unchanged -- it is
                // specified directly at the next surface.
                y[i + 1] = y[i];
                u[i + 1] = u[i];
            }
        }
    }

    Ok(ParaxialRayTrace { y, u })
}

/// Traces a paraxial ray backward: surfaces are visited from image to
/// object, with each surface's curvature negated (a ray seeing a surface
/// from the opposite side sees the opposite sign of convexity) and the
/// refractive indices either side of it swapped. The returned trace is in
/// the same (object-to-image) surface order as [`trace`].
pub(crate) fn trace_reversed(
    model: &SequentialModel,
    wavelength: Float,
    y0: Float,
    u0: Float,
) -> Result<ParaxialRayTrace, OpticsError> {
    let surfaces = model.surfaces();
    let last = surfaces.len() - 1;
    let mut y = Array1::zeros(surfaces.len());
    let mut u = Array1::zeros(surfaces.len());
    y[last] = y0;
    u[last] = u0;

    // `sign` tracks the sign of the refractive index on the image side of
    // the surface about to be processed -- it starts unflipped at the image
    // and flips every time a reflecting surface is stepped over walking
    // backward, mirroring the forward pass in `trace`.
    let mut sign = 1.0;
    for step in 0..surfaces.len() {
        let i = last - step;
        let c = if surfaces[i].paraxial_radius().is_infinite() {
            0.0
        } else {
            -1.0 / surfaces[i].paraxial_radius()
        };
        // Traveling backward, the medium just arrived from is gaps[i] (the
        // forward gap after surface i); the medium departed into is gaps[i - 1],
        // or vacuum if i is the object surface.
        let n_pre_material = match model.gaps().get(i) {
            Some(gap) => gap.material.index_at(wavelength).map(|idx| idx.real)?,
            None => 1.0,
        };
        let n_pre = sign * n_pre_material;
        let object_side_sign = if matches!(surfaces[i].surf_type, SurfaceType::Reflecting) { -sign } else { sign };
        let n_post_material = if i == 0 {
            1.0
        } else {
            model.gaps()[i - 1]
                .material
                .index_at(wavelength)
                .map(|idx| idx.real)?
        };
        let n_post = object_side_sign * n_post_material;
        sign = object_side_sign;
        let m = refraction_matrix(c, n_pre, n_post);
        let v = m.dot(&arr2(&[[y[i]], [u[i]]]));
        y[i] = v[[0, 0]];
        u[i] = v[[1, 0]];

        if i > 0 {
            let thickness = model.gaps()[i - 1].thickness;
            if thickness.is_finite() {
                let t = transfer_matrix(thickness);
                let v = t.dot(&arr2(&[[y[i]], [u[i]]]));
                y[i - 1] = v[[0, 0]];
                u[i - 1] = v[[1, 0]];
            } else {
                y[i - 1] = y[i];
                u[i - 1] = u[i];
            }
        }
    }

    Ok(ParaxialRayTrace { y, u })
}

/// First-order properties of a [`SequentialModel`] at a single wavelength.
#[derive(Debug, Clone)]
pub struct ParaxialProperties {
    pub wavelength: Float,
    /// Back (image-space) effective focal length, f2.
    pub efl_back: Float,
    /// Front (object-space) effective focal length, f1.
    pub efl_front: Float,
    pub back_focal_distance: Float,
    pub front_focal_distance: Float,
    pub back_principal_plane: Float,
    pub front_principal_plane: Float,
    pub entrance_pupil: Pupil,
    pub exit_pupil: Pupil,
    marginal_ray: ParaxialRayTrace,
}

impl ParaxialProperties {
    pub fn compute(
        model: &SequentialModel,
        aperture: &ApertureSpec,
        wavelength: Float,
        obj_space_telecentric: bool,
    ) -> Result<Self, OpticsError> {
        let last = model.surfaces().len() - 1;

        let parallel = trace(model, wavelength, 1.0, 0.0)?;
        let efl_back = -parallel.y[1] / parallel.u[last - 1];
        let back_focal_distance = if parallel.u[last - 1].abs() < crate::core::EPSILON {
            Float::INFINITY
        } else {
            parallel.z_intercept_after(last - 1)
        };
        let back_principal_plane = back_focal_distance - efl_back;

        let reverse_parallel = trace_reversed(model, wavelength, 1.0, 0.0)?;
        let efl_front = parallel.y[1] / reverse_parallel.u[1].abs().max(crate::core::EPSILON)
            * reverse_parallel.u[1].signum();
        let front_focal_distance = if reverse_parallel.u[1].abs() < crate::core::EPSILON {
            Float::INFINITY
        } else {
            -reverse_parallel.y[1] / reverse_parallel.u[1]
        };
        let front_principal_plane = front_focal_distance + efl_front;

        let stop = model.stop_index();
        let marginal_seed = trace(model, wavelength, 0.0, 1.0)?;
        let stop_height = marginal_seed.y[stop];
        let scale = if stop_height.abs() > crate::core::EPSILON {
            model.surfaces()[stop].semi_diameter / stop_height
        } else {
            1.0
        };
        let marginal_ray = ParaxialRayTrace {
            y: &marginal_seed.y * scale,
            u: &marginal_seed.u * scale,
        };

        let entrance_pupil =
            Self::entrance_pupil(model, aperture, wavelength, obj_space_telecentric, &marginal_ray)?;
        let exit_pupil = Self::exit_pupil(model, wavelength, &marginal_ray)?;

        Ok(Self {
            wavelength,
            efl_back,
            efl_front,
            back_focal_distance,
            front_focal_distance,
            back_principal_plane,
            front_principal_plane,
            entrance_pupil,
            exit_pupil,
            marginal_ray,
        })
    }

    fn entrance_pupil(
        model: &SequentialModel,
        aperture: &ApertureSpec,
        wavelength: Float,
        obj_space_telecentric: bool,
        marginal_ray: &ParaxialRayTrace,
    ) -> Result<Pupil, OpticsError> {
        if obj_space_telecentric {
            return Ok(Pupil { location: Float::INFINITY, semi_diameter: Float::NAN });
        }

        let stop = model.stop_index();
        let location = if stop == 0 {
            0.0
        } else {
            let backtrace = trace_reversed(model, wavelength, 0.0, 1.0)?;
            backtrace.z_intercept_after(0)
        };

        let semi_diameter = match aperture {
            ApertureSpec::EntrancePupil { semi_diameter } => *semi_diameter,
            ApertureSpec::FloatByStopSize => marginal_ray.y[0].abs().max(marginal_ray.y[stop].abs()),
            ApertureSpec::ImageFNumber { fno } => {
                let parallel = trace(model, wavelength, 1.0, 0.0)?;
                let last = model.surfaces().len() - 1;
                let efl = -parallel.y[1] / parallel.u[last - 1];
                (efl / fno).abs() / 2.0
            }
            ApertureSpec::ObjectSpaceNA { na } => {
                let z_obj = 0.0;
                (location - z_obj) * na.asin().tan()
            }
        };

        Ok(Pupil { location, semi_diameter })
    }

    fn exit_pupil(
        model: &SequentialModel,
        wavelength: Float,
        marginal_ray: &ParaxialRayTrace,
    ) -> Result<Pupil, OpticsError> {
        let stop = model.stop_index();
        let last = model.surfaces().len() - 1;
        if stop == last {
            return Ok(Pupil {
                location: 0.0,
                semi_diameter: model.surfaces()[last].semi_diameter,
            });
        }

        let fwd = trace(model, wavelength, 0.0, 1.0)?;
        let location = fwd.z_intercept_after(last - 1);
        Ok(Pupil { location, semi_diameter: marginal_ray.y[last].abs() })
    }

    /// Scales and traces the marginal ray: passes through the edge of the
    /// entrance pupil at the object, forward through the whole system.
    pub fn marginal_ray(&self) -> &ParaxialRayTrace {
        &self.marginal_ray
    }

    /// Traces the chief ray for `field`: found as the object-space ray that
    /// passes through the stop center, by linear superposition of the two
    /// basis rays launched from the object at unit height and unit angle,
    /// then rescaled so its object-space height or angle matches the
    /// requested field.
    ///
    /// `field.hx` and `field.hy` are combined into a single meridional field
    /// magnitude `hypot(hx, hy)`; the azimuth that splits this magnitude back
    /// into `x`/`y` components is the caller's responsibility (this module
    /// traces a single meridional plane per the teacher crate's per-axis
    /// `RayTransferMatrix` approach), which is exact for a rotationally
    /// symmetric system.
    pub fn chief_ray(
        &self,
        model: &SequentialModel,
        field: &FieldSpec,
        field_definition: FieldDefinition,
    ) -> Result<ParaxialRayTrace, OpticsError> {
        let stop = model.stop_index();
        let height_basis = trace(model, self.wavelength, 1.0, 0.0)?;
        let angle_basis = trace(model, self.wavelength, 0.0, 1.0)?;
        let field_magnitude = field.hx.hypot(field.hy);

        let object_angle = 1.0;
        let object_height = if height_basis.y[stop].abs() < crate::core::EPSILON {
            0.0
        } else {
            -object_angle * angle_basis.y[stop] / height_basis.y[stop]
        };

        let scale = match field_definition {
            FieldDefinition::Angle => {
                let target = field_magnitude.to_radians().tan();
                if object_angle.abs() < crate::core::EPSILON { 0.0 } else { target / object_angle }
            }
            FieldDefinition::ObjectHeight
            | FieldDefinition::ParaxialImageHeight
            | FieldDefinition::RealImageHeight => {
                if object_height.abs() < crate::core::EPSILON { 0.0 } else { field_magnitude / object_height }
            }
        };

        trace(model, self.wavelength, object_height * scale, object_angle * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Float;
    use crate::materials::Material;
    use crate::specs::gaps::GapSpec;
    use crate::specs::surfaces::{GeometrySpec, SurfaceSpec, SurfaceType};

    fn singlet() -> SequentialModel {
        let surfaces = vec![
            SurfaceSpec::Object,
            SurfaceSpec::Stop { semi_diameter: 5.0, rotation: Default::default() },
            SurfaceSpec::Surface {
                geometry: GeometrySpec::Standard {
                    semi_diameter: 5.0,
                    radius_of_curvature: 20.0,
                    conic_constant: 0.0,
                },
                surf_type: SurfaceType::Refracting,
                physical_aperture: None,
                rotation: Default::default(),
                curvature_solve: None,
            },
            SurfaceSpec::Surface {
                geometry: GeometrySpec::Standard {
                    semi_diameter: 5.0,
                    radius_of_curvature: Float::INFINITY,
                    conic_constant: 0.0,
                },
                surf_type: SurfaceType::Refracting,
                physical_aperture: None,
                rotation: Default::default(),
                curvature_solve: None,
            },
            SurfaceSpec::Image { rotation: Default::default() },
        ];
        let gaps = vec![
            GapSpec::air(Float::INFINITY),
            GapSpec::air(0.0),
            GapSpec { thickness: 5.0, material: Material::constant(1.5168), thickness_solve: None },
            GapSpec::air(95.0),
        ];
        SequentialModel::new(&surfaces, &gaps).unwrap()
    }

    #[test]
    fn a_positive_singlet_has_positive_finite_focal_length() {
        let model = singlet();
        let props = ParaxialProperties::compute(
            &model,
            &ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
            0.5876,
            false,
        )
        .unwrap();
        assert!(props.efl_back.is_finite());
        assert!(props.efl_back > 0.0);
    }

    #[test]
    fn marginal_ray_reaches_the_stop_semi_diameter() {
        let model = singlet();
        let props = ParaxialProperties::compute(
            &model,
            &ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
            0.5876,
            false,
        )
        .unwrap();
        let stop = model.stop_index();
        assert!((props.marginal_ray().y[stop].abs() - 5.0).abs() < 1e-9);
    }
}
