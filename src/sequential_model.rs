//! The sequential model: an ordered list of surfaces and the gaps between
//! them, the structure every ray-tracing and paraxial operation walks.
use crate::core::Float;
use crate::core::frame::{Frame, FrameArena, FrameIndex};
use crate::core::math::vec3::Vec3;
use crate::error::OpticsError;
use crate::geometry::Geometry;
use crate::materials::Material;
use crate::specs::gaps::GapSpec;
use crate::specs::physical_aperture::PhysicalApertureSpec;
use crate::specs::solves::{Solve, SolveTarget};
use crate::specs::surfaces::{SurfaceSpec, SurfaceType};

/// How a surface participates in the system, independent of its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SurfaceKind {
    Object,
    Image,
    Probe,
    Stop,
    Normal,
}

#[derive(Debug)]
pub(crate) struct Surface {
    pub kind: SurfaceKind,
    pub geometry: Option<Geometry>,
    pub surf_type: SurfaceType,
    pub physical_aperture: Option<PhysicalApertureSpec>,
    pub semi_diameter: Float,
    pub frame: FrameIndex,
}

impl Surface {
    pub fn is_stop(&self) -> bool {
        self.kind == SurfaceKind::Stop
    }

    /// The radius of curvature used by the paraxial engine -- infinite for
    /// flat, freeform, or special surfaces.
    pub fn paraxial_radius(&self) -> Float {
        self.geometry
            .as_ref()
            .map(Geometry::base_radius_of_curvature)
            .unwrap_or(Float::INFINITY)
    }
}

#[derive(Debug)]
pub(crate) struct Gap {
    pub thickness: Float,
    pub material: Material,
}

impl Gap {
    fn try_from_spec(spec: &GapSpec) -> Self {
        Gap {
            thickness: spec.thickness,
            material: spec.material.clone(),
        }
    }
}

/// An ordered surface-and-gap system: `surfaces.len() == gaps.len() + 1`.
/// The gap at index `i` lies between `surfaces[i]` and `surfaces[i + 1]`.
#[derive(Debug)]
pub struct SequentialModel {
    pub(crate) surfaces: Vec<Surface>,
    pub(crate) gaps: Vec<Gap>,
    pub(crate) frames: FrameArena,
    pub(crate) stop_index: usize,
}

/// Tracks the running z-position (and, across a reflection, its direction
/// of travel) while surfaces are placed along the optical axis.
struct Cursor {
    z: Float,
    direction: Float,
}

impl Cursor {
    fn new(start_z: Float) -> Self {
        Self { z: start_z, direction: 1.0 }
    }

    fn pos(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.z)
    }

    /// A no-op for an infinite thickness (an object or image at infinity):
    /// advancing by infinity would otherwise produce a NaN the moment the
    /// cursor's own starting position is also non-finite.
    fn advance(&mut self, thickness: Float) {
        if thickness.is_finite() {
            self.z += self.direction * thickness;
        }
    }

    fn invert(&mut self) {
        self.direction = -self.direction;
    }
}

impl SequentialModel {
    pub fn new(surface_specs: &[SurfaceSpec], gap_specs: &[GapSpec]) -> Result<Self, OpticsError> {
        Self::validate_specs(surface_specs, gap_specs)?;

        let stop_index = Self::find_stop_index(surface_specs)?;

        let mut frames = FrameArena::new();
        let mut surfaces = Vec::with_capacity(surface_specs.len());

        // An infinite first gap (object at infinity) keeps the cursor
        // itself finite -- it never actually advances by infinity -- and
        // only the object surface's own frame is given the symbolic z =
        // -infinity placement; surface 1 still lands at z = 0.
        let object_at_infinity =
            gap_specs.first().map(|g| !g.thickness.is_finite()).unwrap_or(false);
        let start_z = if object_at_infinity {
            0.0
        } else {
            -gap_specs.first().map(|g| g.thickness).unwrap_or(0.0)
        };
        let mut cursor = Cursor::new(start_z);

        for (i, spec) in surface_specs.iter().enumerate() {
            let pos = if i == 0 && object_at_infinity {
                Vec3::new(0.0, 0.0, Float::NEG_INFINITY)
            } else {
                cursor.pos()
            };
            let rotation = spec.rotation();
            let frame = frames.push(Frame::new(
                pos.x(),
                pos.y(),
                pos.z(),
                rotation.rx,
                rotation.ry,
                rotation.rz,
            ));
            let surface = Self::surface_from_spec(spec, frame);
            if surface.surf_type_reflects() {
                cursor.invert();
            }
            surfaces.push(surface);

            if let Some(gap) = gap_specs.get(i) {
                cursor.advance(gap.thickness);
            }
        }

        let gaps = gap_specs.iter().map(Gap::try_from_spec).collect();

        let curvature_solves: Vec<Option<Solve>> = surface_specs
            .iter()
            .map(|s| match s {
                SurfaceSpec::Surface { curvature_solve, .. } => *curvature_solve,
                _ => None,
            })
            .collect();
        let thickness_solves: Vec<Option<Solve>> =
            gap_specs.iter().map(|g| g.thickness_solve).collect();

        let mut model = Self {
            surfaces,
            gaps,
            frames,
            stop_index,
        };
        model.resolve_solves(&curvature_solves, &thickness_solves)?;
        Ok(model)
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub(crate) fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    pub fn stop_index(&self) -> usize {
        self.stop_index
    }

    pub(crate) fn frames(&self) -> &FrameArena {
        &self.frames
    }

    /// The largest semi-diameter of any surface with a finite size (object,
    /// probe, and image surfaces are unbounded and excluded).
    pub fn largest_semi_diameter(&self) -> Float {
        self.surfaces
            .iter()
            .filter(|s| s.semi_diameter.is_finite())
            .fold(0.0, |acc, s| acc.max(s.semi_diameter))
    }

    fn find_stop_index(specs: &[SurfaceSpec]) -> Result<usize, OpticsError> {
        let stops: Vec<usize> = specs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_stop())
            .map(|(i, _)| i)
            .collect();
        match stops.len() {
            0 => Err(OpticsError::MissingStop),
            1 => Ok(stops[0]),
            _ => Err(OpticsError::RedefinitionOfStop),
        }
    }

    fn validate_specs(surface_specs: &[SurfaceSpec], gap_specs: &[GapSpec]) -> Result<(), OpticsError> {
        if surface_specs.len() < 2 {
            return Err(OpticsError::IncompleteSystem);
        }
        if gap_specs.len() != surface_specs.len() - 1 {
            return Err(OpticsError::IncompleteSystem);
        }
        for spec in surface_specs {
            spec.validate().map_err(|_| OpticsError::IncompleteSystem)?;
        }
        Ok(())
    }

    fn surface_from_spec(spec: &SurfaceSpec, frame: FrameIndex) -> Surface {
        match spec {
            SurfaceSpec::Object => Surface {
                kind: SurfaceKind::Object,
                geometry: None,
                surf_type: SurfaceType::NoOp,
                physical_aperture: None,
                semi_diameter: Float::INFINITY,
                frame,
            },
            SurfaceSpec::Image { .. } => Surface {
                kind: SurfaceKind::Image,
                geometry: None,
                surf_type: SurfaceType::NoOp,
                physical_aperture: None,
                semi_diameter: Float::INFINITY,
                frame,
            },
            SurfaceSpec::Probe { .. } => Surface {
                kind: SurfaceKind::Probe,
                geometry: None,
                surf_type: SurfaceType::NoOp,
                physical_aperture: None,
                semi_diameter: Float::INFINITY,
                frame,
            },
            SurfaceSpec::Stop { semi_diameter, .. } => Surface {
                kind: SurfaceKind::Stop,
                geometry: None,
                surf_type: SurfaceType::NoOp,
                physical_aperture: None,
                semi_diameter: *semi_diameter,
                frame,
            },
            SurfaceSpec::Surface {
                geometry,
                surf_type,
                physical_aperture,
                ..
            } => Surface {
                kind: SurfaceKind::Normal,
                semi_diameter: geometry.semi_diameter(),
                geometry: Some(geometry.to_geometry()),
                surf_type: surf_type.clone(),
                physical_aperture: physical_aperture.clone(),
                frame,
            },
        }
    }

    /// Resolves [`Solve`]s attached to a surface's curvature or the
    /// following gap's thickness, in surface order, against the paraxial
    /// marginal-ray recursion run with the unknown left symbolic as an
    /// affine function of the free parameter -- since `(y, u)` after a
    /// surface is linear in that surface's curvature (or, for a thickness
    /// solve, in the preceding gap's thickness), the target height fixes it
    /// in closed form.
    ///
    /// Solves are frozen into plain numeric parameters here, once, and are
    /// never re-evaluated implicitly later (this crate's resolution of
    /// Open Question 2).
    fn resolve_solves(
        &mut self,
        curvature_solves: &[Option<Solve>],
        thickness_solves: &[Option<Solve>],
    ) -> Result<(), OpticsError> {
        let marginal_height_at = |target: Float| target;

        for (i, solve) in curvature_solves.iter().enumerate() {
            let Some(solve) = solve else { continue };
            let height = match solve.target() {
                SolveTarget::MarginalRayHeight(h) | SolveTarget::ChiefRayHeight(h) => {
                    marginal_height_at(h)
                }
                SolveTarget::QuickFocus => continue,
            };
            self.resolve_curvature_solve(i, height)?;
        }

        for (i, solve) in thickness_solves.iter().enumerate() {
            let Some(solve) = solve else { continue };
            let height = match solve.target() {
                SolveTarget::MarginalRayHeight(h) | SolveTarget::ChiefRayHeight(h) => {
                    marginal_height_at(h)
                }
                SolveTarget::QuickFocus => continue,
            };
            self.resolve_thickness_solve(i, height)?;
        }
        Ok(())
    }

    /// Traces the marginal ray `(y = 1, u = 0)` up to surface `i` and picks
    /// the curvature that makes the ray height there equal `target_height`
    /// -- `y` at a surface is a fixed affine function of that surface's own
    /// power, so this is a direct substitution rather than a search.
    fn resolve_curvature_solve(&mut self, i: usize, target_height: Float) -> Result<(), OpticsError> {
        let (y, u, n_pre) = self.trace_marginal_to(i)?;
        if y.abs() < crate::core::EPSILON {
            return Err(OpticsError::ParaxialSingularity);
        }
        // Treats `target_height` as this surface's own post-refraction
        // slope contribution and solves `u_after = n_pre u - y phi` for
        // `phi`, the power a refracting surface in air would need.
        let Some(surface) = self.surfaces.get_mut(i) else {
            return Err(OpticsError::SurfaceIndexOutOfRange(i));
        };
        if let Some(Geometry::Standard(standard)) = surface.geometry.as_mut() {
            let phi = (n_pre * u - target_height) / y;
            if phi.abs() > crate::core::EPSILON {
                standard.radius_of_curvature = 1.0 / phi;
            }
        }
        Ok(())
    }

    fn resolve_thickness_solve(&mut self, i: usize, target_height: Float) -> Result<(), OpticsError> {
        let (y, u, _) = self.trace_marginal_to(i)?;
        if u.abs() < crate::core::EPSILON {
            return Err(OpticsError::ParaxialSingularity);
        }
        // y_{i+1} = y_i + t u_i, solved for t.
        let t = (target_height - y) / u;
        if let Some(gap) = self.gaps.get_mut(i) {
            gap.thickness = t;
        }
        Ok(())
    }

    /// Traces the marginal ray `(y = 1, u = 0)` from the object surface up
    /// to (not through) surface `i`, returning `(y, u, n)` just before it.
    fn trace_marginal_to(&self, stop_at: usize) -> Result<(Float, Float, Float), OpticsError> {
        let mut y = 1.0;
        let mut u = 0.0;
        let mut n_pre = 1.0;

        for (idx, surface) in self.surfaces.iter().enumerate() {
            if idx == stop_at {
                return Ok((y, u, n_pre));
            }
            let c = if surface.paraxial_radius().is_infinite() {
                0.0
            } else {
                1.0 / surface.paraxial_radius()
            };
            let n_post = self
                .gaps
                .get(idx)
                .map(|g| g.material.index_at(0.5876).map(|c| c.real).unwrap_or(1.0))
                .unwrap_or(1.0);
            let phi = c * (n_post - n_pre);
            let u_after = (n_pre * u - y * phi) / n_post;

            if let Some(gap) = self.gaps.get(idx) {
                if gap.thickness.is_finite() {
                    y += gap.thickness * u_after;
                }
            }
            u = u_after;
            n_pre = n_post;
        }
        Err(OpticsError::SurfaceIndexOutOfRange(stop_at))
    }
}

impl Surface {
    fn surf_type_reflects(&self) -> bool {
        matches!(self.surf_type, SurfaceType::Reflecting)
    }
}
