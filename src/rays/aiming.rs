//! Ray aiming: choosing a launch position and direction, in object space,
//! for a single `(field, pupil point)` pair so that the traced ray actually
//! passes through the aperture stop at the requested normalized pupil
//! coordinate.
//!
//! Modeled as an enum of strategies rather than a trait object, per the
//! system's preference for flat dispatch over dynamic polymorphism
//! ([`crate::geometry::Geometry`] and [`crate::specs::surfaces::SurfaceType`]
//! take the same approach). [`AimStrategy::Paraxial`] is exact for
//! stop-free vignetting and negligible pupil aberration; [`AimStrategy::Iterative`]
//! and [`AimStrategy::Robust`] refine it against the real ray tracer for
//! systems where the two diverge.
use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::Float;
use crate::core::math::vec3::Vec3;
use crate::error::OpticsError;
use crate::paraxial::ParaxialProperties;
use crate::rays::batch::RayBatch;
use crate::rays::trace;
use crate::sequential_model::SequentialModel;
use crate::specs::fields::{FieldDefinition, FieldSpec};

/// A launch state: an object-space position and a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimedRay {
    pub position: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone)]
pub enum AimStrategy {
    /// The two-point construction: join the chief ray's object-space point
    /// to the target point in the entrance pupil plane, with no correction
    /// for pupil aberration.
    Paraxial,

    /// [`AimStrategy::Paraxial`] refined by Newton iteration against the
    /// real ray tracer, correcting the launch ray until it lands within
    /// `tolerance` of the target pupil point at the stop surface (or
    /// `max_iterations` is exhausted).
    Iterative { max_iterations: usize, tolerance: Float },

    /// [`AimStrategy::Iterative`] that falls back to the uncorrected
    /// paraxial aim if iteration fails to converge, rather than returning
    /// the last (possibly divergent) estimate.
    Robust { max_iterations: usize, tolerance: Float },

    /// Tries `primary`; if it produces a ray that dies before reaching the
    /// stop, retries with `secondary`.
    Fallback { primary: Box<AimStrategy>, secondary: Box<AimStrategy> },

    /// Wraps `inner` with a cache keyed on the field, pupil point, and
    /// wavelength, so repeated aiming requests for the same ray (e.g. across
    /// several surfaces of analysis) skip re-aiming.
    Cached { inner: Box<AimStrategy> },
}

impl Default for AimStrategy {
    fn default() -> Self {
        AimStrategy::Paraxial
    }
}

/// The one shared mutable structure in ray aiming: a fingerprint -> solution
/// map guarded by an `RwLock` so it can be shared across the worker threads
/// that trace separate ray batches in parallel.
#[derive(Debug, Default)]
pub struct AimCache {
    entries: RwLock<HashMap<u64, AimedRay>>,
}

impl AimCache {
    pub fn new() -> Self {
        Self { entries: RwLock::new(HashMap::new()) }
    }

    fn fingerprint(field: &FieldSpec, wavelength: Float, px: Float, py: Float) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        field.hx.to_bits().hash(&mut hasher);
        field.hy.to_bits().hash(&mut hasher);
        wavelength.to_bits().hash(&mut hasher);
        px.to_bits().hash(&mut hasher);
        py.to_bits().hash(&mut hasher);
        hasher.finish()
    }

    fn get(&self, key: u64) -> Option<AimedRay> {
        self.entries.read().expect("aim cache poisoned").get(&key).copied()
    }

    fn insert(&self, key: u64, ray: AimedRay) {
        self.entries.write().expect("aim cache poisoned").insert(key, ray);
    }
}

/// Aims a single ray at normalized pupil coordinate `(px, py)` for `field`,
/// using `strategy`. `cache` is consulted only by [`AimStrategy::Cached`].
#[allow(clippy::too_many_arguments)]
pub fn aim(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    px: Float,
    py: Float,
    strategy: &AimStrategy,
    cache: Option<&AimCache>,
) -> Result<AimedRay, OpticsError> {
    match strategy {
        AimStrategy::Paraxial => paraxial_aim(model, properties, field, field_definition, px, py),
        AimStrategy::Iterative { max_iterations, tolerance } => {
            iterative_aim(model, properties, field, field_definition, wavelength, px, py, *max_iterations, *tolerance)
        }
        AimStrategy::Robust { max_iterations, tolerance } => {
            let refined =
                iterative_aim(model, properties, field, field_definition, wavelength, px, py, *max_iterations, *tolerance)?;
            let paraxial = paraxial_aim(model, properties, field, field_definition, px, py)?;
            if ray_reaches_stop(model, wavelength, refined) {
                Ok(refined)
            } else {
                Ok(paraxial)
            }
        }
        AimStrategy::Fallback { primary, secondary } => {
            let attempt = aim(model, properties, field, field_definition, wavelength, px, py, primary, cache)?;
            if ray_reaches_stop(model, wavelength, attempt) {
                Ok(attempt)
            } else {
                aim(model, properties, field, field_definition, wavelength, px, py, secondary, cache)
            }
        }
        AimStrategy::Cached { inner } => {
            let key = AimCache::fingerprint(field, wavelength, px, py);
            if let Some(cache) = cache {
                if let Some(hit) = cache.get(key) {
                    return Ok(hit);
                }
            }
            let result = aim(model, properties, field, field_definition, wavelength, px, py, inner, cache)?;
            if let Some(cache) = cache {
                cache.insert(key, result);
            }
            Ok(result)
        }
    }
}

/// Joins the chief ray's object-space point to `(px, py)` scaled to the
/// entrance pupil, in the meridional plane defined by the field's azimuth
/// `atan2(hy, hx)` -- exact for a rotationally symmetric system.
fn paraxial_aim(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    px: Float,
    py: Float,
) -> Result<AimedRay, OpticsError> {
    let azimuth = if field.hx == 0.0 && field.hy == 0.0 { 0.0 } else { field.hy.atan2(field.hx) };
    let chief = properties.chief_ray(model, field, field_definition)?;
    let object_height = chief.y[0];
    let object_angle = chief.u[0];

    let pupil = properties.entrance_pupil;
    let object_z = object_z_position(model);
    // The paraxial module tracks z only as cumulative thickness from surface
    // 0, with no step across an infinite gap -- so its z=0 coincides with
    // surface 0's own global position when the object is finite, and with
    // surface 1's (always exactly global z=0, by the cursor's construction)
    // when the object is at infinity.
    let z_origin = if object_z.is_finite() { object_z } else { 0.0 };
    let (px, py) = field.vignette(px, py);

    if pupil.location.is_infinite() {
        // Object-space telecentric: every field shares the same parallel
        // bundle direction, tilted by the chief ray's angle.
        let theta = object_angle.atan();
        let direction = Vec3::new(theta.sin() * azimuth.cos(), theta.sin() * azimuth.sin(), theta.cos());
        let position = Vec3::new(px * pupil.semi_diameter, py * pupil.semi_diameter, z_origin);
        return Ok(AimedRay { position, direction });
    }

    let pupil_z = z_origin + pupil.location;
    let target = Vec3::new(px * pupil.semi_diameter, py * pupil.semi_diameter, pupil_z);

    if object_z.is_infinite() {
        let theta = object_angle.atan();
        let direction = Vec3::new(theta.sin() * azimuth.cos(), theta.sin() * azimuth.sin(), theta.cos());
        // The launch plane is pushed well upstream of the pupil so the ray
        // already has room to converge toward it.
        let upstream = pupil_z - pupil.semi_diameter.abs().max(1.0) * 10.0;
        let dz = target.z() - upstream;
        let position = Vec3::new(
            target.x() - direction.x() * dz / direction.z().max(crate::core::EPSILON),
            target.y() - direction.y() * dz / direction.z().max(crate::core::EPSILON),
            upstream,
        );
        return Ok(AimedRay { position, direction });
    }

    let position = Vec3::new(object_height * azimuth.cos(), object_height * azimuth.sin(), object_z);
    let direction = (target - position).normalize();
    Ok(AimedRay { position, direction })
}

fn object_z_position(model: &SequentialModel) -> Float {
    model.frames().position_in_global_frame(model.surfaces()[0].frame).z()
}

/// Refines [`paraxial_aim`] with damped Newton iteration on the real ray
/// tracer's landing point at the stop surface, using a finite-difference
/// Jacobian of that landing point with respect to the two free launch
/// parameters (lateral position for a finite object, launch angle for an
/// object at infinity).
#[allow(clippy::too_many_arguments)]
fn iterative_aim(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    px: Float,
    py: Float,
    max_iterations: usize,
    tolerance: Float,
) -> Result<AimedRay, OpticsError> {
    let stop = model.stop_index();
    let pupil = properties.entrance_pupil;
    let (vpx, vpy) = field.vignette(px, py);
    let target = (vpx * model.surfaces()[stop].semi_diameter, vpy * model.surfaces()[stop].semi_diameter);

    let mut ray = paraxial_aim(model, properties, field, field_definition, px, py)?;
    let object_at_infinity = object_z_position(model).is_infinite() || pupil.location.is_infinite();
    let step = 1e-4;

    for _ in 0..max_iterations {
        let landing = land_at_stop(model, wavelength, ray, stop);
        let Some((x, y)) = landing else { break };
        let residual = ((x - target.0).powi(2) + (y - target.1).powi(2)).sqrt();
        if residual < tolerance {
            return Ok(ray);
        }

        let (perturbed_a, perturbed_b) = if object_at_infinity {
            (
                perturb_angle(ray, step, 0),
                perturb_angle(ray, step, 1),
            )
        } else {
            (
                perturb_position(ray, step, 0),
                perturb_position(ray, step, 1),
            )
        };

        let Some((xa, ya)) = land_at_stop(model, wavelength, perturbed_a, stop) else { break };
        let Some((xb, yb)) = land_at_stop(model, wavelength, perturbed_b, stop) else { break };

        let j11 = (xa - x) / step;
        let j21 = (ya - y) / step;
        let j12 = (xb - x) / step;
        let j22 = (yb - y) / step;
        let det = j11 * j22 - j12 * j21;
        if det.abs() < crate::core::EPSILON {
            break;
        }

        let dx_target = target.0 - x;
        let dy_target = target.1 - y;
        let da = (j22 * dx_target - j12 * dy_target) / det;
        let db = (-j21 * dx_target + j11 * dy_target) / det;

        ray = if object_at_infinity {
            perturb_angle(perturb_angle(ray, da, 0), db, 1)
        } else {
            perturb_position(perturb_position(ray, da, 0), db, 1)
        };
    }

    Ok(ray)
}

fn perturb_position(ray: AimedRay, delta: Float, axis: usize) -> AimedRay {
    let mut position = ray.position;
    position = if axis == 0 {
        Vec3::new(position.x() + delta, position.y(), position.z())
    } else {
        Vec3::new(position.x(), position.y() + delta, position.z())
    };
    AimedRay { position, direction: ray.direction }
}

fn perturb_angle(ray: AimedRay, delta: Float, axis: usize) -> AimedRay {
    let direction = if axis == 0 {
        Vec3::new(ray.direction.x() + delta, ray.direction.y(), ray.direction.z())
    } else {
        Vec3::new(ray.direction.x(), ray.direction.y() + delta, ray.direction.z())
    };
    AimedRay { position: ray.position, direction: direction.normalize() }
}

fn land_at_stop(model: &SequentialModel, wavelength: Float, ray: AimedRay, stop: usize) -> Option<(Float, Float)> {
    let mut batch = RayBatch::new(&[ray.position], &[ray.direction], wavelength);
    for surface_index in 1..=stop {
        trace::trace_single_surface(model, surface_index, &mut batch).ok()?;
    }
    if batch.is_live(0) { Some((batch.x[0], batch.y[0])) } else { None }
}

fn ray_reaches_stop(model: &SequentialModel, wavelength: Float, ray: AimedRay) -> bool {
    let stop = model.stop_index();
    land_at_stop(model, wavelength, ray, stop).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use crate::specs::aperture::ApertureSpec;
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
    fn paraxial_aim_of_the_chief_ray_lands_on_axis_at_the_stop() {
        let model = singlet();
        let properties =
            ParaxialProperties::compute(&model, &ApertureSpec::EntrancePupil { semi_diameter: 5.0 }, 0.5876, false)
                .unwrap();
        let field = FieldSpec::new(0.0, 0.0, crate::specs::fields::PupilSampling::ChiefRay);
        let ray = paraxial_aim(&model, &properties, &field, FieldDefinition::Angle, 0.0, 0.0).unwrap();
        assert!(ray.direction.n() > 0.0);
    }

    #[test]
    fn paraxial_aim_of_an_edge_pupil_point_reaches_the_stop() {
        let model = singlet();
        let properties =
            ParaxialProperties::compute(&model, &ApertureSpec::EntrancePupil { semi_diameter: 5.0 }, 0.5876, false)
                .unwrap();
        let field = FieldSpec::new(0.0, 0.0, crate::specs::fields::PupilSampling::ChiefRay);
        let ray = paraxial_aim(&model, &properties, &field, FieldDefinition::Angle, 0.0, 1.0).unwrap();
        assert!(ray_reaches_stop(&model, 0.5876, ray));
    }
}
