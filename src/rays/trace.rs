//! The real (non-paraxial) ray tracer: propagates a [`RayBatch`] through
//! every surface of a [`SequentialModel`] in order, mutating it in place.
//!
//! Per-ray numerical failures (missed intersection, total internal
//! reflection, aperture clipping, non-convergence) never abort the batch --
//! the offending ray is marked dead (`intensity = 0`) and tracing continues,
//! per the teacher crate's `Ray::intersect`/`Ray::redirect` primitives
//! generalized from a single ray to a batch.
use crate::core::Float;
use crate::core::math::complex::Complex;
use crate::core::math::vec3::Vec3;
use crate::error::OpticsError;
use crate::rays::batch::{JonesMatrix, RayBatch};
use crate::sequential_model::{Surface, SequentialModel};
use crate::specs::surfaces::SurfaceType;

fn identity_jones() -> JonesMatrix {
    let one = Complex::new(1.0, 0.0);
    let zero = Complex::new(0.0, 0.0);
    [[one, zero], [zero, one]]
}

fn scaled_jones(ts: Float, tp: Float, prior: JonesMatrix) -> JonesMatrix {
    let ts = Complex::new(ts, 0.0);
    let tp = Complex::new(tp, 0.0);
    [
        [cmul(ts, prior[0][0]), cmul(ts, prior[0][1])],
        [cmul(tp, prior[1][0]), cmul(tp, prior[1][1])],
    ]
}

fn cmul(a: Complex<Float>, b: Complex<Float>) -> Complex<Float> {
    Complex::new(a.real * b.real - a.imag * b.imag, a.real * b.imag + a.imag * b.real)
}

/// Amplitude transmission coefficients `(t_s, t_p)` for an unpolarized,
/// non-absorbing refracting interface, per the Fresnel equations.
fn fresnel_transmission(cos_i: Float, cos_t: Float, n_pre: Float, n_post: Float) -> (Float, Float) {
    let ts = (2.0 * n_pre * cos_i) / (n_pre * cos_i + n_post * cos_t);
    let tp = (2.0 * n_pre * cos_i) / (n_post * cos_i + n_pre * cos_t);
    (ts, tp)
}

fn flat_plane_distance(position: Vec3, direction: Vec3) -> Option<Float> {
    if direction.n().abs() < crate::core::EPSILON {
        return None;
    }
    let t = -position.z() / direction.n();
    if t.is_finite() { Some(t) } else { None }
}

fn surface_distance(surface: &Surface, position: Vec3, direction: Vec3) -> Option<Float> {
    match &surface.geometry {
        Some(geometry) => geometry.distance(position, direction),
        None => flat_plane_distance(position, direction),
    }
}

fn surface_normal(surface: &Surface, x: Float, y: Float) -> Vec3 {
    match &surface.geometry {
        Some(geometry) => geometry.surface_normal(x, y),
        None => Vec3::new(0.0, 0.0, -1.0),
    }
}

fn material_index_before(
    model: &SequentialModel,
    surface_index: usize,
    wavelength: Float,
) -> Result<Float, OpticsError> {
    if surface_index == 0 {
        return Ok(1.0);
    }
    model.gaps()[surface_index - 1]
        .material
        .index_at(wavelength)
        .map(|c| c.real)
}

fn material_index_after(
    model: &SequentialModel,
    surface_index: usize,
    wavelength: Float,
) -> Result<Float, OpticsError> {
    match model.gaps().get(surface_index) {
        Some(gap) => gap.material.index_at(wavelength).map(|c| c.real),
        None => material_index_before(model, surface_index, wavelength),
    }
}

/// Traces `batch` through every surface of `model`, in order, mutating it in
/// place. Dead rays keep their index and last valid state.
///
/// The object surface (index 0) is never localized into or intersected: a
/// ray batch is generated already at its launch state in global
/// coordinates, and for an object at infinity the object surface's own
/// frame sits at `z = -inf`, which is not a coordinate system a ray can be
/// localized into.
pub fn trace(model: &SequentialModel, batch: &mut RayBatch) -> Result<(), OpticsError> {
    for surface_index in 1..model.surfaces().len() {
        trace_single_surface(model, surface_index, batch)?;
    }
    Ok(())
}

/// Traces `batch` through a single surface of `model`. Exposed beyond this
/// module so ray aiming can trace just as far as the stop surface when
/// iterating toward a target pupil point.
pub(crate) fn trace_single_surface(
    model: &SequentialModel,
    surface_index: usize,
    batch: &mut RayBatch,
) -> Result<(), OpticsError> {
    let surface = &model.surfaces()[surface_index];
    let frame = surface.frame;

    for i in 0..batch.len() {
        if !batch.is_live(i) {
            continue;
        }

        let wavelength = batch.wavelength[i];
        let n_pre = material_index_before(model, surface_index, wavelength)?;
        let n_post = material_index_after(model, surface_index, wavelength)?;

        // 1. Localize.
        let local_pos = model.frames().localize_point(frame, batch.position(i));
        let local_dir = model.frames().localize_dir(frame, batch.direction(i));

        // 2. Distance.
        let Some(t) = surface_distance(surface, local_pos, local_dir) else {
            batch.kill(i);
            continue;
        };

        // 3. Advance.
        let hit = local_pos + local_dir * t;
        batch.opl[i] += n_pre * t;

        // 4. Aperture clip.
        if let Some(aperture) = &surface.physical_aperture {
            if !aperture.contains(hit.x(), hit.y()) {
                batch.kill(i);
                continue;
            }
        } else if surface.semi_diameter.is_finite()
            && hit.x() * hit.x() + hit.y() * hit.y() > surface.semi_diameter * surface.semi_diameter
        {
            batch.kill(i);
            continue;
        }

        // 5. Interaction.
        let normal = surface_normal(surface, hit.x(), hit.y());
        let new_dir = match &surface.surf_type {
            SurfaceType::Refracting => {
                match refract(local_dir, normal, n_pre, n_post) {
                    Some(d) => d,
                    None => {
                        // Total internal reflection: sequential tracing does
                        // not follow the reflected branch.
                        batch.kill(i);
                        continue;
                    }
                }
            }
            SurfaceType::Reflecting => reflect(local_dir, normal),
            SurfaceType::ThinParaxial { focal_length } => {
                thin_paraxial(local_dir, hit, n_pre, n_post, *focal_length)
            }
            SurfaceType::Grating { groove_density, order } => {
                grating(local_dir, wavelength, *groove_density, *order, n_pre, n_post)
            }
            SurfaceType::NoOp => local_dir,
        };

        if let Some(jones) = batch.polarization.as_mut() {
            jones[i] = match &surface.surf_type {
                SurfaceType::Refracting => {
                    let cos_i = (-local_dir.dot(normal)).abs();
                    let cos_t = 1.0 - (n_pre / n_post).powi(2) * (1.0 - cos_i * cos_i);
                    let cos_t = cos_t.max(0.0).sqrt();
                    let (ts, tp) = fresnel_transmission(cos_i, cos_t, n_pre, n_post);
                    scaled_jones(ts, tp, jones[i])
                }
                SurfaceType::NoOp | SurfaceType::ThinParaxial { .. } => {
                    scaled_jones(1.0, 1.0, jones[i])
                }
                _ => identity_jones(),
            };
        }

        // 6. Globalize.
        batch.set_position(i, model.frames().globalize_point(frame, hit));
        batch.set_direction(i, model.frames().globalize_dir(frame, new_dir.normalize()));
    }

    Ok(())
}

fn refract(direction: Vec3, normal: Vec3, n_pre: Float, n_post: Float) -> Option<Vec3> {
    let eta = n_pre / n_post;
    let cos_theta_i = -direction.dot(normal);
    let discriminant = 1.0 - eta * eta * (1.0 - cos_theta_i * cos_theta_i);
    if discriminant < 0.0 {
        return None;
    }
    let cos_theta_t = discriminant.sqrt();
    Some((direction * eta + normal * (eta * cos_theta_i - cos_theta_t)).normalize())
}

fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    let cos_theta_i = direction.dot(normal);
    direction - normal * (2.0 * cos_theta_i)
}

/// Generalizes the paraxial thin-lens relation `u' = u - y / f` to a real
/// ray by applying it independently to the x and y slopes, then
/// renormalizing.
fn thin_paraxial(direction: Vec3, hit: Vec3, n_pre: Float, n_post: Float, focal_length: Float) -> Vec3 {
    let l = (n_pre * direction.l() - hit.x() / focal_length) / n_post;
    let m = (n_pre * direction.m() - hit.y() / focal_length) / n_post;
    let n_sq = (1.0 - l * l - m * m).max(0.0);
    Vec3::new(l, m, n_sq.sqrt() * direction.n().signum())
}

/// The grating equation, restricted to grooves running along local x so
/// dispersion is confined to the y (tangential) direction:
/// `n_post sin(theta_m) = n_pre sin(theta_i) + m lambda / d`.
fn grating(
    direction: Vec3,
    wavelength_um: Float,
    groove_density_per_mm: Float,
    order: i32,
    n_pre: Float,
    n_post: Float,
) -> Vec3 {
    let wavelength_mm = wavelength_um * 1e-3;
    let m_new = (n_pre * direction.m() + (order as Float) * wavelength_mm * groove_density_per_mm)
        / n_post;
    let l_new = direction.l() * n_pre / n_post;
    let n_sq = (1.0 - l_new * l_new - m_new * m_new).max(0.0);
    Vec3::new(l_new, m_new, n_sq.sqrt() * direction.n().signum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use crate::specs::gaps::GapSpec;
    use crate::specs::surfaces::{GeometrySpec, SurfaceSpec};

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
    fn an_on_axis_ray_stays_on_axis_through_a_centered_singlet() {
        let model = singlet();
        let mut batch = RayBatch::new(
            &[Vec3::new(0.0, 0.0, -1000.0)],
            &[Vec3::new(0.0, 0.0, 1.0)],
            0.5876,
        );
        trace(&model, &mut batch).unwrap();
        assert!(batch.is_live(0));
        assert!(batch.x[0].abs() < 1e-9);
        assert!(batch.y[0].abs() < 1e-9);
    }

    #[test]
    fn a_ray_outside_the_stop_semi_diameter_is_clipped() {
        let model = singlet();
        let mut batch = RayBatch::new(
            &[Vec3::new(0.0, 10.0, -1000.0)],
            &[Vec3::new(0.0, 0.0, 1.0)],
            0.5876,
        );
        trace(&model, &mut batch).unwrap();
        assert!(!batch.is_live(0));
    }

    #[test]
    fn opl_accumulates_monotonically_for_a_live_ray() {
        let model = singlet();
        let mut batch = RayBatch::new(
            &[Vec3::new(0.0, 1.0, -1000.0)],
            &[Vec3::new(0.0, 0.0, 1.0)],
            0.5876,
        );
        trace(&model, &mut batch).unwrap();
        assert!(batch.is_live(0));
        assert!(batch.opl[0] > 0.0);
    }
}
