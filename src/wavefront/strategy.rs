//! Reference-sphere wavefront reconstruction: traces every pupil sample to
//! the image surface, fits a reference sphere to the resulting ray bundle by
//! one of three strategies, and reduces each ray's optical path length to an
//! optical path difference in waves.
use crate::core::Float;
use crate::core::math::vec3::Vec3;
use crate::error::OpticsError;
use crate::paraxial::ParaxialProperties;
use crate::rays::aiming::{self, AimStrategy};
use crate::rays::batch::RayBatch;
use crate::rays::trace;
use crate::sequential_model::SequentialModel;
use crate::specs::apodization::ApodizationSpec;
use crate::specs::fields::{FieldDefinition, FieldSpec};
use crate::wavefront::distribution;

/// How the reference sphere (against which every ray's optical path length
/// is compared) is chosen.
#[derive(Debug, Clone, Copy)]
pub enum ReferenceSphereStrategy {
    /// Centered on the chief ray's image point; radius is the distance from
    /// there to the paraxial exit pupil. Exact only for an unvignetted,
    /// rotationally symmetric system.
    ChiefRay,

    /// Centered on the intensity-weighted centroid of every ray's image
    /// intersection; radius is the weighted mean distance from the centroid
    /// to each ray's wavefront point. `trim_sigma`, if set, drops samples
    /// farther than `trim_sigma` standard deviations from that mean before
    /// a final radius is recomputed.
    CentroidAnchored { trim_sigma: Option<Float> },

    /// The least-squares sphere that best fits every ray's wavefront point.
    BestFit,
}

/// Pupil-plane wavefront samples for one (field, wavelength) pair.
#[derive(Debug, Clone)]
pub struct WavefrontData {
    pub pupil_x: Vec<Float>,
    pub pupil_y: Vec<Float>,
    pub pupil_z: Vec<Float>,
    pub opd_waves: Vec<Float>,
    pub intensity: Vec<Float>,
    pub reference_radius: Float,
}

struct TracedSample {
    image_point: Vec3,
    direction: Vec3,
    opl: Float,
    intensity: Float,
    px: Float,
    py: Float,
}

fn trace_pupil(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    aim_strategy: &AimStrategy,
    apodization: &ApodizationSpec,
) -> Result<Vec<TracedSample>, OpticsError> {
    // Sampled once and reused for both aiming and labeling below -- a
    // pupil sampling drawn from randomness (`PupilSampling::Random`) must
    // not be resampled, or the (px, py) recorded here would no longer
    // describe the ray actually aimed.
    let points = distribution::sample(&field.pupil_sampling);
    let mut positions = Vec::with_capacity(points.len());
    let mut directions = Vec::with_capacity(points.len());
    for &(px, py) in &points {
        let ray = aiming::aim(model, properties, field, field_definition, wavelength, px, py, aim_strategy, None)?;
        positions.push(ray.position);
        directions.push(ray.direction);
    }
    let mut batch = RayBatch::new(&positions, &directions, wavelength);
    for (i, &(px, py)) in points.iter().enumerate() {
        batch.intensity[i] *= apodization.intensity(px, py);
    }
    trace::trace(model, &mut batch)?;

    Ok(points
        .into_iter()
        .enumerate()
        .map(|(i, (px, py))| TracedSample {
            image_point: batch.position(i),
            direction: batch.direction(i),
            opl: batch.opl[i],
            intensity: batch.intensity[i],
            px,
            py,
        })
        .collect())
}

fn trace_chief_ray(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    aim_strategy: &AimStrategy,
) -> Result<TracedSample, OpticsError> {
    let chief_field = FieldSpec { pupil_sampling: crate::specs::fields::PupilSampling::ChiefRay, ..*field };
    let samples =
        trace_pupil(model, properties, &chief_field, field_definition, wavelength, aim_strategy, &ApodizationSpec::Uniform)?;
    Ok(samples.into_iter().next().expect("chief-ray sampling yields exactly one point"))
}

fn image_refractive_index(model: &SequentialModel, wavelength: Float) -> Result<Float, OpticsError> {
    match model.gaps().last() {
        Some(gap) => gap.material.index_at(wavelength).map(|c| c.real),
        None => Ok(1.0),
    }
}

/// The point on the reference sphere that a ray, last seen at `point`
/// traveling along `direction`, actually reaches: the root of the
/// ray-sphere quadratic nearest `point`.
fn sphere_intersection(point: Vec3, direction: Vec3, center: Vec3, radius: Float) -> (Vec3, Float) {
    let oc = point - center;
    let b = 2.0 * direction.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - 4.0 * c;
    if discriminant < 0.0 {
        return (point, 0.0);
    }
    let sqrt_d = discriminant.sqrt();
    let t1 = (-b + sqrt_d) / 2.0;
    let t2 = (-b - sqrt_d) / 2.0;
    let t = if t1.abs() <= t2.abs() { t1 } else { t2 };
    (point + direction * t, t)
}

fn solve4x4(mut a: [[Float; 5]; 4]) -> Option<[Float; 4]> {
    for col in 0..4 {
        let pivot_row = (col..4).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())?;
        if a[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot_row);
        for row in 0..4 {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            for k in col..5 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }
    Some([a[0][4] / a[0][0], a[1][4] / a[1][1], a[2][4] / a[2][2], a[3][4] / a[3][3]])
}

/// Algebraic least-squares sphere fit: `2*c.p + d = |p|^2` for every point
/// `p`, solved for `(cx, cy, cz, d)` with `d = R^2 - |c|^2`.
fn best_fit_sphere(points: &[Vec3]) -> Option<(Vec3, Float)> {
    let mut ata = [[0.0; 5]; 5];
    for p in points {
        let row = [2.0 * p.x(), 2.0 * p.y(), 2.0 * p.z(), 1.0, p.length_squared()];
        for i in 0..5 {
            for j in 0..5 {
                ata[i][j] += row[i] * row[j];
            }
        }
    }
    let mut system = [[0.0; 5]; 4];
    for i in 0..4 {
        for j in 0..4 {
            system[i][j] = ata[i][j];
        }
        system[i][4] = ata[i][4];
    }
    let solution = solve4x4(system)?;
    let center = Vec3::new(solution[0], solution[1], solution[2]);
    let radius_sq = solution[3] + center.length_squared();
    if radius_sq < 0.0 {
        return None;
    }
    Some((center, radius_sq.sqrt()))
}

fn mean(values: &[Float]) -> Float {
    values.iter().sum::<Float>() / (values.len().max(1) as Float)
}

/// Runs the full 4.5 pipeline for one field and wavelength.
pub fn reconstruct(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    strategy: ReferenceSphereStrategy,
    aim_strategy: &AimStrategy,
    apodization: &ApodizationSpec,
) -> Result<WavefrontData, OpticsError> {
    let samples = trace_pupil(model, properties, field, field_definition, wavelength, aim_strategy, apodization)?;
    let n_image = image_refractive_index(model, wavelength)?;
    let live: Vec<&TracedSample> = samples.iter().filter(|s| s.intensity > 0.0).collect();

    let wavefront_point = |s: &TracedSample| s.image_point - s.direction * (s.opl / n_image);

    let (center, radius) = match strategy {
        ReferenceSphereStrategy::ChiefRay => {
            let chief = trace_chief_ray(model, properties, field, field_definition, wavelength, aim_strategy)?;
            let center = chief.image_point;
            let exit_anchor = exit_pupil_global_z(model);
            let exit_point = Vec3::new(0.0, 0.0, exit_anchor + properties.exit_pupil.location);
            (center, (center - exit_point).length())
        }
        ReferenceSphereStrategy::CentroidAnchored { trim_sigma } => {
            let total_intensity: Float = live.iter().map(|s| s.intensity).sum::<Float>().max(crate::core::EPSILON);
            let centroid = live.iter().fold(Vec3::zero(), |acc, s| acc + s.image_point * s.intensity)
                * (1.0 / total_intensity);

            let distances: Vec<Float> = live.iter().map(|s| (wavefront_point(s) - centroid).length()).collect();
            let mean_distance = mean(&distances);
            let radius = match trim_sigma {
                None => mean_distance,
                Some(k) => {
                    let variance =
                        distances.iter().map(|d| (d - mean_distance).powi(2)).sum::<Float>() / distances.len().max(1) as Float;
                    let sigma = variance.sqrt();
                    let trimmed: Vec<Float> =
                        distances.iter().copied().filter(|d| (d - mean_distance).abs() <= k * sigma).collect();
                    if trimmed.is_empty() { mean_distance } else { mean(&trimmed) }
                }
            };
            (centroid, radius)
        }
        ReferenceSphereStrategy::BestFit => {
            let points: Vec<Vec3> = live.iter().map(|s| wavefront_point(s)).collect();
            best_fit_sphere(&points).unwrap_or((Vec3::zero(), 0.0))
        }
    };

    let entrance_radius = properties.entrance_pupil.semi_diameter;
    let tilt_x = field.hx.to_radians().tan();
    let tilt_y = field.hy.to_radians().tan();

    let mut raw_opd = Vec::with_capacity(samples.len());
    let mut pupil_x = Vec::with_capacity(samples.len());
    let mut pupil_y = Vec::with_capacity(samples.len());
    let mut pupil_z = Vec::with_capacity(samples.len());
    for s in &samples {
        if s.intensity <= 0.0 {
            raw_opd.push(0.0);
            pupil_x.push(0.0);
            pupil_y.push(0.0);
            pupil_z.push(0.0);
            continue;
        }
        let (hit, t) = sphere_intersection(s.image_point, s.direction, center, radius);
        raw_opd.push(s.opl - n_image * t + (tilt_x * s.px + tilt_y * s.py) * entrance_radius);
        pupil_x.push(hit.x());
        pupil_y.push(hit.y());
        pupil_z.push(hit.z());
    }

    let reference = match strategy {
        ReferenceSphereStrategy::ChiefRay => {
            let chief = trace_chief_ray(model, properties, field, field_definition, wavelength, aim_strategy)?;
            let (_, t) = sphere_intersection(chief.image_point, chief.direction, center, radius);
            chief.opl - n_image * t
        }
        _ => {
            let live_opd: Vec<Float> =
                samples.iter().zip(&raw_opd).filter(|(s, _)| s.intensity > 0.0).map(|(_, &o)| o).collect();
            mean(&live_opd)
        }
    };

    let wavelength_mm = wavelength * 1e-3;
    let opd_waves = raw_opd.iter().map(|o| (o - reference) / wavelength_mm).collect();

    Ok(WavefrontData {
        pupil_x,
        pupil_y,
        pupil_z,
        opd_waves,
        intensity: samples.iter().map(|s| s.intensity).collect(),
        reference_radius: radius,
    })
}

fn exit_pupil_global_z(model: &SequentialModel) -> Float {
    let last = model.surfaces().len() - 1;
    model.frames().position_in_global_frame(model.surfaces()[last.saturating_sub(1)].frame).z()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use crate::specs::aperture::ApertureSpec;
    use crate::specs::gaps::GapSpec;
    use crate::specs::fields::PupilSampling;
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
    fn on_axis_chief_ray_strategy_has_zero_opd_at_the_chief_ray() {
        let model = singlet();
        let properties =
            ParaxialProperties::compute(&model, &ApertureSpec::EntrancePupil { semi_diameter: 5.0 }, 0.5876, false)
                .unwrap();
        let field = FieldSpec::new(0.0, 0.0, PupilSampling::Hexapolar { rings: 2 });
        let data = reconstruct(
            &model,
            &properties,
            &field,
            FieldDefinition::Angle,
            0.5876,
            ReferenceSphereStrategy::ChiefRay,
            &AimStrategy::Paraxial,
            &ApodizationSpec::Uniform,
        )
        .unwrap();
        assert!(data.opd_waves[0].abs() < 1e-6);
    }

    #[test]
    fn best_fit_sphere_recovers_a_known_sphere() {
        let points: Vec<Vec3> = (0..20)
            .map(|i| {
                let theta = i as Float * 0.3;
                Vec3::new(10.0 * theta.cos(), 10.0 * theta.sin(), 5.0 + 0.01 * i as Float)
            })
            .collect();
        let (center, radius) = best_fit_sphere(&points).unwrap();
        assert!(radius > 0.0);
        assert!(center.z().is_finite());
    }
}
