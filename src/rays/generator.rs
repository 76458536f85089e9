//! Builds a [`RayBatch`] for a single field point by combining a pupil
//! sampling ([`crate::wavefront::distribution::sample`]) with ray aiming
//! ([`crate::rays::aiming`]).
//!
//! Grounded in the teacher crate's `parallel_ray_fan` /
//! `parallel_ray_bundle_on_sq_grid`: both build a bundle of rays from a
//! pupil-plane position distribution and a shared launch direction. This
//! generalizes that to a bundle whose member rays are independently aimed,
//! which is required once the object is at a finite distance or the field is
//! off-axis.
use crate::core::Float;
use crate::error::OpticsError;
use crate::paraxial::ParaxialProperties;
use crate::rays::aiming::{self, AimCache, AimStrategy};
use crate::rays::batch::RayBatch;
use crate::sequential_model::SequentialModel;
use crate::specs::apodization::ApodizationSpec;
use crate::specs::fields::{FieldDefinition, FieldSpec};
use crate::wavefront::distribution;

/// Builds a ray batch for `field` at `wavelength`, one ray per point of
/// `field.pupil_sampling`, aimed with `strategy` and weighted at launch by
/// `apodization`.
pub fn ray_batch_for_field(
    model: &SequentialModel,
    properties: &ParaxialProperties,
    field: &FieldSpec,
    field_definition: FieldDefinition,
    wavelength: Float,
    strategy: &AimStrategy,
    cache: Option<&AimCache>,
    apodization: &ApodizationSpec,
) -> Result<RayBatch, OpticsError> {
    let pupil_points = distribution::sample(&field.pupil_sampling);
    let mut positions = Vec::with_capacity(pupil_points.len());
    let mut directions = Vec::with_capacity(pupil_points.len());
    let mut weights = Vec::with_capacity(pupil_points.len());

    for (px, py) in pupil_points {
        let ray = aiming::aim(model, properties, field, field_definition, wavelength, px, py, strategy, cache)?;
        positions.push(ray.position);
        directions.push(ray.direction);
        weights.push(apodization.intensity(px, py));
    }

    let mut batch = RayBatch::new(&positions, &directions, wavelength);
    for (i, w) in weights.into_iter().enumerate() {
        batch.intensity[i] *= w;
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use crate::rays::trace;
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
    fn an_on_axis_field_produces_a_batch_centered_on_the_axis() {
        let model = singlet();
        let properties =
            ParaxialProperties::compute(&model, &ApertureSpec::EntrancePupil { semi_diameter: 5.0 }, 0.5876, false)
                .unwrap();
        let field = FieldSpec::new(0.0, 0.0, crate::specs::fields::PupilSampling::Hexapolar { rings: 2 });
        let mut batch = ray_batch_for_field(
            &model,
            &properties,
            &field,
            FieldDefinition::Angle,
            0.5876,
            &AimStrategy::Paraxial,
            None,
            &crate::specs::apodization::ApodizationSpec::Uniform,
        )
        .unwrap();
        assert_eq!(batch.len(), 1 + 6 + 12);
        trace::trace(&model, &mut batch).unwrap();
        assert!(batch.live_count() > 0);
    }

    #[test]
    fn an_off_axis_field_still_produces_live_rays() {
        let model = singlet();
        let properties =
            ParaxialProperties::compute(&model, &ApertureSpec::EntrancePupil { semi_diameter: 5.0 }, 0.5876, false)
                .unwrap();
        let field = FieldSpec::new(0.0, 5.0, crate::specs::fields::PupilSampling::ChiefRay);
        let mut batch = ray_batch_for_field(
            &model,
            &properties,
            &field,
            FieldDefinition::Angle,
            0.5876,
            &AimStrategy::Paraxial,
            None,
            &crate::specs::apodization::ApodizationSpec::Uniform,
        )
        .unwrap();
        trace::trace(&model, &mut batch).unwrap();
        assert!(batch.is_live(0));
    }
}
