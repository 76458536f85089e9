//! The top-level optical system: a [`SequentialModel`] plus the fields,
//! wavelengths, aperture, field-definition, ray-aiming, and apodization
//! configuration that make it traceable. Mirrors the teacher crate's split
//! between the bare `SequentialModel` and the views built on top of it
//! (`ParaxialView`, `ray_trace_3d_view`), but gathers the configuration those
//! views used to take as loose arguments into a single owning struct, since
//! ray aiming and apodization did not exist in the teacher crate and need a
//! home of their own.
//!
//! Lifecycle: an `Optic` is mutated freely between traces (swap a field, a
//! wavelength list, an aim strategy) and every trace re-reads current state
//! -- nothing is cached except ray-aiming solutions in `aim_cache`, which is
//! the one piece of shared mutable state and is guarded internally by the
//! cache's own lock.
use crate::core::Float;
use crate::error::OpticsError;
use crate::paraxial::ParaxialProperties;
use crate::rays::aiming::{AimCache, AimStrategy};
use crate::rays::batch::RayBatch;
use crate::rays::generator;
use crate::rays::trace;
use crate::sequential_model::SequentialModel;
use crate::specs::aperture::ApertureSpec;
use crate::specs::apodization::ApodizationSpec;
use crate::specs::fields::{FieldDefinition, FieldSpec};
use crate::specs::gaps::GapSpec;
use crate::specs::surfaces::SurfaceSpec;
use crate::wavefront::strategy::{self, ReferenceSphereStrategy, WavefrontData};

#[derive(Debug)]
pub struct Optic {
    model: SequentialModel,
    fields: Vec<FieldSpec>,
    wavelengths: Vec<Float>,
    primary_wavelength_index: usize,
    aperture: ApertureSpec,
    field_definition: FieldDefinition,
    aim_strategy: AimStrategy,
    apodization: ApodizationSpec,
    obj_space_telecentric: bool,
    aim_cache: AimCache,
}

impl Optic {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        surfaces: &[SurfaceSpec],
        gaps: &[GapSpec],
        fields: Vec<FieldSpec>,
        wavelengths: Vec<Float>,
        primary_wavelength_index: usize,
        aperture: ApertureSpec,
        field_definition: FieldDefinition,
        aim_strategy: AimStrategy,
        apodization: ApodizationSpec,
        obj_space_telecentric: bool,
    ) -> Result<Self, OpticsError> {
        let model = SequentialModel::new(surfaces, gaps)?;
        aperture.validate()?;
        apodization
            .validate()
            .map_err(|e| OpticsError::InvalidFieldSpec(e.to_string()))?;
        for field in &fields {
            field.validate().map_err(|e| OpticsError::InvalidFieldSpec(e.to_string()))?;
        }
        if wavelengths.is_empty() || primary_wavelength_index >= wavelengths.len() {
            return Err(OpticsError::InvalidWavelengthList);
        }
        // Resolving Open Question 3: a telecentric object space (afocal,
        // constant chief-ray angle) has no well-defined field angle and no
        // well-defined EPD from an object-space NA or image F-number, so
        // both are rejected here once rather than re-checked by every
        // ray-aiming call.
        let telecentric_conflict = obj_space_telecentric
            && (aperture.conflicts_with_telecentric_object_space()
                || matches!(field_definition, FieldDefinition::Angle));
        if telecentric_conflict {
            return Err(OpticsError::TelecentricFieldConflict);
        }

        Ok(Self {
            model,
            fields,
            wavelengths,
            primary_wavelength_index,
            aperture,
            field_definition,
            aim_strategy,
            apodization,
            obj_space_telecentric,
            aim_cache: AimCache::new(),
        })
    }

    pub fn model(&self) -> &SequentialModel {
        &self.model
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn wavelengths(&self) -> &[Float] {
        &self.wavelengths
    }

    pub fn primary_wavelength(&self) -> Float {
        self.wavelengths[self.primary_wavelength_index]
    }

    pub fn field_definition(&self) -> FieldDefinition {
        self.field_definition
    }

    pub fn aim_strategy(&self) -> &AimStrategy {
        &self.aim_strategy
    }

    pub fn set_aim_strategy(&mut self, strategy: AimStrategy) {
        self.aim_strategy = strategy;
    }

    pub fn set_fields(&mut self, fields: Vec<FieldSpec>) {
        self.fields = fields;
    }

    /// First-order properties of the system at `wavelength`. Not cached --
    /// every call re-derives it from the current surfaces and aperture, so
    /// it always reflects the latest state even if a caller mutated a curve
    /// or a solve target since the last trace.
    pub fn paraxial(&self, wavelength: Float) -> Result<ParaxialProperties, OpticsError> {
        ParaxialProperties::compute(&self.model, &self.aperture, wavelength, self.obj_space_telecentric)
    }

    pub fn paraxial_primary(&self) -> Result<ParaxialProperties, OpticsError> {
        self.paraxial(self.primary_wavelength())
    }

    /// Builds and traces a real ray batch for `fields()[field_index]` at
    /// `wavelength`, using this optic's configured aim strategy, cache, and
    /// apodization.
    pub fn trace_field(&self, field_index: usize, wavelength: Float) -> Result<RayBatch, OpticsError> {
        let field = self
            .fields
            .get(field_index)
            .ok_or(OpticsError::SurfaceIndexOutOfRange(field_index))?;
        let properties = self.paraxial(wavelength)?;
        let mut batch = generator::ray_batch_for_field(
            &self.model,
            &properties,
            field,
            self.field_definition,
            wavelength,
            &self.aim_strategy,
            Some(&self.aim_cache),
            &self.apodization,
        )?;
        trace::trace(&self.model, &mut batch)?;
        Ok(batch)
    }

    /// Runs the wavefront-reconstruction pipeline (4.5) for
    /// `fields()[field_index]` at `wavelength`.
    pub fn wavefront(
        &self,
        field_index: usize,
        wavelength: Float,
        reference_strategy: ReferenceSphereStrategy,
    ) -> Result<WavefrontData, OpticsError> {
        let field = self
            .fields
            .get(field_index)
            .ok_or(OpticsError::SurfaceIndexOutOfRange(field_index))?;
        let properties = self.paraxial(wavelength)?;
        strategy::reconstruct(
            &self.model,
            &properties,
            field,
            self.field_definition,
            wavelength,
            reference_strategy,
            &self.aim_strategy,
            &self.apodization,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::Material;
    use crate::specs::fields::PupilSampling;
    use crate::specs::surfaces::{GeometrySpec, SurfaceType};

    fn singlet_specs() -> (Vec<SurfaceSpec>, Vec<GapSpec>) {
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
        (surfaces, gaps)
    }

    fn singlet_optic() -> Optic {
        let (surfaces, gaps) = singlet_specs();
        Optic::new(
            &surfaces,
            &gaps,
            vec![FieldSpec::new(0.0, 0.0, PupilSampling::Hexapolar { rings: 2 })],
            vec![0.5876],
            0,
            ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
            FieldDefinition::Angle,
            AimStrategy::Paraxial,
            ApodizationSpec::Uniform,
            false,
        )
        .unwrap()
    }

    #[test]
    fn a_telecentric_object_space_rejects_an_angle_field_definition() {
        let (surfaces, gaps) = singlet_specs();
        let err = Optic::new(
            &surfaces,
            &gaps,
            vec![FieldSpec::new(0.0, 0.0, PupilSampling::ChiefRay)],
            vec![0.5876],
            0,
            ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
            FieldDefinition::Angle,
            AimStrategy::Paraxial,
            ApodizationSpec::Uniform,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, OpticsError::TelecentricFieldConflict));
    }

    #[test]
    fn an_out_of_range_primary_wavelength_index_is_rejected() {
        let (surfaces, gaps) = singlet_specs();
        let err = Optic::new(
            &surfaces,
            &gaps,
            vec![FieldSpec::new(0.0, 0.0, PupilSampling::ChiefRay)],
            vec![0.5876],
            3,
            ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
            FieldDefinition::Angle,
            AimStrategy::Paraxial,
            ApodizationSpec::Uniform,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, OpticsError::InvalidWavelengthList));
    }

    #[test]
    fn tracing_a_configured_field_produces_live_rays() {
        let optic = singlet_optic();
        let batch = optic.trace_field(0, optic.primary_wavelength()).unwrap();
        assert!(batch.live_count() > 0);
    }

    #[test]
    fn wavefront_reconstruction_runs_end_to_end_through_the_optic() {
        let optic = singlet_optic();
        let data = optic.wavefront(0, optic.primary_wavelength(), ReferenceSphereStrategy::ChiefRay).unwrap();
        assert_eq!(data.opd_waves.len(), 1 + 6 + 12);
    }
}
