//! Reusable optical systems for tests and benchmarks, all drawn from
//! catalog parts so expected paraxial values can be checked against a known
//! design rather than invented.
use crate::materials::Material;
use crate::optic::Optic;
use crate::rays::aiming::AimStrategy;
use crate::specs::aperture::ApertureSpec;
use crate::specs::apodization::ApodizationSpec;
use crate::specs::fields::{FieldDefinition, FieldSpec, PupilSampling};
use crate::specs::gaps::GapSpec;
use crate::specs::surfaces::{GeometrySpec, SurfaceSpec, SurfaceType};

fn standard(semi_diameter: f64, radius_of_curvature: f64) -> SurfaceSpec {
    SurfaceSpec::Surface {
        geometry: GeometrySpec::Standard { semi_diameter, radius_of_curvature, conic_constant: 0.0 },
        surf_type: SurfaceType::Refracting,
        physical_aperture: None,
        rotation: Default::default(),
        curvature_solve: None,
    }
}

/// Thorlabs LA1131: a plano-convex singlet, f = 50.097 mm, object at
/// infinity, stop coincident with the first surface.
pub fn convexplano_singlet(pupil_sampling: PupilSampling) -> Optic {
    let surfaces = vec![
        SurfaceSpec::Object,
        SurfaceSpec::Stop { semi_diameter: 12.5, rotation: Default::default() },
        standard(12.5, 25.8),
        standard(12.5, f64::INFINITY),
        SurfaceSpec::Image { rotation: Default::default() },
    ];
    let gaps = vec![
        GapSpec::air(f64::INFINITY),
        GapSpec::air(0.0),
        GapSpec { thickness: 5.3, material: Material::constant(1.515), thickness_solve: None },
        GapSpec::air(46.6),
    ];
    let fields = vec![
        FieldSpec::new(0.0, 0.0, pupil_sampling),
        FieldSpec::new(0.0, 5.0, pupil_sampling),
    ];

    Optic::new(
        &surfaces,
        &gaps,
        fields,
        vec![0.5876],
        0,
        ApertureSpec::EntrancePupil { semi_diameter: 12.5 },
        FieldDefinition::Angle,
        AimStrategy::Paraxial,
        ApodizationSpec::Uniform,
        false,
    )
    .expect("the convexplano singlet is a valid system")
}

/// Thorlabs LB1676-A: a biconvex lens imaging a finite, 200 mm object
/// distance, so fields are specified by object height rather than angle.
pub fn biconvex_finite_conjugate(pupil_sampling: PupilSampling) -> Optic {
    let surfaces = vec![
        SurfaceSpec::Object,
        SurfaceSpec::Stop { semi_diameter: 12.7, rotation: Default::default() },
        standard(12.7, 102.4),
        standard(12.7, -102.4),
        SurfaceSpec::Image { rotation: Default::default() },
    ];
    let gaps = vec![
        GapSpec::air(200.0),
        GapSpec::air(0.0),
        GapSpec { thickness: 3.6, material: Material::constant(1.517), thickness_solve: None },
        GapSpec::air(196.1684),
    ];
    let fields = vec![
        FieldSpec::new(0.0, 0.0, pupil_sampling),
        FieldSpec::new(0.0, 5.0, pupil_sampling),
    ];

    Optic::new(
        &surfaces,
        &gaps,
        fields,
        vec![0.5876],
        0,
        ApertureSpec::EntrancePupil { semi_diameter: 12.7 },
        FieldDefinition::ObjectHeight,
        AimStrategy::Paraxial,
        ApodizationSpec::Uniform,
        false,
    )
    .expect("the biconvex finite-conjugate lens is a valid system")
}

/// A concave spherical mirror, f = +100 mm (R = -200 mm), imaging an
/// infinite object with a 5 degree off-axis field.
pub fn concave_mirror(pupil_sampling: PupilSampling) -> Optic {
    let surfaces = vec![
        SurfaceSpec::Object,
        SurfaceSpec::Stop { semi_diameter: 12.5, rotation: Default::default() },
        SurfaceSpec::Surface {
            geometry: GeometrySpec::Standard { semi_diameter: 12.5, radius_of_curvature: -200.0, conic_constant: 0.0 },
            surf_type: SurfaceType::Reflecting,
            physical_aperture: None,
            rotation: Default::default(),
            curvature_solve: None,
        },
        SurfaceSpec::Image { rotation: Default::default() },
    ];
    let gaps = vec![GapSpec::air(f64::INFINITY), GapSpec::air(0.0), GapSpec::air(100.0)];
    let fields = vec![
        FieldSpec::new(0.0, 0.0, pupil_sampling),
        FieldSpec::new(0.0, 5.0, pupil_sampling),
    ];

    Optic::new(
        &surfaces,
        &gaps,
        fields,
        vec![0.5876],
        0,
        ApertureSpec::EntrancePupil { semi_diameter: 12.5 },
        FieldDefinition::Angle,
        AimStrategy::Paraxial,
        ApodizationSpec::Uniform,
        false,
    )
    .expect("the concave mirror is a valid system")
}

/// The [`concave_mirror`] geometry with its mirror tilted 0.05 rad (about
/// 2.9 degrees) about the local x axis -- a regression fixture for
/// [`crate::specs::surfaces::SurfaceSpec`]'s `rotation` field actually
/// reaching the frame tree, rather than every surface being built untilted.
pub fn tilted_fold_mirror(pupil_sampling: PupilSampling) -> Optic {
    let surfaces = vec![
        SurfaceSpec::Object,
        SurfaceSpec::Stop { semi_diameter: 12.5, rotation: Default::default() },
        SurfaceSpec::Surface {
            geometry: GeometrySpec::Standard { semi_diameter: 12.5, radius_of_curvature: -200.0, conic_constant: 0.0 },
            surf_type: SurfaceType::Reflecting,
            physical_aperture: None,
            rotation: crate::specs::Rotation3D { rx: 0.05, ry: 0.0, rz: 0.0 },
            curvature_solve: None,
        },
        SurfaceSpec::Image { rotation: Default::default() },
    ];
    let gaps = vec![GapSpec::air(f64::INFINITY), GapSpec::air(0.0), GapSpec::air(100.0)];
    let fields = vec![FieldSpec::new(0.0, 0.0, pupil_sampling)];

    Optic::new(
        &surfaces,
        &gaps,
        fields,
        vec![0.5876],
        0,
        ApertureSpec::EntrancePupil { semi_diameter: 12.5 },
        FieldDefinition::Angle,
        AimStrategy::Paraxial,
        ApodizationSpec::Uniform,
        false,
    )
    .expect("the tilted fold mirror is a valid system")
}

/// A six-element Petzval lens, stop buried between the second and third
/// lens groups -- a regression fixture for stop placement away from either
/// end of the system.
pub fn petzval_lens() -> Optic {
    let surfaces = vec![
        SurfaceSpec::Object,
        standard(28.478, 99.56266),
        standard(26.276, -86.84002),
        standard(21.02, -1187.63858),
        SurfaceSpec::Stop { semi_diameter: 16.631, rotation: Default::default() },
        standard(20.543, 57.47491),
        standard(20.074, -54.61685),
        standard(20.074, -614.68633),
        standard(17.297, -38.17110),
        standard(18.94, f64::INFINITY),
        SurfaceSpec::Image { rotation: Default::default() },
    ];
    let gaps = vec![
        GapSpec::air(f64::INFINITY),
        GapSpec { thickness: 13.0, material: Material::constant(1.5168), thickness_solve: None },
        GapSpec { thickness: 4.0, material: Material::constant(1.6645), thickness_solve: None },
        GapSpec::air(40.0),
        GapSpec::air(40.0),
        GapSpec { thickness: 12.0, material: Material::constant(1.6074), thickness_solve: None },
        GapSpec { thickness: 3.0, material: Material::constant(1.6727), thickness_solve: None },
        GapSpec::air(46.82210),
        GapSpec { thickness: 2.0, material: Material::constant(1.6727), thickness_solve: None },
        GapSpec::air(1.87179),
    ];
    let fields = vec![
        FieldSpec::new(0.0, 0.0, PupilSampling::TangentialRayFan { num_rays: 5 }),
        FieldSpec::new(0.0, 5.0, PupilSampling::TangentialRayFan { num_rays: 5 }),
    ];

    Optic::new(
        &surfaces,
        &gaps,
        fields,
        vec![0.567],
        0,
        ApertureSpec::EntrancePupil { semi_diameter: 16.631 },
        FieldDefinition::Angle,
        AimStrategy::Paraxial,
        ApodizationSpec::Uniform,
        false,
    )
    .expect("the Petzval lens is a valid system")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_fixture_builds_and_resolves_paraxial_properties() {
        assert!(convexplano_singlet(PupilSampling::ChiefRay).paraxial_primary().is_ok());
        assert!(biconvex_finite_conjugate(PupilSampling::ChiefRay).paraxial_primary().is_ok());
        assert!(concave_mirror(PupilSampling::ChiefRay).paraxial_primary().is_ok());
        assert!(tilted_fold_mirror(PupilSampling::ChiefRay).paraxial_primary().is_ok());
        assert!(petzval_lens().paraxial_primary().is_ok());
    }

    #[test]
    fn petzval_stop_sits_between_the_front_and_rear_groups() {
        let optic = petzval_lens();
        assert_eq!(optic.model().stop_index(), 4);
    }
}
