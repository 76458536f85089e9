//! Thorlabs LA1131: f = 50.097 mm plano-convex singlet, object at infinity.
use approx::assert_abs_diff_eq;

use paraxia::fixtures::convexplano_singlet;
use paraxia::specs::fields::PupilSampling;

const EFFECTIVE_FOCAL_LENGTH: f64 = 50.097;
const BACK_FOCAL_DISTANCE: f64 = 46.5987;
const ENTRANCE_PUPIL_SEMI_DIAMETER: f64 = 12.5;

#[test]
fn paraxial_effective_focal_length() {
    let optic = convexplano_singlet(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    assert_abs_diff_eq!(EFFECTIVE_FOCAL_LENGTH, properties.efl_back, epsilon = 1e-2);
}

#[test]
fn paraxial_back_focal_distance() {
    let optic = convexplano_singlet(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    assert_abs_diff_eq!(BACK_FOCAL_DISTANCE, properties.back_focal_distance, epsilon = 1e-2);
}

#[test]
fn paraxial_entrance_pupil() {
    let optic = convexplano_singlet(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    assert_abs_diff_eq!(
        ENTRANCE_PUPIL_SEMI_DIAMETER,
        properties.entrance_pupil.semi_diameter,
        epsilon = 1e-6
    );
}

#[test]
fn marginal_ray_reaches_the_entrance_pupil_radius_at_the_stop() {
    let optic = convexplano_singlet(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    let stop = optic.model().stop_index();
    assert_abs_diff_eq!(
        ENTRANCE_PUPIL_SEMI_DIAMETER,
        properties.marginal_ray().y[stop].abs(),
        epsilon = 1e-6
    );
}

#[test]
fn on_axis_chief_ray_never_leaves_the_optical_axis() {
    let optic = convexplano_singlet(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    let field = optic.fields()[0];
    let chief = properties.chief_ray(optic.model(), &field, optic.field_definition()).unwrap();
    for &y in chief.y.iter() {
        assert_abs_diff_eq!(0.0, y, epsilon = 1e-9);
    }
}

#[test]
fn tracing_every_configured_field_produces_live_rays() {
    let optic = convexplano_singlet(PupilSampling::SquareGrid { spacing: 0.1 });
    for i in 0..optic.fields().len() {
        let batch = optic.trace_field(i, optic.primary_wavelength()).unwrap();
        assert!(batch.live_count() > 0);
    }
}
