//! Thorlabs LB1676-A: f = 99.6297 mm biconvex lens imaging a 200 mm object
//! distance, exercising [`FieldDefinition::ObjectHeight`].
use approx::assert_abs_diff_eq;

use paraxia::fixtures::biconvex_finite_conjugate;
use paraxia::specs::fields::PupilSampling;

const EFFECTIVE_FOCAL_LENGTH: f64 = 99.6297;
const BACK_FOCAL_DISTANCE: f64 = 98.4360;
const ENTRANCE_PUPIL_SEMI_DIAMETER: f64 = 12.7;

#[test]
fn paraxial_effective_focal_length() {
    let optic = biconvex_finite_conjugate(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    assert_abs_diff_eq!(EFFECTIVE_FOCAL_LENGTH, properties.efl_back, epsilon = 1e-2);
}

#[test]
fn paraxial_back_focal_distance() {
    let optic = biconvex_finite_conjugate(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    assert_abs_diff_eq!(BACK_FOCAL_DISTANCE, properties.back_focal_distance, epsilon = 1e-2);
}

#[test]
fn marginal_ray_reaches_the_entrance_pupil_radius_at_the_stop() {
    let optic = biconvex_finite_conjugate(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    let stop = optic.model().stop_index();
    assert_abs_diff_eq!(
        ENTRANCE_PUPIL_SEMI_DIAMETER,
        properties.marginal_ray().y[stop].abs(),
        epsilon = 1e-6
    );
}

#[test]
fn an_off_axis_object_point_produces_a_chief_ray_that_leaves_the_axis() {
    let optic = biconvex_finite_conjugate(PupilSampling::ChiefRay);
    let properties = optic.paraxial_primary().unwrap();
    let field = optic.fields()[1];
    let chief = properties.chief_ray(optic.model(), &field, optic.field_definition()).unwrap();
    assert!(chief.y[0].abs() > 0.0);
}

#[test]
fn tracing_every_configured_field_produces_live_rays() {
    let optic = biconvex_finite_conjugate(PupilSampling::Hexapolar { rings: 3 });
    for i in 0..optic.fields().len() {
        let batch = optic.trace_field(i, optic.primary_wavelength()).unwrap();
        assert!(batch.live_count() > 0);
    }
}
