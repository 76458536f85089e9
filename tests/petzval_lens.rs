//! A six-element Petzval lens whose aperture stop sits between the front and
//! rear groups rather than at either end of the system.
use approx::assert_abs_diff_eq;

use paraxia::fixtures::petzval_lens;

const STOP_INDEX: usize = 4;
const ENTRANCE_PUPIL_SEMI_DIAMETER: f64 = 16.631;

#[test]
fn the_aperture_stop_is_buried_between_the_lens_groups() {
    let optic = petzval_lens();
    assert_eq!(STOP_INDEX, optic.model().stop_index());
}

#[test]
fn paraxial_properties_resolve_to_a_converging_system() {
    let optic = petzval_lens();
    let properties = optic.paraxial_primary().unwrap();
    assert!(properties.efl_back.is_finite());
    assert!(properties.efl_back > 0.0);
}

#[test]
fn marginal_ray_reaches_the_entrance_pupil_radius_at_the_stop() {
    let optic = petzval_lens();
    let properties = optic.paraxial_primary().unwrap();
    let stop = optic.model().stop_index();
    assert_abs_diff_eq!(
        ENTRANCE_PUPIL_SEMI_DIAMETER,
        properties.marginal_ray().y[stop].abs(),
        epsilon = 1e-6
    );
}

#[test]
fn tracing_every_configured_field_produces_live_rays() {
    let optic = petzval_lens();
    for i in 0..optic.fields().len() {
        let batch = optic.trace_field(i, optic.primary_wavelength()).unwrap();
        assert!(batch.live_count() > 0);
    }
}
