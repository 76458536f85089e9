//! A small command-line front end: builds the plano-convex singlet fixture,
//! logs its first-order properties, and traces every configured field,
//! reporting how many rays of each survived to the image surface.
use paraxia::fixtures::convexplano_singlet;
use paraxia::specs::fields::PupilSampling;

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let optic = convexplano_singlet(PupilSampling::SquareGrid { spacing: 0.1 });
    let properties = optic.paraxial_primary().expect("paraxial properties should resolve for the singlet");
    tracing::info!(
        efl_back = properties.efl_back,
        entrance_pupil_semi_diameter = properties.entrance_pupil.semi_diameter,
        "computed paraxial properties"
    );

    for (i, field) in optic.fields().iter().enumerate() {
        let batch = optic
            .trace_field(i, optic.primary_wavelength())
            .expect("the bundled singlet should trace without a structural error");
        tracing::info!(
            field = i,
            hx = field.hx,
            hy = field.hy,
            live = batch.live_count(),
            total = batch.len(),
            "traced field"
        );
    }
}
