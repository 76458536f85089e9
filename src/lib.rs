//! A sequential geometric and paraxial optical ray-tracing engine: surfaces
//! and gaps are declared through the `specs` types, assembled into a
//! [`SequentialModel`](sequential_model::SequentialModel), and analyzed
//! through the paraxial engine, the real ray tracer, and wavefront
//! reconstruction -- all gathered behind [`Optic`](optic::Optic).
//!
//! # Quick Start
//! ```rust
//! use paraxia::materials::Material;
//! use paraxia::optic::Optic;
//! use paraxia::rays::aiming::AimStrategy;
//! use paraxia::specs::aperture::ApertureSpec;
//! use paraxia::specs::apodization::ApodizationSpec;
//! use paraxia::specs::fields::{FieldDefinition, FieldSpec, PupilSampling};
//! use paraxia::specs::gaps::GapSpec;
//! use paraxia::specs::surfaces::{GeometrySpec, SurfaceSpec, SurfaceType};
//!
//! // A plano-convex singlet, object at infinity.
//! let surfaces = vec![
//!     SurfaceSpec::Object,
//!     SurfaceSpec::Stop { semi_diameter: 12.5, rotation: Default::default() },
//!     SurfaceSpec::Surface {
//!         geometry: GeometrySpec::Standard {
//!             semi_diameter: 12.5,
//!             radius_of_curvature: 25.8,
//!             conic_constant: 0.0,
//!         },
//!         surf_type: SurfaceType::Refracting,
//!         physical_aperture: None,
//!         rotation: Default::default(),
//!         curvature_solve: None,
//!     },
//!     SurfaceSpec::Surface {
//!         geometry: GeometrySpec::Standard {
//!             semi_diameter: 12.5,
//!             radius_of_curvature: f64::INFINITY,
//!             conic_constant: 0.0,
//!         },
//!         surf_type: SurfaceType::Refracting,
//!         physical_aperture: None,
//!         rotation: Default::default(),
//!         curvature_solve: None,
//!     },
//!     SurfaceSpec::Image { rotation: Default::default() },
//! ];
//! let gaps = vec![
//!     GapSpec::air(f64::INFINITY),
//!     GapSpec::air(0.0),
//!     GapSpec { thickness: 5.3, material: Material::constant(1.515), thickness_solve: None },
//!     GapSpec::air(46.6),
//! ];
//!
//! let fields = vec![
//!     FieldSpec::new(0.0, 0.0, PupilSampling::SquareGrid { spacing: 0.1 }),
//!     FieldSpec::new(0.0, 5.0, PupilSampling::SquareGrid { spacing: 0.1 }),
//! ];
//!
//! let optic = Optic::new(
//!     &surfaces,
//!     &gaps,
//!     fields,
//!     vec![0.567],
//!     0,
//!     ApertureSpec::EntrancePupil { semi_diameter: 5.0 },
//!     FieldDefinition::Angle,
//!     AimStrategy::Paraxial,
//!     ApodizationSpec::Uniform,
//!     false,
//! )
//! .unwrap();
//!
//! let properties = optic.paraxial_primary().unwrap();
//! println!("effective focal length: {}", properties.efl_back);
//!
//! for i in 0..optic.fields().len() {
//!     let batch = optic.trace_field(i, optic.primary_wavelength()).unwrap();
//!     println!("field {i}: {} of {} rays survived", batch.live_count(), batch.len());
//! }
//! ```

mod core;
pub mod error;
pub mod fixtures;
mod geometry;
pub mod materials;
pub mod optic;
pub mod paraxial;
pub mod rays;
mod sequential_model;
pub mod specs;
pub mod wavefront;

pub use core::math::vec3::Vec3;
pub use error::OpticsError;
pub use optic::Optic;
pub use sequential_model::SequentialModel;
