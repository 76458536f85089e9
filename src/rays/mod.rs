//! Ray batches and the machinery that builds and propagates them: the
//! structure-of-arrays [`batch::RayBatch`], the real (non-paraxial)
//! [`trace::trace`], pupil-to-launch-state [`aiming`], and field-level batch
//! [`generator`].
pub mod aiming;
pub mod batch;
pub mod generator;
pub mod trace;
