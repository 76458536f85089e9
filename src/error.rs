//! Structural/configuration failures. Per-ray numerical failures (missed
//! intersection, TIR, aperture clipping) never produce an [`OpticsError`];
//! they are recorded in a ray batch's own `intensity`/`live_mask` channel
//! instead, so that a single bad ray cannot abort an otherwise-good batch.
use thiserror::Error;

use crate::core::Float;

#[derive(Debug, Error)]
pub enum OpticsError {
    #[error("wavelength {wavelength} um outside material's valid range [{min}, {max}] um")]
    WavelengthOutOfRange { wavelength: Float, min: Float, max: Float },

    #[error("invalid material data: {0}")]
    InvalidMaterialData(String),

    #[error("unknown surface type: {0}")]
    UnknownSurfaceType(String),

    #[error("unknown pupil distribution: {0}")]
    UnknownDistribution(String),

    #[error("unknown ray-aiming strategy: {0}")]
    UnknownAimStrategy(String),

    #[error("more than one surface is declared as the aperture stop")]
    RedefinitionOfStop,

    #[error("no surface is declared as the aperture stop")]
    MissingStop,

    #[error("telecentric object space is incompatible with an angle field or EPD/NA aperture spec")]
    TelecentricFieldConflict,

    #[error("solve references a surface with zero optical power")]
    ParaxialSingularity,

    #[error("sequential model must have at least an object and image surface")]
    IncompleteSystem,

    #[error("invalid field specification: {0}")]
    InvalidFieldSpec(String),

    #[error("optic has no wavelengths, or its primary wavelength index is out of range")]
    InvalidWavelengthList,

    #[error("surface index {0} is out of range")]
    SurfaceIndexOutOfRange(usize),
}
