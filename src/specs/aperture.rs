use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::error::OpticsError;

/// Specifies the system aperture: how the entrance pupil diameter is
/// determined.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum ApertureSpec {
    /// A direct entrance-pupil diameter.
    EntrancePupil { semi_diameter: Float },

    /// A working F-number, `EPD = f / image_fno`, resolved once the
    /// paraxial focal length is known.
    ImageFNumber { fno: Float },

    /// An object-space numerical aperture,
    /// `EPD = 2 (EPL - z_obj) tan(asin(NA / n_obj))`.
    ObjectSpaceNA { na: Float },

    /// The stop surface's own physical size determines the pupil (no
    /// separate aperture value is tracked).
    FloatByStopSize,
}

impl ApertureSpec {
    pub fn validate(&self) -> Result<(), OpticsError> {
        let bad = match self {
            ApertureSpec::EntrancePupil { semi_diameter } => {
                semi_diameter.is_nan() || *semi_diameter <= 0.0
            }
            ApertureSpec::ImageFNumber { fno } => fno.is_nan() || *fno <= 0.0,
            ApertureSpec::ObjectSpaceNA { na } => na.is_nan() || *na <= 0.0 || *na >= 1.0,
            ApertureSpec::FloatByStopSize => false,
        };
        if bad {
            return Err(OpticsError::UnknownSurfaceType(
                "aperture specification has an invalid value".into(),
            ));
        }
        Ok(())
    }

    /// Whether this aperture spec requires an object-space numerical
    /// aperture or an angle field, either of which conflicts with a
    /// telecentric object space.
    pub fn conflicts_with_telecentric_object_space(&self) -> bool {
        matches!(self, ApertureSpec::ImageFNumber { .. } | ApertureSpec::ObjectSpaceNA { .. })
    }
}
