use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::error::OpticsError;

/// A clear-aperture shape, distinct from a surface's semi-diameter: rays
/// landing outside it are clipped (intensity set to zero) even though the
/// underlying geometry may be defined more broadly.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum PhysicalApertureSpec {
    Circular { radius: Float },
    Elliptical { radius_x: Float, radius_y: Float },
    Rectangular { half_width: Float, half_height: Float },
    /// A radial aperture whose center is offset from the surface vertex.
    OffsetRadial { radius: Float, offset_x: Float, offset_y: Float },
}

impl PhysicalApertureSpec {
    pub fn validate(&self) -> Result<(), OpticsError> {
        let positive = |v: Float| v.is_finite() && v > 0.0;
        let ok = match self {
            PhysicalApertureSpec::Circular { radius } => positive(*radius),
            PhysicalApertureSpec::Elliptical { radius_x, radius_y } => {
                positive(*radius_x) && positive(*radius_y)
            }
            PhysicalApertureSpec::Rectangular { half_width, half_height } => {
                positive(*half_width) && positive(*half_height)
            }
            PhysicalApertureSpec::OffsetRadial { radius, .. } => positive(*radius),
        };
        if !ok {
            return Err(OpticsError::UnknownSurfaceType(
                "physical aperture dimensions must be finite and positive".into(),
            ));
        }
        Ok(())
    }

    /// Whether the point `(x, y)`, in the surface's local frame, passes
    /// through the clear aperture.
    pub fn contains(&self, x: Float, y: Float) -> bool {
        match self {
            PhysicalApertureSpec::Circular { radius } => x * x + y * y <= radius * radius,
            PhysicalApertureSpec::Elliptical { radius_x, radius_y } => {
                (x / radius_x).powi(2) + (y / radius_y).powi(2) <= 1.0
            }
            PhysicalApertureSpec::Rectangular { half_width, half_height } => {
                x.abs() <= *half_width && y.abs() <= *half_height
            }
            PhysicalApertureSpec::OffsetRadial { radius, offset_x, offset_y } => {
                (x - offset_x).powi(2) + (y - offset_y).powi(2) <= radius * radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_aperture_clips_outside_radius() {
        let a = PhysicalApertureSpec::Circular { radius: 5.0 };
        assert!(a.contains(3.0, 3.0));
        assert!(!a.contains(4.0, 4.0));
    }

    #[test]
    fn offset_radial_shifts_the_clear_region() {
        let a = PhysicalApertureSpec::OffsetRadial {
            radius: 2.0,
            offset_x: 3.0,
            offset_y: 0.0,
        };
        assert!(a.contains(3.0, 0.0));
        assert!(!a.contains(0.0, 0.0));
    }

    #[test]
    fn negative_radius_fails_validation() {
        let a = PhysicalApertureSpec::Circular { radius: -1.0 };
        assert!(a.validate().is_err());
    }
}
