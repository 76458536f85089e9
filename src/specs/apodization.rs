use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::error::OpticsError;

/// A pupil-intensity apodization function, `get_intensity(Px, Py) -> [0,
/// 1]`, evaluated over the normalized pupil.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum ApodizationSpec {
    Uniform,
    Gaussian { sigma: Float },
    CosineSquared,
    Hann,
    Polynomial { coefficients: [Float; 4] },
    SuperGaussian { sigma: Float, order: Float },
    Tukey { alpha: Float },
}

impl ApodizationSpec {
    pub fn validate(&self) -> Result<(), OpticsError> {
        let bad = match self {
            ApodizationSpec::Uniform | ApodizationSpec::CosineSquared | ApodizationSpec::Hann => false,
            ApodizationSpec::Gaussian { sigma } => !(*sigma > 0.0),
            ApodizationSpec::Polynomial { .. } => false,
            ApodizationSpec::SuperGaussian { sigma, order } => !(*sigma > 0.0) || !(*order > 0.0),
            ApodizationSpec::Tukey { alpha } => !(0.0..=1.0).contains(alpha),
        };
        if bad {
            return Err(OpticsError::UnknownSurfaceType(
                "apodization parameters are out of their valid range".into(),
            ));
        }
        Ok(())
    }

    /// The pupil intensity transmission at normalized pupil coordinates
    /// `(Px, Py)`, not clamped to the unit disk (callers are expected to
    /// have already discarded samples outside it).
    pub fn intensity(&self, px: Float, py: Float) -> Float {
        let rho2 = px * px + py * py;
        match self {
            ApodizationSpec::Uniform => 1.0,
            ApodizationSpec::Gaussian { sigma } => (-rho2 / (2.0 * sigma * sigma)).exp(),
            ApodizationSpec::CosineSquared => {
                let rho = rho2.sqrt().min(1.0);
                (crate::core::PI / 2.0 * rho).cos().powi(2)
            }
            ApodizationSpec::Hann => {
                let rho = rho2.sqrt().min(1.0);
                0.5 * (1.0 + (crate::core::PI * rho).cos())
            }
            ApodizationSpec::Polynomial { coefficients } => {
                let rho = rho2.sqrt();
                coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, c)| c * rho.powi(i as i32))
                    .sum()
            }
            ApodizationSpec::SuperGaussian { sigma, order } => {
                (-(rho2 / (sigma * sigma)).powf(*order)).exp()
            }
            ApodizationSpec::Tukey { alpha } => {
                let rho = rho2.sqrt().min(1.0);
                if *alpha <= 0.0 {
                    1.0
                } else if rho < 1.0 - alpha {
                    1.0
                } else {
                    0.5 * (1.0 + (crate::core::PI * (rho - (1.0 - alpha)) / alpha).cos())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_is_always_one() {
        assert_eq!(ApodizationSpec::Uniform.intensity(0.9, 0.4), 1.0);
    }

    #[test]
    fn gaussian_peaks_at_center() {
        let g = ApodizationSpec::Gaussian { sigma: 0.5 };
        assert_eq!(g.intensity(0.0, 0.0), 1.0);
        assert!(g.intensity(0.5, 0.5) < 1.0);
    }

    #[test]
    fn tukey_is_flat_inside_taper_region() {
        let t = ApodizationSpec::Tukey { alpha: 0.5 };
        assert_eq!(t.intensity(0.0, 0.0), 1.0);
        assert!(t.intensity(0.9, 0.0) < 1.0);
    }

    #[test]
    fn negative_sigma_fails_validation() {
        assert!(ApodizationSpec::Gaussian { sigma: -1.0 }.validate().is_err());
    }
}
