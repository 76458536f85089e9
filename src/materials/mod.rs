//! Dispersive refractive index models.
use serde::{Deserialize, Serialize};

use crate::core::Float;
use crate::core::math::complex::Complex;
use crate::error::OpticsError;

/// The refractive index of a gap's constituent material, evaluated at a
/// given wavelength (microns). Variants mirror the dispersion formula
/// families published by refractiveindex.info.
///
/// # See also
/// - [RefractiveIndex.info](https://github.com/polyanskiy/refractiveindex.info-database)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RefractiveIndexSpec {
    /// A constant, wavelength-independent index -- air, vacuum, or a
    /// simplified "design" glass.
    Constant(Float),

    /// Directly tabulated `(wavelength, n)` pairs, linearly interpolated.
    TabulatedN { data: Vec<[Float; 2]> },

    /// The Sellmeier dispersion formula,
    /// `n^2 = 1 + sum_i c[2i] lambda^2 / (lambda^2 - c[2i+1])`.
    Formula1 { wavelength_range: [Float; 2], c: Vec<Float> },

    /// The Sellmeier-2 variant used by some glass catalogs.
    Formula2 { wavelength_range: [Float; 2], c: Vec<Float> },

    /// The polynomial dispersion formula,
    /// `n^2 = c0 + c1 lambda^2 + c2 lambda^-2 + c3 lambda^-4 + ...`.
    Formula3 { wavelength_range: [Float; 2], coefficients: Vec<Float> },

    /// Cauchy-type dispersion formula.
    Formula4 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
    Formula5 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
    Formula6 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
    Formula7 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
    Formula8 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
    Formula9 { wavelength_range: [Float; 2], coefficients: Vec<Float> },
}

/// The extinction coefficient `k` of a gap's constituent material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtinctionSpec {
    Constant(Float),
    TabulatedK { data: Vec<[Float; 2]> },
}

/// A material's full complex refractive index, `n + i k`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub n: RefractiveIndexSpec,
    pub k: Option<ExtinctionSpec>,
}

impl Material {
    pub fn constant(n: Float) -> Self {
        Self {
            n: RefractiveIndexSpec::Constant(n),
            k: None,
        }
    }

    pub fn air() -> Self {
        Self::constant(1.0)
    }

    pub fn depends_on_wavelength(&self) -> bool {
        !matches!(self.n, RefractiveIndexSpec::Constant(_))
            || matches!(self.k, Some(ExtinctionSpec::TabulatedK { .. }))
    }

    /// Evaluates the complex index at `wavelength_um`.
    pub fn index_at(&self, wavelength_um: Float) -> Result<Complex<Float>, OpticsError> {
        let n = self.n.evaluate(wavelength_um)?;
        let k = match &self.k {
            None => 0.0,
            Some(ExtinctionSpec::Constant(k)) => *k,
            Some(ExtinctionSpec::TabulatedK { data }) => interpolate(data, wavelength_um)?,
        };
        Ok(Complex::new(n, k))
    }
}

fn interpolate(data: &[[Float; 2]], x: Float) -> Result<Float, OpticsError> {
    if data.len() < 2 {
        return Err(OpticsError::InvalidMaterialData(
            "tabulated data needs at least two points".into(),
        ));
    }
    if x < data[0][0] || x > data[data.len() - 1][0] {
        return Err(OpticsError::WavelengthOutOfRange {
            wavelength: x,
            min: data[0][0],
            max: data[data.len() - 1][0],
        });
    }
    let idx = data.partition_point(|pair| pair[0] < x).max(1).min(data.len() - 1);
    let [x0, y0] = data[idx - 1];
    let [x1, y1] = data[idx];
    if (x1 - x0).abs() < crate::core::EPSILON {
        return Ok(y0);
    }
    Ok(y0 + (y1 - y0) * (x - x0) / (x1 - x0))
}

impl RefractiveIndexSpec {
    pub fn evaluate(&self, lambda: Float) -> Result<Float, OpticsError> {
        match self {
            RefractiveIndexSpec::Constant(n) => Ok(*n),
            RefractiveIndexSpec::TabulatedN { data } => interpolate(data, lambda),
            RefractiveIndexSpec::Formula1 { c, wavelength_range } => {
                check_range(lambda, *wavelength_range)?;
                let mut sum = 1.0 + c.first().copied().unwrap_or(0.0);
                let mut pairs = c.get(1..).unwrap_or(&[]).chunks_exact(2);
                for chunk in &mut pairs {
                    let (a, b) = (chunk[0], chunk[1]);
                    sum += a * lambda * lambda / (lambda * lambda - b * b);
                }
                Ok(sum.sqrt())
            }
            RefractiveIndexSpec::Formula2 { c, wavelength_range } => {
                check_range(lambda, *wavelength_range)?;
                let mut sum = 1.0 + c.first().copied().unwrap_or(0.0);
                let mut pairs = c.get(1..).unwrap_or(&[]).chunks_exact(2);
                for chunk in &mut pairs {
                    let (a, b) = (chunk[0], chunk[1]);
                    sum += a * lambda * lambda / (lambda * lambda - b);
                }
                Ok(sum.sqrt())
            }
            RefractiveIndexSpec::Formula3 { coefficients, wavelength_range }
            | RefractiveIndexSpec::Formula4 { coefficients, wavelength_range } => {
                check_range(lambda, *wavelength_range)?;
                let mut sum = coefficients.first().copied().unwrap_or(0.0);
                for chunk in coefficients.get(1..).unwrap_or(&[]).chunks_exact(2) {
                    let (a, power) = (chunk[0], chunk[1]);
                    sum += a * lambda.powf(power);
                }
                Ok(sum.sqrt())
            }
            RefractiveIndexSpec::Formula5 { coefficients, wavelength_range }
            | RefractiveIndexSpec::Formula6 { coefficients, wavelength_range }
            | RefractiveIndexSpec::Formula7 { coefficients, wavelength_range }
            | RefractiveIndexSpec::Formula8 { coefficients, wavelength_range }
            | RefractiveIndexSpec::Formula9 { coefficients, wavelength_range } => {
                check_range(lambda, *wavelength_range)?;
                // Cauchy-family formulas: n = c0 + sum c[2i-1] lambda^c[2i].
                let mut n = coefficients.first().copied().unwrap_or(0.0);
                for chunk in coefficients.get(1..).unwrap_or(&[]).chunks_exact(2) {
                    let (a, power) = (chunk[0], chunk[1]);
                    n += a * lambda.powf(power);
                }
                Ok(n)
            }
        }
    }

    pub fn depends_on_wavelength(&self) -> bool {
        !matches!(self, RefractiveIndexSpec::Constant(_))
    }
}

fn check_range(lambda: Float, range: [Float; 2]) -> Result<(), OpticsError> {
    if range == [0.0, 0.0] {
        return Ok(());
    }
    if lambda < range[0] || lambda > range[1] {
        return Err(OpticsError::WavelengthOutOfRange {
            wavelength: lambda,
            min: range[0],
            max: range[1],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_index_ignores_wavelength() {
        let m = Material::constant(1.5168);
        assert_eq!(m.index_at(0.4).unwrap().real, 1.5168);
        assert_eq!(m.index_at(0.7).unwrap().real, 1.5168);
    }

    #[test]
    fn tabulated_interpolates_linearly() {
        let spec = RefractiveIndexSpec::TabulatedN {
            data: vec![[0.4, 1.50], [0.6, 1.52], [0.8, 1.53]],
        };
        let n = spec.evaluate(0.5).unwrap();
        assert!((n - 1.51).abs() < 1e-12);
    }

    #[test]
    fn tabulated_out_of_range_is_an_error() {
        let spec = RefractiveIndexSpec::TabulatedN {
            data: vec![[0.4, 1.50], [0.8, 1.53]],
        };
        assert!(spec.evaluate(1.0).is_err());
    }

    #[test]
    fn sellmeier_air_like_formula_is_finite() {
        let spec = RefractiveIndexSpec::Formula1 {
            wavelength_range: [0.3, 2.0],
            c: vec![0.0, 1.03961212, 0.00600069867_f64.sqrt(), 0.231792344, 0.0200179144_f64.sqrt()],
        };
        let n = spec.evaluate(0.5876).unwrap();
        assert!(n.is_finite() && n > 1.0);
    }
}
