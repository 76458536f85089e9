//! Zernike decomposition of a sampled wavefront: a weighted linear
//! least-squares fit of OPD samples to a truncated Zernike series, sharing
//! the same index convention and term evaluation as
//! [`crate::geometry::Zernike`] so a fitted coefficient vector can be fed
//! straight back into a `GeometrySpec::Zernike` surface.
use crate::core::Float;
use crate::geometry::{ZernikeNormalization, fringe_to_nm, noll_to_nm, standard_to_nm, zernike_value};
use crate::specs::surfaces::ZernikeIndexing;

fn nm(indexing: ZernikeIndexing, k: usize) -> (i32, i32) {
    match ZernikeNormalization::from(indexing) {
        ZernikeNormalization::Fringe => fringe_to_nm(k + 1),
        ZernikeNormalization::Standard => standard_to_nm(k),
        ZernikeNormalization::Noll => noll_to_nm(k + 1),
    }
}

fn solve_nxn(mut a: Vec<Vec<Float>>, mut b: Vec<Float>) -> Option<Vec<Float>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&r1, &r2| a[r1][col].abs().partial_cmp(&a[r2][col].abs()).unwrap())?;
        if a[pivot][col].abs() < 1e-12 {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    Some((0..n).map(|i| b[i] / a[i][i]).collect())
}

/// A truncated Zernike series fit to a sampled wavefront: `indexing` picks
/// the single-index convention, `coefficients[k]` is the weight of term
/// `k`, and `norm_radius` is the pupil radius the samples were normalized
/// against.
#[derive(Debug, Clone)]
pub struct ZernikeFit {
    pub indexing: ZernikeIndexing,
    pub coefficients: Vec<Float>,
    pub norm_radius: Float,
}

impl ZernikeFit {
    /// Weighted least-squares fit of `num_terms` Zernike terms to pupil
    /// samples `(x, y)` with values `opd` and weights `intensity` (dead rays,
    /// `intensity <= 0`, are excluded).
    pub fn fit(
        x: &[Float],
        y: &[Float],
        opd: &[Float],
        intensity: &[Float],
        num_terms: usize,
        indexing: ZernikeIndexing,
        norm_radius: Float,
    ) -> Self {
        let mut ata = vec![vec![0.0; num_terms]; num_terms];
        let mut atb = vec![0.0; num_terms];

        for i in 0..x.len() {
            if intensity[i] <= 0.0 {
                continue;
            }
            let rho = (x[i] * x[i] + y[i] * y[i]).sqrt() / norm_radius;
            if rho > 1.0 + 1e-9 {
                continue;
            }
            let theta = y[i].atan2(x[i]);
            let weight = intensity[i];
            let terms: Vec<Float> = (0..num_terms)
                .map(|k| {
                    let (n, m) = nm(indexing, k);
                    zernike_value(n, m, rho, theta)
                })
                .collect();
            for a in 0..num_terms {
                atb[a] += weight * terms[a] * opd[i];
                for b in 0..num_terms {
                    ata[a][b] += weight * terms[a] * terms[b];
                }
            }
        }

        let coefficients = solve_nxn(ata, atb).unwrap_or_else(|| vec![0.0; num_terms]);
        Self { indexing, coefficients, norm_radius }
    }

    /// Evaluates the fitted series at normalized pupil coordinate `(rho,
    /// theta)`.
    pub fn evaluate(&self, rho: Float, theta: Float) -> Float {
        self.coefficients
            .iter()
            .enumerate()
            .map(|(k, &c)| {
                let (n, m) = nm(self.indexing, k);
                c * zernike_value(n, m, rho, theta)
            })
            .sum()
    }

    /// The RMS of the fitted series over the unit disk, excluding piston --
    /// the standard summary figure for reporting wavefront quality.
    pub fn rms(&self) -> Float {
        self.coefficients.iter().skip(1).map(|c| c * c).sum::<Float>().sqrt()
    }

    /// Samples the fitted series on a regular polar grid, for round-trip
    /// testing: fitting this grid's `(x, y, value, uniform weight)` back
    /// should recover `self.coefficients`.
    pub fn sample_grid(&self, rings: usize, arms: usize) -> (Vec<Float>, Vec<Float>, Vec<Float>) {
        let mut x = Vec::with_capacity(rings * arms + 1);
        let mut y = Vec::with_capacity(rings * arms + 1);
        let mut value = Vec::with_capacity(rings * arms + 1);
        x.push(0.0);
        y.push(0.0);
        value.push(self.evaluate(0.0, 0.0));
        for ring in 1..=rings {
            let rho = ring as Float / rings as Float;
            for arm in 0..arms {
                let theta = 2.0 * crate::core::PI * arm as Float / arms as Float;
                x.push(rho * self.norm_radius * theta.cos());
                y.push(rho * self.norm_radius * theta.sin());
                value.push(self.evaluate(rho, theta));
            }
        }
        (x, y, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitting_a_pure_defocus_term_recovers_its_coefficient() {
        let truth = ZernikeFit { indexing: ZernikeIndexing::Noll, coefficients: vec![0.0, 0.0, 0.0, 0.7], norm_radius: 5.0 };
        let (x, y, value) = truth.sample_grid(8, 12);
        let intensity = vec![1.0; x.len()];
        let fit = ZernikeFit::fit(&x, &y, &value, &intensity, 4, ZernikeIndexing::Noll, 5.0);
        assert!((fit.coefficients[3] - 0.7).abs() < 1e-6);
    }

    #[test]
    fn rms_excludes_piston() {
        let fit = ZernikeFit { indexing: ZernikeIndexing::Noll, coefficients: vec![5.0, 0.1, 0.0, 0.2], norm_radius: 1.0 };
        assert!((fit.rms() - (0.1f64.powi(2) + 0.2f64.powi(2)).sqrt()).abs() < 1e-12);
    }
}
