use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// A 2-D polynomial freeform: a conic base plus `sum_ij coefficients[(i,j)]
/// x^i y^j`, with `(i, j)` stored alongside each coefficient so the term
/// list can be sparse.
#[derive(Debug, Clone)]
pub(crate) struct Polynomial {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    /// `(i, j, coefficient)` triples.
    pub terms: Vec<(u32, u32, Float)>,
}

impl Polynomial {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let extra: Float = self
            .terms
            .iter()
            .map(|&(i, j, c)| c * x.powi(i as i32) * y.powi(j as i32))
            .sum();
        self.base().sag(x, y) + extra
    }

    pub fn surface_normal(&self, x: Float, y: Float) -> Vec3 {
        let h = 1e-6;
        let dzdx = (self.sag(x + h, y) - self.sag(x - h, y)) / (2.0 * h);
        let dzdy = (self.sag(x, y + h) - self.sag(x, y - h)) / (2.0 * h);
        Vec3::new(dzdx, dzdy, -1.0).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_term_matches_direct_evaluation() {
        let p = Polynomial {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
            terms: vec![(2, 1, 5e-3)],
        };
        let expected = 5e-3 * 2.0 * 2.0 * 3.0;
        assert!((p.sag(2.0, 3.0) - expected).abs() < 1e-12);
    }
}
