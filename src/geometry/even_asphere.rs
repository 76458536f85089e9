use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// A rotationally symmetric asphere: a conic base plus even powers of `r`.
/// `coefficients[i]` is the coefficient of `r^(2i+2)`.
#[derive(Debug, Clone)]
pub(crate) struct EvenAsphere {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub coefficients: Vec<Float>,
}

impl EvenAsphere {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let r2 = x * x + y * y;
        // sum_i a_i * r^(2i+2), so r_pow starts at r^2 for i = 0.
        let mut extra = 0.0;
        let mut r_pow = r2;
        for a in &self.coefficients {
            extra += a * r_pow;
            r_pow *= r2;
        }
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
    fn zero_coefficients_matches_base_conic() {
        let a = EvenAsphere {
            semi_diameter: 10.0,
            radius_of_curvature: 30.0,
            conic_constant: -0.5,
            coefficients: vec![],
        };
        assert!((a.sag(2.0, 1.0) - a.base().sag(2.0, 1.0)).abs() < 1e-15);
    }

    #[test]
    fn quartic_term_adds_expected_contribution() {
        let a = EvenAsphere {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
            coefficients: vec![1e-4, 2e-6],
        };
        let r2 = 2.0 * 2.0 + 0.0 * 0.0;
        let expected = 1e-4 * r2 + 2e-6 * r2 * r2;
        assert!((a.sag(2.0, 0.0) - expected).abs() < 1e-12);
    }
}
