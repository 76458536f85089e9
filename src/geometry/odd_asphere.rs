use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// A rotationally symmetric asphere with both even and odd powers of `r`:
/// a conic base plus `sum_i coefficients[i] * r^(i+1)`.
#[derive(Debug, Clone)]
pub(crate) struct OddAsphere {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub coefficients: Vec<Float>,
}

impl OddAsphere {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let r = (x * x + y * y).sqrt();
        let mut extra = 0.0;
        let mut r_pow = r;
        for a in &self.coefficients {
            extra += a * r_pow;
            r_pow *= r;
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
