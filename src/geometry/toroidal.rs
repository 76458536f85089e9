use crate::core::Float;
use crate::core::math::vec3::Vec3;

/// A toroidal surface: a conic-plus-even-polynomial profile in the y-z
/// plane, revolved (not about the z axis, but swept) around a circle of
/// radius `radius_of_rotation` in the x direction.
#[derive(Debug, Clone)]
pub(crate) struct Toroidal {
    pub semi_diameter: Float,
    pub radius_of_rotation: Float,
    pub radius_of_curvature_yz: Float,
    pub conic_constant_yz: Float,
    /// Even-power coefficients in `y`, `coefficients[i]` multiplies `y^(2i+2)`.
    pub coefficients: Vec<Float>,
}

impl Toroidal {
    fn yz_sag(&self, y: Float) -> Float {
        let r = self.radius_of_curvature_yz;
        let k = self.conic_constant_yz;
        let base = if r.is_infinite() {
            0.0
        } else {
            let c = 1.0 / r;
            let disc = 1.0 - (1.0 + k) * c * c * y * y;
            if disc < 0.0 {
                return Float::NAN;
            }
            c * y * y / (1.0 + disc.sqrt())
        };
        let mut extra = 0.0;
        let mut y_pow = y * y;
        for a in &self.coefficients {
            extra += a * y_pow;
            y_pow *= y * y;
        }
        base + extra
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let rr = self.radius_of_rotation;
        if rr.is_infinite() {
            return self.yz_sag(y);
        }
        let z_yz = self.yz_sag(y);
        let inner = (rr - z_yz).powi(2) - x * x;
        if inner < 0.0 {
            return Float::NAN;
        }
        rr - inner.sqrt()
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
    fn zero_x_reduces_to_yz_profile() {
        let t = Toroidal {
            semi_diameter: 10.0,
            radius_of_rotation: 100.0,
            radius_of_curvature_yz: 30.0,
            conic_constant_yz: 0.0,
            coefficients: vec![],
        };
        let zyz = t.yz_sag(2.0);
        let expected = t.radius_of_rotation - (t.radius_of_rotation - zyz);
        assert!((t.sag(0.0, 2.0) - expected).abs() < 1e-9);
    }
}
