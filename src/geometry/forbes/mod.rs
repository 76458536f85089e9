//! The Forbes `Qbfs` and `Q-2D` aspheric departure bases, evaluated through
//! a numerically stable Jacobi-orthogonal-polynomial recurrence rather than
//! the raw power series.
pub(crate) mod jacobi;
mod qpoly;

use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// An axisymmetric Forbes asphere: a conic base plus a departure expanded
/// in the `Qbfs` basis over `u = r / norm_radius`.
#[derive(Debug, Clone)]
pub(crate) struct ForbesQbfs {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub norm_radius: Float,
    pub coefficients: Vec<Float>,
}

impl ForbesQbfs {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let r = (x * x + y * y).sqrt();
        let u = r / self.norm_radius;
        if u > 1.0 {
            return Float::NAN;
        }
        let departure = u.powi(4) * qpoly::qbfs_sum(&self.coefficients, u * u);
        self.base().sag(x, y) + departure
    }

    pub fn surface_normal(&self, x: Float, y: Float) -> Vec3 {
        let h = 1e-6;
        let dzdx = (self.sag(x + h, y) - self.sag(x - h, y)) / (2.0 * h);
        let dzdy = (self.sag(x, y + h) - self.sag(x, y - h)) / (2.0 * h);
        Vec3::new(dzdx, dzdy, -1.0).normalize()
    }
}

/// A single non-axisymmetric term: azimuthal order `m`, its cosine-channel
/// coefficients, and its sine-channel coefficients.
#[derive(Debug, Clone)]
pub(crate) struct Q2dTerm {
    pub m: u32,
    pub cos_coefficients: Vec<Float>,
    pub sin_coefficients: Vec<Float>,
}

/// A full Forbes Q-2D freeform: the `Qbfs` radial part plus a sum of
/// non-axisymmetric `Q_n^m` terms.
#[derive(Debug, Clone)]
pub(crate) struct ForbesQ2d {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub norm_radius: Float,
    pub radial_coefficients: Vec<Float>,
    pub terms: Vec<Q2dTerm>,
}

impl ForbesQ2d {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let r = (x * x + y * y).sqrt();
        let u = r / self.norm_radius;
        if u > 1.0 {
            return Float::NAN;
        }
        let theta = y.atan2(x);
        let u2 = u * u;

        let radial = u.powi(4) * qpoly::qbfs_sum(&self.radial_coefficients, u2);

        let non_axisymmetric: Float = self
            .terms
            .iter()
            .map(|term| {
                let cos_part = qpoly::qm_sum(&term.cos_coefficients, term.m, u2) * (term.m as Float * theta).cos();
                let sin_part = qpoly::qm_sum(&term.sin_coefficients, term.m, u2) * (term.m as Float * theta).sin();
                u.powi(term.m as i32) * (cos_part + sin_part)
            })
            .sum();

        self.base().sag(x, y) + radial + non_axisymmetric
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
        let q = ForbesQbfs {
            semi_diameter: 10.0,
            radius_of_curvature: 50.0,
            conic_constant: -0.3,
            norm_radius: 10.0,
            coefficients: vec![],
        };
        assert!((q.sag(2.0, 1.0) - q.base().sag(2.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn beyond_normalized_radius_is_nan() {
        let q = ForbesQbfs {
            semi_diameter: 10.0,
            radius_of_curvature: 50.0,
            conic_constant: 0.0,
            norm_radius: 5.0,
            coefficients: vec![1e-4],
        };
        assert!(q.sag(6.0, 0.0).is_nan());
    }
}
