use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// Which single-index convention maps a Zernike coefficient's position in
/// `coefficients` to its radial/azimuthal orders `(n, m)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZernikeNormalization {
    Fringe,
    Standard,
    Noll,
}

/// A Zernike freeform: a conic base plus `sum_k coefficients[k] *
/// normalization_k * Z_k(rho, theta)`, over the normalized pupil `rho =
/// r / norm_radius`.
#[derive(Debug, Clone)]
pub(crate) struct Zernike {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub norm_radius: Float,
    pub indexing: ZernikeNormalization,
    pub coefficients: Vec<Float>,
}

/// Converts a 1-based Noll index to `(n, m)`, `m` signed (negative = sine
/// term, positive/zero = cosine term).
pub(crate) fn noll_to_nm(j: usize) -> (i32, i32) {
    let mut n = 0i32;
    let mut j_count = j as i32;
    while j_count > n + 1 {
        n += 1;
        j_count -= n;
    }
    let m_abs = if n % 2 == 0 {
        2 * ((j_count) / 2)
    } else {
        2 * ((j_count - 1) / 2) + 1
    };
    let is_even_j = j % 2 == 0;
    let m = if m_abs == 0 {
        0
    } else if is_even_j {
        m_abs
    } else {
        -m_abs
    };
    (n, m)
}

/// Converts a 1-based Fringe (University of Arizona) index to `(n, m)`.
pub(crate) fn fringe_to_nm(j: usize) -> (i32, i32) {
    // Standard closed-form inversion of the Fringe indexing formula
    // j = (1 + (n + |m|)/2)^2 - 2|m| + (1 - sign(m))/2.
    for n in 0..64 {
        for m in -(n as i32)..=(n as i32) {
            if (n as i32 - m.abs()) % 2 != 0 {
                continue;
            }
            let s = if m < 0 { 1 } else { 0 };
            let fringe = (1 + (n as i32 + m.abs()) / 2).pow(2) - 2 * m.abs() + s;
            if fringe as usize == j {
                return (n as i32, m);
            }
        }
    }
    (0, 0)
}

/// Converts a 0-based "Standard" (ANSI) index to `(n, m)`.
pub(crate) fn standard_to_nm(j: usize) -> (i32, i32) {
    let mut n = 0i32;
    let mut remaining = j as i32;
    loop {
        let count = n + 1;
        if remaining < count {
            let m = -n + 2 * remaining;
            return (n, m);
        }
        remaining -= count;
        n += 1;
    }
}

/// The radial polynomial `R_n^{|m|}(rho)`, via direct summation.
fn radial(n: i32, m_abs: i32, rho: Float) -> Float {
    if (n - m_abs) % 2 != 0 || n < m_abs {
        return 0.0;
    }
    let mut sum = 0.0;
    let half = (n - m_abs) / 2;
    for k in 0..=half {
        let num = factorial(n - k);
        let den = factorial(k) * factorial((n + m_abs) / 2 - k) * factorial((n - m_abs) / 2 - k);
        let coeff = num / den;
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        sum += sign * coeff * rho.powi(n - 2 * k);
    }
    sum
}

fn factorial(n: i32) -> Float {
    (1..=n.max(0)).fold(1.0, |acc, v| acc * v as Float)
}

/// Evaluates the normalized Zernike term `Z_k(rho, theta)` for a given `(n,
/// m)` pair, using the standard orthonormal normalization over the unit
/// disk.
pub(crate) fn zernike_value(n: i32, m: i32, rho: Float, theta: Float) -> Float {
    let r = radial(n, m.abs(), rho);
    let norm = ((2.0 * (n as Float + 1.0)) / if m == 0 { 2.0 } else { 1.0 }).sqrt();
    if m >= 0 {
        norm * r * (m as Float * theta).cos()
    } else {
        norm * r * (m.abs() as Float * theta).sin()
    }
}

impl Zernike {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    fn nm(&self, k: usize) -> (i32, i32) {
        match self.indexing {
            ZernikeNormalization::Fringe => fringe_to_nm(k + 1),
            ZernikeNormalization::Standard => standard_to_nm(k),
            ZernikeNormalization::Noll => noll_to_nm(k + 1),
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let rho = (x * x + y * y).sqrt() / self.norm_radius;
        if rho > 1.0 {
            return Float::NAN;
        }
        let theta = y.atan2(x);
        let extra: Float = self
            .coefficients
            .iter()
            .enumerate()
            .map(|(k, &c)| {
                let (n, m) = self.nm(k);
                c * zernike_value(n, m, rho, theta)
            })
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
    fn noll_index_one_is_piston() {
        assert_eq!(noll_to_nm(1), (0, 0));
    }

    #[test]
    fn noll_indices_two_three_are_tilt() {
        assert_eq!(noll_to_nm(2), (1, 1));
        assert_eq!(noll_to_nm(3), (1, -1));
    }

    #[test]
    fn outside_unit_disk_is_nan() {
        let z = Zernike {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
            norm_radius: 5.0,
            indexing: ZernikeNormalization::Noll,
            coefficients: vec![0.0, 1e-3],
        };
        assert!(z.sag(10.0, 0.0).is_nan());
    }

    #[test]
    fn piston_term_is_constant_offset() {
        let z = Zernike {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
            norm_radius: 5.0,
            indexing: ZernikeNormalization::Noll,
            coefficients: vec![2e-3],
        };
        let expected = 2e-3 * zernike_value(0, 0, 0.0, 0.0);
        assert!((z.sag(0.0, 0.0) - expected).abs() < 1e-12);
    }
}
