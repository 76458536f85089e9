use crate::core::Float;
use crate::core::math::vec3::Vec3;

use super::standard::Standard;

/// A 2-D Chebyshev (first kind) freeform: a conic base plus `sum_ij
/// coefficients[(i,j)] T_i(x/Nx) T_j(y/Ny)`.
#[derive(Debug, Clone)]
pub(crate) struct Chebyshev {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
    pub norm_x: Float,
    pub norm_y: Float,
    /// `(i, j, coefficient)` triples.
    pub terms: Vec<(u32, u32, Float)>,
}

/// Evaluates `T_0..=T_n(x)` via the standard three-term recurrence
/// `T_k = 2 x T_{k-1} - T_{k-2}`.
fn chebyshev_t(max_order: u32, x: Float) -> Vec<Float> {
    let mut t = vec![0.0; max_order as usize + 1];
    t[0] = 1.0;
    if max_order >= 1 {
        t[1] = x;
    }
    for k in 2..=max_order as usize {
        t[k] = 2.0 * x * t[k - 1] - t[k - 2];
    }
    t
}

impl Chebyshev {
    fn base(&self) -> Standard {
        Standard {
            semi_diameter: self.semi_diameter,
            radius_of_curvature: self.radius_of_curvature,
            conic_constant: self.conic_constant,
        }
    }

    pub fn sag(&self, x: Float, y: Float) -> Float {
        let u = x / self.norm_x;
        let v = y / self.norm_y;
        if u.abs() > 1.0 || v.abs() > 1.0 {
            return Float::NAN;
        }
        let max_i = self.terms.iter().map(|&(i, _, _)| i).max().unwrap_or(0);
        let max_j = self.terms.iter().map(|&(_, j, _)| j).max().unwrap_or(0);
        let tu = chebyshev_t(max_i, u);
        let tv = chebyshev_t(max_j, v);
        let extra: Float = self
            .terms
            .iter()
            .map(|&(i, j, c)| c * tu[i as usize] * tv[j as usize])
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
    fn chebyshev_t_matches_closed_forms() {
        let t = chebyshev_t(3, 0.5);
        assert!((t[0] - 1.0).abs() < 1e-12);
        assert!((t[1] - 0.5).abs() < 1e-12);
        assert!((t[2] - (2.0 * 0.25 - 1.0)).abs() < 1e-12); // T2 = 2x^2 - 1
        assert!((t[3] - (4.0 * 0.125 - 3.0 * 0.5)).abs() < 1e-12); // T3 = 4x^3 - 3x
    }

    #[test]
    fn outside_normalized_disk_is_nan() {
        let c = Chebyshev {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
            norm_x: 5.0,
            norm_y: 5.0,
            terms: vec![(1, 0, 1.0)],
        };
        assert!(c.sag(10.0, 0.0).is_nan());
    }
}
