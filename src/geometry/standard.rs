use crate::core::Float;
use crate::core::math::vec3::Vec3;

/// A spherical or conic surface, the only variant with a closed-form
/// intersection. Every other variant uses this shape (via its base radius
/// of curvature) as the starting guess for iterative intersection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Standard {
    pub semi_diameter: Float,
    pub radius_of_curvature: Float,
    pub conic_constant: Float,
}

impl Standard {
    pub fn sag(&self, x: Float, y: Float) -> Float {
        let r2 = x * x + y * y;
        if self.radius_of_curvature.is_infinite() {
            return 0.0;
        }
        let c = 1.0 / self.radius_of_curvature;
        let k = self.conic_constant;
        let disc = 1.0 - (1.0 + k) * c * c * r2;
        if disc < 0.0 {
            return Float::NAN;
        }
        c * r2 / (1.0 + disc.sqrt())
    }

    pub fn surface_normal(&self, x: Float, y: Float) -> Vec3 {
        if self.radius_of_curvature.is_infinite() {
            return Vec3::new(0.0, 0.0, -1.0);
        }
        let c = 1.0 / self.radius_of_curvature;
        let k = self.conic_constant;
        let r2 = x * x + y * y;
        let disc = (1.0 - (1.0 + k) * c * c * r2).max(0.0).sqrt();
        let dzdx = c * x / disc;
        let dzdy = c * y / disc;
        Vec3::new(dzdx, dzdy, -1.0).normalize()
    }

    /// Solves `t^2 - 2 t (dir . offset + N R) + (|offset|^2 - 2 offset_z R) = 0`
    /// for the sphere centered at `(0, 0, R)` in the surface's local frame,
    /// where `offset = position - (0, 0, R)`. Picks the root closer to the
    /// vertex, breaking ties toward the root with positive advance along
    /// the ray direction; the degenerate `a == 0` case (ray parallel to a
    /// flat surface or along the sphere's own tangent) falls back to the
    /// linear solution `t = -c / b`.
    pub fn distance(&self, position: Vec3, direction: Vec3) -> Option<Float> {
        if self.radius_of_curvature.is_infinite() {
            if direction.n().abs() < crate::core::EPSILON {
                return None;
            }
            let t = -position.z() / direction.n();
            return (t >= 0.0).then_some(t);
        }

        let r = self.radius_of_curvature;
        let center = Vec3::new(0.0, 0.0, r);
        let offset = position - center;

        let a = direction.dot(direction);
        let b = direction.dot(offset);
        let c = offset.dot(offset) - r * r;

        let t = if a.abs() < crate::core::EPSILON {
            if b.abs() < crate::core::EPSILON {
                return None;
            }
            -c / (2.0 * b)
        } else {
            let disc = b * b - a * c;
            if disc < 0.0 {
                return None;
            }
            let sq = disc.sqrt();
            let t1 = (-b + sq) / a;
            let t2 = (-b - sq) / a;

            let pick_smaller_z = |t: Float| (position + direction * t).z().abs();
            match (t1 >= 0.0, t2 >= 0.0) {
                (true, true) => {
                    if pick_smaller_z(t1) <= pick_smaller_z(t2) {
                        t1
                    } else {
                        t2
                    }
                }
                (true, false) => t1,
                (false, true) => t2,
                (false, false) => return None,
            }
        };

        (t >= 0.0 && t.is_finite()).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_axial_ray_hits_at_zero() {
        let s = Standard {
            semi_diameter: 10.0,
            radius_of_curvature: 50.0,
            conic_constant: 0.0,
        };
        let t = s
            .distance(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!((t - 0.0).abs() < 1e-9);
    }

    #[test]
    fn flat_surface_is_a_plane() {
        let s = Standard {
            semi_diameter: 10.0,
            radius_of_curvature: Float::INFINITY,
            conic_constant: 0.0,
        };
        let t = s
            .distance(Vec3::new(1.0, 1.0, -5.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!((t - 5.0).abs() < 1e-9);
        assert_eq!(s.sag(1.0, 1.0), 0.0);
    }

    #[test]
    fn parabolic_conic_matches_closed_form_sag() {
        let s = Standard {
            semi_diameter: 10.0,
            radius_of_curvature: 20.0,
            conic_constant: -1.0,
        };
        // For k = -1 (parabola), sag = r^2 / (2R).
        let expected = (3.0_f64 * 3.0 + 4.0 * 4.0) / (2.0 * 20.0);
        assert!((s.sag(3.0, 4.0) - expected).abs() < 1e-12);
    }
}
