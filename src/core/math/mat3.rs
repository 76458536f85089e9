use std::ops::Mul;

use crate::core::Float;

use super::vec3::Vec3;

/// A 3x3 row-major matrix, used for frame rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3 {
    e: [[Float; 3]; 3],
}

impl Mat3 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        e00: Float,
        e01: Float,
        e02: Float,
        e10: Float,
        e11: Float,
        e12: Float,
        e20: Float,
        e21: Float,
        e22: Float,
    ) -> Self {
        Self {
            e: [[e00, e01, e02], [e10, e11, e12], [e20, e21, e22]],
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)
    }

    pub fn transpose(&self) -> Self {
        Self::new(
            self.e[0][0],
            self.e[1][0],
            self.e[2][0],
            self.e[0][1],
            self.e[1][1],
            self.e[2][1],
            self.e[0][2],
            self.e[1][2],
            self.e[2][2],
        )
    }

    pub fn approx_eq(&self, other: &Self, tol: Float) -> bool {
        for i in 0..3 {
            for j in 0..3 {
                if (self.e[i][j] - other.e[i][j]).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Builds the rotation matrix `Rx(rx) * Ry(ry) * Rz(rz)`, i.e. the
    /// composition that applies `z` first, then `y`, then `x` -- the order
    /// [`globalize`](crate::core::frame) requires, ground-truthed against
    /// `pyoptic`'s `rays.py` (`rotate_x/y/z`) and `coordinate_system.py`'s
    /// `localize`/`globalize`. `rx`, `ry`, `rz` are angles in radians about
    /// x, y, and z respectively.
    ///
    /// This is not commutative in the rotation angles; callers that need the
    /// inverse (localize) sequence should use [`Self::transpose`] rather
    /// than negating the angles and rebuilding, since the rotation group is
    /// orthogonal (`R^-1 = R^T`).
    pub fn from_euler_angles(rx: Float, ry: Float, rz: Float) -> Self {
        if rx == 0.0 && ry == 0.0 && rz == 0.0 {
            return Self::identity();
        }

        let (sx, cx) = rx.sin_cos();
        let (sy, cy) = ry.sin_cos();
        let (sz, cz) = rz.sin_cos();

        Self::new(
            cy * cz,
            -cy * sz,
            sy,
            sx * sy * cz + cx * sz,
            cx * cz - sx * sy * sz,
            -sx * cy,
            -cx * sy * cz + sx * sz,
            cx * sy * sz + sx * cz,
            cx * cy,
        )
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.e[0][0] * rhs.x() + self.e[0][1] * rhs.y() + self.e[0][2] * rhs.z(),
            self.e[1][0] * rhs.x() + self.e[1][1] * rhs.y() + self.e[1][2] * rhs.z(),
            self.e[2][0] * rhs.x() + self.e[2][1] * rhs.y() + self.e[2][2] * rhs.z(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_from_zero_euler_angles() {
        assert_eq!(Mat3::from_euler_angles(0.0, 0.0, 0.0), Mat3::identity());
    }

    #[test]
    fn transpose_is_inverse_of_rotation() {
        let r = Mat3::from_euler_angles(0.1, -0.2, 0.3);
        let product = r * Vec3::new(1.0, 0.0, 0.0);
        let back = r.transpose() * product;
        assert!((back.x() - 1.0).abs() < 1e-12);
        assert!(back.y().abs() < 1e-12);
        assert!(back.z().abs() < 1e-12);
    }

    #[test]
    fn from_euler_angles_applies_z_then_y_then_x() {
        // Hand-computed z-then-y-then-x composition for a non-trivial tilt,
        // cross-checked against pyoptic's rotate_x/y/z + coordinate_system
        // globalize for rx=0.3, ry=-0.2, rz=0.15, v=(1, 2, 3).
        let r = Mat3::from_euler_angles(0.3, -0.2, 0.15);
        let v = r * Vec3::new(1.0, 2.0, 3.0);
        assert!((v.x() - 0.0801).abs() < 1e-4);
        assert!((v.y() - 1.1226).abs() < 1e-4);
        assert!((v.z() - 3.5684).abs() < 1e-4);
    }

    #[test]
    fn mul_vec3() {
        let m = Mat3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let v = Vec3::new(1.0, 0.0, 0.0);
        let result = m * v;
        assert_eq!(result, Vec3::new(1.0, 4.0, 7.0));
    }
}
