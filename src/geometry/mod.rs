//! Surface geometry: sag, surface normal, and ray-surface intersection.
//!
//! Every variant is evaluated through the single [`Geometry`] enum rather
//! than through a trait object, so that the match is performed once per
//! surface per ray batch instead of once per ray.
mod biconic;
mod chebyshev;
mod even_asphere;
pub(crate) mod forbes;
mod grid_sag;
mod nurbs;
mod odd_asphere;
mod polynomial;
mod standard;
mod toroidal;
mod zernike;

pub(crate) use biconic::Biconic;
pub(crate) use chebyshev::Chebyshev;
pub(crate) use even_asphere::EvenAsphere;
pub(crate) use grid_sag::GridSag;
pub(crate) use nurbs::Nurbs;
pub(crate) use odd_asphere::OddAsphere;
pub(crate) use polynomial::Polynomial;
pub(crate) use standard::Standard;
pub(crate) use toroidal::Toroidal;
pub(crate) use zernike::{
    Zernike, ZernikeNormalization, fringe_to_nm, noll_to_nm, standard_to_nm, zernike_value,
};

use crate::core::Float;
use crate::core::math::vec3::Vec3;

/// Default convergence tolerance for iterative intersection search.
pub(crate) const INTERSECT_TOL: Float = 1e-10;
/// Default iteration cap for iterative intersection search.
pub(crate) const INTERSECT_MAX_ITER: usize = 100;

/// A surface shape, dispatched through a single tagged enum rather than a
/// trait object so that geometry dispatch happens once per batch.
#[derive(Debug, Clone)]
pub(crate) enum Geometry {
    Standard(Standard),
    EvenAsphere(EvenAsphere),
    OddAsphere(OddAsphere),
    Polynomial(Polynomial),
    Chebyshev(Chebyshev),
    Zernike(Zernike),
    Biconic(Biconic),
    Toroidal(Toroidal),
    ForbesQbfs(forbes::ForbesQbfs),
    ForbesQ2d(forbes::ForbesQ2d),
    Nurbs(Nurbs),
    GridSag(GridSag),
}

impl Geometry {
    /// Base radius of curvature, used to seed the osculating-sphere guess
    /// for iterative intersection search. Flat/freeform surfaces with no
    /// meaningful base curvature return an infinite radius.
    pub fn base_radius_of_curvature(&self) -> Float {
        match self {
            Geometry::Standard(g) => g.radius_of_curvature,
            Geometry::EvenAsphere(g) => g.radius_of_curvature,
            Geometry::OddAsphere(g) => g.radius_of_curvature,
            Geometry::Polynomial(g) => g.radius_of_curvature,
            Geometry::Chebyshev(g) => g.radius_of_curvature,
            Geometry::Zernike(g) => g.radius_of_curvature,
            Geometry::Biconic(g) => g.radius_of_curvature_x,
            Geometry::Toroidal(g) => g.radius_of_rotation,
            Geometry::ForbesQbfs(g) => g.radius_of_curvature,
            Geometry::ForbesQ2d(g) => g.radius_of_curvature,
            Geometry::Nurbs(_) => Float::INFINITY,
            Geometry::GridSag(_) => Float::INFINITY,
        }
    }

    /// The surface sag `z(x, y)`. Returns `NaN` outside the surface's valid
    /// domain (e.g. outside the unit disk for a normalized polynomial
    /// expansion).
    pub fn sag(&self, x: Float, y: Float) -> Float {
        match self {
            Geometry::Standard(g) => g.sag(x, y),
            Geometry::EvenAsphere(g) => g.sag(x, y),
            Geometry::OddAsphere(g) => g.sag(x, y),
            Geometry::Polynomial(g) => g.sag(x, y),
            Geometry::Chebyshev(g) => g.sag(x, y),
            Geometry::Zernike(g) => g.sag(x, y),
            Geometry::Biconic(g) => g.sag(x, y),
            Geometry::Toroidal(g) => g.sag(x, y),
            Geometry::ForbesQbfs(g) => g.sag(x, y),
            Geometry::ForbesQ2d(g) => g.sag(x, y),
            Geometry::Nurbs(g) => g.sag(x, y),
            Geometry::GridSag(g) => g.sag(x, y),
        }
    }

    /// The outward unit surface normal at `(x, y)`, with `nz <= 0` for a
    /// surface oriented to face the incoming (−z-traveling-to+z) beam.
    pub fn surface_normal(&self, x: Float, y: Float) -> Vec3 {
        match self {
            Geometry::Standard(g) => g.surface_normal(x, y),
            Geometry::EvenAsphere(g) => g.surface_normal(x, y),
            Geometry::OddAsphere(g) => g.surface_normal(x, y),
            Geometry::Polynomial(g) => g.surface_normal(x, y),
            Geometry::Chebyshev(g) => g.surface_normal(x, y),
            Geometry::Zernike(g) => g.surface_normal(x, y),
            Geometry::Biconic(g) => g.surface_normal(x, y),
            Geometry::Toroidal(g) => g.surface_normal(x, y),
            Geometry::ForbesQbfs(g) => g.surface_normal(x, y),
            Geometry::ForbesQ2d(g) => g.surface_normal(x, y),
            Geometry::Nurbs(g) => g.surface_normal(x, y),
            Geometry::GridSag(g) => g.surface_normal(x, y),
        }
    }

    /// Whether this variant has a closed-form quadratic intersection
    /// (pure sphere/conic) or must fall back to the iterative scheme.
    fn is_closed_form(&self) -> bool {
        matches!(self, Geometry::Standard(_))
    }

    /// Finds the nonnegative parametric distance `t` along `(position,
    /// direction)` to this surface, or `None` if there is no valid
    /// intersection (ray misses, or iteration failed to converge).
    pub fn distance(&self, position: Vec3, direction: Vec3) -> Option<Float> {
        if let (Geometry::Standard(g), true) = (self, self.is_closed_form()) {
            return g.distance(position, direction);
        }
        self.iterative_distance(position, direction)
    }

    /// Step 1: closed-form intersection with the osculating sphere (using
    /// the base radius of curvature) for an initial guess. Step 2: Newton
    /// iteration, walking the ray along its direction until the sag
    /// residual at the current (x, y) converges.
    fn iterative_distance(&self, position: Vec3, direction: Vec3) -> Option<Float> {
        let r_base = self.base_radius_of_curvature();
        let osculating = Standard {
            semi_diameter: Float::INFINITY,
            radius_of_curvature: r_base,
            conic_constant: 0.0,
        };
        let mut t = osculating.distance(position, direction)?;

        for _ in 0..INTERSECT_MAX_ITER {
            let p = position + direction * t;
            let sag = self.sag(p.x(), p.y());
            if sag.is_nan() {
                return None;
            }
            let dz = p.z() - sag;
            if dz.abs() < INTERSECT_TOL {
                return Some(t);
            }
            if direction.n().abs() < crate::core::EPSILON {
                return None;
            }
            t += dz / direction.n();
            if t < 0.0 || !t.is_finite() {
                return None;
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_sphere_round_trips_through_iterative_path() {
        let standard = Standard {
            semi_diameter: 10.0,
            radius_of_curvature: 50.0,
            conic_constant: 0.0,
        };
        let geom = Geometry::EvenAsphere(EvenAsphere {
            semi_diameter: 10.0,
            radius_of_curvature: 50.0,
            conic_constant: 0.0,
            coefficients: vec![],
        });

        let position = Vec3::new(1.0, 0.5, -5.0);
        let direction = Vec3::new(0.0, 0.0, 1.0);

        let t_closed = standard.distance(position, direction).unwrap();
        let t_iter = geom.distance(position, direction).unwrap();
        assert!((t_closed - t_iter).abs() < 1e-8);
    }
}
