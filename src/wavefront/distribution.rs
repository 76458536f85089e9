//! Pupil sampling distributions: turns a [`PupilSampling`] spec into a set of
//! normalized pupil coordinates `(px, py)` on or inside the unit disk.
//!
//! Shared by [`crate::rays::generator`], which aims a real ray at each point,
//! and by wavefront reconstruction, which uses the same points (plus, for
//! [`PupilSampling::GaussianQuadrature`], their quadrature weights) to
//! integrate optical path difference over the pupil. Grounded in the
//! `distribution.py` reference implementation (Forbes, 1988, for the
//! Gaussian-quadrature radii and weights).
use crate::core::Float;
use crate::specs::fields::PupilSampling;

/// Gaussian-quadrature ring radii, Forbes (1988), for 1 to 6 rings.
fn gaussian_quadrature_radii(rings: usize) -> &'static [Float] {
    match rings {
        1 => &[0.70711],
        2 => &[0.45970, 0.88807],
        3 => &[0.33571, 0.70711, 0.94196],
        4 => &[0.26350, 0.57446, 0.81853, 0.96466],
        5 => &[0.21659, 0.48038, 0.70711, 0.87706, 0.97626],
        6 => &[0.18375, 0.41158, 0.61700, 0.78696, 0.91138, 0.98300],
        _ => &[],
    }
}

/// Per-ring quadrature weights, before the `2 / num_arms` azimuthal spreading
/// applied by [`sample`].
fn gaussian_quadrature_ring_weights(rings: usize) -> &'static [Float] {
    match rings {
        1 => &[0.5],
        2 => &[0.25, 0.25],
        3 => &[0.13889, 0.22222, 0.13889],
        4 => &[0.08696, 0.16304, 0.16304, 0.08696],
        5 => &[0.059231, 0.11966, 0.14222, 0.11966, 0.059231],
        6 => &[0.04283, 0.09019, 0.11698, 0.11698, 0.09019, 0.04283],
        _ => &[],
    }
}

/// The integration weight of every point [`sample`] returns for a
/// [`PupilSampling::GaussianQuadrature { rings, arms }`], in the same order.
/// Only meaningful for that variant; other samplings are unweighted (equal
/// weight to every point is the caller's responsibility).
pub fn gaussian_quadrature_weights(rings: usize, arms: usize) -> Vec<Float> {
    let mut weights = Vec::with_capacity(rings * arms);
    for &w in gaussian_quadrature_ring_weights(rings) {
        for _ in 0..arms {
            weights.push(w * 2.0 / arms as Float);
        }
    }
    weights
}

fn hexapolar_points(rings: usize) -> Vec<(Float, Float)> {
    let mut points = vec![(0.0, 0.0)];
    for ring in 1..=rings {
        let radius = ring as Float / rings as Float;
        let num_theta = 6 * ring;
        for k in 0..num_theta {
            let theta = 2.0 * crate::core::PI * k as Float / num_theta as Float;
            points.push((radius * theta.cos(), radius * theta.sin()));
        }
    }
    points
}

fn square_grid_points(spacing: Float) -> Vec<(Float, Float)> {
    let mut points = Vec::new();
    let steps = (1.0 / spacing).floor() as i64;
    for i in -steps..=steps {
        for j in -steps..=steps {
            let x = i as Float * spacing;
            let y = j as Float * spacing;
            if x * x + y * y <= 1.0 + crate::core::EPSILON {
                points.push((x, y));
            }
        }
    }
    points
}

fn random_points(num_rays: usize) -> Vec<(Float, Float)> {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..num_rays)
        .map(|_| {
            let r: Float = rng.gen_range(0.0..1.0);
            let theta: Float = rng.gen_range(0.0..2.0 * crate::core::PI);
            (r.sqrt() * theta.cos(), r.sqrt() * theta.sin())
        })
        .collect()
}

/// Azimuthal arm angles for Gaussian-quadrature sampling: a single arm
/// (`arms == 1`) is symmetric about the x-axis; larger arm counts are spread
/// evenly over `2*pi`.
fn gaussian_quadrature_arm_angles(arms: usize) -> Vec<Float> {
    (0..arms)
        .map(|k| 2.0 * crate::core::PI * k as Float / arms as Float)
        .collect()
}

/// Samples `sampling` into normalized pupil coordinates `(px, py)` on or
/// inside the unit disk, before a field's vignetting is applied.
pub fn sample(sampling: &PupilSampling) -> Vec<(Float, Float)> {
    match sampling {
        PupilSampling::ChiefRay => vec![(0.0, 0.0)],
        PupilSampling::SquareGrid { spacing } => square_grid_points(*spacing),
        PupilSampling::TangentialRayFan { num_rays } => {
            if *num_rays == 1 {
                vec![(0.0, 0.0)]
            } else {
                (0..*num_rays)
                    .map(|i| {
                        let t = -1.0 + 2.0 * i as Float / (*num_rays as Float - 1.0);
                        (0.0, t)
                    })
                    .collect()
            }
        }
        PupilSampling::Hexapolar { rings } => hexapolar_points(*rings),
        PupilSampling::Random { num_rays } => random_points(*num_rays),
        PupilSampling::GaussianQuadrature { rings, arms } => {
            let radii = gaussian_quadrature_radii(*rings);
            let angles = gaussian_quadrature_arm_angles(*arms);
            radii
                .iter()
                .flat_map(|&r| angles.iter().map(move |&theta| (r * theta.cos(), r * theta.sin())))
                .collect()
        }
        PupilSampling::Line { num_rays, positive_only } => {
            if *num_rays == 1 {
                vec![(0.0, 0.0)]
            } else if *positive_only {
                (0..*num_rays)
                    .map(|i| (i as Float / (*num_rays as Float - 1.0), 0.0))
                    .collect()
            } else {
                (0..*num_rays)
                    .map(|i| {
                        let x = -1.0 + 2.0 * i as Float / (*num_rays as Float - 1.0);
                        (x, 0.0)
                    })
                    .collect()
            }
        }
        PupilSampling::Cross { num_rays } => {
            let mut points = sample(&PupilSampling::Line { num_rays: *num_rays, positive_only: false });
            points.extend(points.clone().into_iter().map(|(x, y)| (y, x)));
            points
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chief_ray_sampling_is_a_single_point_at_the_center() {
        assert_eq!(sample(&PupilSampling::ChiefRay), vec![(0.0, 0.0)]);
    }

    #[test]
    fn square_grid_points_stay_within_the_unit_disk() {
        let points = sample(&PupilSampling::SquareGrid { spacing: 0.2 });
        assert!(points.iter().all(|&(x, y)| x * x + y * y <= 1.0 + 1e-9));
        assert!(points.contains(&(0.0, 0.0)));
    }

    #[test]
    fn hexapolar_sampling_has_the_expected_point_count() {
        let points = hexapolar_points(3);
        assert_eq!(points.len(), 1 + 6 + 12 + 18);
    }

    #[test]
    fn gaussian_quadrature_weights_sum_to_one_for_each_ring_count() {
        for rings in 1..=6 {
            let weights = gaussian_quadrature_weights(rings, 3);
            let total: Float = weights.iter().sum();
            assert!((total - 1.0).abs() < 1e-2, "rings={rings} total={total}");
        }
    }

    #[test]
    fn cross_sampling_concatenates_x_and_y_lines() {
        let points = sample(&PupilSampling::Cross { num_rays: 5 });
        assert_eq!(points.len(), 10);
    }
}
