//! The structure-of-arrays ray batch traced through a [`SequentialModel`].
use crate::core::Float;
use crate::core::math::vec3::Vec3;

/// A single Jones matrix tracking the polarization transport of one ray.
pub(crate) type JonesMatrix = [[crate::core::math::complex::Complex<Float>; 2]; 2];

fn identity_jones() -> JonesMatrix {
    use crate::core::math::complex::Complex;
    let one = Complex::new(1.0, 0.0);
    let zero = Complex::new(0.0, 0.0);
    [[one, zero], [zero, one]]
}

/// A batch of rays traced together through a [`crate::sequential_model::SequentialModel`].
///
/// Every field is a parallel array of length `N`; a ray never moves or is
/// removed from its index, so that `intensity[i]` and `opl[i]` after a trace
/// still describe the `i`-th launched ray even if it died partway through.
#[derive(Debug, Clone)]
pub struct RayBatch {
    pub x: Vec<Float>,
    pub y: Vec<Float>,
    pub z: Vec<Float>,
    pub l: Vec<Float>,
    pub m: Vec<Float>,
    pub n: Vec<Float>,
    pub wavelength: Vec<Float>,
    pub intensity: Vec<Float>,
    pub opl: Vec<Float>,
    pub polarization: Option<Vec<JonesMatrix>>,
}

impl RayBatch {
    /// Builds a batch of `n` rays, all at the given launch state, with no
    /// polarization tracking.
    pub fn new(positions: &[Vec3], directions: &[Vec3], wavelength: Float) -> Self {
        assert_eq!(positions.len(), directions.len());
        let len = positions.len();
        Self {
            x: positions.iter().map(|p| p.x()).collect(),
            y: positions.iter().map(|p| p.y()).collect(),
            z: positions.iter().map(|p| p.z()).collect(),
            l: directions.iter().map(|d| d.l()).collect(),
            m: directions.iter().map(|d| d.m()).collect(),
            n: directions.iter().map(|d| d.n()).collect(),
            wavelength: vec![wavelength; len],
            intensity: vec![1.0; len],
            opl: vec![0.0; len],
            polarization: None,
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Enables Jones-matrix polarization transport, seeding every ray with
    /// the identity matrix.
    pub fn with_polarization(mut self) -> Self {
        self.polarization = Some(vec![identity_jones(); self.len()]);
        self
    }

    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.x[i], self.y[i], self.z[i])
    }

    pub fn direction(&self, i: usize) -> Vec3 {
        Vec3::new(self.l[i], self.m[i], self.n[i])
    }

    pub fn set_position(&mut self, i: usize, p: Vec3) {
        self.x[i] = p.x();
        self.y[i] = p.y();
        self.z[i] = p.z();
    }

    pub fn set_direction(&mut self, i: usize, d: Vec3) {
        self.l[i] = d.l();
        self.m[i] = d.m();
        self.n[i] = d.n();
    }

    pub fn is_live(&self, i: usize) -> bool {
        self.intensity[i] > 0.0
    }

    pub fn kill(&mut self, i: usize) {
        self.intensity[i] = 0.0;
    }

    /// The derived `live_mask`: one boolean per ray, true where `intensity >
    /// 0`.
    pub fn live_mask(&self) -> Vec<bool> {
        self.intensity.iter().map(|&i| i > 0.0).collect()
    }

    pub fn live_count(&self) -> usize {
        self.intensity.iter().filter(|&&i| i > 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_batch_starts_fully_live_with_zero_opl() {
        let batch = RayBatch::new(
            &[Vec3::zero(), Vec3::new(1.0, 0.0, 0.0)],
            &[Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0)],
            0.5876,
        );
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.live_count(), 2);
        assert!(batch.opl.iter().all(|&o| o == 0.0));
    }

    #[test]
    fn killing_a_ray_removes_it_from_the_live_mask_but_keeps_its_index() {
        let mut batch = RayBatch::new(&[Vec3::zero()], &[Vec3::new(0.0, 0.0, 1.0)], 0.55);
        batch.kill(0);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.live_mask(), vec![false]);
    }

    #[test]
    fn with_polarization_seeds_identity_jones_matrices() {
        let batch =
            RayBatch::new(&[Vec3::zero()], &[Vec3::new(0.0, 0.0, 1.0)], 0.55).with_polarization();
        let p = batch.polarization.unwrap();
        assert_eq!(p.len(), 1);
        assert_eq!(p[0][0][0].real, 1.0);
        assert_eq!(p[0][0][1].real, 0.0);
    }
}
