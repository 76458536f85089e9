use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::Float;

/// Specifies a pupil sampling method used to build a [`crate::rays::batch::RayBatch`]
/// for a single field point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PupilSampling {
    /// A pupil consisting of only a chief ray that pierces the pupil center.
    ChiefRay,

    /// A square grid of rays in the entrance pupil, clipped to the unit
    /// disk. Spacing is in normalized pupil distance, `(0, 1]`.
    SquareGrid { spacing: Float },

    /// A tangential (y-z plane) ray fan.
    TangentialRayFan { num_rays: usize },

    /// Concentric-ring hexapolar sampling (`6*(ring+1)` points per ring).
    Hexapolar { rings: usize },

    /// Uniform random sampling over the unit disk.
    Random { num_rays: usize },

    /// Gaussian-quadrature sampling per Forbes (1988), exact for low-order
    /// radial/azimuthal aberration content. `rings` must be in `1..=6`.
    GaussianQuadrature { rings: usize, arms: usize },

    /// A single line of points, along x (`positive_only` restricts to the
    /// non-negative half).
    Line { num_rays: usize, positive_only: bool },

    /// Concatenated x- and y-line fans, sharing the pupil center once.
    Cross { num_rays: usize },
}

impl PupilSampling {
    pub fn validate(&self) -> Result<()> {
        match self {
            PupilSampling::ChiefRay => {}
            PupilSampling::SquareGrid { spacing } => {
                if spacing.is_nan() {
                    anyhow::bail!("Pupil grid spacing must be a number");
                }
                if *spacing <= 0.0 || *spacing > 1.0 {
                    anyhow::bail!("Pupil grid spacing must be in the range (0, 1]");
                }
            }
            PupilSampling::TangentialRayFan { num_rays } | PupilSampling::Random { num_rays } => {
                if *num_rays == 0 {
                    anyhow::bail!("Pupil sampling requires at least one ray");
                }
            }
            PupilSampling::Hexapolar { rings } => {
                if *rings == 0 {
                    anyhow::bail!("Hexapolar sampling requires at least one ring");
                }
            }
            PupilSampling::GaussianQuadrature { rings, arms } => {
                if !(1..=6).contains(rings) {
                    anyhow::bail!("Gaussian quadrature sampling supports 1 to 6 rings");
                }
                if *arms == 0 {
                    anyhow::bail!("Gaussian quadrature sampling requires at least one arm");
                }
            }
            PupilSampling::Line { num_rays, .. } => {
                if *num_rays == 0 {
                    anyhow::bail!("Pupil sampling requires at least one ray");
                }
            }
            PupilSampling::Cross { num_rays } => {
                if *num_rays == 0 {
                    anyhow::bail!("Pupil sampling requires at least one ray");
                }
            }
        }
        Ok(())
    }
}

impl Default for PupilSampling {
    fn default() -> Self {
        Self::SquareGrid { spacing: 0.1 }
    }
}

/// How a field's normalized coordinates `(Hx, Hy)` map to an object-space
/// ray launch point. Shared by every field in a system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub enum FieldDefinition {
    /// `(Hx, Hy)` is the field angle, normalized by the system's maximum
    /// field angle.
    #[default]
    Angle,
    /// `(Hx, Hy)` is the object height, normalized by the system's maximum
    /// object height.
    ObjectHeight,
    /// `(Hx, Hy)` is the paraxial image height; the object-space field is
    /// found by inverting the paraxial magnification.
    ParaxialImageHeight,
    /// `(Hx, Hy)` is the real image height; the object-space field is found
    /// by one real-ray iteration.
    RealImageHeight,
}

/// Specifies an object field point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldSpec {
    pub hx: Float,
    pub hy: Float,
    pub pupil_sampling: PupilSampling,
    /// Vignetting factors `(vcx, vcy, vdx, vdy)` applied to the pupil
    /// sampling before ray aiming: `Px' = Px (1 - vdx) + vcx`, and
    /// similarly for `Py`.
    pub vignetting: (Float, Float, Float, Float),
}

impl FieldSpec {
    pub fn new(hx: Float, hy: Float, pupil_sampling: PupilSampling) -> Self {
        Self {
            hx,
            hy,
            pupil_sampling,
            vignetting: (0.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hx.is_nan() || self.hy.is_nan() {
            anyhow::bail!("Field coordinates must be numbers");
        }
        if self.hx.is_infinite() || self.hy.is_infinite() {
            anyhow::bail!("Field coordinates must be finite");
        }
        self.pupil_sampling.validate()?;
        Ok(())
    }

    /// Applies this field's vignetting factors to a raw normalized pupil
    /// coordinate.
    pub fn vignette(&self, px: Float, py: Float) -> (Float, Float) {
        let (vcx, vcy, vdx, vdy) = self.vignetting;
        (px * (1.0 - vdx) + vcx, py * (1.0 - vdy) + vcy)
    }
}
