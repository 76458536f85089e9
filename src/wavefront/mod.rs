//! Wavefront reconstruction: pupil sampling distributions, reference-sphere
//! strategies, and Zernike decomposition of the resulting optical path
//! difference map.
pub mod distribution;
pub mod strategy;
pub mod zernike_fit;
