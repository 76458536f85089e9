//! Low-level numeric types shared across the crate.
pub(crate) mod math;
pub(crate) mod frame;

pub(crate) type Float = f64;

pub(crate) const EPSILON: Float = Float::EPSILON;
pub(crate) const PI: Float = std::f64::consts::PI;
