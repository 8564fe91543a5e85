//! Motion estimation for a single tracked target.
//!
//! The tracker consumes a [`MotionModel`]: one `predict` or one `correct`
//! per frame, strictly in frame order. [`ConstantVelocityKalman`] is the
//! default implementation, a discrete linear Kalman filter over
//! `[x, y, vx, vy]` that observes `(x, y)` directly.

mod filter;
mod params;

pub use filter::{ConstantVelocityKalman, MotionModel};
pub use params::{KalmanParams, KalmanParamsError};
