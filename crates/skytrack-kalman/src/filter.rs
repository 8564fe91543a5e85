use nalgebra::{Matrix2, Matrix4, Point2, SMatrix, Vector2, Vector4};

use crate::{KalmanParams, KalmanParamsError};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Per-frame motion belief consumed by the tracking loop.
///
/// Every call to `predict` or `correct` advances the belief by exactly one
/// frame; callers must invoke exactly one of them per processed frame, in
/// frame order.
pub trait MotionModel {
    /// Advance one frame without an observation and return the predicted
    /// position.
    fn predict(&mut self) -> Point2<f64>;
    /// Advance one frame and fuse an observed position.
    fn correct(&mut self, measurement: Point2<f64>);
    /// Current position estimate.
    fn position(&self) -> Point2<f64>;
    /// Trace of the error covariance, a scalar measure of uncertainty.
    fn covariance_trace(&self) -> f64;
}

impl<M: MotionModel + ?Sized> MotionModel for Box<M> {
    fn predict(&mut self) -> Point2<f64> {
        (**self).predict()
    }

    fn correct(&mut self, measurement: Point2<f64>) {
        (**self).correct(measurement)
    }

    fn position(&self) -> Point2<f64> {
        (**self).position()
    }

    fn covariance_trace(&self) -> f64 {
        (**self).covariance_trace()
    }
}

/// Discrete Kalman filter over `[x, y, vx, vy]` with a constant-velocity
/// transition and direct position measurements.
#[derive(Clone, Debug)]
pub struct ConstantVelocityKalman {
    params: KalmanParams,
    state: Vector4<f64>,
    covariance: Matrix4<f64>,
    transition: Matrix4<f64>,
    observation: SMatrix<f64, 2, 4>,
    process_noise: Matrix4<f64>,
    measurement_noise: Matrix2<f64>,
    seeded: bool,
}

impl Default for ConstantVelocityKalman {
    fn default() -> Self {
        Self::build(KalmanParams::default())
    }
}

impl ConstantVelocityKalman {
    /// Zero state, `P0 = initial_covariance * I`.
    pub fn new(params: KalmanParams) -> Result<Self, KalmanParamsError> {
        params.validate()?;
        Ok(Self::build(params))
    }

    fn build(params: KalmanParams) -> Self {
        #[rustfmt::skip]
        let transition = Matrix4::new(
            1.0, 0.0, 1.0, 0.0,
            0.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        #[rustfmt::skip]
        let observation = SMatrix::<f64, 2, 4>::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
        );
        Self {
            params,
            state: Vector4::zeros(),
            covariance: Matrix4::identity() * params.initial_covariance,
            transition,
            observation,
            process_noise: Matrix4::identity() * params.process_noise,
            measurement_noise: Matrix2::identity() * params.measurement_noise,
            seeded: false,
        }
    }

    #[inline]
    pub fn params(&self) -> &KalmanParams {
        &self.params
    }

    /// `[x, y, vx, vy]`.
    #[inline]
    pub fn state(&self) -> &Vector4<f64> {
        &self.state
    }

    #[inline]
    pub fn covariance(&self) -> &Matrix4<f64> {
        &self.covariance
    }

    #[inline]
    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.state[2], self.state[3])
    }

    /// Whether a measurement has ever been fused.
    #[inline]
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    fn time_update(&mut self) {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
    }

    fn measurement_update(&mut self, z: Point2<f64>) {
        let h = &self.observation;
        let innovation_cov = h * self.covariance * h.transpose() + self.measurement_noise;
        let Some(inv) = innovation_cov.try_inverse() else {
            log::warn!("singular innovation covariance, measurement ignored");
            return;
        };
        let gain = self.covariance * h.transpose() * inv;
        let innovation = Vector2::new(z.x, z.y) - h * self.state;
        self.state += gain * innovation;
        self.covariance = (Matrix4::identity() - gain * h) * self.covariance;
    }
}

impl MotionModel for ConstantVelocityKalman {
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn predict(&mut self) -> Point2<f64> {
        self.time_update();
        self.position()
    }

    /// The first measurement seeds the position (zero velocity) and is fused
    /// without a time update; later ones advance the state one frame first,
    /// which is what lets consecutive detections build up a velocity.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    fn correct(&mut self, measurement: Point2<f64>) {
        if self.seeded {
            self.time_update();
        } else {
            self.state = Vector4::new(measurement.x, measurement.y, 0.0, 0.0);
            self.seeded = true;
        }
        self.measurement_update(measurement);
    }

    #[inline]
    fn position(&self) -> Point2<f64> {
        Point2::new(self.state[0], self.state[1])
    }

    #[inline]
    fn covariance_trace(&self) -> f64 {
        self.covariance.trace()
    }
}
