use serde::{Deserialize, Serialize};

/// Noise model of the constant-velocity filter.
///
/// All covariances are isotropic: the value is placed on every diagonal
/// entry of the corresponding matrix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KalmanParams {
    /// Process noise per state dimension (`Q = q * I4`).
    pub process_noise: f64,
    /// Measurement noise per observed coordinate (`R = r * I2`).
    pub measurement_noise: f64,
    /// Initial error covariance (`P0 = p0 * I4`).
    pub initial_covariance: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            process_noise: 1e-4,
            measurement_noise: 1e-2,
            initial_covariance: 1.0,
        }
    }
}

/// Rejected noise settings.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum KalmanParamsError {
    #[error("process_noise must be finite and >= 0 (got {0})")]
    ProcessNoise(f64),
    #[error("measurement_noise must be finite and > 0 (got {0})")]
    MeasurementNoise(f64),
    #[error("initial_covariance must be finite and > 0 (got {0})")]
    InitialCovariance(f64),
}

impl KalmanParams {
    pub fn validate(&self) -> Result<(), KalmanParamsError> {
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(KalmanParamsError::ProcessNoise(self.process_noise));
        }
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(KalmanParamsError::MeasurementNoise(self.measurement_noise));
        }
        if !self.initial_covariance.is_finite() || self.initial_covariance <= 0.0 {
            return Err(KalmanParamsError::InitialCovariance(
                self.initial_covariance,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let p: KalmanParams = serde_json::from_str(r#"{"measurement_noise": 0.5}"#).unwrap();
        assert_eq!(p.measurement_noise, 0.5);
        assert_eq!(p.process_noise, 1e-4);
        assert_eq!(p.initial_covariance, 1.0);
    }

    #[test]
    fn validate_rejects_non_positive_measurement_noise() {
        let p = KalmanParams {
            measurement_noise: 0.0,
            ..KalmanParams::default()
        };
        assert_eq!(p.validate(), Err(KalmanParamsError::MeasurementNoise(0.0)));
        assert!(KalmanParams::default().validate().is_ok());
    }
}
