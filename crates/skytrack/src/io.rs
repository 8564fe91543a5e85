//! JSON configuration and run report.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skytrack_detect::{
    BlobGate, BlobGateParams, ContourDetector, ContourParams, DetectError, Detector,
    TemplateDetector, TemplateParams,
};
use skytrack_kalman::{ConstantVelocityKalman, KalmanParams, KalmanParamsError};

use crate::{FrameEntry, RunSummary, Tracker, TrackerParams};

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors building the tracker from a configuration. Fatal before any frame
/// is processed.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to load template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: DetectError,
    },
    #[error(transparent)]
    Kalman(#[from] KalmanParamsError),
}

/// Detector strategy and its settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorConfig {
    Contour {
        #[serde(default)]
        params: ContourParams,
        #[serde(default)]
        gate: Option<BlobGateParams>,
    },
    Template {
        template_path: String,
        #[serde(default)]
        params: TemplateParams,
        #[serde(default)]
        gate: Option<BlobGateParams>,
    },
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig::Contour {
            params: ContourParams::default(),
            gate: None,
        }
    }
}

impl DetectorConfig {
    /// Instantiate the strategy, loading any resource it needs.
    pub fn build(&self) -> Result<Box<dyn Detector>, ConfigError> {
        match self {
            DetectorConfig::Contour { params, gate } => {
                Ok(gated(ContourDetector::new(params.clone()), gate))
            }
            DetectorConfig::Template {
                template_path,
                params,
                gate,
            } => {
                let det = TemplateDetector::from_path(template_path, params.clone()).map_err(
                    |source| ConfigError::Template {
                        path: template_path.clone(),
                        source,
                    },
                )?;
                Ok(gated(det, gate))
            }
        }
    }
}

fn gated<D: Detector + 'static>(det: D, gate: &Option<BlobGateParams>) -> Box<dyn Detector> {
    match gate {
        Some(g) => Box::new(BlobGate::new(det, g.clone())),
        None => Box::new(det),
    }
}

fn default_frames_dir() -> String {
    "frames".to_string()
}

/// Everything a tracking run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_frames_dir")]
    pub frames_dir: String,
    /// Directory for annotated frames; none are written when absent.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub time_log: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub tracker: TrackerParams,
    #[serde(default)]
    pub kalman: KalmanParams,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frames_dir: default_frames_dir(),
            output_dir: Some("output".to_string()),
            time_log: None,
            report_path: None,
            detector: DetectorConfig::default(),
            tracker: TrackerParams::default(),
            kalman: KalmanParams::default(),
        }
    }
}

impl TrackerConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn frames_dir(&self) -> PathBuf {
        PathBuf::from(&self.frames_dir)
    }

    pub fn build_detector(&self) -> Result<Box<dyn Detector>, ConfigError> {
        self.detector.build()
    }

    /// Detector, motion model and loop parameters wired together.
    pub fn build_tracker(&self) -> Result<Tracker<Box<dyn Detector>>, ConfigError> {
        let detector = self.build_detector()?;
        let motion = ConstantVelocityKalman::new(self.kalman)?;
        Ok(Tracker::new(detector, motion, self.tracker.clone()))
    }
}

/// Machine-readable record of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub config: TrackerConfig,
    pub detector: String,
    pub frames: Vec<FrameEntry>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let cfg: TrackerConfig = serde_json::from_str(r#"{"frames_dir": "img/video_01"}"#).unwrap();
        assert_eq!(cfg.frames_dir, "img/video_01");
        assert_eq!(cfg.detector, DetectorConfig::default());
        assert_eq!(cfg.tracker.search_radius, 40);
        assert_eq!(cfg.tracker.max_coasting_frames, Some(8));
        assert_eq!(cfg.kalman, KalmanParams::default());
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn tagged_detector_config() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{
                "detector": {
                    "kind": "template",
                    "template_path": "drone.png",
                    "params": {"threshold": 0.4},
                    "gate": {"threshold": 100}
                },
                "tracker": {"search_radius": 60, "max_coasting_frames": null}
            }"#,
        )
        .unwrap();
        match &cfg.detector {
            DetectorConfig::Template {
                template_path,
                params,
                gate,
            } => {
                assert_eq!(template_path, "drone.png");
                assert_eq!(params.threshold, 0.4);
                let gate = gate.as_ref().expect("gate");
                assert_eq!(gate.threshold, 100);
                assert_eq!(gate.close_kernel, 5);
            }
            other => panic!("unexpected detector {other:?}"),
        }
        assert_eq!(cfg.tracker.search_radius, 60);
        assert_eq!(cfg.tracker.max_coasting_frames, None);
    }

    #[test]
    fn write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        let cfg = TrackerConfig {
            detector: DetectorConfig::Contour {
                params: ContourParams::default(),
                gate: Some(BlobGateParams::default()),
            },
            time_log: Some("out/time_log.txt".to_string()),
            ..TrackerConfig::default()
        };
        cfg.write_json(&path).unwrap();
        assert_eq!(TrackerConfig::load_json(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_template_is_fatal() {
        let cfg = TrackerConfig {
            detector: DetectorConfig::Template {
                template_path: "/nonexistent/drone.png".to_string(),
                params: TemplateParams::default(),
                gate: None,
            },
            ..TrackerConfig::default()
        };
        assert!(matches!(
            cfg.build_tracker(),
            Err(ConfigError::Template { .. })
        ));
    }

    #[test]
    fn invalid_kalman_noise_is_fatal() {
        let cfg = TrackerConfig {
            kalman: KalmanParams {
                measurement_noise: -1.0,
                ..KalmanParams::default()
            },
            ..TrackerConfig::default()
        };
        assert!(matches!(cfg.build_tracker(), Err(ConfigError::Kalman(_))));
    }

    #[test]
    fn contour_config_builds_named_detector() {
        let det = TrackerConfig::default().build_detector().unwrap();
        assert_eq!(det.name(), "contour");
    }
}
