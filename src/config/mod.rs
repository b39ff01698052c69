// src/config/mod.rs
use crate::error::{IemError, Result};
use crate::evaluation::sweep::SweepConfig;
use crate::model::IemParams;
use crate::synthetic::receptive_fields::RfConfig;
use crate::synthetic::trials::TrialConfig;
use crate::synthetic::{FeatureAxis, LabelMode};
use crate::visualization::VisualizationConfig;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub verbose: bool,
    /// Number of bins the synthetic feature axis is split into.
    pub feature_resolution: usize,
    pub model: IemParams,
    pub voxels: RfConfig,
    pub train: TrialConfig,
    pub test: TrialConfig,
    pub output: OutputConfig,
    pub sweep: Option<SweepConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            verbose: false,
            feature_resolution: 360,
            model: IemParams::default(),
            voxels: RfConfig::default(),
            train: TrialConfig::default(),
            test: TrialConfig {
                n_trials: 100,
                label_mode: LabelMode::Random,
                trial_noise: 0.25,
            },
            output: OutputConfig::default(),
            sweep: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub write_csv: bool,
    pub log_dir: PathBuf,
    pub log_file: String,
    pub visualization: VisualizationConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            write_csv: true,
            log_dir: PathBuf::from("logs"),
            log_file: "iem_sim.log".to_string(),
            visualization: VisualizationConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Feature axis the synthetic data lives on, spanning the model's range.
    pub fn feature_axis(&self) -> Result<FeatureAxis> {
        FeatureAxis::new(
            self.model.range_start,
            self.model.range_stop,
            self.feature_resolution,
        )
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.feature_axis()?;
        if self.voxels.n_voxels == 0 {
            return Err(IemError::Config("voxels.n_voxels must be at least 1".to_string()));
        }
        if self.train.n_trials == 0 {
            return Err(IemError::Config(
                "train.n_trials must be at least 1".to_string(),
            ));
        }
        // The score compares predictions against the spread of the test labels.
        if self.test.n_trials < 2 {
            return Err(IemError::Config(format!(
                "test.n_trials must be at least 2 for the score to be defined, got {}",
                self.test.n_trials
            )));
        }
        if self.feature_resolution < 2 {
            return Err(IemError::Config(format!(
                "feature_resolution must be at least 2 so test labels can differ, got {}",
                self.feature_resolution
            )));
        }
        if let Some(sweep) = &self.sweep {
            sweep.validate()?;
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| IemError::Config(format!("Failed to read config file: {}", e)))?;

    let config: SimulationConfig = serde_yaml::from_str(&config_str)
        .map_err(|e| IemError::Config(format!("Failed to parse config file: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(config: &SimulationConfig, path: P) -> Result<()> {
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| IemError::Config(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, yaml)
        .map_err(|e| IemError::Config(format!("Failed to write config file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::sweep::SweepParameter;
    use crate::model::StimulusMode;
    use crate::synthetic::TuningMode;

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = SimulationConfig::default();
        config.seed = 1234;
        config.voxels.tuning_mode = TuningMode::Random;
        config.model.stimulus_resolution = Some(10.0);
        config.sweep = Some(SweepConfig {
            parameter: SweepParameter::TrialNoise,
            values: vec![0.1, 0.5],
            repetitions: 2,
        });

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded.seed, 1234);
        assert_eq!(loaded.voxels.tuning_mode, TuningMode::Random);
        assert_eq!(loaded.model, config.model);
        assert_eq!(loaded.sweep.unwrap().values, vec![0.1, 0.5]);
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() {
        let yaml = "
seed: 9
model:
  stimulus_mode: halfcircular
  range_stop: 180.0
  channel_density: 180
feature_resolution: 180
test:
  n_trials: 20
";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.model.stimulus_mode, StimulusMode::Halfcircular);
        assert_eq!(config.model.n_channels, 6);
        assert_eq!(config.test.n_trials, 20);
        assert_eq!(config.test.trial_noise, 0.25);
        assert_eq!(config.voxels.n_voxels, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_rejects_inconsistent_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "model:\n  stimulus_mode: halfcircular\n").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn single_test_trial_is_rejected() {
        let mut config = SimulationConfig::default();
        config.test.n_trials = 1;
        assert!(matches!(config.validate(), Err(IemError::Config(_))));

        config.test.n_trials = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn single_bin_axis_is_rejected() {
        let mut config = SimulationConfig::default();
        config.feature_resolution = 1;
        assert!(matches!(config.validate(), Err(IemError::Config(_))));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        assert!(matches!(
            load_config("/nonexistent/iem.yaml"),
            Err(IemError::Config(_))
        ));
    }
}
