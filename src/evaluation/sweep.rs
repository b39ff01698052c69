use super::train_and_test;
use crate::config::SimulationConfig;
use crate::error::{IemError, Result};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Simulation setting varied across a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepParameter {
    TrialNoise,
    RfNoise,
    NVoxels,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SweepConfig {
    pub parameter: SweepParameter,
    pub values: Vec<f64>,
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,
}

fn default_repetitions() -> usize {
    5
}

impl SweepConfig {
    pub fn validate(&self) -> Result<()> {
        if self.values.is_empty() {
            return Err(IemError::Config("sweep.values must not be empty".to_string()));
        }
        if self.repetitions == 0 {
            return Err(IemError::Config(
                "sweep.repetitions must be at least 1".to_string(),
            ));
        }
        if self.parameter == SweepParameter::NVoxels
            && self.values.iter().any(|&v| !(v >= 1.0) || v.fract() != 0.0)
        {
            return Err(IemError::Config(
                "n_voxels sweep values must be positive integers".to_string(),
            ));
        }
        Ok(())
    }
}

/// Mean and spread of the score at one sweep value.
#[derive(Debug, Clone, Serialize)]
pub struct SweepPoint {
    pub value: f64,
    pub mean_score: f64,
    pub std_score: f64,
    pub repetitions: usize,
}

fn apply(base: &SimulationConfig, parameter: SweepParameter, value: f64) -> SimulationConfig {
    let mut config = base.clone();
    // Per-point timing lines would interleave across threads.
    config.verbose = false;
    match parameter {
        SweepParameter::TrialNoise => {
            config.train.trial_noise = value;
            config.test.trial_noise = value;
        }
        SweepParameter::RfNoise => config.voxels.rf_noise = value,
        SweepParameter::NVoxels => config.voxels.n_voxels = value as usize,
    }
    config
}

/// Runs `train_and_test` for every value and repetition of the sweep in
/// parallel. Run `i` is seeded with `config.seed + i`, so results do not
/// depend on scheduling.
pub fn run_sweep(config: &SimulationConfig, sweep: &SweepConfig) -> Result<Vec<SweepPoint>> {
    sweep.validate()?;

    let runs: Vec<(usize, usize)> = (0..sweep.values.len())
        .flat_map(|v| (0..sweep.repetitions).map(move |r| (v, r)))
        .collect();

    let scores: Vec<(usize, f64)> = runs
        .par_iter()
        .enumerate()
        .map(|(run_index, &(value_index, _))| {
            let point_config = apply(config, sweep.parameter, sweep.values[value_index]);
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(run_index as u64));
            train_and_test(&point_config, &mut rng).map(|e| (value_index, e.score))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(sweep
        .values
        .iter()
        .enumerate()
        .map(|(value_index, &value)| {
            let point_scores: Vec<f64> = scores
                .iter()
                .filter(|(idx, _)| *idx == value_index)
                .map(|(_, score)| *score)
                .collect();
            let n = point_scores.len() as f64;
            let mean = point_scores.iter().sum::<f64>() / n;
            let variance = point_scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
            SweepPoint {
                value,
                mean_score: mean,
                std_score: variance.sqrt(),
                repetitions: point_scores.len(),
            }
        })
        .collect())
}
