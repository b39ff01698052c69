// src/evaluation/mod.rs

pub mod sweep;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::model::iem::InvertedEncoding1D;
use crate::model::circular::wrap_difference;
use crate::model::StimulusMode;
use crate::synthetic::receptive_fields::{circular_shift, generate_voxel_rfs, VoxelRfs};
use crate::synthetic::trials::{generate_trial_labels, generate_voxel_data};
use crate::synthetic::FeatureAxis;

use nalgebra::DMatrix;
use rand::Rng;
use std::time::Instant;

/// Everything one train/test pass produces.
pub struct Evaluation {
    /// Reconstructed response curves, domain points x test trials.
    pub reconstructions: DMatrix<f64>,
    pub predictions: Vec<f64>,
    pub score: f64,
    pub test_labels: Vec<f64>,
    pub voxel_rfs: VoxelRfs,
    /// Axis the synthetic RFs and labels live on.
    pub feature_axis: FeatureAxis,
    pub channel_domain: Vec<f64>,
    pub channels: DMatrix<f64>,
    pub stimulus_mode: StimulusMode,
}

impl Evaluation {
    /// Mean absolute prediction error, wrapped for circular topologies.
    pub fn mean_absolute_error(&self, period: Option<f64>) -> f64 {
        if self.test_labels.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .predictions
            .iter()
            .zip(self.test_labels.iter())
            .map(|(&p, &l)| match period {
                Some(period) => wrap_difference(p, l, period).abs(),
                None => (p - l).abs(),
            })
            .sum();
        total / self.test_labels.len() as f64
    }
}

/// Generates RFs and training data, fits the model, generates test data from
/// the same RFs, and reconstructs and scores the test trials.
pub fn train_and_test<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<Evaluation> {
    config.validate()?;
    let axis = config.feature_axis()?;

    let start = Instant::now();
    let voxel_rfs = generate_voxel_rfs(&config.voxels, &axis, rng)?;

    let train_labels =
        generate_trial_labels(config.train.n_trials, &axis, config.train.label_mode, rng)?;
    let train_data =
        generate_voxel_data(&voxel_rfs, &train_labels, &axis, config.train.trial_noise, rng)?;
    if config.verbose {
        println!("data generation took: {:?}", start.elapsed());
    }

    let start = Instant::now();
    let mut model = InvertedEncoding1D::new(config.model.clone())?;
    model.fit(&train_data.transpose(), &train_labels)?;
    if config.verbose {
        println!("fit took: {:?}", start.elapsed());
    }

    let test_labels =
        generate_trial_labels(config.test.n_trials, &axis, config.test.label_mode, rng)?;
    let test_data =
        generate_voxel_data(&voxel_rfs, &test_labels, &axis, config.test.trial_noise, rng)?
            .transpose();

    let start = Instant::now();
    let reconstructions = model.predict_feature_responses(&test_data)?;
    let predictions = model.predict(&test_data)?;
    let score = model.score(&test_data, &test_labels)?;
    if config.verbose {
        println!("reconstruction and scoring took: {:?}", start.elapsed());
    }

    Ok(Evaluation {
        reconstructions,
        predictions,
        score,
        test_labels,
        voxel_rfs,
        feature_axis: axis,
        channel_domain: model.channel_domain().to_vec(),
        channels: model.channels().clone(),
        stimulus_mode: config.model.stimulus_mode,
    })
}

/// Shifts each reconstruction so its true label lands on the middle of the
/// domain and averages across trials.
///
/// Circular topologies rotate the curves. Linear curves are shifted without
/// wrapping, and each point averages only the trials that reach it; points no
/// trial reaches stay at zero.
pub fn centered_reconstruction(evaluation: &Evaluation) -> Vec<f64> {
    let domain = &evaluation.channel_domain;
    let n_points = domain.len();
    let mut mean = vec![0.0; n_points];
    let n_trials = evaluation.reconstructions.ncols();
    if n_points == 0 || n_trials == 0 {
        return mean;
    }

    let centre = (n_points / 2) as isize;
    let circular = evaluation.stimulus_mode.is_circular();
    let mut counts = vec![0usize; n_points];
    for (trial, column) in evaluation.reconstructions.column_iter().enumerate() {
        let label_idx = nearest_index(domain, evaluation.test_labels[trial]) as isize;
        let shift = centre - label_idx;
        if circular {
            let curve: Vec<f64> = column.iter().cloned().collect();
            for (acc, value) in mean.iter_mut().zip(circular_shift(&curve, shift)) {
                *acc += value;
            }
            counts.iter_mut().for_each(|c| *c += 1);
        } else {
            for (i, &value) in column.iter().enumerate() {
                let target = i as isize + shift;
                if target >= 0 && (target as usize) < n_points {
                    mean[target as usize] += value;
                    counts[target as usize] += 1;
                }
            }
        }
    }
    for (acc, &count) in mean.iter_mut().zip(counts.iter()) {
        if count > 0 {
            *acc /= count as f64;
        }
    }
    mean
}

fn nearest_index(domain: &[f64], value: f64) -> usize {
    domain
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (*a - value)
                .abs()
                .partial_cmp(&(*b - value).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IemError;
    use crate::synthetic::LabelMode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn quiet_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.train.trial_noise = 0.0;
        config.test.trial_noise = 0.0;
        config.test.n_trials = 24;
        config.test.label_mode = LabelMode::EvenlySpaced;
        config
    }

    #[test]
    fn returns_one_reconstruction_per_test_trial() {
        let mut rng = StdRng::seed_from_u64(21);
        let evaluation = train_and_test(&quiet_config(), &mut rng).unwrap();

        assert_eq!(evaluation.reconstructions.shape(), (360, 24));
        assert_eq!(evaluation.predictions.len(), 24);
        assert_eq!(evaluation.test_labels.len(), 24);
        assert_eq!(evaluation.channel_domain.len(), 360);
        assert_eq!(evaluation.voxel_rfs.n_voxels(), 100);
    }

    #[test]
    fn noise_free_run_scores_high() {
        let mut rng = StdRng::seed_from_u64(22);
        let evaluation = train_and_test(&quiet_config(), &mut rng).unwrap();
        assert!(evaluation.score > 0.9, "score {}", evaluation.score);
        assert!(evaluation.mean_absolute_error(Some(360.0)) < 15.0);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let config = SimulationConfig::default();
        let a = train_and_test(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = train_and_test(&config, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.predictions, b.predictions);
        assert_eq!(a.score, b.score);
    }

    #[test]
    fn single_test_trial_config_fails_before_fitting() {
        let mut config = quiet_config();
        config.test.n_trials = 1;
        let result = train_and_test(&config, &mut StdRng::seed_from_u64(24));
        assert!(matches!(result, Err(IemError::Config(_))));
    }

    #[test]
    fn linear_centering_does_not_wrap() {
        let evaluation = Evaluation {
            reconstructions: DMatrix::from_column_slice(5, 1, &[9.0, 0.0, 0.0, 1.0, 0.0]),
            predictions: vec![3.0],
            score: 1.0,
            test_labels: vec![3.0],
            voxel_rfs: VoxelRfs {
                tuning: Vec::new(),
                rfs: DMatrix::zeros(0, 5),
            },
            feature_axis: FeatureAxis::new(0.0, 5.0, 5).unwrap(),
            channel_domain: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            channels: DMatrix::zeros(2, 5),
            stimulus_mode: StimulusMode::Linear,
        };
        // Label 3 moves to index 2; the value at 0 falls off the left edge.
        assert_eq!(
            centered_reconstruction(&evaluation),
            vec![0.0, 0.0, 1.0, 0.0, 0.0]
        );

        let circular = Evaluation {
            stimulus_mode: StimulusMode::Circular,
            ..evaluation
        };
        assert_eq!(
            centered_reconstruction(&circular),
            vec![0.0, 0.0, 1.0, 0.0, 9.0]
        );
    }

    #[test]
    fn centered_reconstruction_peaks_near_middle() {
        let mut rng = StdRng::seed_from_u64(23);
        let evaluation = train_and_test(&quiet_config(), &mut rng).unwrap();
        let curve = centered_reconstruction(&evaluation);
        let peak = curve
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(idx, _)| idx)
            .unwrap();
        assert!((peak as isize - 180).abs() <= 15, "peak at {}", peak);
    }
}
