use super::receptive_fields::VoxelRfs;
use super::{FeatureAxis, LabelMode};
use crate::error::{IemError, Result};

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TrialConfig {
    pub n_trials: usize,
    pub label_mode: LabelMode,
    /// Noise amplitude as a fraction of the peak noise-free response.
    pub trial_noise: f64,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            n_trials: 200,
            label_mode: LabelMode::Random,
            trial_noise: 0.25,
        }
    }
}

/// Stimulus labels for `n_trials` trials, snapped to the bin grid.
/// Evenly spaced labels cycle through the axis in `n_trials` steps.
pub fn generate_trial_labels<R: Rng + ?Sized>(
    n_trials: usize,
    axis: &FeatureAxis,
    mode: LabelMode,
    rng: &mut R,
) -> Result<Vec<f64>> {
    match mode {
        LabelMode::EvenlySpaced => (0..n_trials)
            .map(|k| axis.snap(axis.range_start + k as f64 * axis.width() / n_trials as f64))
            .collect(),
        LabelMode::Random => (0..n_trials)
            .map(|_| axis.value_of(rng.gen_range(0..axis.resolution)))
            .map(Ok)
            .collect(),
    }
}

/// Builds the voxels x trials response matrix for `labels`.
///
/// Each column selects the RF column of its label's bin through a one-hot
/// matrix, then uniform noise scaled by `trial_noise * max(response)` is added.
pub fn generate_voxel_data<R: Rng + ?Sized>(
    voxel_rfs: &VoxelRfs,
    labels: &[f64],
    axis: &FeatureAxis,
    trial_noise: f64,
    rng: &mut R,
) -> Result<DMatrix<f64>> {
    if voxel_rfs.n_bins() != axis.resolution {
        return Err(IemError::ShapeMismatch(format!(
            "RFs have {} bins but the feature axis has {}",
            voxel_rfs.n_bins(),
            axis.resolution
        )));
    }
    if !(trial_noise >= 0.0) {
        return Err(IemError::InvalidParameter(format!(
            "trial_noise must be non-negative, got {}",
            trial_noise
        )));
    }

    let mut one_hot = DMatrix::<f64>::zeros(axis.resolution, labels.len());
    for (trial, &label) in labels.iter().enumerate() {
        one_hot[(axis.bin_of(label)?, trial)] = 1.0;
    }

    let mut voxel_data = &voxel_rfs.rfs * one_hot;

    if trial_noise > 0.0 && !voxel_data.is_empty() {
        let peak = voxel_data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let scale = trial_noise * peak;
        for value in voxel_data.iter_mut() {
            *value += rng.gen::<f64>() * scale;
        }
    }

    Ok(voxel_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::receptive_fields::{generate_voxel_rfs, RfConfig};
    use crate::synthetic::TuningMode;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn circle() -> FeatureAxis {
        FeatureAxis::new(0.0, 360.0, 360).unwrap()
    }

    #[test]
    fn noise_free_trials_select_rf_columns() {
        let mut rng = StdRng::seed_from_u64(10);
        let axis = circle();
        let config = RfConfig {
            n_voxels: 20,
            tuning_mode: TuningMode::Random,
            rf_noise: 0.1,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        let labels = [0.0, 45.0, 100.0, 359.0];
        let data = generate_voxel_data(&rfs, &labels, &axis, 0.0, &mut rng).unwrap();

        assert_eq!(data.shape(), (20, 4));
        for (trial, &label) in labels.iter().enumerate() {
            let bin = axis.bin_of(label).unwrap();
            assert_eq!(data.column(trial), rfs.rfs.column(bin));
        }
    }

    #[test]
    fn voxel_responds_maximally_at_its_preference() {
        let mut rng = StdRng::seed_from_u64(11);
        let axis = circle();
        let config = RfConfig {
            n_voxels: 360,
            tuning_mode: TuningMode::EvenlySpaced,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        assert_abs_diff_eq!(rfs.tuning[100], 100.0);

        let data = generate_voxel_data(&rfs, &[100.0], &axis, 0.0, &mut rng).unwrap();
        assert_abs_diff_eq!(data[(100, 0)], 1.0, epsilon = 1e-12);
        let strongest = data
            .column(0)
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_abs_diff_eq!(data[(100, 0)], strongest);
    }

    #[test]
    fn fractional_bin_labels_select_their_own_column() {
        let mut rng = StdRng::seed_from_u64(16);
        let axis = FeatureAxis::new(0.0, 360.0, 7).unwrap();
        let config = RfConfig {
            n_voxels: 7,
            rf_width: 1.0,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        let labels = generate_trial_labels(7, &axis, LabelMode::EvenlySpaced, &mut rng).unwrap();
        let data = generate_voxel_data(&rfs, &labels, &axis, 0.0, &mut rng).unwrap();
        for bin in 0..7 {
            assert_abs_diff_eq!(labels[bin], axis.value_of(bin), epsilon = 1e-9);
            assert_eq!(data.column(bin), rfs.rfs.column(bin));
        }
    }

    #[test]
    fn noise_is_bounded_by_fraction_of_peak() {
        let mut rng = StdRng::seed_from_u64(12);
        let axis = circle();
        let rfs = generate_voxel_rfs(&RfConfig::default(), &axis, &mut rng).unwrap();
        let labels = generate_trial_labels(50, &axis, LabelMode::Random, &mut rng).unwrap();
        let clean = generate_voxel_data(&rfs, &labels, &axis, 0.0, &mut rng).unwrap();
        let noisy = generate_voxel_data(&rfs, &labels, &axis, 0.25, &mut rng).unwrap();

        for (c, n) in clean.iter().zip(noisy.iter()) {
            assert!(*n >= *c);
            assert!(*n - *c < 0.25 + 1e-12);
        }
    }

    #[test]
    fn offset_range_indexes_from_range_start() {
        let mut rng = StdRng::seed_from_u64(13);
        let axis = FeatureAxis::new(-90.0, 90.0, 180).unwrap();
        let config = RfConfig {
            n_voxels: 6,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        let data = generate_voxel_data(&rfs, &[-90.0, 0.0], &axis, 0.0, &mut rng).unwrap();
        assert_eq!(data.column(0), rfs.rfs.column(0));
        assert_eq!(data.column(1), rfs.rfs.column(90));
    }

    #[test]
    fn out_of_range_label_is_an_error() {
        let mut rng = StdRng::seed_from_u64(14);
        let axis = circle();
        let rfs = generate_voxel_rfs(&RfConfig::default(), &axis, &mut rng).unwrap();
        let result = generate_voxel_data(&rfs, &[10.0, 400.0], &axis, 0.0, &mut rng);
        assert!(matches!(result, Err(IemError::LabelOutOfRange { .. })));
    }

    #[test]
    fn evenly_spaced_labels_cover_the_axis() {
        let mut rng = StdRng::seed_from_u64(15);
        let labels =
            generate_trial_labels(8, &circle(), LabelMode::EvenlySpaced, &mut rng).unwrap();
        assert_eq!(
            labels,
            vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]
        );
    }
}
