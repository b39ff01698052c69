use super::{FeatureAxis, TuningMode};
use crate::error::{IemError, Result};

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RfConfig {
    pub n_voxels: usize,
    pub tuning_mode: TuningMode,
    /// Magnitude of the uniform noise mixed into each RF before normalization.
    pub rf_noise: f64,
    /// Standard deviation of the Gaussian kernel, in bins.
    pub rf_width: f64,
}

impl Default for RfConfig {
    fn default() -> Self {
        Self {
            n_voxels: 100,
            tuning_mode: TuningMode::EvenlySpaced,
            rf_noise: 0.0,
            rf_width: 15.0,
        }
    }
}

/// A population of voxel receptive fields over a feature axis.
#[derive(Debug, Clone)]
pub struct VoxelRfs {
    /// Preferred feature value of each voxel.
    pub tuning: Vec<f64>,
    /// voxels x bins, each row peaking at 1.0.
    pub rfs: DMatrix<f64>,
}

impl VoxelRfs {
    pub fn n_voxels(&self) -> usize {
        self.rfs.nrows()
    }

    pub fn n_bins(&self) -> usize {
        self.rfs.ncols()
    }
}

/// Symmetric Gaussian window of length `m`, centred on `(m - 1) / 2`.
pub fn gaussian_window(m: usize, std: f64) -> Vec<f64> {
    let centre = (m as f64 - 1.0) / 2.0;
    (0..m)
        .map(|n| {
            let z = (n as f64 - centre) / std;
            (-0.5 * z * z).exp()
        })
        .collect()
}

/// Rotates `curve` right by `shift` positions, wrapping around the end.
/// Negative shifts rotate left.
pub fn circular_shift(curve: &[f64], shift: isize) -> Vec<f64> {
    let len = curve.len();
    if len == 0 {
        return Vec::new();
    }
    let offset = shift.rem_euclid(len as isize) as usize;
    let mut shifted = vec![0.0; len];
    for (i, &value) in curve.iter().enumerate() {
        shifted[(i + offset) % len] = value;
    }
    shifted
}

fn preferred_values<R: Rng + ?Sized>(
    n_voxels: usize,
    axis: &FeatureAxis,
    mode: TuningMode,
    rng: &mut R,
) -> Result<Vec<f64>> {
    match mode {
        TuningMode::EvenlySpaced => (0..n_voxels)
            .map(|k| axis.snap(axis.range_start + k as f64 * axis.width() / n_voxels as f64))
            .collect(),
        TuningMode::Random => (0..n_voxels)
            .map(|_| axis.snap(axis.range_start + rng.gen::<f64>() * axis.width()))
            .collect(),
    }
}

pub fn generate_voxel_rfs<R: Rng + ?Sized>(
    config: &RfConfig,
    axis: &FeatureAxis,
    rng: &mut R,
) -> Result<VoxelRfs> {
    if config.n_voxels == 0 {
        return Err(IemError::InvalidParameter(
            "n_voxels must be at least 1".to_string(),
        ));
    }
    if !(config.rf_width > 0.0) {
        return Err(IemError::InvalidParameter(format!(
            "rf_width must be positive, got {}",
            config.rf_width
        )));
    }
    if !(config.rf_noise >= 0.0) {
        return Err(IemError::InvalidParameter(format!(
            "rf_noise must be non-negative, got {}",
            config.rf_noise
        )));
    }

    let resolution = axis.resolution;
    let tuning = preferred_values(config.n_voxels, axis, config.tuning_mode, rng)?;
    let kernel = gaussian_window(resolution, config.rf_width);
    let peak_index = ((resolution - 1) / 2) as isize;

    let mut rfs = DMatrix::<f64>::zeros(config.n_voxels, resolution);
    for (voxel, &preferred) in tuning.iter().enumerate() {
        let bin = axis.bin_of(preferred)? as isize;
        let row = circular_shift(&kernel, bin - peak_index);
        for (j, value) in row.into_iter().enumerate() {
            rfs[(voxel, j)] = value;
        }
    }

    if config.rf_noise > 0.0 {
        for value in rfs.iter_mut() {
            *value += rng.gen::<f64>() * config.rf_noise;
        }
    }

    for mut row in rfs.row_iter_mut() {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !(max > 0.0 && max.is_finite()) {
            return Err(IemError::InvalidParameter(format!(
                "rf_width {} gives a receptive field with no positive response over {} bins",
                config.rf_width, resolution
            )));
        }
        row /= max;
    }

    Ok(VoxelRfs { tuning, rfs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn circle() -> FeatureAxis {
        FeatureAxis::new(0.0, 360.0, 360).unwrap()
    }

    fn row_max(rfs: &VoxelRfs, voxel: usize) -> f64 {
        rfs.rfs
            .row(voxel)
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn noise_free_rows_peak_at_one() {
        let mut rng = StdRng::seed_from_u64(1);
        for n_voxels in [1, 2, 7, 50] {
            for mode in [TuningMode::Random, TuningMode::EvenlySpaced] {
                let config = RfConfig {
                    n_voxels,
                    tuning_mode: mode,
                    ..RfConfig::default()
                };
                let rfs = generate_voxel_rfs(&config, &circle(), &mut rng).unwrap();
                assert_eq!(rfs.rfs.shape(), (n_voxels, 360));
                for voxel in 0..n_voxels {
                    assert_abs_diff_eq!(row_max(&rfs, voxel), 1.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn noisy_rows_are_still_normalized() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = RfConfig {
            n_voxels: 10,
            rf_noise: 0.5,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &circle(), &mut rng).unwrap();
        for voxel in 0..10 {
            assert_abs_diff_eq!(row_max(&rfs, voxel), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn full_period_shift_is_identity() {
        let kernel = gaussian_window(360, 15.0);
        assert_eq!(circular_shift(&kernel, 360), kernel);
        assert_eq!(circular_shift(&kernel, -720), kernel);
        assert_eq!(circular_shift(&circular_shift(&kernel, 37), -37), kernel);
    }

    #[test]
    fn shift_wraps_around_the_axis() {
        let curve = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(circular_shift(&curve, 1), vec![4.0, 1.0, 2.0, 3.0]);
        assert_eq!(circular_shift(&curve, -1), vec![2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn evenly_spaced_tuning_excludes_stop() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = RfConfig {
            n_voxels: 5,
            tuning_mode: TuningMode::EvenlySpaced,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &circle(), &mut rng).unwrap();
        let expected = [0.0, 72.0, 144.0, 216.0, 288.0];
        for (value, expected) in rfs.tuning.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(*value, *expected, epsilon = 1.0);
        }
        assert!(rfs.tuning.iter().all(|&v| v < 360.0));
    }

    #[test]
    fn rf_peaks_on_preferred_bin() {
        let mut rng = StdRng::seed_from_u64(4);
        let config = RfConfig {
            n_voxels: 12,
            tuning_mode: TuningMode::Random,
            ..RfConfig::default()
        };
        let axis = circle();
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        for (voxel, &preferred) in rfs.tuning.iter().enumerate() {
            let bin = axis.bin_of(preferred).unwrap();
            assert_abs_diff_eq!(rfs.rfs[(voxel, bin)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn evenly_spaced_tuning_on_fractional_bins() {
        let mut rng = StdRng::seed_from_u64(6);
        let axis = FeatureAxis::new(0.0, 360.0, 7).unwrap();
        let config = RfConfig {
            n_voxels: 7,
            tuning_mode: TuningMode::EvenlySpaced,
            rf_width: 1.0,
            ..RfConfig::default()
        };
        let rfs = generate_voxel_rfs(&config, &axis, &mut rng).unwrap();
        for voxel in 0..7 {
            assert_abs_diff_eq!(rfs.tuning[voxel], axis.value_of(voxel), epsilon = 1e-9);
            assert_abs_diff_eq!(rfs.rfs[(voxel, voxel)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn rejects_width_that_underflows_the_kernel() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = RfConfig {
            n_voxels: 3,
            rf_width: 0.01,
            ..RfConfig::default()
        };
        assert!(matches!(
            generate_voxel_rfs(&config, &circle(), &mut rng),
            Err(IemError::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_zero_voxels() {
        let mut rng = StdRng::seed_from_u64(5);
        let config = RfConfig {
            n_voxels: 0,
            ..RfConfig::default()
        };
        assert!(matches!(
            generate_voxel_rfs(&config, &circle(), &mut rng),
            Err(IemError::InvalidParameter(_))
        ));
    }
}
