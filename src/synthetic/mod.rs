// src/synthetic/mod.rs

pub mod receptive_fields;
pub mod trials;

use crate::error::{IemError, Result};
use serde::{Deserialize, Serialize};

// FEATURE AXIS ----------------------------------------------------------------

/// Slack, in bins, absorbed before flooring so bin starts map to their own bin.
const BIN_TOLERANCE: f64 = 1e-9;

/// Discretized feature domain `[range_start, range_stop)` split into
/// `resolution` equal bins. Bin `k` holds the values starting at
/// `range_start + k * bin_width()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureAxis {
    pub range_start: f64,
    pub range_stop: f64,
    pub resolution: usize,
}

impl FeatureAxis {
    pub fn new(range_start: f64, range_stop: f64, resolution: usize) -> Result<Self> {
        if !(range_stop > range_start) {
            return Err(IemError::InvalidParameter(format!(
                "range_stop ({}) must be greater than range_start ({})",
                range_stop, range_start
            )));
        }
        if resolution == 0 {
            return Err(IemError::InvalidParameter(
                "feature resolution must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            range_start,
            range_stop,
            resolution,
        })
    }

    pub fn width(&self) -> f64 {
        self.range_stop - self.range_start
    }

    pub fn bin_width(&self) -> f64 {
        self.width() / self.resolution as f64
    }

    pub fn value_of(&self, bin: usize) -> f64 {
        self.range_start + bin as f64 * self.bin_width()
    }

    pub fn values(&self) -> Vec<f64> {
        (0..self.resolution).map(|bin| self.value_of(bin)).collect()
    }

    /// Index of the bin holding `value`. Labels are offset by `range_start`
    /// so ranges that do not start at zero still index from bin 0.
    pub fn bin_of(&self, value: f64) -> Result<usize> {
        if !(value >= self.range_start && value < self.range_stop) {
            return Err(IemError::LabelOutOfRange {
                label: value,
                range_start: self.range_start,
                range_stop: self.range_stop,
            });
        }
        let position = (value - self.range_start) * self.resolution as f64 / self.width();
        let bin = (position + BIN_TOLERANCE).floor() as usize;
        Ok(bin.min(self.resolution - 1))
    }

    /// Value of the bin that holds `value`.
    pub fn snap(&self, value: f64) -> Result<f64> {
        self.bin_of(value).map(|bin| self.value_of(bin))
    }
}

// SELECTION MODES -------------------------------------------------------------

/// How voxels pick their preferred feature value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningMode {
    Random,
    EvenlySpaced,
}

/// How a trial sequence picks its stimulus labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    Random,
    EvenlySpaced,
}
