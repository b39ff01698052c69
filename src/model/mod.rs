// src/model/mod.rs

pub mod channels;
pub mod circular;
pub mod iem;

use crate::error::{IemError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Topology of the stimulus feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusMode {
    /// Full circle, e.g. motion direction over 360 degrees.
    Circular,
    /// Half circle, e.g. orientation over 180 degrees.
    Halfcircular,
    /// Bounded line with no wrap-around.
    Linear,
}

impl StimulusMode {
    pub fn is_circular(&self) -> bool {
        matches!(self, StimulusMode::Circular | StimulusMode::Halfcircular)
    }
}

impl FromStr for StimulusMode {
    type Err = IemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "circular" => Ok(StimulusMode::Circular),
            "halfcircular" => Ok(StimulusMode::Halfcircular),
            "linear" => Ok(StimulusMode::Linear),
            other => Err(IemError::InvalidParameter(format!(
                "unknown stimulus mode '{}', expected circular, halfcircular or linear",
                other
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IemParams {
    pub n_channels: usize,
    /// Exponent applied to each channel's cosine, controls falloff.
    pub channel_exp: f64,
    pub stimulus_mode: StimulusMode,
    pub range_start: f64,
    pub range_stop: f64,
    /// Number of points the basis is evaluated on.
    pub channel_density: usize,
    /// Width of the stimulus boxcar. `None` selects the nearest domain point.
    pub stimulus_resolution: Option<f64>,
}

impl Default for IemParams {
    fn default() -> Self {
        Self {
            n_channels: 6,
            channel_exp: 5.0,
            stimulus_mode: StimulusMode::Circular,
            range_start: 0.0,
            range_stop: 360.0,
            channel_density: 360,
            stimulus_resolution: None,
        }
    }
}

impl IemParams {
    pub fn width(&self) -> f64 {
        self.range_stop - self.range_start
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_channels < 2 {
            return Err(IemError::InvalidParameter(format!(
                "n_channels must be at least 2, got {}",
                self.n_channels
            )));
        }
        if self.channel_density < self.n_channels {
            return Err(IemError::InvalidParameter(format!(
                "channel_density ({}) must be at least n_channels ({})",
                self.channel_density, self.n_channels
            )));
        }
        if !(self.range_stop > self.range_start) {
            return Err(IemError::InvalidParameter(format!(
                "range_stop ({}) must be greater than range_start ({})",
                self.range_stop, self.range_start
            )));
        }
        if !(self.channel_exp > 0.0) {
            return Err(IemError::InvalidParameter(format!(
                "channel_exp must be positive, got {}",
                self.channel_exp
            )));
        }

        let expected_width = match self.stimulus_mode {
            StimulusMode::Circular => Some(360.0),
            StimulusMode::Halfcircular => Some(180.0),
            StimulusMode::Linear => None,
        };
        if let Some(expected) = expected_width {
            if (self.width() - expected).abs() > 1e-9 {
                return Err(IemError::InvalidParameter(format!(
                    "{:?} stimuli need a range of {} units, got {}",
                    self.stimulus_mode,
                    expected,
                    self.width()
                )));
            }
        }

        if let Some(resolution) = self.stimulus_resolution {
            if !(resolution > 0.0 && resolution <= self.width()) {
                return Err(IemError::InvalidParameter(format!(
                    "stimulus_resolution must be in (0, {}], got {}",
                    self.width(),
                    resolution
                )));
            }
        }
        Ok(())
    }
}
