// src/visualization/mod.rs

pub mod export;
pub mod plotter;
pub mod terminal;
#[cfg(feature = "visualization")]
pub mod window;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct VisualizationConfig {
    pub terminal_plot: bool,
    /// Number of character rows used for a terminal curve.
    pub terminal_rows: usize,
    /// Opens the egui window when built with the `visualization` feature.
    pub window: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub plot_height: u32,
    /// Voxel RFs drawn in the window, evenly picked from the population.
    pub max_rfs_shown: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            terminal_plot: true,
            terminal_rows: 24,
            window: false,
            window_width: 1200,
            window_height: 800,
            plot_height: 220,
            max_rfs_shown: 8,
        }
    }
}
