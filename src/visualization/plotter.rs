// src/visualization/plotter.rs

use super::VisualizationConfig;
use crate::evaluation::{centered_reconstruction, Evaluation};

/// A named (x, y) line ready to draw.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// Plot-ready view of one evaluation.
pub struct ReconstructionPlots {
    pub centered: Series,
    pub channels: Vec<Series>,
    pub voxel_rfs: Vec<Series>,
    /// (true label, prediction) per test trial.
    pub predictions: Vec<(f64, f64)>,
    pub score: f64,
}

impl ReconstructionPlots {
    pub fn new(evaluation: &Evaluation, config: &VisualizationConfig) -> Self {
        let domain = &evaluation.channel_domain;
        let half_width = match (domain.first(), domain.len()) {
            (Some(first), n) if n > 1 => domain[n / 2] - first,
            _ => 0.0,
        };

        // Centred curve is plotted against the offset from the true label.
        let centered_curve = centered_reconstruction(evaluation);
        let centered = Series {
            name: "mean centred reconstruction".to_string(),
            points: domain
                .iter()
                .zip(centered_curve.iter())
                .map(|(&x, &y)| (x - domain[0] - half_width, y))
                .collect(),
        };

        let channels = evaluation
            .channels
            .row_iter()
            .enumerate()
            .map(|(i, row)| Series {
                name: format!("channel {}", i),
                points: domain.iter().cloned().zip(row.iter().cloned()).collect(),
            })
            .collect();

        let n_voxels = evaluation.voxel_rfs.n_voxels();
        let shown = config.max_rfs_shown.min(n_voxels);
        let bin_values = evaluation.feature_axis.values();
        let voxel_rfs = (0..shown)
            .map(|k| {
                let voxel = k * n_voxels / shown.max(1);
                Series {
                    name: format!("voxel {} ({:.0})", voxel, evaluation.voxel_rfs.tuning[voxel]),
                    points: bin_values
                        .iter()
                        .cloned()
                        .zip(evaluation.voxel_rfs.rfs.row(voxel).iter().cloned())
                        .collect(),
                }
            })
            .collect();

        let predictions = evaluation
            .test_labels
            .iter()
            .cloned()
            .zip(evaluation.predictions.iter().cloned())
            .collect();

        Self {
            centered,
            channels,
            voxel_rfs,
            predictions,
            score: evaluation.score,
        }
    }
}
