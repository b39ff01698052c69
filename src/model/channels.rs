use super::circular::wrap_difference;
use super::IemParams;

use nalgebra::DMatrix;
use std::f64::consts::PI;

/// Evenly spaced points from `start` to `stop`, with or without `stop`.
pub fn linspace(start: f64, stop: f64, n: usize, endpoint: bool) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let divisions = if endpoint { n - 1 } else { n } as f64;
            let step = (stop - start) / divisions;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

// CHANNEL BASIS ---------------------------------------------------------------

/// Channel tuning functions evaluated over the feature domain.
#[derive(Debug, Clone)]
pub struct ChannelBasis {
    pub domain: Vec<f64>,
    pub centers: Vec<f64>,
    /// channels x domain points.
    pub channels: DMatrix<f64>,
}

impl ChannelBasis {
    pub fn new(params: &IemParams) -> Self {
        let circular = params.stimulus_mode.is_circular();
        let domain = linspace(
            params.range_start,
            params.range_stop,
            params.channel_density,
            !circular,
        );
        let centers = linspace(
            params.range_start,
            params.range_stop,
            params.n_channels,
            !circular,
        );

        let channels = DMatrix::from_fn(centers.len(), domain.len(), |i, j| {
            channel_response(domain[j], centers[i], params)
        });

        ChannelBasis {
            domain,
            centers,
            channels,
        }
    }

    pub fn n_channels(&self) -> usize {
        self.channels.nrows()
    }

    /// Difference between two feature values, wrapped when the topology is circular.
    fn difference(&self, a: f64, b: f64, params: &IemParams) -> f64 {
        if params.stimulus_mode.is_circular() {
            wrap_difference(a, b, params.width())
        } else {
            a - b
        }
    }

    fn nearest_domain_index(&self, value: f64, params: &IemParams) -> usize {
        self.domain
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = self.difference(**a, value, params).abs();
                let db = self.difference(**b, value, params).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    /// Predicted channel activations for each label, trials x channels.
    pub fn trial_activations(&self, labels: &[f64], params: &IemParams) -> DMatrix<f64> {
        let mut activations = DMatrix::<f64>::zeros(labels.len(), self.n_channels());

        for (trial, &label) in labels.iter().enumerate() {
            let mut selected: Vec<usize> = match params.stimulus_resolution {
                Some(resolution) => self
                    .domain
                    .iter()
                    .enumerate()
                    .filter(|(_, x)| {
                        self.difference(**x, label, params).abs() <= resolution / 2.0
                    })
                    .map(|(idx, _)| idx)
                    .collect(),
                None => Vec::new(),
            };
            if selected.is_empty() {
                selected.push(self.nearest_domain_index(label, params));
            }

            let weight = 1.0 / selected.len() as f64;
            for &idx in &selected {
                for channel in 0..self.n_channels() {
                    activations[(trial, channel)] += weight * self.channels[(channel, idx)];
                }
            }
        }
        activations
    }
}

/// Response of the channel centred on `center` to feature value `x`.
///
/// `|cos(pi * d / width)|^exp`, where `d` wraps for circular topologies.
/// Linear channels are zero beyond half the range from their centre.
pub fn channel_response(x: f64, center: f64, params: &IemParams) -> f64 {
    let width = params.width();
    let d = if params.stimulus_mode.is_circular() {
        wrap_difference(x, center, width)
    } else {
        x - center
    };
    if d.abs() >= width / 2.0 {
        return 0.0;
    }
    (PI * d / width).cos().abs().powf(params.channel_exp)
}
