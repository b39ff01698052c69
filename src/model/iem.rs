use super::channels::ChannelBasis;
use super::circular::{circ_dist, circ_mean, to_angle};
use super::{IemParams, StimulusMode};
use crate::error::{IemError, Result};

use nalgebra::DMatrix;

/// Singular values below this are treated as zero by the pseudo-inverse.
const PINV_EPS: f64 = 1e-10;

// -----------------------------------------------------------------------------
// INVERTED ENCODING MODEL
// -----------------------------------------------------------------------------

struct FittedWeights {
    /// voxels x channels
    weights: DMatrix<f64>,
    /// channels x voxels
    inverse: DMatrix<f64>,
}

/// One-dimensional inverted encoding model.
///
/// Observations are rows throughout: `x` is trials x voxels and `y` holds one
/// feature label per trial.
pub struct InvertedEncoding1D {
    params: IemParams,
    basis: ChannelBasis,
    fitted: Option<FittedWeights>,
}

impl InvertedEncoding1D {
    pub fn new(params: IemParams) -> Result<Self> {
        params.validate()?;
        let basis = ChannelBasis::new(&params);
        Ok(Self {
            params,
            basis,
            fitted: None,
        })
    }

    pub fn params(&self) -> &IemParams {
        &self.params
    }

    /// channels x domain points.
    pub fn channels(&self) -> &DMatrix<f64> {
        &self.basis.channels
    }

    pub fn channel_domain(&self) -> &[f64] {
        &self.basis.domain
    }

    pub fn channel_centers(&self) -> &[f64] {
        &self.basis.centers
    }

    /// Estimated voxel x channel weights, available after `fit`.
    pub fn weights(&self) -> Option<&DMatrix<f64>> {
        self.fitted.as_ref().map(|f| &f.weights)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Estimates voxel weights by least squares, `W = X' pinv(C')`, where `C`
    /// holds the basis activation each training label predicts.
    pub fn fit(&mut self, x: &DMatrix<f64>, y: &[f64]) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(IemError::ShapeMismatch(format!(
                "{} observations but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        if y.is_empty() || x.ncols() == 0 {
            return Err(IemError::InvalidParameter(
                "fit needs at least one observation and one voxel".to_string(),
            ));
        }
        self.check_labels(y)?;

        let activations = self.basis.trial_activations(y, &self.params);
        let activation_pinv = activations
            .transpose()
            .pseudo_inverse(PINV_EPS)
            .map_err(|e| IemError::Numerical(e.to_string()))?;

        let weights = x.transpose() * activation_pinv;
        let inverse = weights
            .clone()
            .pseudo_inverse(PINV_EPS)
            .map_err(|e| IemError::Numerical(e.to_string()))?;

        self.fitted = Some(FittedWeights { weights, inverse });
        Ok(())
    }

    /// Channel responses implied by each observation, channels x trials.
    pub fn predict_channel_responses(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let fitted = self.fitted.as_ref().ok_or(IemError::NotFitted)?;
        if x.ncols() != fitted.weights.nrows() {
            return Err(IemError::ShapeMismatch(format!(
                "model was fitted on {} voxels, got {}",
                fitted.weights.nrows(),
                x.ncols()
            )));
        }
        Ok(&fitted.inverse * x.transpose())
    }

    /// Reconstructed response curve over the channel domain for each
    /// observation, domain points x trials.
    pub fn predict_feature_responses(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        let channel_responses = self.predict_channel_responses(x)?;
        Ok(self.basis.channels.transpose() * channel_responses)
    }

    /// Point estimate per observation: the domain value where its
    /// reconstruction peaks.
    pub fn predict(&self, x: &DMatrix<f64>) -> Result<Vec<f64>> {
        let responses = self.predict_feature_responses(x)?;
        Ok(responses
            .column_iter()
            .map(|column| {
                let peak = column
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0);
                self.basis.domain[peak]
            })
            .collect())
    }

    /// Goodness of fit of the point predictions for `x` against `y`.
    pub fn score(&self, x: &DMatrix<f64>, y: &[f64]) -> Result<f64> {
        if x.nrows() != y.len() {
            return Err(IemError::ShapeMismatch(format!(
                "{} observations but {} labels",
                x.nrows(),
                y.len()
            )));
        }
        let predictions = self.predict(x)?;
        score_predictions(&predictions, y, &self.params)
    }

    fn check_labels(&self, y: &[f64]) -> Result<()> {
        let inclusive_stop = self.params.stimulus_mode == StimulusMode::Linear;
        for &label in y {
            let below_stop = if inclusive_stop {
                label <= self.params.range_stop
            } else {
                label < self.params.range_stop
            };
            if !(label >= self.params.range_start && below_stop) {
                return Err(IemError::LabelOutOfRange {
                    label,
                    range_start: self.params.range_start,
                    range_stop: self.params.range_stop,
                });
            }
        }
        Ok(())
    }
}

/// Coefficient of determination of `predictions` against `labels`.
///
/// Circular topologies measure residuals as angular distances on the full
/// circle and the total spread around the circular mean of the labels.
pub fn score_predictions(predictions: &[f64], labels: &[f64], params: &IemParams) -> Result<f64> {
    if predictions.len() != labels.len() {
        return Err(IemError::ShapeMismatch(format!(
            "{} predictions but {} labels",
            predictions.len(),
            labels.len()
        )));
    }

    let (ss_res, ss_tot) = if params.stimulus_mode.is_circular() {
        let angle = |v: f64| to_angle(v, params.range_start, params.width());
        let label_angles: Vec<f64> = labels.iter().map(|&v| angle(v)).collect();
        let mean = circ_mean(&label_angles);

        let ss_res = label_angles
            .iter()
            .zip(predictions.iter())
            .map(|(&l, &p)| circ_dist(l, angle(p)).powi(2))
            .sum::<f64>();
        let ss_tot = label_angles
            .iter()
            .map(|&l| circ_dist(l, mean).powi(2))
            .sum::<f64>();
        (ss_res, ss_tot)
    } else {
        let mean = labels.iter().sum::<f64>() / labels.len() as f64;
        let ss_res = labels
            .iter()
            .zip(predictions.iter())
            .map(|(&l, &p)| (l - p).powi(2))
            .sum::<f64>();
        let ss_tot = labels.iter().map(|&l| (l - mean).powi(2)).sum::<f64>();
        (ss_res, ss_tot)
    };

    if !(ss_tot > f64::EPSILON) {
        return Err(IemError::DegenerateScore);
    }
    Ok(1.0 - ss_res / ss_tot)
}
