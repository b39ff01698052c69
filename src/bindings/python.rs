use crate::error::IemError;
use crate::model::iem::InvertedEncoding1D;
use crate::model::IemParams;
use crate::synthetic::receptive_fields::{self, RfConfig, VoxelRfs};
use crate::synthetic::{trials, FeatureAxis, TuningMode};

use nalgebra::DMatrix;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

impl From<IemError> for PyErr {
    fn from(err: IemError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn to_matrix(rows: Vec<Vec<f64>>) -> PyResult<DMatrix<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, |r| r.len());
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(DMatrix::from_row_slice(n_rows, n_cols, &flat))
}

fn from_matrix(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    matrix
        .row_iter()
        .map(|row| row.iter().cloned().collect())
        .collect()
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[pyclass]
pub struct PyInvertedEncoding {
    model: InvertedEncoding1D,
}

#[pymethods]
impl PyInvertedEncoding {
    #[new]
    #[pyo3(signature = (
        n_channels = 6,
        channel_exp = 5.0,
        stimulus_mode = "circular",
        range_start = 0.0,
        range_stop = 360.0,
        channel_density = 360,
        stimulus_resolution = None
    ))]
    pub fn new(
        n_channels: usize,
        channel_exp: f64,
        stimulus_mode: &str,
        range_start: f64,
        range_stop: f64,
        channel_density: usize,
        stimulus_resolution: Option<f64>,
    ) -> PyResult<Self> {
        let params = IemParams {
            n_channels,
            channel_exp,
            stimulus_mode: stimulus_mode.parse()?,
            range_start,
            range_stop,
            channel_density,
            stimulus_resolution,
        };
        Ok(PyInvertedEncoding {
            model: InvertedEncoding1D::new(params)?,
        })
    }

    /// X is trials x voxels, y holds one label per trial.
    pub fn fit(&mut self, x: Vec<Vec<f64>>, y: Vec<f64>) -> PyResult<()> {
        let x = to_matrix(x)?;
        Ok(self.model.fit(&x, &y)?)
    }

    pub fn predict(&self, x: Vec<Vec<f64>>) -> PyResult<Vec<f64>> {
        let x = to_matrix(x)?;
        Ok(self.model.predict(&x)?)
    }

    pub fn score(&self, x: Vec<Vec<f64>>, y: Vec<f64>) -> PyResult<f64> {
        let x = to_matrix(x)?;
        Ok(self.model.score(&x, &y)?)
    }

    /// Reconstructions as domain points x trials.
    pub fn predict_feature_responses(&self, x: Vec<Vec<f64>>) -> PyResult<Vec<Vec<f64>>> {
        let x = to_matrix(x)?;
        Ok(from_matrix(&self.model.predict_feature_responses(&x)?))
    }

    #[getter]
    pub fn channel_domain(&self) -> Vec<f64> {
        self.model.channel_domain().to_vec()
    }

    #[getter]
    pub fn channels(&self) -> Vec<Vec<f64>> {
        from_matrix(self.model.channels())
    }
}

/// Returns (voxel RFs as voxels x bins, preferred value per voxel).
#[pyfunction]
#[pyo3(signature = (
    n_voxels,
    feature_resolution,
    range_start = 0.0,
    range_stop = 360.0,
    random_tuning = true,
    rf_noise = 0.0,
    rf_width = 15.0,
    seed = None
))]
#[allow(clippy::too_many_arguments)]
pub fn generate_voxel_rfs(
    n_voxels: usize,
    feature_resolution: usize,
    range_start: f64,
    range_stop: f64,
    random_tuning: bool,
    rf_noise: f64,
    rf_width: f64,
    seed: Option<u64>,
) -> PyResult<(Vec<Vec<f64>>, Vec<f64>)> {
    let axis = FeatureAxis::new(range_start, range_stop, feature_resolution)?;
    let config = RfConfig {
        n_voxels,
        tuning_mode: if random_tuning {
            TuningMode::Random
        } else {
            TuningMode::EvenlySpaced
        },
        rf_noise,
        rf_width,
    };
    let rfs = receptive_fields::generate_voxel_rfs(&config, &axis, &mut make_rng(seed))?;
    Ok((from_matrix(&rfs.rfs), rfs.tuning))
}

/// Returns the voxels x trials response matrix for `trial_list`.
#[pyfunction]
#[pyo3(signature = (
    voxel_rfs,
    trial_list,
    range_start = 0.0,
    range_stop = 360.0,
    trial_noise = 0.25,
    seed = None
))]
pub fn generate_voxel_data(
    voxel_rfs: Vec<Vec<f64>>,
    trial_list: Vec<f64>,
    range_start: f64,
    range_stop: f64,
    trial_noise: f64,
    seed: Option<u64>,
) -> PyResult<Vec<Vec<f64>>> {
    let rfs = VoxelRfs {
        tuning: Vec::new(),
        rfs: to_matrix(voxel_rfs)?,
    };
    let axis = FeatureAxis::new(range_start, range_stop, rfs.n_bins())?;
    let data =
        trials::generate_voxel_data(&rfs, &trial_list, &axis, trial_noise, &mut make_rng(seed))?;
    Ok(from_matrix(&data))
}

/// A Python module implemented in Rust.
#[pymodule]
pub fn iem_sim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyInvertedEncoding>()?;
    m.add_function(wrap_pyfunction!(generate_voxel_rfs, m)?)?;
    m.add_function(wrap_pyfunction!(generate_voxel_data, m)?)?;
    Ok(())
}
