// src/visualization/export.rs

use crate::error::Result;
use crate::evaluation::sweep::SweepPoint;
use crate::evaluation::Evaluation;
use crate::model::circular::wrap_difference;

use std::fs;
use std::path::{Path, PathBuf};

/// Reconstructions as rows of domain points, one column per test trial.
pub fn write_reconstructions<P: AsRef<Path>>(evaluation: &Evaluation, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["feature".to_string()];
    header.extend((0..evaluation.reconstructions.ncols()).map(|t| format!("trial_{}", t)));
    writer.write_record(&header)?;

    for (row, &feature) in evaluation.channel_domain.iter().enumerate() {
        let mut record = vec![feature.to_string()];
        record.extend(
            evaluation
                .reconstructions
                .row(row)
                .iter()
                .map(|v| v.to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per test trial: label, prediction and error. `period` wraps the
/// error for circular feature spaces.
pub fn write_predictions<P: AsRef<Path>>(
    evaluation: &Evaluation,
    period: Option<f64>,
    path: P,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["trial", "label", "prediction", "error"])?;

    for (trial, (&label, &prediction)) in evaluation
        .test_labels
        .iter()
        .zip(evaluation.predictions.iter())
        .enumerate()
    {
        let error = match period {
            Some(period) => wrap_difference(prediction, label, period),
            None => prediction - label,
        };
        writer.write_record(&[
            trial.to_string(),
            label.to_string(),
            prediction.to_string(),
            error.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per voxel: preferred value followed by its RF over the feature axis.
pub fn write_voxel_rfs<P: AsRef<Path>>(evaluation: &Evaluation, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let rfs = &evaluation.voxel_rfs;

    let mut header = vec!["voxel".to_string(), "preferred".to_string()];
    header.extend(evaluation.feature_axis.values().iter().map(|v| v.to_string()));
    writer.write_record(&header)?;

    for voxel in 0..rfs.n_voxels() {
        let mut record = vec![voxel.to_string(), rfs.tuning[voxel].to_string()];
        record.extend(rfs.rfs.row(voxel).iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// The channel basis, one row per domain point and one column per channel.
pub fn write_channels<P: AsRef<Path>>(evaluation: &Evaluation, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["feature".to_string()];
    header.extend((0..evaluation.channels.nrows()).map(|c| format!("channel_{}", c)));
    writer.write_record(&header)?;

    for (point, &feature) in evaluation.channel_domain.iter().enumerate() {
        let mut record = vec![feature.to_string()];
        record.extend(
            evaluation
                .channels
                .column(point)
                .iter()
                .map(|v| v.to_string()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_sweep<P: AsRef<Path>>(points: &[SweepPoint], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes every evaluation table into `directory` and returns the paths.
pub fn write_evaluation<P: AsRef<Path>>(
    evaluation: &Evaluation,
    period: Option<f64>,
    directory: P,
) -> Result<Vec<PathBuf>> {
    let directory = directory.as_ref();
    fs::create_dir_all(directory)?;

    let reconstructions = directory.join("reconstructions.csv");
    let predictions = directory.join("predictions.csv");
    let voxel_rfs = directory.join("voxel_rfs.csv");
    let channels = directory.join("channels.csv");

    write_reconstructions(evaluation, &reconstructions)?;
    write_predictions(evaluation, period, &predictions)?;
    write_voxel_rfs(evaluation, &voxel_rfs)?;
    write_channels(evaluation, &channels)?;

    Ok(vec![reconstructions, predictions, voxel_rfs, channels])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::evaluation::train_and_test;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn evaluation() -> Evaluation {
        let mut config = SimulationConfig::default();
        config.voxels.n_voxels = 12;
        config.train.n_trials = 60;
        config.test.n_trials = 5;
        train_and_test(&config, &mut StdRng::seed_from_u64(41)).unwrap()
    }

    #[test]
    fn writes_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        let evaluation = evaluation();
        let paths = write_evaluation(&evaluation, Some(360.0), dir.path().join("out")).unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.exists()));

        let mut reader = csv::Reader::from_path(&paths[0]).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 6);
        assert_eq!(reader.records().count(), 360);

        let mut reader = csv::Reader::from_path(&paths[1]).unwrap();
        assert_eq!(reader.records().count(), 5);

        let mut reader = csv::Reader::from_path(&paths[2]).unwrap();
        assert_eq!(reader.headers().unwrap().len(), 362);
        assert_eq!(reader.records().count(), 12);
    }

    #[test]
    fn sweep_rows_are_serialized_with_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        let points = vec![SweepPoint {
            value: 0.5,
            mean_score: 0.8,
            std_score: 0.1,
            repetitions: 3,
        }];
        write_sweep(&points, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("value,mean_score,std_score,repetitions"));
        assert_eq!(lines.next(), Some("0.5,0.8,0.1,3"));
    }
}
