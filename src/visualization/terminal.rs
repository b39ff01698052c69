// src/visualization/terminal.rs

use super::plotter::Series;
use crate::model::circular::wrap_difference;
use colored::Colorize;

const BAR_WIDTH: usize = 60;

/// Draws `series` as horizontal bars, one per bucket of points. The bucket
/// holding the peak is drawn in red.
pub fn render_curve(series: &Series, rows: usize) -> Vec<String> {
    let points = &series.points;
    if points.is_empty() || rows == 0 {
        return Vec::new();
    }

    let rows = rows.min(points.len());
    let bucket = (points.len() + rows - 1) / rows;
    let buckets: Vec<(f64, f64)> = points
        .chunks(bucket)
        .map(|chunk| {
            let x = chunk[0].0;
            let y = chunk.iter().map(|(_, y)| y).sum::<f64>() / chunk.len() as f64;
            (x, y)
        })
        .collect();

    let min = buckets.iter().map(|b| b.1).fold(f64::INFINITY, f64::min);
    let max = buckets.iter().map(|b| b.1).fold(f64::NEG_INFINITY, f64::max);
    let span = if max > min { max - min } else { 1.0 };

    let mut lines = vec![format!("{}", series.name.bold())];
    for &(x, y) in &buckets {
        let len = (((y - min) / span) * BAR_WIDTH as f64).round() as usize;
        let bar = "|".repeat(len.min(BAR_WIDTH));
        let bar = if y == max { bar.red() } else { bar.white() };
        lines.push(format!("{:>8.1} {}", x, bar));
    }
    lines
}

/// One line per (label, prediction) pair, green when the error is within
/// `tolerance` and red otherwise.
pub fn render_predictions(
    predictions: &[(f64, f64)],
    period: Option<f64>,
    tolerance: f64,
    limit: usize,
) -> Vec<String> {
    predictions
        .iter()
        .take(limit)
        .map(|&(label, prediction)| {
            let error = match period {
                Some(period) => wrap_difference(prediction, label, period),
                None => prediction - label,
            };
            let line = format!(
                "label {:>7.1}  predicted {:>7.1}  error {:>+7.1}",
                label, prediction, error
            );
            if error.abs() <= tolerance {
                line.green().to_string()
            } else {
                line.red().to_string()
            }
        })
        .collect()
}

pub fn render_score(score: f64) -> String {
    let text = format!("score: {:.3}", score);
    if score >= 0.5 {
        text.green().bold().to_string()
    } else {
        text.yellow().bold().to_string()
    }
}
