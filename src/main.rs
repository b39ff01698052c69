use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

use iem_sim::config::{load_config, save_config, SimulationConfig};
use iem_sim::evaluation::sweep::{run_sweep, SweepConfig, SweepParameter};
use iem_sim::evaluation::train_and_test;
use iem_sim::utils::log::{log_csv, log_with_header};
use iem_sim::visualization::export::{write_evaluation, write_sweep};
use iem_sim::visualization::plotter::ReconstructionPlots;
use iem_sim::visualization::terminal::{render_curve, render_predictions, render_score};
use iem_sim::Result;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("run") => run(args.get(2)),
        Some("sweep") => sweep(args.get(2)),
        Some("init") => match args.get(2) {
            Some(path) => init(path),
            None => {
                println!("Please specify a path for the config file");
                return;
            }
        },
        Some(other) => {
            println!(
                "Invalid argument '{}', please use 'run', 'sweep' or 'init'",
                other
            );
            return;
        }
        None => {
            println!("Please specify 'run', 'sweep' or 'init' as argument");
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn config_from(path: Option<&String>) -> Result<SimulationConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let config = SimulationConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Period used to wrap errors, `None` for linear feature spaces.
fn error_period(config: &SimulationConfig) -> Option<f64> {
    if config.model.stimulus_mode.is_circular() {
        Some(config.model.width())
    } else {
        None
    }
}

fn init(path: &str) -> Result<()> {
    save_config(&SimulationConfig::default(), path)?;
    println!("Wrote default config to {}", path);
    Ok(())
}

fn run(path: Option<&String>) -> Result<()> {
    let config = config_from(path)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let period = error_period(&config);

    let start = Instant::now();
    let evaluation = train_and_test(&config, &mut rng)?;
    let elapsed = start.elapsed();

    let mae = evaluation.mean_absolute_error(period);
    println!(
        "{} {} voxels, {} train / {} test trials in {:?}",
        "Finished".green().bold(),
        evaluation.voxel_rfs.n_voxels(),
        config.train.n_trials,
        evaluation.test_labels.len(),
        elapsed
    );
    println!("{}", render_score(evaluation.score));
    println!("mean absolute error: {:.2}", mae);

    let visualization = &config.output.visualization;
    let plots = ReconstructionPlots::new(&evaluation, visualization);
    if visualization.terminal_plot {
        for line in render_curve(&plots.centered, visualization.terminal_rows) {
            println!("{}", line);
        }
        let tolerance = config.model.width() / config.model.n_channels as f64 / 2.0;
        for line in render_predictions(&plots.predictions, period, tolerance, 10) {
            println!("{}", line);
        }
    }

    if config.output.write_csv {
        let paths = write_evaluation(&evaluation, period, &config.output.directory)?;
        for path in paths {
            println!("Wrote {}", path.display());
        }
    }

    let summary = format!(
        "seed: {}\nvoxels: {}\nstimulus_mode: {:?}\nscore: {}\nmean_absolute_error: {}\nelapsed: {:?}",
        config.seed,
        evaluation.voxel_rfs.n_voxels(),
        config.model.stimulus_mode,
        evaluation.score,
        mae,
        elapsed
    );
    log_with_header(&config.output.log_dir, &config.output.log_file, "RUN", &summary)?;
    let row = [
        config.seed.to_string(),
        evaluation.voxel_rfs.n_voxels().to_string(),
        evaluation.score.to_string(),
        mae.to_string(),
    ];
    let row: Vec<&str> = row.iter().map(String::as_str).collect();
    log_csv(
        &config.output.log_dir,
        "runs.csv",
        &["seed", "n_voxels", "score", "mean_absolute_error"],
        &row,
    )?;

    if visualization.window {
        show_window(plots, visualization.clone());
    }
    Ok(())
}

#[cfg(feature = "visualization")]
fn show_window(
    plots: ReconstructionPlots,
    config: iem_sim::visualization::VisualizationConfig,
) {
    use iem_sim::visualization::window::VisualizationWindow;
    if let Err(e) = VisualizationWindow::run(plots, config) {
        eprintln!("Visualization window error: {}", e);
    }
}

#[cfg(not(feature = "visualization"))]
fn show_window(
    _plots: ReconstructionPlots,
    _config: iem_sim::visualization::VisualizationConfig,
) {
    println!(
        "{}",
        "Window requested but iem-sim was built without the 'visualization' feature".yellow()
    );
}

fn sweep(path: Option<&String>) -> Result<()> {
    let config = config_from(path)?;
    let sweep = config.sweep.clone().unwrap_or_else(|| SweepConfig {
        parameter: SweepParameter::TrialNoise,
        values: vec![0.0, 0.25, 0.5, 1.0, 2.0],
        repetitions: 5,
    });

    let start = Instant::now();
    let points = run_sweep(&config, &sweep)?;
    println!(
        "{} {:?} sweep over {} values in {:?}",
        "Finished".green().bold(),
        sweep.parameter,
        points.len(),
        start.elapsed()
    );
    for point in &points {
        println!(
            "{:>10.3}  score {:.3} ± {:.3}",
            point.value, point.mean_score, point.std_score
        );
    }

    if config.output.write_csv {
        std::fs::create_dir_all(&config.output.directory)?;
        let path = config.output.directory.join("sweep.csv");
        write_sweep(&points, &path)?;
        println!("Wrote {}", path.display());
    }

    let summary = points
        .iter()
        .map(|p| format!("{}: {} ± {}", p.value, p.mean_score, p.std_score))
        .collect::<Vec<_>>()
        .join("\n");
    log_with_header(
        &config.output.log_dir,
        &config.output.log_file,
        &format!("SWEEP {:?}", sweep.parameter),
        &summary,
    )?;
    Ok(())
}
