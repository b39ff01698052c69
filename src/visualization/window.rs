// src/visualization/window.rs

use super::plotter::{ReconstructionPlots, Series};
use super::VisualizationConfig;
use eframe::egui;

pub struct VisualizationWindow {
    plots: ReconstructionPlots,
    config: VisualizationConfig,
}

impl VisualizationWindow {
    pub fn new(plots: ReconstructionPlots, config: VisualizationConfig) -> Self {
        Self { plots, config }
    }

    pub fn run(plots: ReconstructionPlots, config: VisualizationConfig) -> Result<(), eframe::Error> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window_width as f32, config.window_height as f32])
                .with_title("iem-sim - Reconstructions"),
            ..Default::default()
        };

        eframe::run_native(
            "iem-sim Visualization",
            options,
            Box::new(|_cc| Ok(Box::new(VisualizationWindow::new(plots, config)))),
        )
    }
}

impl eframe::App for VisualizationWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Inverted encoding model - score {:.3}", self.plots.score));
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Mean reconstruction, centred on the true label");
                self.plot_lines(
                    ui,
                    "centered",
                    std::slice::from_ref(&self.plots.centered),
                    egui::Color32::LIGHT_RED,
                );
                ui.add_space(10.0);

                ui.heading("Channel basis");
                self.plot_lines(ui, "channels", &self.plots.channels, egui::Color32::LIGHT_BLUE);
                ui.add_space(10.0);

                ui.heading("Voxel receptive fields");
                self.plot_lines(ui, "voxel_rfs", &self.plots.voxel_rfs, egui::Color32::LIGHT_GREEN);
                ui.add_space(10.0);

                ui.heading("Predicted vs true label");
                self.plot_predictions(ui);
            });
        });
    }
}

impl VisualizationWindow {
    fn plot_lines(&self, ui: &mut egui::Ui, name: &str, series: &[Series], color: egui::Color32) {
        // Import from egui_plot crate, not egui::plot
        use egui_plot::{Legend, Line, Plot, PlotPoints};

        if series.is_empty() {
            return;
        }

        let lines: Vec<Line> = series
            .iter()
            .map(|s| {
                let points: PlotPoints = s.points.iter().map(|(x, y)| [*x, *y]).collect();
                let line = Line::new(points).width(1.5).name(&s.name);
                // A single series keeps the panel colour, several get egui's palette.
                if series.len() == 1 {
                    line.color(color)
                } else {
                    line
                }
            })
            .collect();

        Plot::new(name)
            .height(self.config.plot_height as f32)
            .legend(Legend::default())
            .show_axes([true, true])
            .show_grid([true, true])
            .show(ui, |plot_ui| {
                for line in lines {
                    plot_ui.line(line);
                }
            });
    }

    fn plot_predictions(&self, ui: &mut egui::Ui) {
        use egui_plot::{Plot, PlotPoints, Points};

        let points: PlotPoints = self
            .plots
            .predictions
            .iter()
            .map(|(label, prediction)| [*label, *prediction])
            .collect();

        Plot::new("predictions")
            .height(self.config.plot_height as f32)
            .data_aspect(1.0)
            .show(ui, |plot_ui| {
                plot_ui.points(Points::new(points).radius(2.5).color(egui::Color32::YELLOW));
            });
    }
}
