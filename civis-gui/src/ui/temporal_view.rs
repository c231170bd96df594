//! Temporal view (bottom panel): traces of the active neuron.

use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::app::LabelerApp;
use crate::state::TraceTab;
use crate::ui::theme;

impl LabelerApp {
    pub(crate) fn render_temporal_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("temporal")
            .resizable(true)
            .default_height(260.0)
            .min_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(&self.views.temporal.title);
                    ui.separator();
                    for tab in TraceTab::ALL {
                        ui.selectable_value(&mut self.ui_state.trace_tab, tab, tab.title());
                    }
                });

                let Some(projection) = &self.views.temporal.projection else {
                    ui.centered_and_justified(|ui| ui.label("No Data"));
                    return;
                };
                let tab = self.ui_state.trace_tab;

                Plot::new("temporal")
                    .legend(Legend::default())
                    .x_axis_label("Time (s)")
                    .allow_scroll(false)
                    .show(ui, |plot_ui| {
                        for &kind in tab.kinds() {
                            let points = projection.points(kind);
                            if points.is_empty() {
                                continue;
                            }
                            plot_ui.line(
                                Line::new(PlotPoints::new(points))
                                    .name(kind.to_string())
                                    .color(theme::trace_color(kind))
                                    .style(theme::trace_style(kind)),
                            );
                        }
                    });
            });
    }
}
