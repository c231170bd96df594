//! Spatial view (central panel): reference image with neuron contours.

use civis_core::Contour;
use eframe::egui::{self, Color32, Stroke};
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints, PlotUi, Polygon};

use crate::app::LabelerApp;
use crate::message::AppMessage;
use crate::util::{usize_to_f32, usize_to_f64};
use crate::viewer::{contour_color, contour_fill};

impl LabelerApp {
    /// Render the central panel with the reference image and contours.
    pub(crate) fn render_spatial_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (Some(session), Some(tex)) = (self.annotator.session(), &self.texture) else {
                ui.centered_and_justified(|ui| ui.label("No Data"));
                return;
            };
            let (w, h) = (session.width(), session.height());
            let highlighted = self.views.spatial.highlighted;

            let plot = Plot::new("spatial")
                .data_aspect(1.0)
                .show_grid(false)
                .show(ui, |plot_ui| {
                    plot_ui.image(PlotImage::new(
                        tex,
                        PlotPoint::new(usize_to_f64(w) / 2.0, usize_to_f64(h) / 2.0),
                        [usize_to_f32(w), usize_to_f32(h)],
                    ));
                    for (index, contour) in session.contours().iter().enumerate() {
                        draw_contour(plot_ui, contour, index, highlighted == Some(index));
                    }
                    plot_ui.pointer_coordinate()
                });

            let hovered = plot
                .inner
                .and_then(|p| session.neuron_at(p.x, p.y))
                .and_then(|index| session.ids().index_to_id(index));
            self.ui_state.hovered_id = hovered;

            if plot.response.clicked() {
                if let Some(point) = plot.inner {
                    self.push(AppMessage::SelectAt(point.x, point.y));
                }
            }
            if let Some(id) = hovered {
                plot.response.on_hover_text(format!("ID: {id}"));
            }
        });
    }
}

/// Draw one contour: convex outlines as a single polygon, others as
/// triangle fill plus outline.
fn draw_contour(plot_ui: &mut PlotUi, contour: &Contour, index: usize, active: bool) {
    if contour.is_empty() {
        return;
    }
    let color = contour_color(index);
    let fill = contour_fill(color, active);
    let stroke_width = if active { 3.0 } else { 1.0 };
    let stroke = Stroke::new(stroke_width, color);

    if contour.is_convex() {
        plot_ui.polygon(
            Polygon::new(PlotPoints::new(contour.points().to_vec()))
                .stroke(stroke)
                .fill_color(fill),
        );
        return;
    }
    for tri in contour.triangulate() {
        plot_ui.polygon(
            Polygon::new(PlotPoints::new(tri.to_vec()))
                .stroke(Stroke::new(0.0, Color32::TRANSPARENT))
                .fill_color(fill),
        );
    }
    plot_ui.line(
        Line::new(PlotPoints::new(contour.closed_points()))
            .color(color)
            .width(stroke_width),
    );
}
