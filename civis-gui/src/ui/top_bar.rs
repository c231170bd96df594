//! Top bar: session loading and status line.

use eframe::egui;
use rfd::FileDialog;

use crate::app::LabelerApp;
use crate::message::AppMessage;
use crate::ui::theme::{self, accent, ThemeColors};

impl LabelerApp {
    pub(crate) fn render_top_bar(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);
        egui::TopBottomPanel::top("session_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(theme::form_label("Session"));
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.ui_state.session_input)
                        .hint_text("session name")
                        .desired_width(220.0),
                );
                let submitted =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.add(theme::primary_button("Load Data")).clicked() || submitted {
                    self.push(AppMessage::LoadSession(self.ui_state.session_input.clone()));
                }
                if ui.button("Open file…").clicked() {
                    if let Some(path) = FileDialog::new()
                        .add_filter("MATLAB v7.3", &["mat", "h5"])
                        .pick_file()
                    {
                        self.push(AppMessage::OpenFile(path));
                    }
                }

                ui.separator();
                let color = if self.ui_state.status_is_error {
                    accent::RED
                } else {
                    colors.text_muted
                };
                ui.label(egui::RichText::new(&self.ui_state.status).color(color));
            });
        });
    }
}
