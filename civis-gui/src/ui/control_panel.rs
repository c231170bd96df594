//! Left control panel: navigation, labeling and label files.

use civis_core::{Label, SelectionEvent, Step};
use eframe::egui;

use crate::app::LabelerApp;
use crate::message::AppMessage;
use crate::ui::theme::{self, ThemeColors};
use crate::viewer::Colormap;
use crate::views::MENU_PLACEHOLDER;

impl LabelerApp {
    /// Render the left control panel.
    pub(crate) fn render_side_panel(&mut self, ctx: &egui::Context) {
        let colors = ThemeColors::from_ctx(ctx);

        egui::SidePanel::left("ctrl")
            .default_width(260.0)
            .frame(
                egui::Frame::none()
                    .fill(colors.bg_panel)
                    .inner_margin(egui::Margin::same(8.0)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        let loaded = self.is_loaded();
                        ui.add_enabled_ui(loaded, |ui| {
                            self.render_section(ui, "Navigation", true, |app, ui| {
                                app.render_navigation(ui);
                            });
                            self.render_section(ui, "Label", true, |app, ui| {
                                app.render_label_controls(ui);
                            });
                            self.render_section(ui, "Label File", true, |app, ui| {
                                app.render_label_file(ui);
                            });
                            self.render_section(ui, "Neurons", true, |app, ui| {
                                app.render_neuron_menus(ui);
                            });
                            self.render_section(ui, "View", false, |app, ui| {
                                app.render_view_options(ui);
                            });
                        });
                        ui.add_space(12.0);
                    });
            });
    }

    /// Render a collapsible section with header.
    fn render_section<F>(&mut self, ui: &mut egui::Ui, title: &str, default_open: bool, content: F)
    where
        F: FnOnce(&mut Self, &mut egui::Ui),
    {
        egui::CollapsingHeader::new(theme::section_header(title))
            .id_salt(title)
            .default_open(default_open)
            .show(ui, |ui| content(self, ui));
    }

    fn render_navigation(&mut self, ui: &mut egui::Ui) {
        let nav = &self.views.navigation;
        let (can_previous, can_next) = (nav.can_previous, nav.can_next);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(can_previous, egui::Button::new("◀ Previous"))
                .clicked()
            {
                self.push(AppMessage::Select(SelectionEvent::Step(Step::Previous)));
            }
            if ui
                .add_enabled(can_next, egui::Button::new("Next ▶"))
                .clicked()
            {
                self.push(AppMessage::Select(SelectionEvent::Step(Step::Next)));
            }
        });

        ui.horizontal(|ui| {
            ui.label(theme::form_label("Index"));
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.views.navigation.index_text)
                    .desired_width(80.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                match self.views.navigation.index_text.trim().parse::<i64>() {
                    Ok(id) => self.push(AppMessage::Select(SelectionEvent::Direct(id))),
                    Err(_) => {
                        let status = format!(
                            "'{}' is not a neuron index",
                            self.views.navigation.index_text.trim()
                        );
                        log::warn!("{status}");
                        self.ui_state.status = status;
                        self.ui_state.status_is_error = true;
                        self.views.navigation.reset_text();
                    }
                }
            }
        });

        let (min, max) = self.views.navigation.id_range;
        let mut id = self.views.navigation.id.unwrap_or(min);
        let slider = ui.add(egui::Slider::new(&mut id, min..=max).text("id"));
        if slider.changed() && Some(id) != self.views.navigation.id {
            self.push(AppMessage::Select(SelectionEvent::Direct(id)));
        }
    }

    fn render_label_controls(&mut self, ui: &mut egui::Ui) {
        let active = self.views.labels.active;
        ui.horizontal(|ui| {
            for label in Label::ALL {
                if ui
                    .add(theme::label_button(label, active == Some(label)))
                    .clicked()
                {
                    self.push(AppMessage::SetLabel(label));
                }
            }
        });
        ui.add_space(4.0);
        ui.label(theme::stat_value(&self.views.summary.counts_text));
    }

    fn render_label_file(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(theme::form_label("File name"));
            ui.add(
                egui::TextEdit::singleline(&mut self.ui_state.label_file_name)
                    .desired_width(140.0),
            );
        });
        ui.horizontal(|ui| {
            if ui.add(theme::primary_button("Save Labels")).clicked() {
                self.push(AppMessage::SaveLabels);
            }
            if ui.button("Load Labels").clicked() {
                self.push(AppMessage::LoadLabels);
            }
        });
        if let Ok(path) = self.label_path() {
            ui.horizontal_wrapped(|ui| {
                ui.label(theme::stat_label("Target"));
                ui.label(theme::stat_value(&path.display().to_string()));
            });
        }
    }

    fn render_neuron_menus(&mut self, ui: &mut egui::Ui) {
        let menus = [
            ("Kept Neurons", &self.views.summary.kept),
            ("Discarded Neurons", &self.views.summary.discarded),
            ("Unlabeled Neurons", &self.views.summary.unlabeled),
        ];
        let mut picked = None;
        for (title, ids) in menus {
            ui.label(theme::form_label(title));
            egui::ComboBox::from_id_salt(title)
                .selected_text(MENU_PLACEHOLDER)
                .width(200.0)
                .show_ui(ui, |ui| {
                    for &id in ids {
                        if ui.selectable_label(false, id.to_string()).clicked() {
                            picked = Some(id);
                        }
                    }
                });
        }
        if let Some(id) = picked {
            self.push(AppMessage::Select(SelectionEvent::Direct(id)));
        }
    }

    fn render_view_options(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(theme::form_label("Colormap"));
            let current = self.ui_state.colormap;
            egui::ComboBox::from_id_salt("colormap")
                .selected_text(current.to_string())
                .show_ui(ui, |ui| {
                    for colormap in Colormap::ALL {
                        if ui
                            .selectable_label(current == colormap, colormap.to_string())
                            .clicked()
                            && current != colormap
                        {
                            self.push(AppMessage::SetColormap(colormap));
                        }
                    }
                });
        });
        if let Some(id) = self.ui_state.hovered_id {
            ui.horizontal(|ui| {
                ui.label(theme::stat_label("Hovered"));
                ui.label(theme::stat_value(&id.to_string()));
            });
        }
    }
}
