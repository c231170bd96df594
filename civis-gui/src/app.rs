//! Main application state and message handling.
//!
//! `LabelerApp` owns the [`Annotator`] and the view models. Rendering only
//! reads them and queues [`AppMessage`]s; every state change happens in
//! `handle_messages`.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use civis_core::{Annotator, Session, DEFAULT_SAMPLE_RATE_HZ};
use civis_io::{label_file_beside, load_labels, load_session, save_labels, LabelerConfig};
use eframe::egui;
use log::{error, info, warn};

use crate::message::AppMessage;
use crate::state::{SessionSource, UiState};
use crate::viewer::reference_image;
use crate::views::Views;

/// Main application state.
pub struct LabelerApp {
    /// Path configuration; `None` when no config file was found.
    pub(crate) config: Option<LabelerConfig>,
    /// Session, labels and selection.
    pub(crate) annotator: Annotator,
    /// Panel projections, updated through selection notifications.
    pub(crate) views: Views,
    /// Widget buffers and view options.
    pub(crate) ui_state: UiState,
    /// Origin of the loaded session.
    pub(crate) source: Option<SessionSource>,
    /// Operator actions queued during the current frame.
    pub(crate) messages: VecDeque<AppMessage>,
    /// Reference image texture.
    pub(crate) texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
}

impl LabelerApp {
    pub fn new(config: Option<LabelerConfig>) -> Self {
        let sample_rate = config
            .as_ref()
            .map_or(DEFAULT_SAMPLE_RATE_HZ, |c| c.sample_rate_hz);
        let mut ui_state = UiState::default();
        if let Some(config) = &config {
            ui_state.label_file_name.clone_from(&config.label_file_name);
        }
        Self {
            config,
            annotator: Annotator::new(sample_rate),
            views: Views::default(),
            ui_state,
            source: None,
            messages: VecDeque::new(),
            texture: None,
            texture_dirty: false,
        }
    }

    /// Queue an operator action for the end of the frame.
    pub(crate) fn push(&mut self, message: AppMessage) {
        self.messages.push_back(message);
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.annotator.is_loaded()
    }

    /// Label file for the loaded session, from the configuration or next to
    /// the container that was opened.
    pub(crate) fn label_path(&self) -> anyhow::Result<PathBuf> {
        let file_name = &self.ui_state.label_file_name;
        match &self.source {
            Some(SessionSource::Named(name)) => {
                let config = self
                    .config
                    .as_ref()
                    .ok_or_else(|| anyhow!("no configuration loaded"))?;
                Ok(config.label_file(name, file_name)?)
            }
            Some(SessionSource::File(path)) => Ok(label_file_beside(path, file_name)?),
            None => Err(anyhow!("no session loaded")),
        }
    }

    /// Drain queued operator actions, each to completion.
    pub fn handle_messages(&mut self, ctx: &egui::Context) {
        if self.messages.is_empty() {
            return;
        }
        while let Some(msg) = self.messages.pop_front() {
            match msg {
                AppMessage::LoadSession(name) => {
                    let name = name.trim().to_string();
                    let result = self.session_path(&name).and_then(|path| read_session(&path));
                    match result {
                        Ok(session) => self.install(session, SessionSource::Named(name)),
                        Err(e) => self.report_error(&e),
                    }
                }
                AppMessage::OpenFile(path) => match read_session(&path) {
                    Ok(session) => self.install(session, SessionSource::File(path)),
                    Err(e) => self.report_error(&e),
                },
                AppMessage::Select(event) => {
                    let result = self.annotator.dispatch(event, &mut self.views.observers());
                    if let Err(e) = result {
                        self.views.navigation.reset_text();
                        self.report_warning(&e.to_string());
                    }
                }
                AppMessage::SelectAt(x, y) => {
                    let result = self.annotator.select_at(x, y, &mut self.views.observers());
                    if let Err(e) = result {
                        self.report_warning(&e.to_string());
                    }
                }
                AppMessage::SetLabel(label) => {
                    let result = self.annotator.set_label(label, &mut self.views.observers());
                    if let Err(e) = result {
                        self.report_warning(&e.to_string());
                    }
                }
                AppMessage::SaveLabels => {
                    let result = self.label_path().and_then(|path| {
                        save_labels(self.annotator.labels(), &path)?;
                        Ok(path)
                    });
                    match result {
                        Ok(path) => self.report(format!("Labels saved to {}", path.display())),
                        Err(e) => self.report_error(&e),
                    }
                }
                AppMessage::LoadLabels => {
                    let result = self.label_path().and_then(|path| {
                        let expected = self.annotator.labels().len();
                        let store = load_labels(&path, Some(expected))?;
                        self.annotator
                            .replace_labels(store, &mut self.views.observers())?;
                        Ok(path)
                    });
                    match result {
                        Ok(path) => self.report(format!("Labels loaded from {}", path.display())),
                        Err(e) => self.report_error(&e),
                    }
                }
                AppMessage::SetColormap(colormap) => {
                    self.ui_state.colormap = colormap;
                    self.texture_dirty = true;
                }
            }
        }

        if self.texture_dirty {
            self.refresh_texture(ctx);
        }
        ctx.request_repaint();
    }

    fn session_path(&self, name: &str) -> anyhow::Result<PathBuf> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| anyhow!("no configuration found (set CIVIS_CONFIG or add config.json)"))?;
        Ok(config.session_file(name)?)
    }

    fn install(&mut self, session: Session, source: SessionSource) {
        match self.annotator.install(session, &mut self.views.observers()) {
            Ok(update) => {
                let what = match &source {
                    SessionSource::Named(name) => name.clone(),
                    SessionSource::File(path) => path.display().to_string(),
                };
                if let SessionSource::Named(name) = &source {
                    self.ui_state.session_input.clone_from(name);
                }
                self.source = Some(source);
                self.texture_dirty = true;
                let neurons = self.annotator.labels().len();
                self.report(format!(
                    "Data loaded: {what} ({neurons} neurons, ids {}..={})",
                    update.id_range.0, update.id_range.1
                ));
            }
            Err(e) => self.report_error(&anyhow!(e)),
        }
    }

    fn refresh_texture(&mut self, ctx: &egui::Context) {
        self.texture_dirty = false;
        self.texture = self.annotator.session().map(|session| {
            let image = reference_image(session.image(), self.ui_state.colormap);
            ctx.load_texture("reference", image, egui::TextureOptions::NEAREST)
        });
    }

    fn report(&mut self, status: String) {
        info!("{status}");
        self.ui_state.status = status;
        self.ui_state.status_is_error = false;
    }

    fn report_warning(&mut self, status: &str) {
        warn!("{status}");
        self.ui_state.status = status.to_string();
        self.ui_state.status_is_error = true;
    }

    fn report_error(&mut self, e: &anyhow::Error) {
        error!("{e:#}");
        self.ui_state.status = format!("Error: {e:#}");
        self.ui_state.status_is_error = true;
    }
}

fn read_session(path: &std::path::Path) -> anyhow::Result<Session> {
    load_session(path).with_context(|| format!("cannot load {}", path.display()))
}

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_top_bar(ctx);
        self.render_side_panel(ctx);
        self.render_temporal_panel(ctx);
        self.render_spatial_panel(ctx);
        self.handle_messages(ctx);
    }
}
