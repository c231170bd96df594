//! Widget buffers and view options.

use std::path::PathBuf;

use civis_core::TraceKind;
use civis_io::config::DEFAULT_LABEL_FILE_NAME;

use crate::viewer::Colormap;

/// Temporal plot tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceTab {
    /// Lowpass and raw traces.
    #[default]
    Raw,
    /// Deconvolved, denoised and re-based traces.
    Rebased,
}

impl TraceTab {
    pub const ALL: [TraceTab; 2] = [TraceTab::Raw, TraceTab::Rebased];

    pub fn title(self) -> &'static str {
        match self {
            TraceTab::Raw => "Raw",
            TraceTab::Rebased => "Rebased",
        }
    }

    /// Trace kinds drawn on this tab.
    pub fn kinds(self) -> &'static [TraceKind] {
        match self {
            TraceTab::Raw => &[TraceKind::Lowpass, TraceKind::Raw],
            TraceTab::Rebased => &[
                TraceKind::Deconvolved,
                TraceKind::Denoised,
                TraceKind::Reraw,
            ],
        }
    }
}

/// Where the loaded session came from; decides where labels are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// Resolved from a session name through the configuration.
    Named(String),
    /// Opened directly from a container file.
    File(PathBuf),
}

/// Text buffers and toggles owned by widgets.
pub struct UiState {
    /// Session name input.
    pub session_input: String,
    /// Label file suffix input.
    pub label_file_name: String,
    /// Status line shown in the top bar.
    pub status: String,
    /// Whether the status line reports a failure.
    pub status_is_error: bool,
    pub colormap: Colormap,
    pub trace_tab: TraceTab,
    /// Neuron id under the pointer in the spatial view.
    pub hovered_id: Option<i64>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            session_input: String::new(),
            label_file_name: DEFAULT_LABEL_FILE_NAME.to_string(),
            status: String::from("No session loaded"),
            status_is_error: false,
            colormap: Colormap::Grayscale,
            trace_tab: TraceTab::Raw,
            hovered_id: None,
        }
    }
}
