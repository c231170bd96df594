//! Operator actions.
//!
//! Widgets queue an `AppMessage` while the frame is drawn and
//! `LabelerApp::handle_messages` drains the queue afterwards, in arrival
//! order, each message to completion before the next.

use std::path::PathBuf;

use civis_core::{Label, SelectionEvent};

use crate::viewer::Colormap;

pub enum AppMessage {
    /// Resolve a session name through the configuration and load it.
    LoadSession(String),
    /// Load a container picked from disk.
    OpenFile(PathBuf),
    /// Navigation input (buttons, slider, index field, menus).
    Select(SelectionEvent),
    /// Click on the spatial view, in plot coordinates.
    SelectAt(f64, f64),
    /// Label the active neuron.
    SetLabel(Label),
    /// Write the label table to the current label file.
    SaveLabels,
    /// Replace the label table from the current label file.
    LoadLabels,
    /// Recolour the reference image.
    SetColormap(Colormap),
}
