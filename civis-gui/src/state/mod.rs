//! Application state modules.

mod ui;

pub use ui::{SessionSource, TraceTab, UiState};
