//! UI rendering modules.
//!
//! - `top_bar`: session loading and status line
//! - `control_panel`: left sidebar with navigation and labeling
//! - `spatial_view`: central panel with image and contours
//! - `temporal_view`: bottom panel with trace plots

mod control_panel;
mod spatial_view;
mod temporal_view;
pub mod theme;
mod top_bar;
