//! Application theme and color definitions.
//!
//! Dark and light palettes with monospace text, following the system
//! preference.

use eframe::egui::{
    self, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Theme, Visuals,
};
use egui_plot::LineStyle;

use civis_core::{Label, TraceKind};

/// Color palette (dark theme).
pub mod dark {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0x1f, 0x1f, 0x1f);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2a);

    pub const BORDER: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
}

/// Color palette (light theme).
pub mod light {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);

    pub const BORDER: Color32 = Color32::from_rgb(0xd0, 0xd0, 0xd0);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0xc0, 0xc0, 0xc0);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0xdd, 0xdd, 0xdd);
}

/// Shared accent colors (same for both themes).
pub mod accent {
    use eframe::egui::Color32;

    pub const BLUE: Color32 = Color32::from_rgb(0x4a, 0x9e, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
    pub const AMBER: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
}

/// Theme-aware colors for hand-drawn frames.
#[derive(Clone, Copy)]
pub struct ThemeColors {
    pub bg_panel: Color32,
    pub text_muted: Color32,
}

impl ThemeColors {
    pub fn from_ctx(ctx: &egui::Context) -> Self {
        if ctx.style().visuals.dark_mode {
            Self {
                bg_panel: dark::BG_PANEL,
                text_muted: dark::TEXT_MUTED,
            }
        } else {
            Self {
                bg_panel: light::BG_PANEL,
                text_muted: light::TEXT_MUTED,
            }
        }
    }
}

struct Palette {
    bg_dark: Color32,
    bg_panel: Color32,
    bg_input: Color32,
    border: Color32,
    border_light: Color32,
    text_primary: Color32,
    text_muted: Color32,
    button_hover: Color32,
}

const DARK: Palette = Palette {
    bg_dark: dark::BG_DARK,
    bg_panel: dark::BG_PANEL,
    bg_input: dark::BG_INPUT,
    border: dark::BORDER,
    border_light: dark::BORDER_LIGHT,
    text_primary: dark::TEXT_PRIMARY,
    text_muted: dark::TEXT_MUTED,
    button_hover: dark::BUTTON_HOVER,
};

const LIGHT: Palette = Palette {
    bg_dark: light::BG_DARK,
    bg_panel: light::BG_PANEL,
    bg_input: light::BG_INPUT,
    border: light::BORDER,
    border_light: light::BORDER_LIGHT,
    text_primary: light::TEXT_PRIMARY,
    text_muted: light::TEXT_MUTED,
    button_hover: light::BUTTON_HOVER,
};

/// Configure style based on current visuals (dark/light mode).
pub fn configure_style(ctx: &egui::Context) {
    let theme = if ctx.style().visuals.dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    };
    let visuals = match theme {
        Theme::Dark => build_visuals(Visuals::dark(), &DARK, 0.3),
        Theme::Light => build_visuals(Visuals::light(), &LIGHT, 0.2),
    };
    ctx.set_visuals(visuals);
    configure_fonts_and_spacing(ctx);
}

fn build_visuals(mut visuals: Visuals, p: &Palette, selection_alpha: f32) -> Visuals {
    let rounding = Rounding::same(4.0);

    visuals.window_fill = p.bg_panel;
    visuals.panel_fill = p.bg_panel;
    visuals.faint_bg_color = p.bg_dark;
    visuals.extreme_bg_color = p.bg_input;

    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = p.bg_input;
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, p.text_muted);
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, p.border);
    widgets.noninteractive.rounding = rounding;

    widgets.inactive.bg_fill = p.bg_input;
    widgets.inactive.fg_stroke = Stroke::new(1.0, p.text_primary);
    widgets.inactive.bg_stroke = Stroke::new(1.0, p.border_light);
    widgets.inactive.rounding = rounding;

    widgets.hovered.bg_fill = p.button_hover;
    widgets.hovered.fg_stroke = Stroke::new(1.0, p.text_primary);
    widgets.hovered.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.hovered.rounding = rounding;

    widgets.active.bg_fill = accent::BLUE;
    widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    widgets.active.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.active.rounding = rounding;

    widgets.open.bg_fill = p.bg_input;
    widgets.open.fg_stroke = Stroke::new(1.0, p.text_primary);
    widgets.open.bg_stroke = Stroke::new(1.0, p.border_light);
    widgets.open.rounding = rounding;

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(selection_alpha);
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);

    visuals
}

fn configure_fonts_and_spacing(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (TextStyle::Small, FontId::new(10.0, FontFamily::Monospace)),
        (TextStyle::Body, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Heading, FontId::new(14.0, FontFamily::Monospace)),
        (
            TextStyle::Monospace,
            FontId::new(12.0, FontFamily::Monospace),
        ),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.indent = 16.0;

    ctx.set_style(style);
}

/// Style a button as the primary action button.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(4.0))
}

/// Label button, filled with the label's color while it is the active
/// neuron's label.
pub fn label_button(label: Label, lit: bool) -> egui::Button<'static> {
    let button = egui::Button::new(label.name()).rounding(Rounding::same(4.0));
    if lit {
        button.fill(label_color(label)).selected(true)
    } else {
        button
    }
}

pub fn label_color(label: Label) -> Color32 {
    match label {
        Label::Keep => accent::GREEN,
        Label::Discard => accent::RED,
        Label::Unlabeled => accent::AMBER,
    }
}

/// Line color of a trace kind in the temporal plot.
pub fn trace_color(kind: TraceKind) -> Color32 {
    match kind {
        TraceKind::Lowpass | TraceKind::Denoised => accent::RED,
        TraceKind::Raw | TraceKind::Reraw => accent::BLUE,
        TraceKind::Deconvolved => accent::GREEN,
    }
}

pub fn trace_style(kind: TraceKind) -> LineStyle {
    match kind {
        TraceKind::Deconvolved => LineStyle::dashed_loose(),
        _ => LineStyle::Solid,
    }
}

/// Create a section header label.
pub fn section_header(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(11.0).strong()
}

/// Create a form label.
pub fn form_label(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(10.0)
}

/// Create a stat label (left column).
pub fn stat_label(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0).weak()
}

/// Create a stat value (right column).
pub fn stat_value(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0)
}
