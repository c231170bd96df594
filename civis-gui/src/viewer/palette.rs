//! Contour colours.

use eframe::egui::Color32;

const CONTOUR_PALETTE: [Color32; 19] = [
    Color32::from_rgb(0xe6, 0x19, 0x4b),
    Color32::from_rgb(0x3c, 0xb4, 0x4b),
    Color32::from_rgb(0xff, 0xe1, 0x19),
    Color32::from_rgb(0x43, 0x63, 0xd8),
    Color32::from_rgb(0xf5, 0x82, 0x31),
    Color32::from_rgb(0x91, 0x1e, 0xb4),
    Color32::from_rgb(0x42, 0xd4, 0xf4),
    Color32::from_rgb(0xf0, 0x32, 0xe6),
    Color32::from_rgb(0xbf, 0xef, 0x45),
    Color32::from_rgb(0xfa, 0xbe, 0xd4),
    Color32::from_rgb(0x46, 0x99, 0x90),
    Color32::from_rgb(0xdc, 0xbe, 0xff),
    Color32::from_rgb(0x9a, 0x63, 0x24),
    Color32::from_rgb(0xff, 0xfa, 0xc8),
    Color32::from_rgb(0x80, 0x00, 0x00),
    Color32::from_rgb(0xaa, 0xff, 0xc3),
    Color32::from_rgb(0x80, 0x80, 0x00),
    Color32::from_rgb(0xff, 0xd8, 0xb1),
    Color32::from_rgb(0x00, 0x00, 0x75),
];

/// Outline colour of the contour at `index`, cycling through the palette.
pub fn contour_color(index: usize) -> Color32 {
    CONTOUR_PALETTE[index % CONTOUR_PALETTE.len()]
}

/// Translucent fill; the active contour is drawn more opaque.
pub fn contour_fill(color: Color32, active: bool) -> Color32 {
    let alpha = if active { 170 } else { 100 };
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(contour_color(0), contour_color(19));
        assert_ne!(contour_color(0), contour_color(1));
    }
}
