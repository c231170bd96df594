//! Colormaps for the reference image.

use crate::util::f32_to_u8;

/// Available colormaps for the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    /// Black to white.
    Grayscale,
    /// Approximate Viridis: blue to teal to green to yellow.
    Viridis,
    /// Black to red to yellow to white.
    Hot,
    /// Black to bright green.
    Green,
}

impl Colormap {
    pub const ALL: [Colormap; 4] = [
        Colormap::Grayscale,
        Colormap::Viridis,
        Colormap::Hot,
        Colormap::Green,
    ];

    /// Maps a normalized value in `[0, 1]` to RGBA bytes.
    #[must_use]
    pub fn apply(self, val: f32) -> [u8; 4] {
        let val = val.clamp(0.0, 1.0);
        match self {
            Colormap::Grayscale => {
                let v = f32_to_u8(val * 255.0);
                [v, v, v, 255]
            }
            Colormap::Viridis => [
                f32_to_u8(255.0 * val.powi(2)),
                f32_to_u8(255.0 * val),
                f32_to_u8(255.0 * (1.0 - val)),
                255,
            ],
            Colormap::Hot => {
                // black -> red over the lower third, then yellow, then white
                let r = f32_to_u8(val * 3.0 * 255.0);
                let g = f32_to_u8((val * 3.0 - 1.0) * 255.0);
                let b = f32_to_u8((val * 3.0 - 2.0) * 255.0);
                [r, g, b, 255]
            }
            Colormap::Green => [0, f32_to_u8(val * 255.0), 0, 255],
        }
    }
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Colormap::Grayscale => write!(f, "Grayscale"),
            Colormap::Viridis => write!(f, "Viridis"),
            Colormap::Hot => write!(f, "Hot"),
            Colormap::Green => write!(f, "Green"),
        }
    }
}
