//! Image and contour rendering helpers.

mod colormap;
mod palette;
mod texture;

pub use colormap::Colormap;
pub use palette::{contour_color, contour_fill};
pub use texture::reference_image;
