//! SVG serialization and rasterization of a scene graph.

pub mod raster;
pub mod svg;

pub use raster::{FrameRgba, Rasterizer};
pub use svg::{SvgOptions, write_svg};
