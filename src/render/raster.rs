use crate::foundation::color::Rgba;
use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use std::path::Path;
use std::sync::Arc;

/// Largest frame edge the rasterizer will allocate.
const MAX_DIM: u32 = 16_384;

/// Straight-alpha RGBA8 frame.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameRgba {
    /// Pixel at `(x, y)`, `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    pub fn save_png(&self, path: &Path) -> SkyscrollResult<()> {
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| SkyscrollError::render(format!("write png '{}': {e}", path.display())))
    }
}

/// Parses SVG text with `usvg` and paints it with `resvg`.
///
/// System fonts are loaded once, when the rasterizer is built.
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new() -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self {
            options: usvg::Options {
                fontdb: Arc::new(db),
                ..Default::default()
            },
        }
    }

    pub fn font_count(&self) -> usize {
        self.options.fontdb.len()
    }

    /// Render `svg` into a `width`x`height` frame, over `background` when given.
    pub fn render(
        &self,
        svg: &str,
        width: u32,
        height: u32,
        background: Option<Rgba>,
    ) -> SkyscrollResult<FrameRgba> {
        if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
            return Err(SkyscrollError::render(format!(
                "frame size {width}x{height} out of range (1..={MAX_DIM})"
            )));
        }
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| SkyscrollError::render(format!("parse svg: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| SkyscrollError::render("failed to allocate frame pixmap"))?;
        if let Some(bg) = background {
            let [r, g, b, a] = bg.to_rgba8();
            pixmap.fill(resvg::tiny_skia::Color::from_rgba8(r, g, b, a));
        }

        let sx = width as f32 / tree.size().width();
        let sy = height as f32 / tree.size().height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok(FrameRgba {
            width,
            height,
            data,
        })
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4" viewBox="0 0 4 4"><rect x="0" y="0" width="2" height="4" fill="#ff0000"/></svg>"##;

    #[test]
    fn paints_over_background() {
        let r = Rasterizer::new();
        let frame = r
            .render(RED_SQUARE, 4, 4, Some(Rgba::rgba(0.0, 0.0, 0.0, 1.0)))
            .unwrap();
        assert_eq!(frame.data.len(), 4 * 4 * 4);
        assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(3, 3), Some([0, 0, 0, 255]));
        assert_eq!(frame.pixel(4, 0), None);
    }

    #[test]
    fn rejects_bad_input() {
        let r = Rasterizer::new();
        assert!(r.render("<svg", 4, 4, None).is_err());
        assert!(r.render(RED_SQUARE, 0, 4, None).is_err());
    }
}
