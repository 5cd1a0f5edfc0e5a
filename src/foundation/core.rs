use crate::foundation::error::{SkyscrollError, SkyscrollResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// SVG `viewBox` of the scene in user units.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    /// Create a validated view box with positive extent.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> SkyscrollResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(SkyscrollError::validation(
                "ViewBox width and height must be finite and > 0",
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    pub fn to_attr(self) -> String {
        format!(
            "{} {} {} {}",
            fmt_num(self.x),
            fmt_num(self.y),
            fmt_num(self.width),
            fmt_num(self.height)
        )
    }
}

/// Format a number for SVG output: at most four decimals, no trailing zeros, no `-0`.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let mut s = format!("{:.4}", v);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        s = "0".to_owned();
    }
    s
}
