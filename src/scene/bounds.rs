use crate::foundation::core::{BezPath, Rect};
use crate::scene::transform::parse_numbers;
use kurbo::Shape as _;
use std::collections::BTreeMap;

/// Local (pre-transform) bounds of a single shape element, or `None` for non-geometric tags.
///
/// Text bounds are estimated from the font size and character count; the scene only needs them
/// to place transform origins.
pub(crate) fn shape_bounds(
    tag: &str,
    attrs: &BTreeMap<String, String>,
    text: Option<&str>,
) -> Option<Rect> {
    let num = |name: &str| -> f64 {
        attrs
            .get(name)
            .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    match tag {
        "path" => {
            let d = attrs.get("d")?;
            match BezPath::from_svg(d) {
                Ok(path) => Some(path.bounding_box()),
                Err(err) => {
                    tracing::warn!(%err, "unparseable path data; bounds unknown");
                    None
                }
            }
        }
        "rect" | "image" => Some(Rect::new(
            num("x"),
            num("y"),
            num("x") + num("width"),
            num("y") + num("height"),
        )),
        "circle" => {
            let (cx, cy, r) = (num("cx"), num("cy"), num("r"));
            Some(Rect::new(cx - r, cy - r, cx + r, cy + r))
        }
        "ellipse" => {
            let (cx, cy, rx, ry) = (num("cx"), num("cy"), num("rx"), num("ry"));
            Some(Rect::new(cx - rx, cy - ry, cx + rx, cy + ry))
        }
        "line" => Some(
            Rect::new(num("x1"), num("y1"), num("x2"), num("y2")).abs(),
        ),
        "polygon" | "polyline" => {
            let pts = parse_numbers(attrs.get("points")?).ok()?;
            pts.chunks_exact(2)
                .map(|p| Rect::new(p[0], p[1], p[0], p[1]))
                .reduce(|a, b| a.union(b))
        }
        "text" => {
            let size = attrs
                .get("font-size")
                .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
                .unwrap_or(16.0);
            let chars = text.map(|t| t.chars().count()).unwrap_or(0) as f64;
            let width = chars * size * 0.6;
            let x = num("x");
            let x0 = match attrs.get("text-anchor").map(String::as_str) {
                Some("middle") => x - width / 2.0,
                Some("end") => x - width,
                _ => x,
            };
            let y = num("y");
            Some(Rect::new(x0, y - size * 0.8, x0 + width, y + size * 0.2))
        }
        _ => None,
    }
}
