use crate::foundation::color::Rgba;
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{SkyscrollError, SkyscrollResult};

/// Interpolation contract for animatable value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Rgba {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            r: f64::lerp(&a.r, &b.r, t),
            g: f64::lerp(&a.g, &b.g, t),
            b: f64::lerp(&a.b, &b.b, t),
            a: f64::lerp(&a.a, &b.a, t),
        }
    }
}

/// An animatable property of a scene node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Prop {
    X,
    Y,
    /// Uniform scale; writes both axes, reads the x axis.
    Scale,
    ScaleX,
    ScaleY,
    /// Rotation in degrees.
    Rotation,
    Opacity,
    Visibility,
    /// A raw element attribute (`cy`, `offset`, `stop-color`, ...).
    Attr(String),
}

impl Prop {
    pub fn attr(name: impl Into<String>) -> Self {
        Self::Attr(name.into())
    }

    /// `true` when writing `self` can clobber a value written through `other`.
    pub fn overlaps(&self, other: &Prop) -> bool {
        match (self, other) {
            (Prop::Scale, Prop::ScaleX | Prop::ScaleY) | (Prop::ScaleX | Prop::ScaleY, Prop::Scale) => {
                true
            }
            (a, b) => a == b,
        }
    }
}

impl std::fmt::Display for Prop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prop::X => f.write_str("x"),
            Prop::Y => f.write_str("y"),
            Prop::Scale => f.write_str("scale"),
            Prop::ScaleX => f.write_str("scaleX"),
            Prop::ScaleY => f.write_str("scaleY"),
            Prop::Rotation => f.write_str("rotation"),
            Prop::Opacity => f.write_str("opacity"),
            Prop::Visibility => f.write_str("visibility"),
            Prop::Attr(name) => write!(f, "attr:{name}"),
        }
    }
}

/// Value written to a [`Prop`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Number(f64),
    Color(Rgba),
    Visible(bool),
}

impl PropValue {
    /// Parse an authored attribute value: a number when it reads as one, else a color.
    pub fn parse_attr(s: &str) -> SkyscrollResult<Self> {
        let trimmed = s.trim();
        let numeric = trimmed.strip_suffix("px").unwrap_or(trimmed);
        if let Ok(v) = numeric.parse::<f64>() {
            return Ok(Self::Number(v));
        }
        Rgba::parse(trimmed)
            .map(Self::Color)
            .map_err(|_| SkyscrollError::parse(format!("attribute value \"{s}\" is not animatable")))
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_color(self) -> Option<Rgba> {
        match self {
            Self::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Attribute text for SVG output.
    pub fn to_attr(self) -> String {
        match self {
            Self::Number(v) => crate::foundation::core::fmt_num(v),
            Self::Color(c) => c.to_css(),
            Self::Visible(true) => "visible".to_owned(),
            Self::Visible(false) => "hidden".to_owned(),
        }
    }
}

impl Lerp for PropValue {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        // Endpoints are exact so settled animations land on their authored values.
        if t >= 1.0 {
            return *b;
        }
        match (a, b) {
            (Self::Number(a), Self::Number(b)) => Self::Number(f64::lerp(a, b, t)),
            (Self::Color(a), Self::Color(b)) => Self::Color(Rgba::lerp(a, b, t)),
            // Discrete values snap to the end as soon as the tween has started.
            _ => {
                if t > 0.0 {
                    *b
                } else {
                    *a
                }
            }
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Rgba> for PropValue {
    fn from(c: Rgba) -> Self {
        Self::Color(c)
    }
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Visible(v)
    }
}

/// One axis of a transform origin.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum OriginAxis {
    /// Percentage of the node's local bounds.
    Percent(f64),
    /// Absolute offset from the bounds' top-left corner in user units.
    Px(f64),
}

impl OriginAxis {
    fn parse(s: &str) -> SkyscrollResult<Self> {
        let s = s.trim();
        let bad = || SkyscrollError::parse(format!("invalid transform origin component \"{s}\""));
        match s {
            "left" | "top" => return Ok(Self::Percent(0.0)),
            "center" => return Ok(Self::Percent(50.0)),
            "right" | "bottom" => return Ok(Self::Percent(100.0)),
            _ => {}
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct.parse().map(Self::Percent).map_err(|_| bad());
        }
        s.strip_suffix("px")
            .unwrap_or(s)
            .parse()
            .map(Self::Px)
            .map_err(|_| bad())
    }

    fn resolve(self, start: f64, extent: f64) -> f64 {
        match self {
            Self::Percent(p) => start + extent * p / 100.0,
            Self::Px(v) => start + v,
        }
    }
}

/// Transform origin relative to a node's local bounds; defaults to the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Origin {
    pub x: OriginAxis,
    pub y: OriginAxis,
}

impl Default for Origin {
    fn default() -> Self {
        Self::percent(0.0, 0.0)
    }
}

impl Origin {
    pub const fn percent(x: f64, y: f64) -> Self {
        Self {
            x: OriginAxis::Percent(x),
            y: OriginAxis::Percent(y),
        }
    }

    pub fn resolve(self, bounds: Rect) -> Point {
        Point::new(
            self.x.resolve(bounds.x0, bounds.width()),
            self.y.resolve(bounds.y0, bounds.height()),
        )
    }
}

impl std::str::FromStr for Origin {
    type Err = SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let x = parts
            .next()
            .ok_or_else(|| SkyscrollError::parse("empty transform origin"))?;
        let y = parts.next().unwrap_or(x);
        if parts.next().is_some() {
            return Err(SkyscrollError::parse(format!(
                "transform origin \"{s}\" has more than two components"
            )));
        }
        Ok(Self {
            x: OriginAxis::parse(x)?,
            y: OriginAxis::parse(y)?,
        })
    }
}
