//! The scrolling host: viewport size, scroll offset, spacer geometry and scroll listeners.

use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use crate::trigger::range::TriggerBox;
use slotmap::{SlotMap, new_key_type};
use std::fmt;
use std::str::FromStr;

new_key_type! {
    pub struct ListenerId;
}

pub const DEFAULT_WIDTH: f64 = 1440.0;
pub const DEFAULT_HEIGHT: f64 = 900.0;
/// Height of the scroll-distance element every trigger measures against.
pub const SPACER_HEIGHT: f64 = 6000.0;

/// Registration record of a scroll listener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    pub owner: String,
    pub passive: bool,
}

#[derive(Debug)]
pub struct Viewport {
    width: f64,
    height: f64,
    scroll_y: f64,
    spacer: TriggerBox,
    listeners: SlotMap<ListenerId, Listener>,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> SkyscrollResult<Self> {
        Self::with_spacer(width, height, SPACER_HEIGHT)
    }

    pub fn with_spacer(width: f64, height: f64, spacer_height: f64) -> SkyscrollResult<Self> {
        validate_size(width, height)?;
        if !(spacer_height.is_finite() && spacer_height > 0.0) {
            return Err(SkyscrollError::validation(format!(
                "spacer height must be > 0, got {spacer_height}"
            )));
        }
        Ok(Self {
            width,
            height,
            scroll_y: 0.0,
            spacer: TriggerBox {
                top: 0.0,
                height: spacer_height,
            },
            listeners: SlotMap::with_key(),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Layout box of the spacer element.
    pub fn trigger_box(&self) -> TriggerBox {
        self.spacer
    }

    /// Largest reachable scroll offset.
    pub fn max_scroll(&self) -> f64 {
        (self.spacer.top + self.spacer.height - self.height).max(0.0)
    }

    /// Scroll to `y`, clamped to the scrollable extent. Returns `true` if the offset changed.
    pub fn scroll_to(&mut self, y: f64) -> bool {
        let y = if y.is_finite() { y } else { 0.0 };
        let y = y.clamp(0.0, self.max_scroll());
        let changed = y != self.scroll_y;
        self.scroll_y = y;
        changed
    }

    /// Scroll to a fraction of the scrollable extent.
    pub fn scroll_to_fraction(&mut self, fraction: f64) -> bool {
        self.scroll_to(fraction.clamp(0.0, 1.0) * self.max_scroll())
    }

    pub fn resize(&mut self, width: f64, height: f64) -> SkyscrollResult<()> {
        validate_size(width, height)?;
        self.width = width;
        self.height = height;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
        Ok(())
    }

    pub fn subscribe(&mut self, owner: impl Into<String>) -> ListenerId {
        self.listeners.insert(Listener {
            owner: owner.into(),
            passive: true,
        })
    }

    /// Remove a listener; unknown handles are ignored.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id).is_some()
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listeners(&self) -> impl Iterator<Item = (ListenerId, &Listener)> {
        self.listeners.iter()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scroll_y: 0.0,
            spacer: TriggerBox {
                top: 0.0,
                height: SPACER_HEIGHT,
            },
            listeners: SlotMap::with_key(),
        }
    }
}

fn validate_size(width: f64, height: f64) -> SkyscrollResult<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(SkyscrollError::validation(format!(
            "viewport must be non-empty, got {width}x{height}"
        )))
    }
}

/// One width feature of a media query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidthFeature {
    Max(f64),
    Min(f64),
}

/// Width-based media query, e.g. `(max-width: 1922px)` or
/// `(min-width: 600px) and (max-width: 900px)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    features: Vec<WidthFeature>,
}

impl MediaQuery {
    pub fn matches(&self, viewport: &Viewport) -> bool {
        self.features.iter().all(|f| match *f {
            WidthFeature::Max(w) => viewport.width() <= w,
            WidthFeature::Min(w) => viewport.width() >= w,
        })
    }
}

impl FromStr for MediaQuery {
    type Err = SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |why: &str| SkyscrollError::parse(format!("media query \"{s}\": {why}"));
        let mut features = Vec::new();
        for part in s.split(" and ") {
            let inner = part
                .trim()
                .strip_prefix('(')
                .and_then(|p| p.strip_suffix(')'))
                .ok_or_else(|| bad("expected a parenthesized feature"))?;
            let (name, value) = inner
                .split_once(':')
                .ok_or_else(|| bad("expected `name: value`"))?;
            let value = value.trim();
            let px: f64 = value
                .strip_suffix("px")
                .unwrap_or(value)
                .trim()
                .parse()
                .map_err(|_| bad("width must be a pixel length"))?;
            features.push(match name.trim() {
                "max-width" => WidthFeature::Max(px),
                "min-width" => WidthFeature::Min(px),
                other => return Err(bad(&format!("unsupported feature `{other}`"))),
            });
        }
        Ok(Self { features })
    }
}

impl fmt::Display for MediaQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, feature) in self.features.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            match feature {
                WidthFeature::Max(w) => write!(f, "(max-width: {w}px)")?,
                WidthFeature::Min(w) => write!(f, "(min-width: {w}px)")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_is_clamped_to_spacer() {
        let mut vp = Viewport::default();
        assert_eq!(vp.max_scroll(), 5100.0);
        assert!(vp.scroll_to(9000.0));
        assert_eq!(vp.scroll_y(), 5100.0);
        assert!(!vp.scroll_to(5100.0));
        vp.scroll_to(-4.0);
        assert_eq!(vp.scroll_y(), 0.0);
        vp.scroll_to_fraction(0.5);
        assert_eq!(vp.scroll_y(), 2550.0);
    }

    #[test]
    fn resize_reclamps_scroll() {
        let mut vp = Viewport::default();
        vp.scroll_to_fraction(1.0);
        vp.resize(800.0, 2000.0).unwrap();
        assert_eq!(vp.scroll_y(), 4000.0);
        assert!(vp.resize(0.0, 10.0).is_err());
    }

    #[test]
    fn listeners_are_handles() {
        let mut vp = Viewport::default();
        let a = vp.subscribe("scene");
        assert!(vp.is_subscribed(a));
        assert_eq!(vp.listener_count(), 1);
        assert!(vp.unsubscribe(a));
        assert!(!vp.unsubscribe(a));
        assert!(!vp.is_subscribed(a));
        assert_eq!(vp.listener_count(), 0);
    }

    #[test]
    fn media_queries() {
        let q: MediaQuery = "(max-width: 1922px)".parse().unwrap();
        assert!(q.matches(&Viewport::default()));
        assert!(!q.matches(&Viewport::new(2560.0, 1440.0).unwrap()));
        assert_eq!(q.to_string(), "(max-width: 1922px)");

        let q: MediaQuery = "(min-width: 600px) and (max-width: 900px)".parse().unwrap();
        assert!(q.matches(&Viewport::new(700.0, 500.0).unwrap()));
        assert!(!q.matches(&Viewport::new(1000.0, 500.0).unwrap()));

        assert!("max-width: 10px".parse::<MediaQuery>().is_err());
        assert!("(orientation: landscape)".parse::<MediaQuery>().is_err());
    }
}
