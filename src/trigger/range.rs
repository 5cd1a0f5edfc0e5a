use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use std::fmt;
use std::str::FromStr;

/// A position along an element (or the viewport) measured from its top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the element's height.
    Percent(f64),
    /// Absolute pixels from the element's top.
    Px(f64),
}

impl Edge {
    /// Offset from the top of an element of height `extent`.
    pub fn offset(self, extent: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => extent / 2.0,
            Self::Bottom => extent,
            Self::Percent(p) => extent * p / 100.0,
            Self::Px(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bad = || SkyscrollError::parse(format!("invalid scroll edge \"{s}\""));
        match s {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    pct.parse().map(Self::Percent).map_err(|_| bad())
                } else {
                    s.strip_suffix("px")
                        .unwrap_or(s)
                        .parse()
                        .map(Self::Px)
                        .map_err(|_| bad())
                }
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Center => f.write_str("center"),
            Self::Bottom => f.write_str("bottom"),
            Self::Percent(p) => write!(f, "{p}%"),
            Self::Px(px) => write!(f, "{px}"),
        }
    }
}

/// `<trigger-edge> <viewport-edge>`: the scroll offset at which the trigger's edge meets the
/// viewport's edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangePoint {
    pub trigger: Edge,
    pub viewport: Edge,
}

impl RangePoint {
    pub fn resolve(self, trigger: TriggerBox, viewport_height: f64) -> f64 {
        trigger.top + self.trigger.offset(trigger.height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for RangePoint {
    type Err = SkyscrollError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(trigger), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(SkyscrollError::parse(format!(
                "scroll range point \"{s}\" must be \"<trigger-edge> <viewport-edge>\""
            )));
        };
        Ok(Self {
            trigger: trigger.parse()?,
            viewport: viewport.parse()?,
        })
    }
}

impl fmt::Display for RangePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.trigger, self.viewport)
    }
}

/// Layout of the trigger element in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerBox {
    pub top: f64,
    pub height: f64,
}

/// Start/end points of a trigger region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollRange {
    pub start: RangePoint,
    pub end: RangePoint,
}

impl ScrollRange {
    pub fn parse(start: &str, end: &str) -> SkyscrollResult<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Measure against the current layout. The start must precede the end.
    pub fn resolve(&self, trigger: TriggerBox, viewport_height: f64) -> SkyscrollResult<ResolvedRange> {
        let start = self.start.resolve(trigger, viewport_height);
        let end = self.end.resolve(trigger, viewport_height);
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return Err(SkyscrollError::validation(format!(
                "scroll range \"{}\" -> \"{}\" resolves to {start}..{end}; start must precede end",
                self.start, self.end
            )));
        }
        Ok(ResolvedRange { start, end })
    }
}

/// Which side of a resolved range the scroll position is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RangeState {
    Before,
    Active,
    After,
}

/// A range measured in scroll pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ResolvedRange {
    pub start: f64,
    pub end: f64,
}

impl ResolvedRange {
    /// Raw progress `clamp((scroll - start) / (end - start), 0, 1)`.
    pub fn progress(&self, scroll: f64) -> f64 {
        ((scroll - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    /// `Active` strictly inside the range, `Before`/`After` at or beyond its ends.
    pub fn state(&self, scroll: f64) -> RangeState {
        let p = self.progress(scroll);
        if p <= 0.0 {
            RangeState::Before
        } else if p >= 1.0 {
            RangeState::After
        } else {
            RangeState::Active
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPACER: TriggerBox = TriggerBox {
        top: 0.0,
        height: 6000.0,
    };

    #[test]
    fn parses_authored_points() {
        assert_eq!(
            "top top".parse::<RangePoint>().unwrap(),
            RangePoint {
                trigger: Edge::Top,
                viewport: Edge::Top
            }
        );
        assert_eq!(
            "45% 100%".parse::<RangePoint>().unwrap(),
            RangePoint {
                trigger: Edge::Percent(45.0),
                viewport: Edge::Percent(100.0)
            }
        );
        assert_eq!(
            "2150 100%".parse::<RangePoint>().unwrap().trigger,
            Edge::Px(2150.0)
        );
        assert_eq!("6000 bottom".parse::<RangePoint>().unwrap().viewport, Edge::Bottom);
        assert!("top".parse::<RangePoint>().is_err());
        assert!("top top top".parse::<RangePoint>().is_err());
        assert!("middle top".parse::<RangePoint>().is_err());
    }

    #[test]
    fn resolves_against_spacer_and_viewport() {
        let r = ScrollRange::parse("top top", "45% 100%").unwrap();
        let rr = r.resolve(SPACER, 900.0).unwrap();
        assert_eq!(rr.start, 0.0);
        assert_eq!(rr.end, 1800.0);

        let r = ScrollRange::parse("70% 50%", "bottom 100%").unwrap();
        let rr = r.resolve(SPACER, 900.0).unwrap();
        assert_eq!(rr.start, 3750.0);
        assert_eq!(rr.end, 5100.0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let r = ScrollRange::parse("1% top", "2150 100%").unwrap();
        assert!(r.resolve(SPACER, 900.0).is_ok());
        let err = r.resolve(SPACER, 2200.0).unwrap_err();
        assert!(matches!(err, SkyscrollError::Validation(_)));
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let rr = ResolvedRange {
            start: 900.0,
            end: 1500.0,
        };
        let mut prev = -1.0;
        for scroll in (0..=2400).step_by(7) {
            let p = rr.progress(f64::from(scroll));
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= prev);
            prev = p;
        }
        assert_eq!(rr.state(900.0), RangeState::Before);
        assert_eq!(rr.state(901.0), RangeState::Active);
        assert_eq!(rr.state(1500.0), RangeState::After);
    }
}
