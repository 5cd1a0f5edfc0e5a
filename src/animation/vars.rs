use crate::animation::ease::Ease;
use crate::animation::value::{Origin, Prop, PropValue};
use crate::foundation::color::Rgba;

/// How many extra cycles a time-based tween plays after the first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Repeat {
    #[default]
    Once,
    Count(u32),
    Infinite,
}

/// Plain-data property set plus timing options, shared by timeline steps, time-based tweens and
/// immediate sets. Timelines read `ease`, `duration` and `origin`; time-based tweens read all of
/// the timing fields; sets read only the properties and origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vars {
    pub props: Vec<(Prop, PropValue)>,
    pub ease: Option<Ease>,
    pub duration: Option<f64>,
    pub delay: f64,
    pub repeat: Repeat,
    pub repeat_delay: f64,
    pub yoyo: bool,
    pub origin: Option<Origin>,
}

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `prop` to `value`, replacing an earlier entry for the same property.
    pub fn prop(mut self, prop: Prop, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        match self.props.iter_mut().find(|(p, _)| *p == prop) {
            Some(slot) => slot.1 = value,
            None => self.props.push((prop, value)),
        }
        self
    }

    pub fn x(self, v: f64) -> Self {
        self.prop(Prop::X, v)
    }

    pub fn y(self, v: f64) -> Self {
        self.prop(Prop::Y, v)
    }

    pub fn scale(self, v: f64) -> Self {
        self.prop(Prop::Scale, v)
    }

    pub fn scale_x(self, v: f64) -> Self {
        self.prop(Prop::ScaleX, v)
    }

    pub fn rotation(self, degrees: f64) -> Self {
        self.prop(Prop::Rotation, degrees)
    }

    pub fn opacity(self, v: f64) -> Self {
        self.prop(Prop::Opacity, v)
    }

    pub fn visible(self, v: bool) -> Self {
        self.prop(Prop::Visibility, v)
    }

    pub fn attr(self, name: &str, value: impl Into<PropValue>) -> Self {
        self.prop(Prop::attr(name), value)
    }

    pub fn attr_color(self, name: &str, color: Rgba) -> Self {
        self.prop(Prop::attr(name), color)
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = Some(ease);
        self
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs.max(0.0));
        self
    }

    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = secs.max(0.0);
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn repeat_delay(mut self, secs: f64) -> Self {
        self.repeat_delay = secs.max(0.0);
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn get(&self, prop: &Prop) -> Option<PropValue> {
        self.props
            .iter()
            .find(|(p, _)| p == prop)
            .map(|(_, value)| *value)
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}
