use crate::animation::ease::Ease;
use crate::animation::value::{Lerp, Origin, Prop, PropValue};
use crate::animation::vars::{Repeat, Vars};
use crate::scene::graph::{NodeId, SceneGraph};

/// Duration used when an animation does not specify one.
pub const DEFAULT_DURATION: f64 = 0.5;

/// One property moving from an (optional, otherwise captured) start value to an end value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropTween {
    pub(crate) prop: Prop,
    pub(crate) from: Option<PropValue>,
    pub(crate) to: PropValue,
}

/// Pair `to` properties with their explicit `from` values. Properties present only in `from`
/// become start-time sets.
pub(crate) fn pair_props(from: Option<&Vars>, to: &Vars) -> (Vec<PropTween>, Vec<(Prop, PropValue)>) {
    let tweens = to
        .props
        .iter()
        .map(|(prop, value)| PropTween {
            prop: prop.clone(),
            from: from.and_then(|f| f.get(prop)),
            to: *value,
        })
        .collect();
    let start_sets = from
        .map(|f| {
            f.props
                .iter()
                .filter(|(prop, _)| to.get(prop).is_none())
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    (tweens, start_sets)
}

/// Start values, either explicit or read from the scene.
pub(crate) fn capture_starts(
    scene: &SceneGraph,
    target: NodeId,
    tweens: &[PropTween],
) -> Vec<PropValue> {
    tweens
        .iter()
        .map(|t| t.from.unwrap_or_else(|| scene.get(target, &t.prop)))
        .collect()
}

pub(crate) fn write_progress(
    scene: &mut SceneGraph,
    target: NodeId,
    tweens: &[PropTween],
    starts: &[PropValue],
    eased: f64,
) {
    for (tween, start) in tweens.iter().zip(starts) {
        scene.set(target, &tween.prop, PropValue::lerp(start, &tween.to, eased));
    }
}

/// Wall-clock driven tween: hook side effects and ambient loops.
#[derive(Debug, Clone)]
pub struct Tween {
    target: NodeId,
    tweens: Vec<PropTween>,
    start_sets: Vec<(Prop, PropValue)>,
    duration: f64,
    delay: f64,
    ease: Ease,
    repeat: Repeat,
    repeat_delay: f64,
    yoyo: bool,
    origin: Option<Origin>,
    immediate: bool,
    elapsed: f64,
    starts: Option<Vec<PropValue>>,
    finished: bool,
}

impl Tween {
    /// Tween from the node's values at first render to `vars`.
    pub fn to(target: NodeId, vars: Vars) -> Self {
        Self::build(target, None, vars)
    }

    /// Tween from explicit `from` values to `to`; the start is rendered when primed.
    pub fn from_to(target: NodeId, from: Vars, to: Vars) -> Self {
        Self::build(target, Some(from), to)
    }

    fn build(target: NodeId, from: Option<Vars>, to: Vars) -> Self {
        let immediate = from.is_some();
        let (tweens, start_sets) = pair_props(from.as_ref(), &to);
        Self {
            target,
            tweens,
            start_sets,
            duration: to.duration.unwrap_or(DEFAULT_DURATION),
            delay: to.delay,
            ease: to.ease.unwrap_or_default(),
            repeat: to.repeat,
            repeat_delay: to.repeat_delay,
            yoyo: to.yoyo,
            origin: to.origin,
            immediate,
            elapsed: 0.0,
            starts: None,
            finished: false,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_infinite(&self) -> bool {
        self.repeat == Repeat::Infinite
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total cycles played, `None` when infinite.
    pub fn cycles(&self) -> Option<u64> {
        match self.repeat {
            Repeat::Once => Some(1),
            Repeat::Count(n) => Some(u64::from(n) + 1),
            Repeat::Infinite => None,
        }
    }

    pub fn props(&self) -> impl Iterator<Item = &Prop> {
        self.tweens.iter().map(|t| &t.prop)
    }

    /// Render the explicit start state right away (`from_to` only).
    pub fn prime(&mut self, scene: &mut SceneGraph) {
        if !self.immediate {
            return;
        }
        self.start(scene);
        if let Some(starts) = &self.starts {
            write_progress(scene, self.target, &self.tweens, starts, 0.0);
        }
    }

    fn start(&mut self, scene: &mut SceneGraph) {
        if self.starts.is_some() {
            return;
        }
        if let Some(origin) = self.origin {
            scene.set_origin(self.target, origin);
        }
        for (prop, value) in &self.start_sets {
            scene.set(self.target, prop, *value);
        }
        self.starts = Some(capture_starts(scene, self.target, &self.tweens));
    }

    /// Drop properties another tween now owns. Returns `true` when nothing is left to animate.
    pub fn drop_props(&mut self, taken: &[Prop]) -> bool {
        let keep: Vec<bool> = self
            .tweens
            .iter()
            .map(|t| !taken.iter().any(|p| p.overlaps(&t.prop)))
            .collect();
        if let Some(starts) = &mut self.starts {
            let mut flags = keep.iter();
            starts.retain(|_| flags.next().copied().unwrap_or(true));
        }
        let mut flags = keep.iter();
        self.tweens.retain(|_| flags.next().copied().unwrap_or(true));
        self.tweens.is_empty()
    }

    /// Advance by `dt` seconds and write the resulting values. Returns `true` while active.
    pub fn tick(&mut self, dt: f64, scene: &mut SceneGraph) -> bool {
        if self.finished {
            return false;
        }
        self.elapsed += dt.max(0.0);
        let t = self.elapsed - self.delay;
        if t < 0.0 {
            return true;
        }

        let (iteration, local) = self.cycle_position(t);
        let local = if self.yoyo && iteration % 2 == 1 {
            1.0 - local
        } else {
            local
        };

        self.start(scene);
        if let Some(starts) = &self.starts {
            write_progress(
                scene,
                self.target,
                &self.tweens,
                starts,
                self.ease.apply(local),
            );
        }
        !self.finished
    }

    /// `(iteration, progress within iteration)` at active time `t`; marks completion.
    fn cycle_position(&mut self, t: f64) -> (u64, f64) {
        if self.duration <= 0.0 {
            if !self.is_infinite() {
                self.finished = true;
            }
            let last = self.cycles().unwrap_or(1).saturating_sub(1);
            return (last, 1.0);
        }

        let cycle = self.duration + self.repeat_delay;
        let iteration = (t / cycle).floor() as u64;
        if let Some(total) = self.cycles()
            && iteration >= total
        {
            self.finished = true;
            return (total - 1, 1.0);
        }
        let within = t - iteration as f64 * cycle;
        (iteration, (within / self.duration).min(1.0))
    }
}
