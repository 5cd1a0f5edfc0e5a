use crate::animation::ease::Ease;
use crate::animation::tween::{
    DEFAULT_DURATION, PropTween, capture_starts, pair_props, write_progress,
};
use crate::animation::value::{Origin, Prop, PropValue};
use crate::animation::vars::Vars;
use crate::scene::graph::{NodeId, SceneGraph};

/// One keyframe step: a property set on a target, placed at `at` within its timeline.
#[derive(Debug, Clone)]
pub struct Step {
    target: NodeId,
    tweens: Vec<PropTween>,
    start_sets: Vec<(Prop, PropValue)>,
    at: f64,
    duration: f64,
    ease: Ease,
    origin: Option<Origin>,
    immediate: bool,
    starts: Option<Vec<PropValue>>,
    last_local: Option<f64>,
}

impl Step {
    fn new(target: NodeId, from: Option<Vars>, to: Vars, at: f64) -> Self {
        let immediate = from.is_some();
        let (tweens, start_sets) = pair_props(from.as_ref(), &to);
        Self {
            target,
            tweens,
            start_sets,
            at: at.max(0.0),
            duration: to.duration.unwrap_or(DEFAULT_DURATION),
            ease: to.ease.unwrap_or_default(),
            origin: to.origin,
            immediate,
            starts: None,
            last_local: None,
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn at(&self) -> f64 {
        self.at
    }

    pub fn end(&self) -> f64 {
        self.at + self.duration
    }

    pub fn props(&self) -> impl Iterator<Item = &Prop> {
        self.tweens.iter().map(|t| &t.prop)
    }

    /// End value of `prop` in this step.
    pub fn end_value(&self, prop: &Prop) -> Option<PropValue> {
        self.tweens.iter().find(|t| t.prop == *prop).map(|t| t.to)
    }

    /// Start value of `prop`, once captured.
    pub fn start_value(&self, prop: &Prop) -> Option<PropValue> {
        let idx = self.tweens.iter().position(|t| t.prop == *prop)?;
        self.starts.as_ref().map(|s| s[idx])
    }

    fn local_progress(&self, time: f64) -> f64 {
        if self.duration <= 0.0 {
            return if time >= self.at { 1.0 } else { 0.0 };
        }
        ((time - self.at) / self.duration).clamp(0.0, 1.0)
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

    fn prime(&mut self, scene: &mut SceneGraph) {
        if !self.immediate {
            return;
        }
        self.start(scene);
        self.write(0.0, scene);
    }

    fn render(&mut self, time: f64, scene: &mut SceneGraph) {
        let local = self.local_progress(time);
        if self.starts.is_none() {
            // `to` steps stay dormant until the playhead first passes their offset.
            if local <= 0.0 {
                return;
            }
            self.start(scene);
        }
        if self.last_local == Some(local) {
            return;
        }
        self.write(local, scene);
    }

    fn write(&mut self, local: f64, scene: &mut SceneGraph) {
        self.last_local = Some(local);
        if let Some(starts) = &self.starts {
            write_progress(
                scene,
                self.target,
                &self.tweens,
                starts,
                self.ease.apply(local),
            );
        }
    }
}

/// Accumulates steps for a [`Timeline`]; submitted once at setup.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    name: String,
    steps: Vec<Step>,
}

impl TimelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Animate `target` from whatever it shows when the step first plays to `vars`.
    pub fn to(mut self, target: NodeId, vars: Vars, at: f64) -> Self {
        self.steps.push(Step::new(target, None, vars, at));
        self
    }

    /// Animate `target` from `from` to `to`; the `from` state renders as soon as the timeline is
    /// registered.
    pub fn from_to(mut self, target: NodeId, from: Vars, to: Vars, at: f64) -> Self {
        self.steps.push(Step::new(target, Some(from), to, at));
        self
    }

    pub fn build(self) -> Timeline {
        let duration = self.steps.iter().map(Step::end).fold(0.0, f64::max);
        Timeline {
            name: self.name,
            steps: self.steps,
            duration,
            last_progress: None,
        }
    }
}

/// An ordered group of steps driven by a single `0..=1` progress value.
#[derive(Debug, Clone)]
pub struct Timeline {
    name: String,
    steps: Vec<Step>,
    duration: f64,
    last_progress: Option<f64>,
}

impl Timeline {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the timeline in step time units (`max(at + duration)`).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Last rendered progress.
    pub fn progress(&self) -> Option<f64> {
        self.last_progress
    }

    /// Render the explicit start state of every `from_to` step.
    pub fn prime(&mut self, scene: &mut SceneGraph) {
        for step in &mut self.steps {
            step.prime(scene);
        }
    }

    /// Render at `progress`; returns `false` when the progress did not change.
    pub fn render(&mut self, progress: f64, scene: &mut SceneGraph) -> bool {
        let progress = progress.clamp(0.0, 1.0);
        if self.last_progress == Some(progress) {
            return false;
        }
        self.last_progress = Some(progress);
        let time = progress * self.duration;
        for step in &mut self.steps {
            step.render(time, scene);
        }
        true
    }
}
