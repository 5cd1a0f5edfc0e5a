use crate::animation::timeline::Timeline;
use crate::animation::tween::Tween;
use crate::animation::value::{Prop, PropValue};
use crate::animation::vars::Vars;
use crate::foundation::error::SkyscrollResult;
use crate::scene::graph::{NodeId, SceneGraph};
use crate::trigger::hooks::{EffectCtx, HookFn, HookKind, transitions};
use crate::trigger::range::{RangeState, ResolvedRange, ScrollRange};
use crate::trigger::scrub::{Scrub, ScrubDriver};
use crate::viewport::{MediaQuery, Viewport};
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

new_key_type! {
    pub struct TriggerId;
    pub struct LoopId;
    pub struct TweenId;
    pub struct MediaRuleId;
}

/// Any handle the registry hands out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationHandle {
    Trigger(TriggerId),
    Loop(LoopId),
    Tween(TweenId),
    MediaRule(MediaRuleId),
}

impl From<TriggerId> for AnimationHandle {
    fn from(id: TriggerId) -> Self {
        Self::Trigger(id)
    }
}

impl From<LoopId> for AnimationHandle {
    fn from(id: LoopId) -> Self {
        Self::Loop(id)
    }
}

impl From<TweenId> for AnimationHandle {
    fn from(id: TweenId) -> Self {
        Self::Tween(id)
    }
}

impl From<MediaRuleId> for AnimationHandle {
    fn from(id: MediaRuleId) -> Self {
        Self::MediaRule(id)
    }
}

/// A scrubbed timeline bound to a scroll range, plus its boundary hooks.
pub struct Trigger {
    range: ScrollRange,
    resolved: Option<ResolvedRange>,
    driver: ScrubDriver,
    timeline: Timeline,
    state: Option<RangeState>,
    raw: f64,
    hooks: SmallVec<[(HookKind, HookFn); 2]>,
}

impl Trigger {
    pub fn name(&self) -> &str {
        self.timeline.name()
    }

    pub fn range(&self) -> &ScrollRange {
        &self.range
    }

    /// Range in scroll pixels as of the last refresh.
    pub fn resolved(&self) -> Option<ResolvedRange> {
        self.resolved
    }

    pub fn scrub(&self) -> Scrub {
        self.driver.scrub()
    }

    /// Unsmoothed progress at the last scroll.
    pub fn raw_progress(&self) -> f64 {
        self.raw
    }

    /// Progress the timeline was last rendered at.
    pub fn progress(&self) -> f64 {
        self.driver.current()
    }

    pub fn state(&self) -> Option<RangeState> {
        self.state
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    /// Recompute raw progress at `scroll` and run the hooks of any boundary crossed.
    fn update(&mut self, scroll: f64, scene: &mut SceneGraph, spawned: &mut Vec<Tween>) {
        let Some(resolved) = self.resolved else {
            return;
        };
        self.raw = resolved.progress(scroll);
        let next = resolved.state(scroll);
        let prev = self.state.replace(next).unwrap_or(RangeState::Before);
        for kind in transitions(prev, next) {
            tracing::debug!(trigger = self.timeline.name(), ?kind, scroll, "hook");
            for (hook_kind, hook) in &mut self.hooks {
                if *hook_kind == kind {
                    let mut ctx = EffectCtx::new(scene);
                    hook(&mut ctx);
                    spawned.extend(ctx.into_spawned());
                }
            }
        }
    }

    fn render(&mut self, scene: &mut SceneGraph) {
        self.timeline.render(self.driver.current(), scene);
    }
}

struct MediaRule {
    query: MediaQuery,
    sets: Vec<(NodeId, Vars)>,
    /// Values overwritten while the rule is applied.
    saved: Option<Vec<(NodeId, Prop, PropValue)>>,
}

impl MediaRule {
    fn sync(&mut self, viewport: &Viewport, scene: &mut SceneGraph) {
        let matches = self.query.matches(viewport);
        match (matches, self.saved.is_some()) {
            (true, false) => {
                let mut saved = Vec::new();
                for (target, vars) in &self.sets {
                    for (prop, _) in &vars.props {
                        saved.push((*target, prop.clone(), scene.get(*target, prop)));
                    }
                    scene.apply(*target, vars);
                }
                tracing::debug!(query = %self.query, "media rule applied");
                self.saved = Some(saved);
            }
            (false, true) => {
                for (target, prop, value) in self.saved.take().into_iter().flatten() {
                    scene.set(target, &prop, value);
                }
                tracing::debug!(query = %self.query, "media rule reverted");
            }
            _ => {}
        }
    }
}

/// Live entity counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    pub triggers: usize,
    pub hooks: usize,
    pub loops: usize,
    pub tweens: usize,
    pub media_rules: usize,
}

/// Owns every scroll trigger, loop, in-flight tween and media rule of a mounted scene.
///
/// Triggers render in registration order, so overlapping writes resolve last-write-wins.
#[derive(Default)]
pub struct AnimationRegistry {
    triggers: SlotMap<TriggerId, Trigger>,
    order: Vec<TriggerId>,
    loops: SlotMap<LoopId, Tween>,
    tweens: SlotMap<TweenId, Tween>,
    media: SlotMap<MediaRuleId, MediaRule>,
    scroll: f64,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `timeline` to `range`. Explicit `from_to` starts render immediately; the range is
    /// measured at the next [`refresh`](Self::refresh).
    pub fn create_timeline(
        &mut self,
        range: ScrollRange,
        scrub: Scrub,
        mut timeline: Timeline,
        scene: &mut SceneGraph,
    ) -> TriggerId {
        timeline.prime(scene);
        let id = self.triggers.insert(Trigger {
            range,
            resolved: None,
            driver: ScrubDriver::new(scrub, 0.0),
            timeline,
            state: None,
            raw: 0.0,
            hooks: SmallVec::new(),
        });
        self.order.push(id);
        id
    }

    /// Attach a hook to a trigger. Returns `false` for a dead handle.
    pub fn on(
        &mut self,
        trigger: TriggerId,
        kind: HookKind,
        hook: impl FnMut(&mut EffectCtx<'_>) + 'static,
    ) -> bool {
        match self.triggers.get_mut(trigger) {
            Some(t) => {
                t.hooks.push((kind, Box::new(hook)));
                true
            }
            None => false,
        }
    }

    /// Register an ambient loop; it only stops when killed.
    pub fn create_loop(&mut self, mut tween: Tween, scene: &mut SceneGraph) -> LoopId {
        tween.prime(scene);
        self.loops.insert(tween)
    }

    /// Start a time-based tween. Properties it animates are taken away from older tweens on the
    /// same node; a tween left with nothing to animate is killed.
    pub fn spawn_tween(&mut self, mut tween: Tween, scene: &mut SceneGraph) -> TweenId {
        let target = tween.target();
        let taken: Vec<Prop> = tween.props().cloned().collect();
        self.tweens
            .retain(|_, older| older.target() != target || !older.drop_props(&taken));
        tween.prime(scene);
        self.tweens.insert(tween)
    }

    /// Apply `vars` to `target` immediately.
    pub fn set(&mut self, target: NodeId, vars: &Vars, scene: &mut SceneGraph) {
        scene.apply(target, vars);
    }

    /// Write `sets` while `query` matches the viewport and restore the overwritten values once
    /// it stops matching. Evaluated at refresh.
    pub fn add_media_rule(&mut self, query: MediaQuery, sets: Vec<(NodeId, Vars)>) -> MediaRuleId {
        self.media.insert(MediaRule {
            query,
            sets,
            saved: None,
        })
    }

    /// Re-measure every range against the current layout, re-evaluate media rules and snap each
    /// timeline to the current scroll position.
    ///
    /// A range whose start does not precede its end stays dormant and its error is returned after
    /// every other trigger has been refreshed.
    pub fn refresh(&mut self, viewport: &Viewport, scene: &mut SceneGraph) -> SkyscrollResult<()> {
        for rule in self.media.values_mut() {
            rule.sync(viewport, scene);
        }

        let trigger_box = viewport.trigger_box();
        let max_scroll = viewport.max_scroll();
        let mut first_err = None;
        for &id in &self.order {
            let Some(trigger) = self.triggers.get_mut(id) else {
                continue;
            };
            match trigger.range.resolve(trigger_box, viewport.height()) {
                Ok(resolved) => {
                    if resolved.end > max_scroll {
                        tracing::warn!(
                            trigger = trigger.name(),
                            end = resolved.end,
                            max_scroll,
                            "scroll range ends beyond the maximum scroll offset and never completes"
                        );
                    }
                    trigger.resolved = Some(resolved);
                }
                Err(err) => {
                    tracing::error!(trigger = trigger.name(), %err, "invalid scroll range");
                    trigger.resolved = None;
                    first_err.get_or_insert(err);
                }
            }
        }

        self.scroll = viewport.scroll_y();
        self.dispatch(scene, true);
        first_err.map_or(Ok(()), Err)
    }

    /// Scroll listener entry point.
    pub fn on_scroll(&mut self, scroll: f64, scene: &mut SceneGraph) {
        self.scroll = scroll;
        self.dispatch(scene, false);
    }

    fn dispatch(&mut self, scene: &mut SceneGraph, snap: bool) {
        let mut spawned = Vec::new();
        for &id in &self.order {
            let Some(trigger) = self.triggers.get_mut(id) else {
                continue;
            };
            if trigger.resolved.is_none() {
                continue;
            }
            trigger.update(self.scroll, scene, &mut spawned);
            if snap {
                trigger.driver.snap(trigger.raw);
            } else {
                trigger.driver.set_target(trigger.raw);
            }
            if snap || trigger.driver.scrub() == Scrub::Immediate {
                trigger.render(scene);
            }
        }
        for tween in spawned {
            self.spawn_tween(tween, scene);
        }
    }

    /// Advance scrub catch-ups, loops and tweens by `dt` seconds.
    pub fn tick(&mut self, dt: f64, scene: &mut SceneGraph) {
        for &id in &self.order {
            if let Some(trigger) = self.triggers.get_mut(id) {
                trigger.driver.tick(dt);
                trigger.render(scene);
            }
        }
        for tween in self.loops.values_mut() {
            tween.tick(dt, scene);
        }
        self.tweens.retain(|_, tween| tween.tick(dt, scene));
    }

    /// Remove one entity. Returns `false` if the handle was already dead.
    pub fn kill(&mut self, handle: impl Into<AnimationHandle>) -> bool {
        match handle.into() {
            AnimationHandle::Trigger(id) => {
                self.order.retain(|&t| t != id);
                self.triggers.remove(id).is_some()
            }
            AnimationHandle::Loop(id) => self.loops.remove(id).is_some(),
            AnimationHandle::Tween(id) => self.tweens.remove(id).is_some(),
            AnimationHandle::MediaRule(id) => self.media.remove(id).is_some(),
        }
    }

    pub fn kill_all(&mut self) {
        self.triggers.clear();
        self.order.clear();
        self.loops.clear();
        self.tweens.clear();
        self.media.clear();
    }

    pub fn trigger(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(id)
    }

    /// Triggers in registration order.
    pub fn triggers(&self) -> impl Iterator<Item = (TriggerId, &Trigger)> {
        self.order
            .iter()
            .filter_map(|&id| self.triggers.get(id).map(|t| (id, t)))
    }

    pub fn find_trigger(&self, name: &str) -> Option<&Trigger> {
        self.triggers().map(|(_, t)| t).find(|t| t.name() == name)
    }

    pub fn loop_tween(&self, id: LoopId) -> Option<&Tween> {
        self.loops.get(id)
    }

    pub fn tween(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(id)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            triggers: self.triggers.len(),
            hooks: self.triggers.values().map(Trigger::hook_count).sum(),
            loops: self.loops.len(),
            tweens: self.tweens.len(),
            media_rules: self.media.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stats() == RegistryStats::default()
    }

    /// `true` once every scrub has caught up and no finite tween is in flight.
    pub fn is_settled(&self) -> bool {
        self.triggers.values().all(|t| t.driver.is_settled())
            && self.tweens.values().all(Tween::is_finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::ease::Ease;
    use crate::animation::timeline::TimelineBuilder;
    use crate::animation::vars::Repeat;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene() -> SceneGraph {
        SceneGraph::from_json(
            r#"{
                "view_box": {"x": 0, "y": 0, "width": 750, "height": 500},
                "children": [
                    {"tag": "rect", "id": "a", "attrs": {"width": "10", "height": "10"}},
                    {"tag": "rect", "id": "b", "attrs": {"width": "10", "height": "10"}}
                ]
            }"#,
        )
        .unwrap()
    }

    fn x(scene: &SceneGraph, id: NodeId) -> f64 {
        scene.get(id, &Prop::X).as_number().unwrap()
    }

    fn range(start: &str, end: &str) -> ScrollRange {
        ScrollRange::parse(start, end).unwrap()
    }

    #[test]
    fn immediate_scrub_tracks_scroll() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut vp = Viewport::default();
        let mut reg = AnimationRegistry::new();
        let tl = TimelineBuilder::new("slide")
            .to(a, Vars::new().x(100.0).ease(Ease::Linear).duration(1.0), 0.0)
            .build();
        reg.create_timeline(range("top top", "1000 top"), Scrub::Immediate, tl, &mut scene);
        reg.refresh(&vp, &mut scene).unwrap();
        assert_eq!(x(&scene, a), 0.0);

        vp.scroll_to(500.0);
        reg.on_scroll(vp.scroll_y(), &mut scene);
        assert_eq!(x(&scene, a), 50.0);
        vp.scroll_to(2000.0);
        reg.on_scroll(vp.scroll_y(), &mut scene);
        assert_eq!(x(&scene, a), 100.0);
    }

    #[test]
    fn smooth_scrub_catches_up_on_tick() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        let tl = TimelineBuilder::new("slide")
            .to(a, Vars::new().x(100.0).ease(Ease::Linear).duration(1.0), 0.0)
            .build();
        let id = reg.create_timeline(range("top top", "1000 top"), Scrub::Smooth(1.0), tl, &mut scene);
        reg.refresh(&Viewport::default(), &mut scene).unwrap();

        reg.on_scroll(1000.0, &mut scene);
        assert_eq!(x(&scene, a), 0.0);
        assert!(!reg.is_settled());
        reg.tick(0.5, &mut scene);
        let mid = x(&scene, a);
        assert!(mid > 0.0 && mid < 100.0);
        reg.tick(0.5, &mut scene);
        assert_eq!(x(&scene, a), 100.0);
        assert!(reg.is_settled());
        assert_eq!(reg.trigger(id).unwrap().raw_progress(), 1.0);
    }

    #[test]
    fn later_registration_wins_overlapping_writes() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        for (name, to) in [("first", 10.0), ("second", 20.0)] {
            let tl = TimelineBuilder::new(name)
                .to(a, Vars::new().x(to).duration(1.0), 0.0)
                .build();
            reg.create_timeline(range("top top", "100 top"), Scrub::Immediate, tl, &mut scene);
        }
        reg.refresh(&Viewport::default(), &mut scene).unwrap();
        reg.on_scroll(500.0, &mut scene);
        assert_eq!(x(&scene, a), 20.0);
    }

    #[test]
    fn hooks_fire_on_crossings_and_spawn_tweens() {
        let mut scene = scene();
        let (a, b) = (scene.require("a").unwrap(), scene.require("b").unwrap());
        let mut reg = AnimationRegistry::new();
        let tl = TimelineBuilder::new("t").to(a, Vars::new().x(1.0), 0.0).build();
        let id = reg.create_timeline(range("100 top", "200 top"), Scrub::Immediate, tl, &mut scene);
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in [HookKind::Enter, HookKind::Leave, HookKind::EnterBack, HookKind::LeaveBack] {
            let log = Rc::clone(&log);
            reg.on(id, kind, move |_| log.borrow_mut().push(kind));
        }
        reg.on(id, HookKind::Enter, move |ctx| {
            ctx.to(b, Vars::new().y(50.0).duration(0.2));
        });
        reg.refresh(&Viewport::default(), &mut scene).unwrap();
        assert!(log.borrow().is_empty());

        reg.on_scroll(150.0, &mut scene);
        assert_eq!(reg.stats().tweens, 1);
        reg.on_scroll(900.0, &mut scene);
        reg.on_scroll(0.0, &mut scene);
        assert_eq!(
            *log.borrow(),
            [
                HookKind::Enter,
                HookKind::Leave,
                HookKind::EnterBack,
                HookKind::LeaveBack
            ]
        );

        reg.tick(1.0, &mut scene);
        assert_eq!(scene.get(b, &Prop::Y).as_number(), Some(50.0));
        assert_eq!(reg.stats().tweens, 0);
    }

    #[test]
    fn newer_tween_takes_over_conflicting_props() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        let old = reg.spawn_tween(Tween::to(a, Vars::new().x(100.0).duration(1.0)), &mut scene);
        reg.tick(0.1, &mut scene);
        reg.spawn_tween(Tween::to(a, Vars::new().x(-100.0).duration(1.0)), &mut scene);
        assert!(reg.tween(old).is_none());
        reg.tick(2.0, &mut scene);
        assert_eq!(x(&scene, a), -100.0);
    }

    #[test]
    fn loops_survive_ticks_until_killed() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        let id = reg.create_loop(
            Tween::from_to(
                a,
                Vars::new().opacity(0.3),
                Vars::new().opacity(1.0).duration(0.3).repeat(Repeat::Infinite).repeat_delay(1.0),
            ),
            &mut scene,
        );
        for _ in 0..600 {
            reg.tick(1.0 / 60.0, &mut scene);
        }
        assert!(reg.loop_tween(id).is_some_and(|t| !t.is_finished()));
        assert!(reg.kill(id));
        assert!(!reg.kill(id));
        assert!(reg.is_empty());
    }

    #[test]
    fn media_rule_applies_and_reverts() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        reg.add_media_rule(
            "(max-width: 1922px)".parse().unwrap(),
            vec![(a, Vars::new().x(10.0).opacity(1.0))],
        );
        let mut vp = Viewport::default();
        reg.refresh(&vp, &mut scene).unwrap();
        assert_eq!(x(&scene, a), 10.0);

        vp.resize(2560.0, 1440.0).unwrap();
        reg.refresh(&vp, &mut scene).unwrap();
        assert_eq!(x(&scene, a), 0.0);
    }

    #[test]
    fn invalid_range_is_reported_at_refresh() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        let tl = TimelineBuilder::new("bad").to(a, Vars::new().x(1.0), 0.0).build();
        let id = reg.create_timeline(range("bottom top", "top top"), Scrub::Immediate, tl, &mut scene);
        assert!(reg.refresh(&Viewport::default(), &mut scene).is_err());
        assert!(reg.trigger(id).unwrap().resolved().is_none());
    }

    #[test]
    fn kill_all_empties_registry() {
        let mut scene = scene();
        let a = scene.require("a").unwrap();
        let mut reg = AnimationRegistry::new();
        let tl = TimelineBuilder::new("t").to(a, Vars::new().x(1.0), 0.0).build();
        let id = reg.create_timeline(range("top top", "bottom top"), Scrub::secs(2.0), tl, &mut scene);
        reg.on(id, HookKind::Enter, |_| {});
        assert_eq!(
            reg.stats(),
            RegistryStats {
                triggers: 1,
                hooks: 1,
                ..RegistryStats::default()
            }
        );
        reg.kill_all();
        assert!(reg.is_empty());
        assert!(!reg.on(id, HookKind::Leave, |_| {}));
    }
}
