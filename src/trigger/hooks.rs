use super::range::RangeState;
use crate::animation::tween::Tween;
use crate::animation::vars::Vars;
use crate::scene::graph::{NodeId, SceneGraph};
use smallvec::SmallVec;

/// Directional boundary crossings of a trigger range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum HookKind {
    /// Forward past the start.
    Enter,
    /// Forward past the end.
    Leave,
    /// Backward past the end.
    EnterBack,
    /// Backward past the start.
    LeaveBack,
}

impl HookKind {
    pub fn is_enter(self) -> bool {
        matches!(self, Self::Enter | Self::EnterBack)
    }
}

/// Hooks fired by a state change, in the order the boundaries were crossed.
pub fn transitions(prev: RangeState, next: RangeState) -> SmallVec<[HookKind; 2]> {
    use HookKind::*;
    use RangeState::*;

    let mut out = SmallVec::new();
    match (prev, next) {
        (Before, Active) => out.push(Enter),
        (Before, After) => out.extend([Enter, Leave]),
        (Active, After) => out.push(Leave),
        (After, Active) => out.push(EnterBack),
        (After, Before) => out.extend([EnterBack, LeaveBack]),
        (Active, Before) => out.push(LeaveBack),
        (Before, Before) | (Active, Active) | (After, After) => {}
    }
    out
}

/// Side-effect callback attached to a trigger.
pub type HookFn = Box<dyn FnMut(&mut EffectCtx<'_>)>;

/// What a hook may do: read and set scene values, and spawn time-based tweens.
pub struct EffectCtx<'a> {
    scene: &'a mut SceneGraph,
    spawned: Vec<Tween>,
}

impl<'a> EffectCtx<'a> {
    pub(crate) fn new(scene: &'a mut SceneGraph) -> Self {
        Self {
            scene,
            spawned: Vec::new(),
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        self.scene
    }

    /// Apply `vars` to `target` immediately.
    pub fn set(&mut self, target: NodeId, vars: &Vars) {
        self.scene.apply(target, vars);
    }

    pub fn to(&mut self, target: NodeId, vars: Vars) {
        self.spawned.push(Tween::to(target, vars));
    }

    pub fn from_to(&mut self, target: NodeId, from: Vars, to: Vars) {
        let mut tween = Tween::from_to(target, from, to);
        tween.prime(self.scene);
        self.spawned.push(tween);
    }

    pub(crate) fn into_spawned(self) -> Vec<Tween> {
        self.spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RangeState::*;

    #[test]
    fn single_boundary_crossings() {
        assert_eq!(transitions(Before, Active).as_slice(), [HookKind::Enter]);
        assert_eq!(transitions(Active, After).as_slice(), [HookKind::Leave]);
        assert_eq!(transitions(After, Active).as_slice(), [HookKind::EnterBack]);
        assert_eq!(transitions(Active, Before).as_slice(), [HookKind::LeaveBack]);
        assert!(transitions(Active, Active).is_empty());
    }

    #[test]
    fn jumps_fire_both_crossings_in_order() {
        assert_eq!(
            transitions(Before, After).as_slice(),
            [HookKind::Enter, HookKind::Leave]
        );
        assert_eq!(
            transitions(After, Before).as_slice(),
            [HookKind::EnterBack, HookKind::LeaveBack]
        );
    }

    #[test]
    fn enter_and_leave_alternate_over_any_path() {
        let states = [Before, After, Active, Before, Active, After, Before, After, Active, After];
        let mut last_enter: Option<bool> = None;
        let mut prev = Before;
        for next in states {
            for kind in transitions(prev, next) {
                assert_ne!(last_enter, Some(kind.is_enter()), "{kind:?} repeated");
                last_enter = Some(kind.is_enter());
            }
            prev = next;
        }
    }

    #[test]
    fn effect_ctx_sets_and_collects_tweens() {
        let mut scene = SceneGraph::from_json(
            r#"{"view_box": {"x": 0, "y": 0, "width": 10, "height": 10},
                "children": [{"tag": "rect", "id": "r", "attrs": {"width": "1", "height": "1"}}]}"#,
        )
        .unwrap();
        let r = scene.require("r").unwrap();
        let mut ctx = EffectCtx::new(&mut scene);
        ctx.set(r, &Vars::new().opacity(0.25));
        ctx.to(r, Vars::new().x(5.0));
        ctx.from_to(r, Vars::new().y(3.0), Vars::new().y(9.0));
        assert_eq!(ctx.into_spawned().len(), 2);
        assert_eq!(scene.get(r, &crate::animation::value::Prop::Opacity).as_number(), Some(0.25));
        assert_eq!(scene.get(r, &crate::animation::value::Prop::Y).as_number(), Some(3.0));
    }
}
