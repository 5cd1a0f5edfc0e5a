//! The animation registry: every scroll-bound timeline, loop and tween of a mounted scene.

pub mod registry;

pub use registry::{
    AnimationHandle, AnimationRegistry, LoopId, MediaRuleId, RegistryStats, Trigger, TriggerId,
    TweenId,
};
