//! Scroll triggers: range resolution, scrub smoothing and boundary hooks.

pub mod hooks;
pub mod range;
pub mod scrub;

pub use hooks::{EffectCtx, HookFn, HookKind};
pub use range::{RangeState, ResolvedRange, ScrollRange, TriggerBox};
pub use scrub::{Scrub, ScrubDriver};
