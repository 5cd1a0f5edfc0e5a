//! skyscroll drives a scroll-bound, day-to-night parallax SVG scene.
//!
//! A [`Page`] hosts a [`SceneGraph`] and a [`Viewport`]. Mounting its [`SceneController`]
//! registers the choreography with an [`AnimationRegistry`]: scrubbed timelines bound to scroll
//! ranges of a tall spacer element, boundary hooks that fire one-shot tweens, and ambient loops.
//!
//! The host drives everything explicitly:
//!
//! - [`Page::scroll_to`] dispatches a scroll event (raw progress and hooks update at once)
//! - [`Page::tick`] advances one animation frame (scrub catch-up, loops and tweens)
//! - [`Page::to_svg`] / [`Page::render_frame`] serialize or rasterize the current state
//!
//! No wall clock is read, so a sequence of scrolls and ticks always produces the same frames.
#![forbid(unsafe_code)]

pub mod animation;
pub mod controller;
pub mod engine;
pub mod foundation;
pub mod page;
pub mod render;
pub mod scene;
pub mod trigger;
pub mod viewport;

pub use animation::ease::Ease;
pub use animation::timeline::{Timeline, TimelineBuilder};
pub use animation::tween::Tween;
pub use animation::value::{Origin, Prop, PropValue};
pub use animation::vars::{Repeat, Vars};
pub use controller::SceneController;
pub use controller::nodes::SceneNodes;
pub use engine::registry::{AnimationHandle, AnimationRegistry, RegistryStats, TriggerId};
pub use foundation::color::Rgba;
pub use foundation::core::{Affine, Point, Rect, ViewBox};
pub use foundation::error::{SkyscrollError, SkyscrollResult};
pub use page::{DAYBREAK_SCENE, Page, PageSnapshot};
pub use render::{FrameRgba, Rasterizer, SvgOptions, write_svg};
pub use scene::graph::{NodeId, SceneGraph};
pub use scene::model::{ElementDef, SceneDef};
pub use trigger::{EffectCtx, HookKind, RangeState, ScrollRange, Scrub};
pub use viewport::{MediaQuery, Viewport};
