//! A page hosting one scene: owns the scene graph, the viewport and the controller, and plays the
//! browser's part (scroll events, animation frames, layout changes).

use crate::controller::SceneController;
use crate::engine::registry::RegistryStats;
use crate::foundation::color::Rgba;
use crate::foundation::error::SkyscrollResult;
use crate::render::raster::{FrameRgba, Rasterizer};
use crate::render::svg::{SvgOptions, write_svg};
use crate::scene::graph::{NodeSnapshot, SceneGraph};
use crate::viewport::Viewport;

/// The built-in day-to-night scene document.
pub const DAYBREAK_SCENE: &str = include_str!("../assets/daybreak.json");

/// Animation frame interval used by [`Page::settle`].
pub const FRAME_DT: f64 = 1.0 / 60.0;
/// Upper bound on frames [`Page::settle`] advances.
pub const MAX_SETTLE_FRAMES: usize = 60 * 30;

pub struct Page {
    scene: SceneGraph,
    viewport: Viewport,
    controller: SceneController,
}

/// Serializable state dump of a page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageSnapshot {
    pub scroll_y: f64,
    pub max_scroll: f64,
    pub stats: RegistryStats,
    pub triggers: Vec<TriggerSnapshot>,
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TriggerSnapshot {
    pub name: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub raw_progress: f64,
    pub progress: f64,
}

impl Page {
    pub fn new(scene: SceneGraph, viewport: Viewport) -> Self {
        Self {
            scene,
            viewport,
            controller: SceneController::new(),
        }
    }

    /// Page over the built-in scene.
    pub fn daybreak(viewport: Viewport) -> SkyscrollResult<Self> {
        Ok(Self::new(SceneGraph::from_json(DAYBREAK_SCENE)?, viewport))
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn controller(&self) -> &SceneController {
        &self.controller
    }

    pub fn mount(&mut self) -> SkyscrollResult<()> {
        self.controller.mount(&mut self.scene, &mut self.viewport)
    }

    pub fn unmount(&mut self) {
        self.controller.unmount(&mut self.scene, &mut self.viewport);
    }

    /// Scroll to `y` pixels and dispatch the scroll event.
    pub fn scroll_to(&mut self, y: f64) {
        if self.viewport.scroll_to(y) {
            self.controller.handle_scroll(&self.viewport, &mut self.scene);
        }
    }

    /// Scroll to a fraction of the scrollable extent.
    pub fn scroll_to_fraction(&mut self, fraction: f64) {
        let max = self.viewport.max_scroll();
        self.scroll_to(fraction.clamp(0.0, 1.0) * max);
    }

    /// Resize the viewport and refresh the mounted controller.
    pub fn resize(&mut self, width: f64, height: f64) -> SkyscrollResult<()> {
        self.viewport.resize(width, height)?;
        self.controller.refresh(&self.viewport, &mut self.scene)
    }

    /// Advance one animation frame of `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.controller.tick(dt, &mut self.scene);
    }

    /// Advance frames at 60 fps until scrubs and finite tweens settle. Returns the number of
    /// frames advanced.
    pub fn settle(&mut self) -> usize {
        for frame in 0..MAX_SETTLE_FRAMES {
            if self.controller.is_settled() {
                return frame;
            }
            self.tick(FRAME_DT);
        }
        tracing::warn!(frames = MAX_SETTLE_FRAMES, "page did not settle");
        MAX_SETTLE_FRAMES
    }

    pub fn to_svg(&self) -> String {
        write_svg(
            &self.scene,
            SvgOptions {
                width: self.viewport.width(),
                height: self.viewport.height(),
                indent: true,
            },
        )
    }

    /// Rasterize the current state at the viewport's pixel size.
    pub fn render_frame(&self, rasterizer: &Rasterizer) -> SkyscrollResult<FrameRgba> {
        let background = self
            .scene
            .background()
            .map(Rgba::parse)
            .transpose()?;
        rasterizer.render(
            &self.to_svg(),
            self.viewport.width().round() as u32,
            self.viewport.height().round() as u32,
            background,
        )
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            scroll_y: self.viewport.scroll_y(),
            max_scroll: self.viewport.max_scroll(),
            stats: self.controller.stats(),
            triggers: self
                .controller
                .registry()
                .triggers()
                .map(|(_, t)| TriggerSnapshot {
                    name: t.name().to_owned(),
                    start: t.resolved().map(|r| r.start),
                    end: t.resolved().map(|r| r.end),
                    raw_progress: t.raw_progress(),
                    progress: t.progress(),
                })
                .collect(),
            nodes: self.scene.snapshot(),
        }
    }
}
