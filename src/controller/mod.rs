//! Mounts the day-to-night choreography onto a scene and keeps it bound to the viewport.

pub mod choreography;
pub mod nodes;

use crate::engine::registry::{AnimationRegistry, RegistryStats};
use crate::foundation::error::SkyscrollResult;
use crate::scene::graph::SceneGraph;
use crate::viewport::{ListenerId, Viewport};
use nodes::SceneNodes;

/// Owns the animation registry and scroll subscription of one mounted scene.
#[derive(Default)]
pub struct SceneController {
    registry: AnimationRegistry,
    listener: Option<ListenerId>,
    nodes: Option<SceneNodes>,
    mounts: u64,
}

impl SceneController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the whole choreography against `scene` and subscribe to `viewport` scrolls.
    ///
    /// Mounting an already-mounted controller first tears down everything the previous mount
    /// registered. When a required node is missing nothing is registered and the error is
    /// returned; the scene is left in its authored state.
    #[tracing::instrument(skip_all, fields(mount = self.mounts + 1))]
    pub fn mount(&mut self, scene: &mut SceneGraph, viewport: &mut Viewport) -> SkyscrollResult<()> {
        tracing::info!("mount");
        self.teardown(scene, viewport);

        let nodes = match SceneNodes::resolve(scene) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::error!(%err, "scene nodes missing on mount; no animations registered");
                return Err(err);
            }
        };

        self.listener = Some(viewport.subscribe("scene-controller"));
        self.mounts += 1;
        if let Err(err) = choreography::build(&mut self.registry, scene, &nodes) {
            tracing::error!(%err, "choreography setup failed");
            self.teardown(scene, viewport);
            return Err(err);
        }
        self.nodes = Some(nodes);

        let refreshed = self.registry.refresh(viewport, scene);
        let stats = self.registry.stats();
        tracing::info!(
            triggers = stats.triggers,
            hooks = stats.hooks,
            loops = stats.loops,
            "timelines created and refreshed"
        );
        refreshed
    }

    /// Remove the scroll listener, kill every animation and restore the authored scene.
    #[tracing::instrument(skip_all)]
    pub fn unmount(&mut self, scene: &mut SceneGraph, viewport: &mut Viewport) {
        tracing::info!("cleanup");
        self.teardown(scene, viewport);
    }

    fn teardown(&mut self, scene: &mut SceneGraph, viewport: &mut Viewport) {
        if let Some(listener) = self.listener.take() {
            viewport.unsubscribe(listener);
        }
        self.registry.kill_all();
        self.nodes = None;
        scene.revert();
    }

    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Nodes resolved by the current mount.
    pub fn nodes(&self) -> Option<&SceneNodes> {
        self.nodes.as_ref()
    }

    /// Scroll listener body; ignored unless the subscription is live.
    pub fn handle_scroll(&mut self, viewport: &Viewport, scene: &mut SceneGraph) {
        if self.listener.is_some_and(|l| viewport.is_subscribed(l)) {
            self.registry.on_scroll(viewport.scroll_y(), scene);
        }
    }

    /// Animation-frame tick.
    pub fn tick(&mut self, dt: f64, scene: &mut SceneGraph) {
        self.registry.tick(dt, scene);
    }

    /// Re-measure after a layout change.
    #[tracing::instrument(skip_all)]
    pub fn refresh(&mut self, viewport: &Viewport, scene: &mut SceneGraph) -> SkyscrollResult<()> {
        if !self.is_mounted() {
            return Ok(());
        }
        self.registry.refresh(viewport, scene)
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    pub fn is_settled(&self) -> bool {
        self.registry.is_settled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DAYBREAK_SCENE;

    fn setup() -> (SceneController, SceneGraph, Viewport) {
        (
            SceneController::new(),
            SceneGraph::from_json(DAYBREAK_SCENE).unwrap(),
            Viewport::default(),
        )
    }

    #[test]
    fn double_mount_registers_once() {
        let (mut c, mut scene, mut vp) = setup();
        c.mount(&mut scene, &mut vp).unwrap();
        let once = c.stats();
        c.mount(&mut scene, &mut vp).unwrap();
        assert_eq!(c.stats(), once);
        assert_eq!(vp.listener_count(), 1);
    }

    #[test]
    fn unmount_reverts_scene() {
        let (mut c, mut scene, mut vp) = setup();
        c.mount(&mut scene, &mut vp).unwrap();
        assert!(!scene.is_pristine());
        c.unmount(&mut scene, &mut vp);
        assert!(scene.is_pristine());
        assert!(c.registry().is_empty());
        assert_eq!(vp.listener_count(), 0);
        assert!(!c.is_mounted());
    }

    #[test]
    fn scroll_is_ignored_when_unmounted() {
        let (mut c, mut scene, mut vp) = setup();
        vp.scroll_to(3000.0);
        c.handle_scroll(&vp, &mut scene);
        assert!(scene.is_pristine());
    }

    #[test]
    fn scrolling_a_different_scene_does_not_panic() {
        let (mut c, mut scene, mut vp) = setup();
        c.mount(&mut scene, &mut vp).unwrap();
        let mut other = SceneGraph::from_json(
            r#"{
                "view_box": {"x": 0, "y": 0, "width": 10, "height": 10},
                "children": [{"tag": "rect", "id": "a"}]
            }"#,
        )
        .unwrap();
        vp.scroll_to(3000.0);
        c.handle_scroll(&vp, &mut other);
        for _ in 0..120 {
            c.tick(1.0 / 60.0, &mut other);
        }
        assert!(c.is_mounted());
    }
}
