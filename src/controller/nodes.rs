use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use crate::scene::graph::{NodeId, SceneGraph};

/// Stars that twinkle on their own: 1-based index among the star paths, and the pause between
/// blinks in seconds.
pub const TWINKLE: [(usize, f64); 15] = [
    (1, 0.8),
    (3, 1.8),
    (5, 1.0),
    (8, 1.2),
    (11, 0.5),
    (15, 2.0),
    (17, 1.1),
    (18, 1.4),
    (25, 1.1),
    (28, 0.9),
    (30, 1.3),
    (35, 2.0),
    (40, 0.8),
    (45, 1.8),
    (48, 1.0),
];

/// A star path resolved for the twinkle loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwinkleStar {
    pub node: NodeId,
    pub repeat_delay: f64,
}

/// Every node the choreography animates, resolved once per mount.
#[derive(Clone, Debug)]
pub struct SceneNodes {
    // scene 1
    pub hills1: [NodeId; 9],
    pub clouds_big: [NodeId; 2],
    pub cloud_start: [NodeId; 2],
    pub info: NodeId,
    pub bird: NodeId,
    pub clouds: [NodeId; 4],
    // sky
    pub bg_grad: NodeId,
    /// `#bg_grad` stops 2 through 6.
    pub bg_grad_stops: [NodeId; 5],
    pub sun: NodeId,
    /// `#lg4` stops 1 and 2.
    pub lg4_stops: [NodeId; 2],
    // scene 2
    pub hills2: [NodeId; 6],
    pub bats: NodeId,
    pub bat_wings: Vec<NodeId>,
    // scene 3
    pub scene3: NodeId,
    pub bg2: NodeId,
    pub bg2_grad: NodeId,
    pub hills3: [NodeId; 5],
    pub stars: NodeId,
    pub arrow2: NodeId,
    pub text2: NodeId,
    pub fstar: NodeId,
    pub twinkle: Vec<TwinkleStar>,
}

impl SceneNodes {
    /// Resolve every required node; the first one missing is reported as
    /// [`SkyscrollError::MissingNode`]. Twinkle stars are optional and skipped with a warning.
    pub fn resolve(scene: &SceneGraph) -> SkyscrollResult<Self> {
        let bg_grad = scene.require("bg_grad")?;
        let lg4 = scene.require("lg4")?;
        let bats = scene.require("bats")?;
        let stars = scene.require("stars")?;

        let mut twinkle = Vec::with_capacity(TWINKLE.len());
        for (index, repeat_delay) in TWINKLE {
            match scene.nth_of_type(stars, "path", index) {
                Some(node) => twinkle.push(TwinkleStar { node, repeat_delay }),
                None => tracing::warn!(index, "#stars path:nth-of-type({index}) not found; skipping"),
            }
        }

        Ok(Self {
            hills1: ids(scene, ["h1-1", "h1-2", "h1-3", "h1-4", "h1-5", "h1-6", "h1-7", "h1-8", "h1-9"])?,
            clouds_big: ids(scene, ["cloudsBig-L", "cloudsBig-R"])?,
            cloud_start: ids(scene, ["cloudStart-L", "cloudStart-R"])?,
            info: scene.require("info")?,
            bird: scene.require("bird")?,
            clouds: ids(scene, ["cloud1", "cloud2", "cloud3", "cloud4"])?,
            bg_grad,
            bg_grad_stops: [
                nth_child(scene, bg_grad, "bg_grad", 2)?,
                nth_child(scene, bg_grad, "bg_grad", 3)?,
                nth_child(scene, bg_grad, "bg_grad", 4)?,
                nth_child(scene, bg_grad, "bg_grad", 5)?,
                nth_child(scene, bg_grad, "bg_grad", 6)?,
            ],
            sun: scene.require("sun")?,
            lg4_stops: [nth_child(scene, lg4, "lg4", 1)?, nth_child(scene, lg4, "lg4", 2)?],
            hills2: ids(scene, ["h2-1", "h2-2", "h2-3", "h2-4", "h2-5", "h2-6"])?,
            bats,
            bat_wings: scene.children_with_tag(bats, "path").collect(),
            scene3: scene.require("scene3")?,
            bg2: scene.require("bg2")?,
            bg2_grad: scene.require("bg2-grad")?,
            hills3: ids(scene, ["h3-1", "h3-2", "h3-3", "h3-4", "h3-5"])?,
            stars,
            arrow2: scene.require("arrow2")?,
            text2: scene.require("text2")?,
            fstar: scene.require("fstar")?,
            twinkle,
        })
    }
}

fn ids<const N: usize>(scene: &SceneGraph, names: [&str; N]) -> SkyscrollResult<[NodeId; N]> {
    let mut out = [NodeId(0); N];
    for (slot, name) in out.iter_mut().zip(names) {
        *slot = scene.require(name)?;
    }
    Ok(out)
}

fn nth_child(scene: &SceneGraph, parent: NodeId, name: &str, n: usize) -> SkyscrollResult<NodeId> {
    scene
        .nth_child(parent, n)
        .ok_or_else(|| SkyscrollError::missing_node(format!("#{name} stop:nth-child({n})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::DAYBREAK_SCENE;

    #[test]
    fn daybreak_resolves_every_node() {
        let scene = SceneGraph::from_json(DAYBREAK_SCENE).unwrap();
        let nodes = SceneNodes::resolve(&scene).unwrap();
        assert_eq!(nodes.bat_wings.len(), 2);
        assert_eq!(nodes.twinkle.len(), TWINKLE.len());
        assert_eq!(scene.node(nodes.bg_grad_stops[4]).unwrap().attrs["stop-color"], "#FFAB93");
        assert_eq!(scene.node(nodes.hills3[0]).unwrap().tag, "g");
    }

    #[test]
    fn missing_node_is_named() {
        let scene = SceneGraph::from_json(
            r#"{"view_box": {"x": 0, "y": 0, "width": 10, "height": 10},
                "children": [{"tag": "g", "id": "stars"}]}"#,
        )
        .unwrap();
        let err = SceneNodes::resolve(&scene).unwrap_err();
        assert!(matches!(err, SkyscrollError::MissingNode(ref what) if what == "#bg_grad"));
    }
}
