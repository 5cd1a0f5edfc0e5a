use crate::animation::value::{Origin, Prop, PropValue};
use crate::animation::vars::Vars;
use crate::foundation::core::{Affine, Point, Rect, ViewBox};
use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use crate::scene::bounds::shape_bounds;
use crate::scene::model::{ElementDef, SceneDef};
use crate::scene::transform::{parse_transform, split_translation};
use std::collections::{BTreeMap, HashMap};

/// Typed handle to one node of a [`SceneGraph`].
///
/// Handles are only meaningful for the graph that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub(crate) u32);

/// Animated state of a node, layered over its authored attributes.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NodeState {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees.
    pub rotation: f64,
    /// `None` falls back to the authored `opacity` attribute.
    pub opacity: Option<f64>,
    /// `None` falls back to the authored `visibility` attribute.
    pub visible: Option<bool>,
    pub origin: Origin,
    /// Attribute overrides written by animations.
    pub attrs: BTreeMap<String, PropValue>,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            opacity: None,
            visible: None,
            origin: Origin::default(),
            attrs: BTreeMap::new(),
        }
    }
}

impl NodeState {
    fn has_transform(&self) -> bool {
        self.x != 0.0
            || self.y != 0.0
            || self.scale_x != 1.0
            || self.scale_y != 1.0
            || self.rotation != 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    /// Authored attributes, minus `transform` (its translation is folded into `x`/`y`).
    pub attrs: BTreeMap<String, String>,
    pub text: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Linear part of the authored transform, applied beneath the animated one.
    pub base: Affine,
    /// Bounds in the node's own coordinate space, before any transform.
    pub local_bounds: Option<Rect>,
    initial: NodeState,
    pub state: NodeState,
}

/// Arena-backed scene graph built from a [`SceneDef`].
#[derive(Debug, Clone)]
pub struct SceneGraph {
    view_box: ViewBox,
    preserve_aspect_ratio: String,
    background: Option<String>,
    nodes: Vec<Node>,
    defs: Vec<NodeId>,
    roots: Vec<NodeId>,
    by_id: HashMap<String, NodeId>,
}

impl SceneGraph {
    pub fn from_def(def: &SceneDef) -> SkyscrollResult<Self> {
        def.validate()?;
        let mut graph = Self {
            view_box: def.view_box,
            preserve_aspect_ratio: def.preserve_aspect_ratio.clone(),
            background: def.background.clone(),
            nodes: Vec::new(),
            defs: Vec::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
        };
        for el in &def.defs {
            let id = graph.insert(el, None)?;
            graph.defs.push(id);
        }
        for el in &def.children {
            let id = graph.insert(el, None)?;
            graph.roots.push(id);
        }
        Ok(graph)
    }

    pub fn from_json(s: &str) -> SkyscrollResult<Self> {
        Self::from_def(&SceneDef::from_json(s)?)
    }

    fn insert(&mut self, el: &ElementDef, parent: Option<NodeId>) -> SkyscrollResult<NodeId> {
        let idx = NodeId(
            u32::try_from(self.nodes.len())
                .map_err(|_| SkyscrollError::validation("scene has too many nodes"))?,
        );

        let mut attrs = el.attrs.clone();
        let mut initial = NodeState::default();
        let mut base = Affine::IDENTITY;
        if let Some(raw) = attrs.get("transform") {
            let ((x, y), linear) = split_translation(parse_transform(raw)?);
            initial.x = x;
            initial.y = y;
            base = linear;
            attrs.remove("transform");
        }
        let local_bounds = shape_bounds(&el.tag, &attrs, el.text.as_deref());

        self.nodes.push(Node {
            tag: el.tag.clone(),
            id: el.id.clone(),
            attrs,
            text: el.text.clone(),
            parent,
            children: Vec::new(),
            base,
            local_bounds,
            state: initial.clone(),
            initial,
        });
        if let Some(id) = &el.id {
            self.by_id.insert(id.clone(), idx);
        }

        let mut children = Vec::with_capacity(el.children.len());
        for child in &el.children {
            children.push(self.insert(child, Some(idx))?);
        }

        // Groups take the union of their children's authored placement.
        let group_bounds = children
            .iter()
            .filter_map(|&c| {
                let child = &self.nodes[c.0 as usize];
                let placed = Affine::translate((child.initial.x, child.initial.y)) * child.base;
                child.local_bounds.map(|b| placed.transform_rect_bbox(b))
            })
            .reduce(|a, b| a.union(b));

        let node = &mut self.nodes[idx.0 as usize];
        node.children = children;
        if node.local_bounds.is_none() {
            node.local_bounds = group_bounds;
        }
        Ok(idx)
    }

    pub fn view_box(&self) -> ViewBox {
        self.view_box
    }

    pub fn preserve_aspect_ratio(&self) -> &str {
        &self.preserve_aspect_ratio
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn defs(&self) -> &[NodeId] {
        &self.defs
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// `None` for an id that was not issued by this graph.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    /// Look up a node by id, failing with [`SkyscrollError::MissingNode`].
    pub fn require(&self, id: &str) -> SkyscrollResult<NodeId> {
        self.find(id)
            .ok_or_else(|| SkyscrollError::missing_node(format!("#{id}")))
    }

    /// The `n`-th child (1-based) of `parent`, regardless of tag.
    pub fn nth_child(&self, parent: NodeId, n: usize) -> Option<NodeId> {
        let idx = n.checked_sub(1)?;
        self.node(parent)?.children.get(idx).copied()
    }

    /// The `n`-th child (1-based) of `parent` among children with tag `tag`.
    pub fn nth_of_type(&self, parent: NodeId, tag: &str, n: usize) -> Option<NodeId> {
        let idx = n.checked_sub(1)?;
        self.children_with_tag(parent, tag).nth(idx)
    }

    pub fn children_with_tag<'a>(
        &'a self,
        parent: NodeId,
        tag: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.node(parent)
            .into_iter()
            .flat_map(|p| p.children.iter().copied())
            .filter(move |&c| self.node(c).is_some_and(|n| n.tag == tag))
    }

    /// Current value of `prop`, falling back to authored attributes and then to neutral defaults.
    ///
    /// An id from another graph reads as the neutral default.
    pub fn get(&self, id: NodeId, prop: &Prop) -> PropValue {
        let Some(node) = self.node(id) else {
            return match prop {
                Prop::Scale | Prop::ScaleX | Prop::ScaleY | Prop::Opacity => PropValue::Number(1.0),
                Prop::Visibility => PropValue::Visible(true),
                _ => PropValue::Number(0.0),
            };
        };
        let s = &node.state;
        match prop {
            Prop::X => PropValue::Number(s.x),
            Prop::Y => PropValue::Number(s.y),
            Prop::Scale | Prop::ScaleX => PropValue::Number(s.scale_x),
            Prop::ScaleY => PropValue::Number(s.scale_y),
            Prop::Rotation => PropValue::Number(s.rotation),
            Prop::Opacity => PropValue::Number(s.opacity.unwrap_or_else(|| {
                node.attrs
                    .get("opacity")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1.0)
            })),
            Prop::Visibility => PropValue::Visible(s.visible.unwrap_or_else(|| {
                node.attrs.get("visibility").map(String::as_str) != Some("hidden")
            })),
            Prop::Attr(name) => s.attrs.get(name).copied().unwrap_or_else(|| {
                node.attrs
                    .get(name)
                    .and_then(|raw| PropValue::parse_attr(raw).ok())
                    .unwrap_or(PropValue::Number(0.0))
            }),
        }
    }

    /// Writes to an id from another graph are dropped.
    pub fn set(&mut self, id: NodeId, prop: &Prop, value: PropValue) {
        let Some(node) = self.node_mut(id) else {
            tracing::debug!(?id, %prop, "ignoring write to unknown node");
            return;
        };
        let s = &mut node.state;
        match (prop, value) {
            (Prop::X, PropValue::Number(v)) => s.x = v,
            (Prop::Y, PropValue::Number(v)) => s.y = v,
            (Prop::Scale, PropValue::Number(v)) => {
                s.scale_x = v;
                s.scale_y = v;
            }
            (Prop::ScaleX, PropValue::Number(v)) => s.scale_x = v,
            (Prop::ScaleY, PropValue::Number(v)) => s.scale_y = v,
            (Prop::Rotation, PropValue::Number(v)) => s.rotation = v,
            (Prop::Opacity, PropValue::Number(v)) => s.opacity = Some(v.clamp(0.0, 1.0)),
            (Prop::Visibility, PropValue::Visible(v)) => s.visible = Some(v),
            (Prop::Attr(name), v) => {
                s.attrs.insert(name.clone(), v);
            }
            (prop, value) => {
                tracing::debug!(%prop, ?value, "ignoring value of the wrong kind");
            }
        }
    }

    pub fn set_origin(&mut self, id: NodeId, origin: Origin) {
        if let Some(node) = self.node_mut(id) {
            node.state.origin = origin;
        }
    }

    /// Apply every property in `vars` immediately (a zero-duration set).
    pub fn apply(&mut self, id: NodeId, vars: &Vars) {
        if let Some(origin) = vars.origin {
            self.set_origin(id, origin);
        }
        for (prop, value) in &vars.props {
            self.set(id, prop, *value);
        }
    }

    /// Restore every node to its authored state.
    pub fn revert(&mut self) {
        for node in &mut self.nodes {
            node.state = node.initial.clone();
        }
    }

    /// `true` when no node deviates from its authored state.
    pub fn is_pristine(&self) -> bool {
        self.nodes.iter().all(|n| n.state == n.initial)
    }

    /// Full transform of a node relative to its parent:
    /// `translate(x, y) · origin · rotate · scale · origin⁻¹ · base`.
    ///
    /// Returns `None` when the node has neither an animated nor an authored transform.
    pub fn transform(&self, id: NodeId) -> Option<Affine> {
        let node = self.node(id)?;
        let s = &node.state;
        if !s.has_transform() && node.base == Affine::IDENTITY {
            return None;
        }
        let origin = node
            .local_bounds
            .map(|b| s.origin.resolve(b))
            .unwrap_or(Point::ORIGIN);
        let o = (node.base * origin).to_vec2();
        Some(
            Affine::translate((s.x, s.y))
                * Affine::translate(o)
                * Affine::rotate(s.rotation.to_radians())
                * Affine::scale_non_uniform(s.scale_x, s.scale_y)
                * Affine::translate(-o)
                * node.base,
        )
    }

    /// Per-node state for every node that carries an id.
    pub fn snapshot(&self) -> Vec<NodeSnapshot> {
        let mut out: Vec<NodeSnapshot> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| {
                let id = n.id.clone()?;
                let node = NodeId(i as u32);
                Some(NodeSnapshot {
                    id,
                    x: n.state.x,
                    y: n.state.y,
                    scale_x: n.state.scale_x,
                    scale_y: n.state.scale_y,
                    rotation: n.state.rotation,
                    opacity: self.get(node, &Prop::Opacity).as_number().unwrap_or(1.0),
                    visible: matches!(self.get(node, &Prop::Visibility), PropValue::Visible(true)),
                    attrs: n
                        .state
                        .attrs
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_attr()))
                        .collect(),
                })
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

/// Serializable view of one node's animated state.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub opacity: f64,
    pub visible: bool,
    pub attrs: BTreeMap<String, String>,
}
