use crate::foundation::core::ViewBox;
use crate::foundation::error::{SkyscrollError, SkyscrollResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// JSON scene document: a view box plus an SVG-shaped element tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDef {
    pub view_box: ViewBox,
    #[serde(default = "default_aspect")]
    pub preserve_aspect_ratio: String,
    /// Fill painted behind the scene (CSS color).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Paint servers (gradients) referenced from the element tree.
    #[serde(default)]
    pub defs: Vec<ElementDef>,
    pub children: Vec<ElementDef>,
}

fn default_aspect() -> String {
    "xMidYMid meet".to_owned()
}

/// One SVG element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementDef {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    /// Character data (for `text` elements).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDef>,
}

impl SceneDef {
    pub fn from_json(s: &str) -> SkyscrollResult<Self> {
        let def: SceneDef = serde_json::from_str(s)?;
        def.validate()?;
        Ok(def)
    }

    /// Check the static invariants the scene graph relies on.
    pub fn validate(&self) -> SkyscrollResult<()> {
        ViewBox::new(
            self.view_box.x,
            self.view_box.y,
            self.view_box.width,
            self.view_box.height,
        )?;

        let mut seen = BTreeSet::new();
        for el in self.defs.iter().chain(self.children.iter()) {
            validate_element(el, &mut seen)?;
        }
        Ok(())
    }
}

/// Tag and attribute names are written into the SVG verbatim.
fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ':' || c == '_')
}

fn validate_element<'a>(el: &'a ElementDef, seen: &mut BTreeSet<&'a str>) -> SkyscrollResult<()> {
    if !is_name(&el.tag) {
        return Err(SkyscrollError::validation(format!(
            "invalid element tag \"{}\"",
            el.tag
        )));
    }
    if let Some(id) = el.id.as_deref() {
        if id.is_empty() {
            return Err(SkyscrollError::validation("element id must not be empty"));
        }
        if !seen.insert(id) {
            return Err(SkyscrollError::validation(format!(
                "duplicate element id \"{id}\""
            )));
        }
    }
    if el.attrs.contains_key("id") {
        return Err(SkyscrollError::validation(
            "element ids go in the `id` field, not in `attrs`",
        ));
    }
    if let Some(name) = el.attrs.keys().find(|k| !is_name(k)) {
        return Err(SkyscrollError::validation(format!(
            "invalid attribute name \"{name}\" on <{}>",
            el.tag
        )));
    }
    for child in &el.children {
        validate_element(child, seen)?;
    }
    Ok(())
}
