use crate::foundation::core::fmt_num;
use crate::scene::graph::{NodeId, SceneGraph};
use std::fmt::Write as _;

/// Output size and paint options for [`write_svg`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgOptions {
    pub width: f64,
    pub height: f64,
    /// Pretty-print with one element per line.
    pub indent: bool,
}

/// Serialize the current state of `scene` as a standalone SVG document.
///
/// Animated state is merged over authored attributes: the node transform is emitted as a single
/// `matrix(...)`, opacity and visibility override their attributes, and attribute overrides
/// replace authored values.
pub fn write_svg(scene: &SceneGraph, opts: SvgOptions) -> String {
    let mut out = String::with_capacity(32 * 1024);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}" viewBox="{}" preserveAspectRatio="{}""#,
        fmt_num(opts.width),
        fmt_num(opts.height),
        scene.view_box().to_attr(),
        escape_attr(scene.preserve_aspect_ratio()),
    );
    if let Some(bg) = scene.background() {
        let _ = write!(out, r#" style="background-color: {}""#, escape_attr(bg));
    }
    out.push('>');
    newline(&mut out, opts, 0);

    if !scene.defs().is_empty() {
        out.push_str("<defs>");
        newline(&mut out, opts, 1);
        for &id in scene.defs() {
            write_node(&mut out, scene, id, opts, 2);
        }
        out.push_str("</defs>");
        newline(&mut out, opts, 0);
    }
    for &id in scene.roots() {
        write_node(&mut out, scene, id, opts, 1);
    }
    out.push_str("</svg>\n");
    out
}

fn write_node(out: &mut String, scene: &SceneGraph, id: NodeId, opts: SvgOptions, depth: usize) {
    let Some(node) = scene.node(id) else {
        return;
    };
    indent(out, opts, depth);
    let _ = write!(out, "<{}", node.tag);
    if let Some(el_id) = &node.id {
        let _ = write!(out, r#" id="{}""#, escape_attr(el_id));
    }

    let state = &node.state;
    for (name, value) in &node.attrs {
        let overridden = state.attrs.contains_key(name)
            || (name == "opacity" && state.opacity.is_some())
            || (name == "visibility" && state.visible.is_some());
        if !overridden {
            let _ = write!(out, r#" {name}="{}""#, escape_attr(value));
        }
    }
    for (name, value) in &state.attrs {
        let _ = write!(out, r#" {name}="{}""#, escape_attr(&value.to_attr()));
    }
    if let Some(opacity) = state.opacity {
        let _ = write!(out, r#" opacity="{}""#, fmt_num(opacity));
    }
    if let Some(visible) = state.visible {
        let _ = write!(
            out,
            r#" visibility="{}""#,
            if visible { "visible" } else { "hidden" }
        );
    }
    if let Some(t) = scene.transform(id) {
        let c = t.as_coeffs();
        let _ = write!(
            out,
            r#" transform="matrix({} {} {} {} {} {})""#,
            fmt_num(c[0]),
            fmt_num(c[1]),
            fmt_num(c[2]),
            fmt_num(c[3]),
            fmt_num(c[4]),
            fmt_num(c[5]),
        );
    }

    if node.children.is_empty() && node.text.is_none() {
        out.push_str("/>");
        newline(out, opts, 0);
        return;
    }
    out.push('>');
    if let Some(text) = &node.text {
        out.push_str(&escape_text(text));
    }
    if !node.children.is_empty() {
        newline(out, opts, 0);
        for &child in &node.children {
            write_node(out, scene, child, opts, depth + 1);
        }
        indent(out, opts, depth);
    }
    let _ = write!(out, "</{}>", node.tag);
    newline(out, opts, 0);
}

fn newline(out: &mut String, opts: SvgOptions, depth: usize) {
    if opts.indent {
        out.push('\n');
        indent(out, opts, depth);
    }
}

fn indent(out: &mut String, opts: SvgOptions, depth: usize) {
    if opts.indent {
        for _ in 0..depth {
            out.push_str("  ");
        }
    }
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
