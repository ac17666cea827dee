use std::fmt::Write;

use super::label::fit_label;
use super::style::{css_class, fill, fill_opacity};
use super::view::ViewController;
use super::{FrameRenderer, Layout, MARGIN, OUTER_DIAMETER};

/// Static SVG frame of the packed layout as seen from the current focus.
pub struct SvgRenderer {
    pub outer: f64,
    pub margin: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        SvgRenderer { outer: OUTER_DIAMETER, margin: MARGIN }
    }
}

pub const STYLE: &str = "\
.node{cursor:pointer}\
.node:hover{stroke:#000;stroke-width:1.5px}\
.node--leaf:hover{stroke:#333}\
.node--root{pointer-events:none}\
.label{font:11px \"Helvetica Neue\",Helvetica,Arial,sans-serif;text-anchor:middle;dominant-baseline:middle;\
text-shadow:0 1px 0 #fff,1px 0 0 #fff,-1px 0 0 #fff,0 -1px 0 #fff;pointer-events:none}";

impl FrameRenderer for SvgRenderer {
    fn render_frame(&self, layout: &Layout, view: &ViewController) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{w}" viewBox="0 0 {w} {w}">"#,
            w = num(self.outer)
        );
        let _ = writeln!(out, "<style>{STYLE}</style>");
        let _ = writeln!(out, r#"<g transform="translate({m},{m})">"#, m = num(self.margin));

        for node in &layout.nodes {
            let c = view.project(layout, node.circle());
            let _ = writeln!(
                out,
                r#"<circle class="{}" cx="{}" cy="{}" r="{}" style="fill:{};fill-opacity:{}"><title>{}</title></circle>"#,
                css_class(node),
                num(c.x),
                num(c.y),
                num(c.r),
                fill(node).css(),
                num(fill_opacity(node)),
                esc(super::view::tooltip(layout, node.id).unwrap_or_default()),
            );
        }

        for node in layout.nodes.iter().filter(|n| view.label_visible(n)) {
            let c = view.project(layout, node.circle());
            let text = fit_label(&node.name, c.r);
            if text.is_empty() {
                continue;
            }
            let _ = writeln!(
                out,
                r#"<text class="label" x="{}" y="{}">{}</text>"#,
                num(c.x),
                num(c.y),
                esc(&text)
            );
        }

        out.push_str("</g>\n</svg>\n");
        out
    }
}

/// Fixed two-decimal coordinates with trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
