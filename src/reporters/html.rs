use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::types::ReportMeta;
use crate::viz::label::{CHAR_WIDTH, ELLIPSIS, LABEL_FIT, TRIM_STEP};
use crate::viz::style::{css_class, fill, fill_opacity};
use crate::viz::svg::{esc, STYLE};
use crate::viz::view::ViewController;
use crate::viz::{Layout, MARGIN, OUTER_DIAMETER};

/// Node as the page script sees it. Colours are resolved here so the page
/// and the SVG frame always agree.
#[derive(Serialize)]
struct PageNode<'a> {
    id: usize,
    name: &'a str,
    path: &'a str,
    parent: Option<usize>,
    x: f64,
    y: f64,
    r: f64,
    fill: String,
    opacity: f64,
    class: &'static str,
}

pub fn report_html(
    layout: &Layout,
    view: &ViewController,
    meta: &ReportMeta,
    output_file: &Path,
) -> std::io::Result<()> {
    fs::write(output_file, build_html(layout, view, meta))
}

// `</` inside a script block would end it early.
fn script_json<T: Serialize>(value: &T, fallback: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| fallback.to_string()).replace("</", "<\\/")
}

fn build_html(layout: &Layout, view: &ViewController, meta: &ReportMeta) -> String {
    let nodes: Vec<PageNode> = layout
        .nodes
        .iter()
        .map(|n| PageNode {
            id: n.id,
            name: &n.name,
            path: if n.path.is_empty() { &n.name } else { &n.path },
            parent: n.parent,
            x: n.x,
            y: n.y,
            r: n.r,
            fill: fill(n).css(),
            opacity: fill_opacity(n),
            class: css_class(n),
        })
        .collect();
    let data = script_json(&nodes, "[]");
    let zoom = script_json(&view.zoom_table(layout), "null");

    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8"><meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>hotspot-map: {folder}</title>
  <style>
    *,*::before,*::after{{box-sizing:border-box;margin:0;padding:0}}
    body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#fff;color:#1e293b;padding:1.5rem;font-size:14px;line-height:1.6}}
    h1{{font-size:1.5rem;font-weight:800}} h1 .fire{{color:#8b0000}}
    .meta{{color:#64748b;margin:.3rem 0 1rem;font-size:.8rem}} .meta span{{margin-right:1.5rem}}
    .hint{{color:#94a3b8;font-size:.75rem;margin-bottom:.5rem}}
    #tooltip{{position:fixed;display:none;pointer-events:none;background:rgba(15,23,42,.9);color:#f8fafc;padding:.2rem .5rem;border-radius:.25rem;font-family:ui-monospace,monospace;font-size:.75rem;white-space:nowrap}}
    {style}
  </style>
</head>
<body>
  <h1><span class="fire">●</span> hotspot-map</h1>
  <p class="meta">
    <span>Repo: <strong>{repo}</strong></span>
    <span>Folder: <strong>{folder}</strong></span>
    <span>Since: <strong>{since}</strong></span>
    <span>Files: <strong>{files}</strong></span>
    <span>Generated: <strong>{now}</strong></span>
  </p>
  <p class="hint">Click a circle to zoom in, click it again or anywhere outside the circles to zoom out. Hold Alt for a slow zoom.</p>
  <svg id="map" width="{outer}" height="{outer}" viewBox="0 0 {outer} {outer}"><g transform="translate({margin},{margin})"></g></svg>
  <div id="tooltip"></div>
  <script>
  (() => {{
    const NODES = {data};
    const ZOOM = {zoom};
    const DIAMETER = {diameter};
    const ELLIPSIS = "{ellipsis}", TRIM_STEP = {trim_step}, LABEL_FIT = {label_fit}, CHAR_WIDTH = {char_width};
{script}
  }})();
  </script>
</body>
</html>"#,
        folder = esc(&meta.folder),
        repo = esc(&meta.repo),
        since = esc(&meta.since),
        files = meta.file_count,
        now = now,
        style = STYLE,
        outer = OUTER_DIAMETER,
        margin = MARGIN,
        diameter = view.diameter(),
        zoom = zoom,
        ellipsis = ELLIPSIS,
        trim_step = TRIM_STEP,
        label_fit = LABEL_FIT,
        char_width = CHAR_WIDTH,
        data = data,
        script = SCRIPT,
    )
}

/// Page-side view. Click outcomes and durations come from the `ZOOM` table
/// built by `ViewController::zoom_table`; projection and label fitting follow
/// `viz::view` and `viz::label`.
const SCRIPT: &str = r#"
    const SVG_NS = "http://www.w3.org/2000/svg";
    const svg = document.getElementById("map");
    const layer = svg.querySelector("g");
    const tooltip = document.getElementById("tooltip");
    const circles = [], labels = [];

    function measure(t, text) {
      t.textContent = text;
      const w = t.getComputedTextLength ? t.getComputedTextLength() : 0;
      return w > 0 ? w : text.length * CHAR_WIDTH;
    }

    function fitLabel(t, name, radius) {
      const budget = Math.max(0, LABEL_FIT * radius);
      if (measure(t, name) <= budget) return;
      let kept = Array.from(name);
      if (kept[kept.length - 1] === ELLIPSIS) kept.pop();
      for (;;) {
        if (kept.length <= TRIM_STEP) { t.textContent = ""; return; }
        kept = kept.slice(0, kept.length - TRIM_STEP);
        if (measure(t, kept.join("") + ELLIPSIS) <= budget) return;
      }
    }

    class ViewController {
      constructor(focus) {
        const n = NODES[focus];
        this.focus = focus;
        this.view = [n.x, n.y, n.r];
      }

      targetOf(id) {
        const rule = id === null ? undefined : ZOOM.on_click[id];
        if (rule === undefined) return ZOOM.background;
        return id === this.focus ? rule[0] : rule[1];
      }

      click(id, alt) {
        this.zoom(this.targetOf(id), alt);
      }

      zoom(target, alt) {
        this.focus = target;
        const from = this.view.slice();
        const n = NODES[target];
        const to = [n.x, n.y, n.r];
        const duration = alt ? ZOOM.slow_duration_ms : ZOOM.duration_ms;
        const start = performance.now();
        labels.forEach(t => { t.style.display = "none"; });
        const frame = now => {
          const u = Math.min(1, (now - start) / duration);
          const e = u < 0.5 ? 4 * u * u * u : 1 - Math.pow(-2 * u + 2, 3) / 2;
          this.view = from.map((f, j) => f + (to[j] - f) * e);
          const k = this.project();
          if (u < 1) requestAnimationFrame(frame); else this.showLabels(k);
        };
        requestAnimationFrame(frame);
      }

      project() {
        const v = this.view;
        const k = v[2] > 0 ? DIAMETER / (2 * v[2]) : 1;
        const ox = v[0] - v[2], oy = v[1] - v[2];
        NODES.forEach((n, i) => {
          const x = (n.x - ox) * k, y = (n.y - oy) * k;
          circles[i].setAttribute("cx", x);
          circles[i].setAttribute("cy", y);
          circles[i].setAttribute("r", n.r * k);
          labels[i].setAttribute("x", x);
          labels[i].setAttribute("y", y);
        });
        return k;
      }

      showLabels(k) {
        NODES.forEach((n, i) => {
          if (n.parent === this.focus) {
            labels[i].style.display = "inline";
            fitLabel(labels[i], n.name, n.r * k);
          } else {
            labels[i].style.display = "none";
          }
        });
      }
    }

    const controller = new ViewController(ZOOM.focus);

    for (const n of NODES) {
      const c = document.createElementNS(SVG_NS, "circle");
      c.setAttribute("class", n.class);
      c.style.fill = n.fill;
      c.style.fillOpacity = n.opacity;
      c.addEventListener("click", e => { e.stopPropagation(); controller.click(n.id, e.altKey); });
      c.addEventListener("mousemove", e => {
        tooltip.textContent = n.path;
        tooltip.style.left = (e.clientX + 12) + "px";
        tooltip.style.top = (e.clientY + 12) + "px";
        tooltip.style.display = "block";
      });
      c.addEventListener("mouseout", () => { tooltip.style.display = "none"; });
      layer.appendChild(c);
      circles.push(c);
    }
    for (const n of NODES) {
      const t = document.createElementNS(SVG_NS, "text");
      t.setAttribute("class", "label");
      layer.appendChild(t);
      labels.push(t);
    }
    window.addEventListener("click", e => controller.click(null, e.altKey));

    controller.showLabels(controller.project());
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HotspotTree;
    use crate::viz::pack::PackLayout;
    use crate::viz::view::{ClickTarget, Modifiers};
    use crate::viz::LayoutEngine;

    fn meta() -> ReportMeta {
        ReportMeta {
            repo: "/work/<repo>".into(),
            folder: "src".into(),
            since: "3 months".into(),
            file_count: 2,
        }
    }

    fn layout() -> Layout {
        let mut src = HotspotTree::directory("src");
        src.children.push(HotspotTree::leaf("a.rs", 120.0, 1.0));
        src.children.push(HotspotTree::leaf("</script>.rs", 30.0, 0.0));
        let mut root = HotspotTree::root();
        root.children.push(src);
        PackLayout::default().compute_layout(&root)
    }

    fn page(layout: &Layout) -> String {
        build_html(layout, &ViewController::new(layout), &meta())
    }

    fn embedded(html: &str, name: &str) -> serde_json::Value {
        let prefix = format!("const {name} = ");
        let line = html.lines().find_map(|l| l.trim().strip_prefix(prefix.as_str())).unwrap();
        serde_json::from_str(line.trim_end_matches(';')).unwrap()
    }

    #[test]
    fn test_page_embeds_layout() {
        let html = page(&layout());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#""path":"src/a.rs""#));
        assert!(html.contains(r#""fill":"darkred""#));
        assert!(html.contains(r#""class":"node node--root""#));
        let zoom = embedded(&html, "ZOOM");
        assert_eq!(zoom["duration_ms"], 750);
        assert_eq!(zoom["slow_duration_ms"], 7500);
    }

    #[test]
    fn test_page_clicks_follow_controller() {
        let l = layout();
        let zoom = embedded(&page(&l), "ZOOM");
        let rules = zoom["on_click"].as_array().unwrap();
        assert_eq!(rules.len(), l.nodes.len());

        let plain = Modifiers::default();
        for node in &l.nodes {
            let mut view = ViewController::new(&l);
            view.zoom(node.id, plain);
            let again = view.click(&l, ClickTarget::Node(node.id), plain).to;
            assert_eq!(rules[node.id][0], again, "same node clicked twice");

            let mut view = ViewController::new(&l);
            let other = l.nodes.iter().find(|n| n.id != node.id).unwrap().id;
            view.zoom(other, plain);
            let into = view.click(&l, ClickTarget::Node(node.id), plain).to;
            assert_eq!(rules[node.id][1], into, "node clicked while another has focus");
        }

        let mut view = ViewController::new(&l);
        view.zoom(1, plain);
        assert_eq!(zoom["background"], view.click(&l, ClickTarget::Background, plain).to);
    }

    #[test]
    fn test_page_state_lives_in_one_controller() {
        let html = page(&layout());
        assert!(html.contains("class ViewController"));
        assert!(html.contains("(() => {"), "script is wrapped so nothing leaks into globals");
        assert!(!html.contains("let focus"));
        assert!(html.contains("controller.click(n.id, e.altKey)"));
    }

    #[test]
    fn test_zoom_out_listens_on_window() {
        let html = page(&layout());
        assert!(html.contains(r#"window.addEventListener("click""#));
        assert!(!html.contains(r#"svg.addEventListener("click""#));
    }

    #[test]
    fn test_header_is_escaped() {
        let html = page(&layout());
        assert!(html.contains("/work/&lt;repo&gt;"));
        assert!(html.contains("<strong>3 months</strong>"));
    }

    #[test]
    fn test_names_cannot_close_the_script() {
        let html = page(&layout());
        assert_eq!(html.matches("</script>").count(), 1, "only the real closing tag");
    }

    #[test]
    fn test_report_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspots.html");
        let l = layout();
        report_html(&l, &ViewController::new(&l), &meta(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("hotspot-map"));
    }
}
