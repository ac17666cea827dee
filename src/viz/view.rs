//! Zoom state for the packed view.
//!
//! The controller only remembers which node is in focus. Everything else
//! (the visible window, projected coordinates, which labels show) is derived
//! from the focus and the layout on demand.

use serde::Serialize;
use std::time::Duration;

use super::{Circle, Layout, PackedNode};

pub const ZOOM_DURATION: Duration = Duration::from_millis(750);
/// Slow-motion zoom while alt is held.
pub const SLOW_ZOOM_DURATION: Duration = Duration::from_millis(7500);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Node(usize),
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransition {
    pub from: usize,
    pub to: usize,
    pub duration: Duration,
}

/// Every click outcome the page can ask for, resolved by the controller
/// ahead of time so the page script only looks answers up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomTable {
    /// Focus the page opens on.
    pub focus: usize,
    /// Per node id: `[target when that node has focus, target otherwise]`.
    pub on_click: Vec<[usize; 2]>,
    pub background: usize,
    pub duration_ms: u64,
    pub slow_duration_ms: u64,
}

/// Layout-space window currently mapped onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewWindow {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl ViewWindow {
    /// Scale from layout units to viewport pixels.
    pub fn scale(&self, diameter: f64) -> f64 {
        if self.r > 0.0 { diameter / (2.0 * self.r) } else { 1.0 }
    }
}

#[derive(Debug, Clone)]
pub struct ViewController {
    focus: usize,
    diameter: f64,
}

impl ViewController {
    pub fn new(layout: &Layout) -> Self {
        ViewController { focus: Layout::ROOT, diameter: layout.size }
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Clicking the focused node zooms back out; clicking anything else
    /// zooms into it. Ids outside the layout count as the background.
    pub fn click(&mut self, layout: &Layout, target: ClickTarget, modifiers: Modifiers) -> ZoomTransition {
        let to = match target {
            ClickTarget::Node(id) if id == self.focus => Layout::ROOT,
            ClickTarget::Node(id) if layout.get(id).is_some() => id,
            _ => Layout::ROOT,
        };
        self.zoom(to, modifiers)
    }

    pub fn zoom(&mut self, target: usize, modifiers: Modifiers) -> ZoomTransition {
        let from = self.focus;
        self.focus = target;
        ZoomTransition {
            from,
            to: target,
            duration: if modifiers.alt { SLOW_ZOOM_DURATION } else { ZOOM_DURATION },
        }
    }

    /// Replays every possible click on a copy of this controller.
    pub fn zoom_table(&self, layout: &Layout) -> ZoomTable {
        let plain = Modifiers::default();
        let mut scratch = self.clone();
        let on_click = layout
            .nodes
            .iter()
            .map(|node| {
                scratch.zoom(node.id, plain);
                let focused = scratch.click(layout, ClickTarget::Node(node.id), plain).to;
                let otherwise = match layout.nodes.iter().find(|n| n.id != node.id) {
                    Some(other) => {
                        scratch.zoom(other.id, plain);
                        scratch.click(layout, ClickTarget::Node(node.id), plain).to
                    }
                    None => focused,
                };
                [focused, otherwise]
            })
            .collect();

        let background = scratch.click(layout, ClickTarget::Background, plain);
        let slow = scratch.click(layout, ClickTarget::Background, Modifiers { alt: true });
        ZoomTable {
            focus: self.focus,
            on_click,
            background: background.to,
            duration_ms: millis(background.duration),
            slow_duration_ms: millis(slow.duration),
        }
    }

    pub fn window(&self, layout: &Layout) -> ViewWindow {
        let node = layout.get(self.focus).unwrap_or_else(|| layout.root());
        ViewWindow { x: node.x, y: node.y, r: node.r }
    }

    /// Maps a layout circle into viewport coordinates, with `(0, 0)` at the
    /// top-left of the inner square.
    pub fn project(&self, layout: &Layout, circle: Circle) -> Circle {
        let w = self.window(layout);
        let k = w.scale(self.diameter);
        Circle {
            x: (circle.x - (w.x - w.r)) * k,
            y: (circle.y - (w.y - w.r)) * k,
            r: circle.r * k,
        }
    }

    pub fn label_visible(&self, node: &PackedNode) -> bool {
        node.parent == Some(self.focus)
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Tooltip text shown while hovering `id`.
pub fn tooltip(layout: &Layout, id: usize) -> Option<&str> {
    let node = layout.get(id)?;
    Some(if node.path.is_empty() { node.name.as_str() } else { node.path.as_str() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HotspotTree;
    use crate::viz::pack::PackLayout;
    use crate::viz::LayoutEngine;

    fn layout() -> Layout {
        let mut src = HotspotTree::directory("src");
        src.children.push(HotspotTree::leaf("main.rs", 100.0, 1.0));
        src.children.push(HotspotTree::leaf("util.rs", 25.0, 0.5));
        let mut root = HotspotTree::root();
        root.children.push(src);
        root.children.push(HotspotTree::leaf("build.rs", 9.0, 0.0));
        PackLayout::default().compute_layout(&root)
    }

    fn id_of(layout: &Layout, path: &str) -> usize {
        layout.nodes.iter().find(|n| n.path == path).map(|n| n.id).unwrap()
    }

    #[test]
    fn test_starts_at_root() {
        let l = layout();
        assert_eq!(ViewController::new(&l).focus(), Layout::ROOT);
    }

    #[test]
    fn test_click_node_focuses_it() {
        let l = layout();
        let src = id_of(&l, "src");
        let mut view = ViewController::new(&l);
        let t = view.click(&l, ClickTarget::Node(src), Modifiers::default());
        assert_eq!(view.focus(), src);
        assert_eq!(t, ZoomTransition { from: Layout::ROOT, to: src, duration: ZOOM_DURATION });
    }

    #[test]
    fn test_click_focused_node_returns_to_root() {
        let l = layout();
        let src = id_of(&l, "src");
        let mut view = ViewController::new(&l);
        view.click(&l, ClickTarget::Node(src), Modifiers::default());
        view.click(&l, ClickTarget::Node(src), Modifiers::default());
        assert_eq!(view.focus(), Layout::ROOT);
    }

    #[test]
    fn test_background_returns_to_root() {
        let l = layout();
        let mut view = ViewController::new(&l);
        view.click(&l, ClickTarget::Node(id_of(&l, "src/main.rs")), Modifiers::default());
        let t = view.click(&l, ClickTarget::Background, Modifiers::default());
        assert_eq!(view.focus(), Layout::ROOT);
        assert_eq!(t.to, Layout::ROOT);
    }

    #[test]
    fn test_unknown_node_treated_as_background() {
        let l = layout();
        let mut view = ViewController::new(&l);
        view.click(&l, ClickTarget::Node(id_of(&l, "src")), Modifiers::default());
        view.click(&l, ClickTarget::Node(999), Modifiers::default());
        assert_eq!(view.focus(), Layout::ROOT);
    }

    #[test]
    fn test_alt_slows_transition() {
        let l = layout();
        let mut view = ViewController::new(&l);
        let t = view.click(&l, ClickTarget::Node(1), Modifiers { alt: true });
        assert_eq!(t.duration, SLOW_ZOOM_DURATION);
    }

    #[test]
    fn test_zoom_table_matches_clicks() {
        let l = layout();
        let src = id_of(&l, "src");
        let main = id_of(&l, "src/main.rs");
        let table = ViewController::new(&l).zoom_table(&l);

        assert_eq!(table.focus, Layout::ROOT);
        assert_eq!(table.on_click.len(), l.nodes.len());
        assert_eq!(table.on_click[src], [Layout::ROOT, src]);
        assert_eq!(table.on_click[main], [Layout::ROOT, main]);
        assert_eq!(table.on_click[Layout::ROOT], [Layout::ROOT, Layout::ROOT]);
        assert_eq!(table.background, Layout::ROOT);
        assert_eq!((table.duration_ms, table.slow_duration_ms), (750, 7500));
    }

    #[test]
    fn test_zoom_table_leaves_controller_alone() {
        let l = layout();
        let src = id_of(&l, "src");
        let mut view = ViewController::new(&l);
        view.zoom(src, Modifiers::default());
        let table = view.zoom_table(&l);
        assert_eq!(table.focus, src);
        assert_eq!(view.focus(), src);
    }

    #[test]
    fn test_single_node_table() {
        let l = PackLayout::default().compute_layout(&HotspotTree::root());
        let table = ViewController::new(&l).zoom_table(&l);
        assert_eq!(table.on_click, vec![[Layout::ROOT, Layout::ROOT]]);
    }

    #[test]
    fn test_root_projection_is_identity() {
        let l = layout();
        let view = ViewController::new(&l);
        for node in &l.nodes {
            let p = view.project(&l, node.circle());
            assert!((p.x - node.x).abs() < 1e-9 && (p.r - node.r).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zoomed_focus_fills_viewport() {
        let l = layout();
        let src = id_of(&l, "src");
        let mut view = ViewController::new(&l);
        view.zoom(src, Modifiers::default());
        let p = view.project(&l, l.nodes[src].circle());
        let half = l.size / 2.0;
        assert!((p.x - half).abs() < 1e-6 && (p.y - half).abs() < 1e-6);
        assert!((p.r - half).abs() < 1e-6, "focus radius projects to {}", p.r);
    }

    #[test]
    fn test_labels_follow_focus() {
        let l = layout();
        let src = id_of(&l, "src");
        let main = &l.nodes[id_of(&l, "src/main.rs")];
        let mut view = ViewController::new(&l);
        assert!(view.label_visible(&l.nodes[src]));
        assert!(!view.label_visible(main));
        view.zoom(src, Modifiers::default());
        assert!(view.label_visible(main));
        assert!(!view.label_visible(&l.nodes[src]));
    }

    #[test]
    fn test_tooltip_shows_full_path() {
        let l = layout();
        assert_eq!(tooltip(&l, id_of(&l, "src/util.rs")), Some("src/util.rs"));
        assert_eq!(tooltip(&l, Layout::ROOT), Some("root"));
        assert_eq!(tooltip(&l, 999), None);
    }
}
