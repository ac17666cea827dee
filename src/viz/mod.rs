//! Zoomable circle-packing view of a [`HotspotTree`].
//!
//! Layout and rendering sit behind [`LayoutEngine`] and [`FrameRenderer`] so
//! the backend can change without touching the tree or the zoom state held
//! by [`view::ViewController`].

pub mod color;
pub mod enclose;
pub mod label;
pub mod pack;
pub mod style;
pub mod svg;
pub mod view;

use crate::types::HotspotTree;
use serde::Serialize;

/// Outer edge of the drawing, in pixels.
pub const OUTER_DIAMETER: f64 = 960.0;
pub const MARGIN: f64 = 10.0;
pub const INNER_DIAMETER: f64 = OUTER_DIAMETER - MARGIN - MARGIN;

/// A circle in layout space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

/// One positioned node. Ids are pre-order indices, so the root is `0` and
/// every parent id is smaller than its children's.
#[derive(Debug, Clone, Serialize)]
pub struct PackedNode {
    pub id: usize,
    pub name: String,
    /// Slash-joined names from below the root down to this node.
    pub path: String,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub value: f64,
    pub weight: Option<f64>,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl PackedNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn circle(&self) -> Circle {
        Circle { x: self.x, y: self.y, r: self.r }
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<PackedNode>,
    /// Side of the square the layout was fitted into.
    pub size: f64,
}

impl Layout {
    pub const ROOT: usize = 0;

    pub fn root(&self) -> &PackedNode {
        &self.nodes[Self::ROOT]
    }

    pub fn get(&self, id: usize) -> Option<&PackedNode> {
        self.nodes.get(id)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &PackedNode> {
        self.nodes.iter().filter(|n| n.is_leaf() && n.parent.is_some())
    }
}

pub trait LayoutEngine {
    fn compute_layout(&self, tree: &HotspotTree) -> Layout;
}

pub trait FrameRenderer {
    /// Renders the layout as seen with the controller's current focus.
    fn render_frame(&self, layout: &Layout, view: &view::ViewController) -> String;
}
