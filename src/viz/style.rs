use super::color::{depth_color, Rgb};
use super::PackedNode;

/// How a circle is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Any node carrying a positive weight.
    Risk,
    /// Leaf without a risk signal.
    Calm,
    /// Directory, coloured by depth.
    Depth(Rgb),
}

impl Fill {
    pub fn css(&self) -> String {
        match self {
            Fill::Risk => "darkred".to_string(),
            Fill::Calm => "WhiteSmoke".to_string(),
            Fill::Depth(rgb) => rgb.to_string(),
        }
    }
}

/// Risk wins over the depth gradient, even on directories.
pub fn fill(node: &PackedNode) -> Fill {
    if node.weight.unwrap_or(0.0) > 0.0 {
        Fill::Risk
    } else if !node.is_leaf() {
        Fill::Depth(depth_color(node.depth))
    } else {
        Fill::Calm
    }
}

/// Opacity follows the weight; nodes without one are drawn fully opaque.
pub fn fill_opacity(node: &PackedNode) -> f64 {
    match node.weight {
        Some(w) if w.is_finite() => w.clamp(0.0, 1.0),
        Some(_) => 0.0,
        None => 1.0,
    }
}

pub fn css_class(node: &PackedNode) -> &'static str {
    match (node.parent, node.is_leaf()) {
        (None, _) => "node node--root",
        (Some(_), true) => "node node--leaf",
        (Some(_), false) => "node",
    }
}
