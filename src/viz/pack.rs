//! Circle-packing layout.
//!
//! Leaves get a radius of `sqrt(size)`; siblings are packed around each other
//! with a front chain, wrapped in their smallest enclosing circle, and the
//! whole hierarchy is finally scaled into a square of side `size`.

use super::enclose::enclose;
use super::{Circle, Layout, LayoutEngine, PackedNode, INNER_DIAMETER};
use crate::types::HotspotTree;

pub struct PackLayout {
    pub size: f64,
    /// Gap between sibling circles, in output pixels.
    pub padding: f64,
}

impl Default for PackLayout {
    fn default() -> Self {
        PackLayout { size: INNER_DIAMETER, padding: 2.0 }
    }
}

impl LayoutEngine for PackLayout {
    fn compute_layout(&self, tree: &HotspotTree) -> Layout {
        let mut nodes = Vec::new();
        flatten(tree, None, 0, "", &mut nodes);

        for node in nodes.iter_mut().filter(|n| n.is_leaf()) {
            node.r = node.value.max(0.0).sqrt();
        }

        // Children always have larger ids than their parent, so walking ids
        // backwards visits every subtree before its root.
        for id in (0..nodes.len()).rev() {
            pack_children(&mut nodes, id, 0.0);
        }

        let center = self.size / 2.0;
        let estimate = nodes[0].r;
        if !(estimate > 0.0) {
            for node in nodes.iter_mut() {
                node.x = center;
                node.y = center;
                node.r = 0.0;
            }
            nodes[0].r = center;
            return Layout { nodes, size: self.size };
        }

        // Second pass with the padding expressed in layout units.
        let pad = self.padding * estimate / self.size;
        for id in (0..nodes.len()).rev() {
            pack_children(&mut nodes, id, pad);
        }

        let k = self.size / (2.0 * nodes[0].r);
        nodes[0].x = center;
        nodes[0].y = center;
        nodes[0].r *= k;
        for id in 1..nodes.len() {
            let parent = nodes[id].parent.unwrap_or(0);
            let (px, py) = (nodes[parent].x, nodes[parent].y);
            let node = &mut nodes[id];
            node.r *= k;
            node.x = px + k * node.x;
            node.y = py + k * node.y;
        }

        Layout { nodes, size: self.size }
    }
}

/// Pre-order flattening; children are visited largest value first, which is
/// also the order they get packed in.
fn flatten(
    tree: &HotspotTree,
    parent: Option<usize>,
    depth: usize,
    parent_path: &str,
    out: &mut Vec<PackedNode>,
) -> usize {
    let id = out.len();
    let path = match parent {
        None => String::new(),
        Some(_) if parent_path.is_empty() => tree.name.clone(),
        Some(_) => format!("{parent_path}/{}", tree.name),
    };
    out.push(PackedNode {
        id,
        name: tree.name.clone(),
        path: path.clone(),
        depth,
        parent,
        children: Vec::new(),
        value: tree.total_size(),
        weight: tree.weight,
        x: 0.0,
        y: 0.0,
        r: 0.0,
    });

    let mut order: Vec<&HotspotTree> = tree.children.iter().collect();
    order.sort_by(|a, b| b.total_size().total_cmp(&a.total_size()));
    for child in order {
        let child_id = flatten(child, Some(id), depth + 1, &path, out);
        out[id].children.push(child_id);
    }
    id
}

/// Packs the children of `id` around its (relative) origin and sets the
/// node's own radius to the enclosing circle grown by `pad`.
fn pack_children(nodes: &mut [PackedNode], id: usize, pad: f64) {
    if nodes[id].is_leaf() {
        return;
    }
    let children = nodes[id].children.clone();
    let mut circles: Vec<Circle> = children
        .iter()
        .map(|&c| Circle { x: 0.0, y: 0.0, r: nodes[c].r + pad })
        .collect();

    let enclosing = pack_siblings(&mut circles);

    for (&c, circle) in children.iter().zip(&circles) {
        nodes[c].x = circle.x;
        nodes[c].y = circle.y;
    }
    nodes[id].r = enclosing + pad;
}

/// Places circles tangent to each other without overlap, centred on the
/// origin. Returns the radius of the enclosing circle.
pub fn pack_siblings(circles: &mut [Circle]) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }
    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    circles[0].x = -circles[1].r;
    circles[1].x = circles[0].r;
    circles[1].y = 0.0;
    if n == 2 {
        return circles[0].r + circles[1].r;
    }

    place(circles, 1, 0, 2);

    // Front chain as a circular doubly linked list over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    prev[1] = 0;
    next[1] = 2;
    prev[2] = 1;
    next[2] = 0;
    prev[0] = 2;

    let (mut a, mut b) = (0usize, 1usize);
    let mut i = 3;
    'pack: while i < n {
        place(circles, a, b, i);
        let c = i;

        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        // Insert c between a and b.
        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        // Continue from the chain pair closest to the origin.
        let mut best = score(circles, a, next[a]);
        let mut cur = next[c];
        while cur != b {
            let s = score(circles, cur, next[cur]);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let mut front = vec![circles[b]];
    let mut cur = next[b];
    while cur != b {
        front.push(circles[cur]);
        cur = next[cur];
    }
    let e = enclose(&front);

    for circle in circles.iter_mut() {
        circle.x -= e.x;
        circle.y -= e.y;
    }
    e.r
}

/// Moves circle `c` so it is tangent to both `a` and `b`.
fn place(circles: &mut [Circle], b: usize, a: usize, c: usize) {
    let (ca, cb) = (circles[a], circles[b]);
    let r = circles[c].r;
    let (dx, dy) = (cb.x - ca.x, cb.y - ca.y);
    let d2 = dx * dx + dy * dy;

    let (x, y) = if d2 > 0.0 {
        let a2 = (ca.r + r) * (ca.r + r);
        let b2 = (cb.r + r) * (cb.r + r);
        if a2 > b2 {
            let t = (d2 + b2 - a2) / (2.0 * d2);
            let h = (b2 / d2 - t * t).max(0.0).sqrt();
            (cb.x - t * dx - h * dy, cb.y - t * dy + h * dx)
        } else {
            let t = (d2 + a2 - b2) / (2.0 * d2);
            let h = (a2 / d2 - t * t).max(0.0).sqrt();
            (ca.x + t * dx - h * dy, ca.y + t * dy + h * dx)
        }
    } else {
        (ca.x + r, ca.y)
    };
    circles[c].x = x;
    circles[c].y = y;
}

fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = a.r + b.r - 1e-6;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin of the weighted midpoint of a chain pair.
fn score(circles: &[Circle], a: usize, b: usize) -> f64 {
    let (ca, cb) = (circles[a], circles[b]);
    let ab = ca.r + cb.r;
    if ab == 0.0 {
        return ca.x * ca.x + ca.y * ca.y;
    }
    let dx = (ca.x * cb.r + cb.x * ca.r) / ab;
    let dy = (ca.y * cb.r + cb.y * ca.r) / ab;
    dx * dx + dy * dy
}
