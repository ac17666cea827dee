use crate::analyzers::lines::clean_path;
use crate::types::{Effort, HotspotTree, LineCount};
use std::collections::HashMap;

/// Nests the lines-of-code table into a directory tree.
///
/// Every file of `lines` becomes exactly one leaf, sized by its code lines.
/// The leaf weight is the file's revisions divided by the largest revision
/// count in `effort`; files without revisions weigh 0.
pub fn build_tree(lines: &[LineCount], effort: &[Effort]) -> HotspotTree {
    let max_revisions = effort.iter().map(|e| e.revisions).max().unwrap_or(0);
    let weights: HashMap<&str, f64> = effort
        .iter()
        .map(|e| {
            let w = if max_revisions == 0 { 0.0 } else { e.revisions as f64 / max_revisions as f64 };
            (clean_path(&e.module), w)
        })
        .collect();

    let mut root = HotspotTree::root();
    for row in lines {
        let path = clean_path(&row.file);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        let Some((file_name, dirs)) = segments.split_last() else { continue };

        let mut node = &mut root;
        for dir in dirs {
            node = child_directory(node, dir);
        }
        let weight = weights.get(path).copied().unwrap_or(0.0);
        node.children.push(HotspotTree::leaf(file_name, row.code as f64, weight));
    }
    root
}

fn child_directory<'a>(parent: &'a mut HotspotTree, name: &str) -> &'a mut HotspotTree {
    let pos = match parent.children.iter().position(|c| c.name == name && c.size.is_none()) {
        Some(pos) => pos,
        None => {
            parent.children.push(HotspotTree::directory(name));
            parent.children.len() - 1
        }
    };
    &mut parent.children[pos]
}
