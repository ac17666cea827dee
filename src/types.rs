use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

// ─── Revision log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Commit {
    #[allow(dead_code)]
    pub hash: String,
    pub author: String,
    #[allow(dead_code)]
    pub date: String,
    #[allow(dead_code)]
    pub subject: String,
    pub files: Vec<String>,
}

// ─── Metrics tables ───────────────────────────────────────────────────────────

/// One row of the revision-frequency table (`entity,n-revs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revisions {
    pub entity: String,
    pub revisions: usize,
}

/// One per-file row of the cloc `--by-file --csv` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCount {
    pub language: String,
    pub file: String,
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

/// One row of the merged complexity/effort table (`module,revisions,code`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effort {
    pub module: String,
    pub revisions: usize,
    pub code: u64,
}

/// Indentation complexity of one file at one revision.
#[derive(Debug, Clone, PartialEq)]
pub struct RevisionComplexity {
    pub rev: String,
    /// Non-blank lines measured.
    pub n: usize,
    pub total: f64,
    pub mean: f64,
    pub sd: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub commits: usize,
    pub entities: usize,
    pub entities_changed: usize,
    pub authors: usize,
}

// ─── Hotspot tree ─────────────────────────────────────────────────────────────

/// Node of the nested enclosure document consumed by the visualizer.
///
/// Leaves carry `size` (lines of code) and `weight` (normalized revision
/// count, `0.0..=1.0`). Directory nodes only carry `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotTree {
    pub name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number_or_numeric_string"
    )]
    pub size: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "number_or_numeric_string"
    )]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HotspotTree>,
}

impl HotspotTree {
    pub fn root() -> Self {
        Self::directory("root")
    }

    pub fn directory(name: &str) -> Self {
        HotspotTree { name: name.to_string(), size: None, weight: None, children: Vec::new() }
    }

    pub fn leaf(name: &str, size: f64, weight: f64) -> Self {
        HotspotTree {
            name: name.to_string(),
            size: Some(size),
            weight: Some(weight),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// All leaves in document order.
    pub fn leaves(&self) -> Vec<&HotspotTree> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Follows a `/`-separated chain of child names starting below this node.
    #[cfg(test)]
    pub fn find(&self, path: &str) -> Option<&HotspotTree> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .try_fold(self, |node, segment| node.children.iter().find(|c| c.name == segment))
    }

    /// Sum of leaf sizes below (and including) this node.
    pub fn total_size(&self) -> f64 {
        if self.is_leaf() {
            self.size.unwrap_or(0.0).max(0.0)
        } else {
            self.children.iter().map(HotspotTree::total_size).sum()
        }
    }
}

fn collect_leaves<'a>(node: &'a HotspotTree, out: &mut Vec<&'a HotspotTree>) {
    if node.is_leaf() {
        out.push(node);
    } else {
        for child in &node.children {
            collect_leaves(child, out);
        }
    }
}

/// The enclosure transform from maat-scripts emits sizes as strings
/// (`"size": "120"`), so both shapes are accepted.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("expected a number, got \"{s}\""))),
    }
}

// ─── Report ───────────────────────────────────────────────────────────────────

/// Context shown in the header of the rendered map.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub repo: String,
    pub folder: String,
    pub since: String,
    pub file_count: usize,
}

// ─── Artifacts ────────────────────────────────────────────────────────────────

/// Fixed file names of every artifact produced under the output directory.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub revision_log: PathBuf,
    pub frequencies: PathBuf,
    pub lines: PathBuf,
    pub complexity_effort: PathBuf,
    pub hotspots_json: PathBuf,
    pub hotspots_html: PathBuf,
    pub hotspots_svg: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: &Path) -> Self {
        ArtifactPaths {
            dir: dir.to_path_buf(),
            revision_log: dir.join("repo.log"),
            frequencies: dir.join("maat_freqs.csv"),
            lines: dir.join("maat_lines.csv"),
            complexity_effort: dir.join("complexity_effort.csv"),
            hotspots_json: dir.join("hotspots.json"),
            hotspots_html: dir.join("hotspots.html"),
            hotspots_svg: dir.join("hotspots.svg"),
        }
    }

    /// Data artifacts in the order the pipeline writes them.
    pub fn chain(&self) -> [&Path; 5] {
        [
            &self.revision_log,
            &self.frequencies,
            &self.lines,
            &self.complexity_effort,
            &self.hotspots_json,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_omits_children_in_json() {
        let leaf = HotspotTree::leaf("main.rs", 120.0, 0.5);
        let json = serde_json::to_value(&leaf).unwrap();
        assert!(json.get("children").is_none(), "Leaves must not serialize children: {json}");
        assert_eq!(json["size"], 120.0);
    }

    #[test]
    fn test_directory_omits_size_and_weight() {
        let mut dir = HotspotTree::directory("src");
        dir.children.push(HotspotTree::leaf("a.rs", 1.0, 0.0));
        let json = serde_json::to_value(&dir).unwrap();
        assert!(json.get("size").is_none());
        assert!(json.get("weight").is_none());
        assert_eq!(json["children"].as_array().map(|c| c.len()), Some(1));
    }

    #[test]
    fn test_string_sizes_are_accepted() {
        let json = r#"{"name":"root","children":[{"name":"a.py","children":[],"size":"42","weight":0.25}]}"#;
        let tree: HotspotTree = serde_json::from_str(json).expect("string sizes should parse");
        assert_eq!(tree.children[0].size, Some(42.0));
        assert_eq!(tree.children[0].weight, Some(0.25));
        assert!(tree.children[0].is_leaf());
    }

    #[test]
    fn test_non_numeric_size_rejected() {
        let json = r#"{"name":"a.py","size":"lots"}"#;
        let result: Result<HotspotTree, _> = serde_json::from_str(json);
        assert!(result.is_err(), "Non-numeric size must be a data error");
    }

    #[test]
    fn test_find_and_leaves() {
        let mut src = HotspotTree::directory("src");
        src.children.push(HotspotTree::leaf("a.rs", 10.0, 1.0));
        src.children.push(HotspotTree::leaf("b.rs", 5.0, 0.0));
        let mut root = HotspotTree::root();
        root.children.push(src);

        assert_eq!(root.leaves().len(), 2);
        assert_eq!(root.find("src/b.rs").and_then(|n| n.size), Some(5.0));
        assert!(root.find("src/c.rs").is_none());
        assert!((root.total_size() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_artifact_chain_order() {
        let paths = ArtifactPaths::new(Path::new("generated"));
        let chain = paths.chain();
        assert!(chain[0].ends_with("repo.log"));
        assert!(chain[4].ends_with("hotspots.json"));
    }
}
