use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::types::HotspotTree;

/// Writes the enclosure document as pretty-printed JSON.
pub fn write_tree(tree: &HotspotTree, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, tree)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Reads an enclosure document, refusing anything that is not a tree.
pub fn read_tree(path: &Path) -> Result<HotspotTree, String> {
    let file = File::open(path).map_err(|e| format!("cannot open: {e}"))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| format!("not a hotspot tree: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_written_tree_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspots.json");
        let mut root = HotspotTree::root();
        root.children.push(HotspotTree::leaf("main.rs", 10.0, 0.5));
        write_tree(&root, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert_eq!(read_tree(&path).unwrap(), root);
    }

    #[test]
    fn test_reads_string_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspots.json");
        std::fs::write(
            &path,
            r#"{"name":"root","children":[{"name":"a.py","size":"42","weight":0.25}]}"#,
        )
        .unwrap();
        let tree = read_tree(&path).unwrap();
        assert_eq!(tree.children[0].size, Some(42.0));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotspots.json");
        std::fs::write(&path, r#"[1, 2, 3]"#).unwrap();
        let err = read_tree(&path).unwrap_err();
        assert!(err.contains("not a hotspot tree"), "got: {err}");

        std::fs::write(&path, r#"{"name":"root","children":[{"name":"x","size":"lots"}]}"#).unwrap();
        assert!(read_tree(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = read_tree(Path::new("/nonexistent/hotspots.json")).unwrap_err();
        assert!(err.starts_with("cannot open"));
    }
}
