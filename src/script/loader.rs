//! Work item loading.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// One named piece of work: an id plus the sentences to speak for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub id: String,             // Key from the script, used in output names
    pub sentences: Vec<String>, // Raw sentences, chunked before synthesis
}

/// Load a script file mapping work item ids to sentence lists.
///
/// The file must hold a single JSON object like
/// `{"P1": ["First sentence.", "Second."], "P2": [...]}`. Items are returned
/// in sorted key order so repeated runs process them in a stable sequence.
///
/// # Errors
/// Fails when the file cannot be read, is not an object of string arrays,
/// or contains no items at all.
pub fn load_work_items(path: &Path) -> Result<Vec<WorkItem>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading script {}", path.display()))?;
    let entries: BTreeMap<String, Vec<String>> =
        serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))?;
    if entries.is_empty() {
        bail!("script {} contains no work items", path.display());
    }
    Ok(entries.into_iter().map(|(id, sentences)| WorkItem { id, sentences }).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_script(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_items_in_sorted_key_order() {
        let (_dir, path) = write_script(r#"{"b": ["Later."], "a": ["First.", "Second."]}"#);
        let items = load_work_items(&path).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].sentences, vec!["First.", "Second."]);
        assert_eq!(items[1].id, "b");
    }

    #[test]
    fn rejects_non_object_scripts() {
        let (_dir, path) = write_script(r#"["not", "a", "map"]"#);
        assert!(load_work_items(&path).is_err());
    }

    #[test]
    fn rejects_empty_scripts() {
        let (_dir, path) = write_script("{}");
        let err = load_work_items(&path).unwrap_err();
        assert!(err.to_string().contains("no work items"), "unexpected: {err:#}");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_work_items(Path::new("/definitely/not/here.json")).is_err());
    }
}
