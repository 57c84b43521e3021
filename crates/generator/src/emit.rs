use landing_kit_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Write one rendered page under the output root, creating intermediate
/// directories as needed.
///
/// Directory creation treats "already exists" as success, so concurrent
/// builds into a shared tree cannot trip over each other. Existing page
/// content at the target path is overwritten.
pub fn emit_page(out_root: &Path, rel_path: &Path, html: &str) -> Result<PathBuf> {
    let target = out_root.join(rel_path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::PageWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(&target, html).map_err(|e| Error::PageWrite {
        path: target.clone(),
        source: e,
    })?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_emit_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let rel = Path::new("pergolas/marbella/index.html");
        let written = emit_page(dir.path(), rel, "<html></html>").unwrap();

        assert_eq!(written, dir.path().join(rel));
        assert_eq!(fs::read_to_string(&written).unwrap(), "<html></html>");
    }

    #[test]
    fn test_emit_overwrites_existing_page() {
        let dir = TempDir::new().unwrap();
        let rel = Path::new("pergolas/marbella/index.html");
        emit_page(dir.path(), rel, "old").unwrap();
        emit_page(dir.path(), rel, "new").unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(rel)).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_emit_existing_directories_are_fine() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pergolas/marbella")).unwrap();
        let rel = Path::new("pergolas/marbella/index.html");
        assert!(emit_page(dir.path(), rel, "x").is_ok());
    }

    #[test]
    fn test_emit_reports_write_failure_with_path() {
        let dir = TempDir::new().unwrap();
        // A file where a directory is needed makes create_dir_all fail
        fs::write(dir.path().join("pergolas"), "not a dir").unwrap();

        let result = emit_page(dir.path(), Path::new("pergolas/marbella/index.html"), "x");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to write"));
    }
}
