//! Changelog file operations

use std::io::Write;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::{ChangelogError, Result};

/// Write changelog content atomically.
///
/// The content goes to a temporary file in the same directory which is then
/// renamed over the target, so an interrupted run leaves either the old or the
/// new file, never a partial one.
#[instrument(skip(content), fields(path = %path.display(), len = content.len()))]
pub fn write_changelog(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_failed = |reason: String| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        reason,
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_failed(e.to_string()))?;
    temp.write_all(content.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| write_failed(e.to_string()))?;
    temp.persist(path).map_err(|e| write_failed(e.error.to_string()))?;

    info!(path = %path.display(), "changelog written");
    Ok(())
}

/// Read existing changelog content
pub fn read_changelog(path: &Path) -> Result<Option<String>> {
    if path.exists() {
        debug!(path = %path.display(), "reading existing changelog");
        Ok(Some(std::fs::read_to_string(path)?))
    } else {
        debug!(path = %path.display(), "no existing changelog found");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CHANGELOG.md");

        assert!(read_changelog(&path).unwrap().is_none());

        write_changelog(&path, "# Changelog\n").unwrap();
        assert_eq!(read_changelog(&path).unwrap().as_deref(), Some("# Changelog\n"));
    }

    #[test]
    fn test_write_replaces_existing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("CHANGELOG.md");
        std::fs::write(&path, "old content that is longer than the new one").unwrap();

        write_changelog(&path, "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");

        let leftovers: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing").join("CHANGELOG.md");
        assert!(write_changelog(&path, "x").is_err());
    }
}
