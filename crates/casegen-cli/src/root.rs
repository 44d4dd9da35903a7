use casegen_core::paths::CASEGEN_DIR;
use std::path::{Path, PathBuf};

/// Resolve the project root.
///
/// Priority:
/// 1. `--root` flag / `CASEGEN_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.casegen/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_marked_ancestor(&cwd).unwrap_or(cwd)
}

fn find_marked_ancestor(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CASEGEN_DIR).is_dir())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_root(Some(dir.path())), dir.path());
    }

    #[test]
    fn finds_marker_in_parent() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".casegen")).unwrap();
        let deep = dir.path().join("specs/login");
        std::fs::create_dir_all(&deep).unwrap();
        assert_eq!(find_marked_ancestor(&deep).as_deref(), Some(dir.path()));
    }

    #[test]
    fn no_marker_yields_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_marked_ancestor(dir.path()), None);
    }
}
