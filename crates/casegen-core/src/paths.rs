use crate::error::{CasegenError, Result};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const CASEGEN_DIR: &str = ".casegen";
pub const CONFIG_FILE: &str = ".casegen/config.yaml";
pub const DEFAULT_PROJECTS_DIR: &str = "saved_projects";

/// Layout of a saved project timestamp, e.g. `2024-05-01_13-45-09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn casegen_dir(root: &Path) -> PathBuf {
    root.join(CASEGEN_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against `root` unless it is already absolute.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

/// `<title stem>_<timestamp>.<ext>`, see [`title_stem`].
pub fn record_file_name(title: &str, timestamp: &str, ext: &str) -> String {
    format!("{}_{timestamp}.{ext}", title_stem(title))
}

/// File-name stem for `title`. Titles that sanitize unchanged are used as-is;
/// any other title gets a short digest of its raw text appended, so distinct
/// titles never share a file.
pub fn title_stem(title: &str) -> String {
    let sanitized = sanitize_title(title);
    if sanitized == title {
        return sanitized;
    }
    let digest = Sha256::digest(title.as_bytes());
    format!("{sanitized}-{}", &hex::encode(digest)[..8])
}

// ---------------------------------------------------------------------------
// Sanitizing and validation
// ---------------------------------------------------------------------------

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();
static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();

fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9 ._\-]").unwrap())
}

fn timestamp_re() -> &'static Regex {
    TIMESTAMP_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2}$").unwrap())
}

/// Make a user-supplied title safe to use as a file name component.
pub fn sanitize_title(title: &str) -> String {
    let cleaned = unsafe_re().replace_all(title.trim(), "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned.to_string()
    }
}

pub fn validate_timestamp(timestamp: &str) -> Result<()> {
    if !timestamp_re().is_match(timestamp) {
        return Err(CasegenError::InvalidTimestamp(timestamp.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
