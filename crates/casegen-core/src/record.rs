use crate::config::Config;
use crate::error::{CasegenError, Result};
use crate::paths;
use crate::types::{AutomationStyle, FormatType, Framework, TestType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProjectRecord
// ---------------------------------------------------------------------------

/// One saved generation result. Immutable once written.
///
/// On disk the optional fields are written as empty strings, matching the
/// files produced by earlier versions of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub title: String,
    pub author: String,
    pub author_email: String,
    pub timestamp: String,
    pub test_type: TestType,
    pub format_type: FormatType,
    #[serde(default, with = "blank")]
    pub framework: Option<Framework>,
    #[serde(default, with = "blank")]
    pub style: Option<AutomationStyle>,
    #[serde(default, with = "blank")]
    pub expected_result: Option<String>,
    #[serde(default, with = "blank")]
    pub severity: Option<String>,
    #[serde(default, with = "blank")]
    pub category: Option<String>,
    pub user_story: String,
    pub output: String,
}

impl ProjectRecord {
    /// Human-readable identity used in errors and logs.
    pub fn key(&self) -> String {
        format!("{} @ {}", self.title, self.timestamp)
    }
}

/// Current local time in the record timestamp layout.
pub fn timestamp_now() -> String {
    chrono::Local::now()
        .format(paths::TIMESTAMP_FORMAT)
        .to_string()
}

/// Serde adapter: `None` <-> `""`.
mod blank {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => s.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// ProjectStore
// ---------------------------------------------------------------------------

/// One JSON file per record inside a single directory. No index, no locks:
/// every read scans the directory.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(root: &Path, config: &Config) -> Self {
        Self::new(paths::resolve(root, &config.storage.projects_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, title: &str, timestamp: &str) -> PathBuf {
        self.dir
            .join(paths::record_file_name(title, timestamp, "json"))
    }

    pub fn attachment_path(&self, title: &str, timestamp: &str) -> PathBuf {
        self.dir.join(paths::record_file_name(title, timestamp, "txt"))
    }

    /// Persist a new record. Fails with `RecordExists` rather than replacing
    /// a record with the same title and timestamp.
    pub fn save(&self, record: &ProjectRecord) -> Result<PathBuf> {
        paths::validate_timestamp(&record.timestamp)?;
        let path = self.record_path(&record.title, &record.timestamp);
        let data = serde_json::to_string_pretty(record)?;
        if !crate::io::write_new(&path, data.as_bytes())? {
            return Err(CasegenError::RecordExists(record.key()));
        }
        tracing::debug!(path = %path.display(), "saved project record");
        Ok(path)
    }

    pub fn load(&self, title: &str, timestamp: &str) -> Result<ProjectRecord> {
        paths::validate_timestamp(timestamp)?;
        let not_found = || CasegenError::RecordNotFound(format!("{title} @ {timestamp}"));
        let path = self.record_path(title, timestamp);
        if !path.exists() {
            return Err(not_found());
        }
        let data = std::fs::read_to_string(&path)?;
        let record: ProjectRecord = serde_json::from_str(&data)?;
        // Distinct titles can sanitize to the same file name.
        if record.title != title {
            return Err(not_found());
        }
        Ok(record)
    }

    /// Every readable record in the directory, newest first.
    ///
    /// Files that cannot be read or parsed are skipped with a warning instead
    /// of failing the whole scan.
    pub fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(CasegenError::from)
                .and_then(|data| serde_json::from_str::<ProjectRecord>(&data).map_err(Into::into));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable project file");
                }
            }
        }
        records.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(records)
    }

    /// Records whose `author_email` equals `owner_email`, newest first.
    pub fn list(&self, owner_email: &str) -> Result<Vec<ProjectRecord>> {
        let mut records = self.list_all()?;
        records.retain(|r| r.author_email == owner_email);
        Ok(records)
    }

    /// Write the raw output next to the record as a `.txt` file, for mail
    /// attachments and downloads. Overwrites an earlier export.
    pub fn write_attachment(&self, record: &ProjectRecord) -> Result<PathBuf> {
        paths::validate_timestamp(&record.timestamp)?;
        let path = self.attachment_path(&record.title, &record.timestamp);
        crate::io::atomic_write(&path, record.output.as_bytes())?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Partition records by title. Each title maps to its `(timestamp, record)`
/// versions, most recent first.
pub fn group_by_title(
    records: impl IntoIterator<Item = ProjectRecord>,
) -> BTreeMap<String, Vec<(String, ProjectRecord)>> {
    let mut groups: BTreeMap<String, Vec<(String, ProjectRecord)>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.title.clone())
            .or_default()
            .push((record.timestamp.clone(), record));
    }
    for versions in groups.values_mut() {
        versions.sort_by(|a, b| b.0.cmp(&a.0));
    }
    groups
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
