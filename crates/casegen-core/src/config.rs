use crate::error::{CasegenError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_model_key_env")]
    pub api_key_env: String,
}

fn default_model_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_model_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_model_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_model_key_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// IdentityConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,
    #[serde(default = "default_identity_key_env")]
    pub api_key_env: String,
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_identity_key_env() -> String {
    "FIREBASE_API_KEY".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: default_identity_base_url(),
            api_key_env: default_identity_key_env(),
        }
    }
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_mail_api_base")]
    pub api_base: String,
    /// OAuth client secret downloaded from the provider console.
    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,
    /// Cached authorized-user token written after the first consent.
    #[serde(default = "default_token_file")]
    pub token_file: PathBuf,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_mail_api_base() -> String {
    "https://gmail.googleapis.com".to_string()
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_file() -> PathBuf {
    PathBuf::from("token.json")
}

fn default_subject() -> String {
    "Your Test Cases".to_string()
}

fn default_body() -> String {
    "Attached is your generated test output.".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_base: default_mail_api_base(),
            credentials_file: default_credentials_file(),
            token_file: default_token_file(),
            subject: default_subject(),
            body: default_body(),
        }
    }
}

// ---------------------------------------------------------------------------
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_PROJECTS_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            projects_dir: default_projects_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `.casegen/config.yaml`. Secrets never live here; only the
/// names of the environment variables that hold them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(CasegenError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(CasegenError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn credentials_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.mail.credentials_file)
    }

    pub fn token_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.mail.token_file)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_hosted_services() {
        let cfg = Config::default();
        assert_eq!(cfg.model.model, "gpt-3.5-turbo");
        assert!((cfg.model.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(cfg.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.identity.api_key_env, "FIREBASE_API_KEY");
        assert_eq!(cfg.storage.projects_dir, PathBuf::from("saved_projects"));
        assert_eq!(cfg.mail.token_file, PathBuf::from("token.json"));
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(CasegenError::NotInitialized)
        ));
        assert_eq!(Config::load_or_default(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.model.model = "gpt-4o-mini".to_string();
        cfg.storage.projects_dir = PathBuf::from("/srv/casegen/projects");
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".casegen")).unwrap();
        std::fs::write(
            dir.path().join(".casegen/config.yaml"),
            "model:\n  temperature: 0.9\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert!((cfg.model.temperature - 0.9).abs() < f32::EPSILON);
        assert_eq!(cfg.model.model, "gpt-3.5-turbo");
        assert_eq!(cfg.mail, MailConfig::default());
    }

    #[test]
    fn mail_paths_resolve_against_root() {
        let cfg = Config::default();
        let root = Path::new("/tmp/proj");
        assert_eq!(
            cfg.token_path(root),
            PathBuf::from("/tmp/proj/token.json")
        );
        assert_eq!(
            cfg.credentials_path(root),
            PathBuf::from("/tmp/proj/credentials.json")
        );
    }
}
