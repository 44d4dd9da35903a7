use thiserror::Error;

#[derive(Debug, Error)]
pub enum CasegenError {
    #[error("not initialized: run 'casegen init'")]
    NotInitialized,

    #[error("{0}")]
    Validation(String),

    #[error("project already saved: {0}")]
    RecordExists(String),

    #[error("project not found: {0}")]
    RecordNotFound(String),

    #[error("invalid timestamp '{0}': expected YYYY-MM-DD_HH-MM-SS")]
    InvalidTimestamp(String),

    #[error("invalid test type: {0}")]
    InvalidTestType(String),

    #[error("invalid output format: {0}")]
    InvalidFormatType(String),

    #[error("invalid automation framework: {0}")]
    InvalidFramework(String),

    #[error("invalid automation style: {0}")]
    InvalidStyle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, CasegenError>;
