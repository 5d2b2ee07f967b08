use thiserror::Error;

use crate::extract::ExtractionResult;
use crate::models::FieldKind;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("fetch failed for {url}: {message}")]
    Fetch {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("incomplete extraction, unresolved fields: {missing:?}")]
    IncompleteExtraction {
        missing: Vec<FieldKind>,
        partial: ExtractionResult,
    },

    #[error("unparseable price text: {raw:?}")]
    PriceParse { raw: String },

    #[error("snapshot append conflict: another run recorded this state first")]
    StoreConflict,

    #[error("notification error: {0}")]
    Notify(String),

    #[error("invalid selector: {selector}")]
    Selector { selector: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("browser error: {0}")]
    Browser(anyhow::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tracker file error: {0}")]
    TrackerFile(#[from] toml::de::Error),
}

// headless_chrome surfaces its failures as anyhow errors
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::Browser(err)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
