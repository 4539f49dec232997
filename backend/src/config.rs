//! Runtime configuration, read once from the environment at startup.

use crate::reconciler::HeaderSynonyms;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE: &str = "rankings.sqlite";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("cannot read header synonyms from {path}: {source}")]
    SynonymsUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("header synonyms file {path} is not valid: {source}")]
    SynonymsInvalid {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub max_upload_bytes: usize,
    pub synonyms: HeaderSynonyms,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("RANKINGS_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "RANKINGS_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let max_upload_bytes = match lookup("RANKINGS_MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse()
                .ok()
                .filter(|&bytes: &usize| bytes > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "RANKINGS_MAX_UPLOAD_BYTES",
                    value,
                })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let synonyms = match lookup("RANKINGS_HEADER_SYNONYMS") {
            Some(path) => load_synonyms(path)?,
            None => HeaderSynonyms::default(),
        };

        Ok(Self {
            host: lookup("RANKINGS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_path: lookup("RANKINGS_DATABASE")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
                .into(),
            max_upload_bytes,
            synonyms,
        })
    }
}

fn load_synonyms(path: String) -> Result<HeaderSynonyms, ConfigError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::SynonymsUnreadable { path, source }),
    };
    serde_json::from_str(&contents).map_err(|source| ConfigError::SynonymsInvalid { path, source })
}
