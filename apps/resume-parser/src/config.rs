use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Default request body limit for uploads: 10 MiB.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_NER_MODEL_REPO: &str = "djagatiya/ner-bert-base-cased-ontonotesv5-englishv4";

/// Which entity recognizer to load at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NerBackend {
    /// Built-in rule recognizer. Always available.
    Pattern,
    /// BERT token-classification model. Requires the `bert` cargo feature.
    Bert,
}

impl std::str::FromStr for NerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" | "rules" => Ok(NerBackend::Pattern),
            "bert" => Ok(NerBackend::Bert),
            other => bail!("Unknown NER backend '{other}' (expected 'pattern' or 'bert')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Prefix stored uploads with a UUID instead of overwriting on name collision.
    pub unique_upload_names: bool,
    pub ner_backend: NerBackend,
    /// Extra organization names for the pattern recognizer.
    pub ner_gazetteer: Option<PathBuf>,
    pub ner_model_repo: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: var_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var_or("RUST_LOG", "info"),
            upload_dir: PathBuf::from(var_or("UPLOAD_DIR", "uploads")),
            max_upload_bytes: match lookup("MAX_UPLOAD_BYTES") {
                Some(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
            unique_upload_names: parse_bool(
                "UNIQUE_UPLOAD_NAMES",
                &var_or("UNIQUE_UPLOAD_NAMES", "false"),
            )?,
            ner_backend: var_or("NER_BACKEND", "pattern").parse()?,
            ner_gazetteer: lookup("NER_GAZETTEER")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            ner_model_repo: var_or("NER_MODEL_REPO", DEFAULT_NER_MODEL_REPO),
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("Environment variable '{key}' must be a boolean, got '{other}'"),
    }
}
