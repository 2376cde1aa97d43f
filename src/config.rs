use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::classifier::artifact::MODEL_FILE;

/// Default ceiling on document length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 100_000;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy, so any of
/// these can live there instead of the shell environment.
pub struct Config {
    /// Where the model artifact is written by `train` and read by everything else
    pub model_path: PathBuf,
    /// Documents longer than this are rejected before classification
    pub max_input_chars: usize,
    /// Address the HTTP server binds to (TRUTHLENS_BIND)
    #[cfg(feature = "web")]
    pub bind: String,
    /// Port the HTTP server listens on (TRUTHLENS_PORT)
    #[cfg(feature = "web")]
    pub port: u16,
}

/// Returns the default model artifact path.
/// Uses the platform data directory: ~/.local/share/truthlens/model.json on Linux.
pub fn default_model_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("truthlens")
        .join(MODEL_FILE)
}

impl Config {
    /// Load configuration from environment variables. Everything has a default.
    pub fn load() -> Result<Self> {
        let model_path = env::var("TRUTHLENS_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_path());

        let max_input_chars = match env::var("TRUTHLENS_MAX_INPUT_CHARS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TRUTHLENS_MAX_INPUT_CHARS is not a number: {raw:?}"))?,
            Err(_) => DEFAULT_MAX_INPUT_CHARS,
        };

        #[cfg(feature = "web")]
        let port = match env::var("TRUTHLENS_PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("TRUTHLENS_PORT is not a valid port: {raw:?}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            model_path,
            max_input_chars,
            #[cfg(feature = "web")]
            bind: env::var("TRUTHLENS_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
            #[cfg(feature = "web")]
            port,
        })
    }

    /// Check that a trained model artifact exists.
    /// Call this before any operation that classifies text.
    pub fn require_model(&self) -> Result<()> {
        if !self.model_path.exists() {
            anyhow::bail!(
                "No model found at {}\n\
                 Run `truthlens train --data <csv>` to train one,\n\
                 or set TRUTHLENS_MODEL_PATH to an existing artifact.",
                self.model_path.display()
            );
        }
        Ok(())
    }
}
