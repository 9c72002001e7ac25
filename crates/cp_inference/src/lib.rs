use std::sync::Arc;
use std::time::Duration;

use cp_core::{InferenceModel, Result};
use serde::{Deserialize, Serialize};

pub mod engine;
pub mod models;
pub mod prompt;
pub mod stream;

pub use engine::SummaryEngine;
pub use models::{create_generator, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sampling options forwarded verbatim to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub num_predict: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            top_k: 40,
            top_p: 0.9,
            num_predict: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `ollama` or `dummy`.
    pub backend: String,
    pub base_url: String,
    pub default_model: String,
    /// Hard limit on a whole generation request, streaming included.
    pub timeout: Duration,
    pub options: SamplingOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: "ollama".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            options: SamplingOptions::default(),
        }
    }
}

/// Build the engine for the configured backend.
pub fn create_model(config: &Config) -> Result<Arc<dyn InferenceModel>> {
    let generator = create_generator(config)?;
    Ok(Arc::new(SummaryEngine::new(generator, config.default_model.clone())))
}

pub mod prelude {
    pub use super::{create_model, Config, SamplingOptions, SummaryEngine};
    pub use cp_core::{CorpusEntry, Error, InferenceModel, Result};
}
