use std::sync::Arc;

use async_trait::async_trait;
use cp_core::{Error, Result};

pub mod dummy;
pub mod ollama;

pub use dummy::DummyGenerator;
pub use ollama::OllamaGenerator;

use crate::Config;

/// A language model backend: turns one prompt into one complete answer.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, model: &str) -> Result<String>;

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

pub fn create_generator(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    match config.backend.as_str() {
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        "dummy" => Ok(Arc::new(DummyGenerator)),
        other => Err(Error::Generation(format!(
            "Unknown model backend '{}'. Available backends: ollama, dummy",
            other
        ))),
    }
}
