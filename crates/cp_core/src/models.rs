use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Title and body of an article handed to question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub title: String,
    pub content: String,
}

#[async_trait]
pub trait InferenceModel: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize an article body. `model` overrides the default model.
    async fn summarize(&self, text: &str, model: Option<&str>) -> Result<String>;

    /// Answer a question using the given articles as context.
    async fn answer(&self, corpus: &[CorpusEntry], question: &str, model: Option<&str>) -> Result<String>;

    /// Models the backend can serve.
    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
