use async_trait::async_trait;
use cp_core::Result;

use super::TextGenerator;

/// Offline backend: answers with the first words of the prompt's payload.
#[derive(Debug, Default)]
pub struct DummyGenerator;

#[async_trait]
impl TextGenerator for DummyGenerator {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn generate(&self, prompt: &str, _model: &str) -> Result<String> {
        let payload = prompt
            .split_once("Article:")
            .map(|(_, rest)| rest)
            .unwrap_or(prompt);
        let words: Vec<&str> = payload.split_whitespace().take(20).collect();
        Ok(words.join(" "))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["dummy".to_string()])
    }
}
