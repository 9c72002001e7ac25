use std::sync::Arc;

use async_trait::async_trait;
use cp_core::{CorpusEntry, InferenceModel, Result};
use tracing::{info, warn};

use crate::models::TextGenerator;
use crate::prompt::{answer_prompt, summary_prompt};

/// Summary Generation Engine: prompt construction and budgets on top of a
/// [`TextGenerator`] backend.
pub struct SummaryEngine {
    generator: Arc<dyn TextGenerator>,
    default_model: String,
}

impl SummaryEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, default_model: impl Into<String>) -> Self {
        Self {
            generator,
            default_model: default_model.into(),
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn run(&self, prompt: &str, model: Option<&str>) -> Result<String> {
        let model = model.unwrap_or(&self.default_model);
        let result = self.generator.generate(prompt, model).await;
        if let Err(e) = &result {
            warn!(model, backend = self.generator.name(), error = %e, "Generation failed");
        }
        result
    }
}

#[async_trait]
impl InferenceModel for SummaryEngine {
    fn name(&self) -> &str {
        self.generator.name()
    }

    async fn summarize(&self, text: &str, model: Option<&str>) -> Result<String> {
        self.run(&summary_prompt(text), model).await
    }

    async fn answer(&self, corpus: &[CorpusEntry], question: &str, model: Option<&str>) -> Result<String> {
        info!(articles = corpus.len(), "🤖 Answering question over corpus");
        self.run(&answer_prompt(corpus, question), model).await
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        self.generator.list_models().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{CORPUS_CHAR_BUDGET, SUMMARY_CHAR_BUDGET};
    use cp_core::Error;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str, model: &str) -> Result<String> {
            self.calls.lock().unwrap().push((prompt.to_string(), model.to_string()));
            if self.fail {
                return Err(Error::Generation("backend down".to_string()));
            }
            Ok("A short summary.".to_string())
        }
    }

    #[tokio::test]
    async fn test_long_text_is_truncated_before_prompting() {
        let generator = Arc::new(RecordingGenerator::default());
        let engine = SummaryEngine::new(generator.clone(), "llama3.2");
        let body = format!("{}{}", "b".repeat(SUMMARY_CHAR_BUDGET), "OVERFLOW");

        assert_eq!(engine.summarize(&body, None).await.unwrap(), "A short summary.");

        let calls = generator.calls.lock().unwrap();
        let (prompt, model) = &calls[0];
        assert_eq!(model, "llama3.2");
        assert!(prompt.contains(&format!("{}...", "b".repeat(SUMMARY_CHAR_BUDGET))));
        assert!(!prompt.contains("OVERFLOW"));
    }

    #[tokio::test]
    async fn test_model_hint_overrides_default() {
        let generator = Arc::new(RecordingGenerator::default());
        let engine = SummaryEngine::new(generator.clone(), "llama3.2");
        engine.summarize("text", Some("mistral")).await.unwrap();
        assert_eq!(generator.calls.lock().unwrap()[0].1, "mistral");
    }

    #[tokio::test]
    async fn test_answer_packs_within_budget() {
        let generator = Arc::new(RecordingGenerator::default());
        let engine = SummaryEngine::new(generator.clone(), "llama3.2");
        let corpus: Vec<_> = (0..6)
            .map(|i| CorpusEntry {
                title: format!("Story {}", i),
                content: "c".repeat(3000),
            })
            .collect();

        engine.answer(&corpus, "What happened?", None).await.unwrap();

        let calls = generator.calls.lock().unwrap();
        let prompt = &calls[0].0;
        let context = prompt
            .split_once("Context:\n")
            .and_then(|(_, rest)| rest.rsplit_once("\n\nAnswer:"))
            .map(|(context, _)| context)
            .unwrap();
        let packed: usize = context.split("\n\n").map(|s| s.chars().count()).sum();
        assert!(packed <= CORPUS_CHAR_BUDGET);
        assert!(prompt.contains("Story 0") && prompt.contains("Story 1"));
        assert!(!prompt.contains("Story 2"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_returned_not_panicked() {
        let generator = Arc::new(RecordingGenerator {
            fail: true,
            ..Default::default()
        });
        let engine = SummaryEngine::new(generator, "llama3.2");
        let err = engine.summarize("text", None).await.unwrap_err();
        assert!(err.is_generation_failure());
    }
}
