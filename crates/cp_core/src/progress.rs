use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressState {
    InProgress,
    Completed,
    Failed,
}

/// Transient notification about one article's enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "summary_progress")]
pub struct ProgressEvent {
    pub article_id: i64,
    pub status: String,
    pub progress: u8,
    pub state: ProgressState,
}

impl ProgressEvent {
    pub const STARTED_LABEL: &'static str = "Generating summary...";

    pub fn started(article_id: i64) -> Self {
        Self {
            article_id,
            status: Self::STARTED_LABEL.to_string(),
            progress: 0,
            state: ProgressState::InProgress,
        }
    }

    pub fn completed(article_id: i64, summary: impl Into<String>) -> Self {
        Self {
            article_id,
            status: summary.into(),
            progress: 100,
            state: ProgressState::Completed,
        }
    }

    pub fn failed(article_id: i64, placeholder: impl Into<String>) -> Self {
        Self {
            article_id,
            status: placeholder.into(),
            progress: 100,
            state: ProgressState::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state != ProgressState::InProgress
    }
}

/// Anything that can fan progress events out to clients.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn publish(&self, event: ProgressEvent);
}
