use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cp_core::{
    Article, ArticleStorage, Error, InferenceModel, ProgressEvent, ProgressSink, Result, SUMMARY_ERROR_PLACEHOLDER,
};
use futures::FutureExt;
use tokio::sync::{oneshot, Mutex as TokioMutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Summaries generated at the same time, across all runs.
    pub max_concurrent: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { max_concurrent: 2 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Completion signal of one detached enrichment run. Dropping it leaves the
/// run going.
#[derive(Debug)]
pub struct EnrichmentHandle {
    report: oneshot::Receiver<EnrichmentReport>,
}

impl EnrichmentHandle {
    pub async fn wait(self) -> Result<EnrichmentReport> {
        self.report
            .await
            .map_err(|_| Error::Generation("Enrichment run ended without reporting".to_string()))
    }
}

/// Enrichment Coordinator: summarizes stored articles through a fixed-size
/// pool, persisting each result and announcing progress.
#[derive(Clone)]
pub struct Enricher {
    storage: Arc<dyn ArticleStorage>,
    inference: Arc<dyn InferenceModel>,
    sink: Arc<dyn ProgressSink>,
    semaphore: Arc<Semaphore>,
    runs: Arc<TokioMutex<Vec<JoinHandle<()>>>>,
}

impl Enricher {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        inference: Arc<dyn InferenceModel>,
        sink: Arc<dyn ProgressSink>,
        config: &EnrichmentConfig,
    ) -> Self {
        Self {
            storage,
            inference,
            sink,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            runs: Arc::new(TokioMutex::new(Vec::new())),
        }
    }

    /// Start summarizing `articles` in the background and return at once.
    pub async fn enrich(&self, articles: Vec<Article>, model: Option<String>) -> EnrichmentHandle {
        let (tx, rx) = oneshot::channel();
        let this = self.clone();
        let total = articles.len();

        let handle = tokio::spawn(async move {
            let mut workers = JoinSet::new();
            for article in articles {
                let this = this.clone();
                let model = model.clone();
                workers.spawn(async move { this.enrich_one(article, model.as_deref()).await });
            }

            let mut report = EnrichmentReport::default();
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok(true) => report.succeeded += 1,
                    Ok(false) => report.failed += 1,
                    Err(e) => {
                        error!(error = %e, "Enrichment worker panicked");
                        report.failed += 1;
                    }
                }
            }

            info!(total, succeeded = report.succeeded, failed = report.failed, "✅ Enrichment run finished");
            let _ = tx.send(report);
        });

        let mut runs = self.runs.lock().await;
        runs.retain(|run| !run.is_finished());
        runs.push(handle);

        EnrichmentHandle { report: rx }
    }

    /// Runs that have not finished yet.
    pub async fn pending(&self) -> usize {
        self.runs.lock().await.iter().filter(|run| !run.is_finished()).count()
    }

    /// Wait for every outstanding run.
    pub async fn shutdown(&self) {
        let runs = std::mem::take(&mut *self.runs.lock().await);
        info!(runs = runs.len(), "Waiting for outstanding enrichment");
        for run in runs {
            if let Err(e) = run.await {
                error!(error = %e, "Enrichment run aborted");
            }
        }
    }

    /// Summarize one article. Returns whether generation succeeded; either
    /// way the article gets a summary value and a terminal event.
    async fn enrich_one(&self, article: Article, model: Option<&str>) -> bool {
        let Ok(_permit) = self.semaphore.acquire().await else {
            error!(article_id = article.id, "Enrichment pool closed");
            return false;
        };

        self.sink.publish(ProgressEvent::started(article.id)).await;
        info!(article_id = article.id, title = %article.title, "🤖 Generating summary");

        let generated = AssertUnwindSafe(self.inference.summarize(&article.content, model))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(Error::Generation("Summary generation panicked".to_string())));

        match generated {
            Ok(summary) => {
                self.persist(article.id, &summary).await;
                info!(article_id = article.id, "✨ Summary generated");
                self.sink.publish(ProgressEvent::completed(article.id, summary)).await;
                true
            }
            Err(e) => {
                warn!(article_id = article.id, error = %e, "Error generating summary");
                self.persist(article.id, SUMMARY_ERROR_PLACEHOLDER).await;
                self.sink
                    .publish(ProgressEvent::failed(article.id, SUMMARY_ERROR_PLACEHOLDER))
                    .await;
                false
            }
        }
    }

    async fn persist(&self, id: i64, summary: &str) {
        if let Err(e) = self.storage.update_summary(id, summary).await {
            error!(article_id = id, error = %e, "Failed to store summary");
        }
    }
}
