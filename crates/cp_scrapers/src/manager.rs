use std::sync::Arc;

use chrono::{Duration, Utc};
use cp_core::{
    Article, ArticleStorage, ContentType, CorpusEntry, Error, InferenceModel, NewArticle, ProgressSink, Result,
};
use tracing::{info, instrument, warn};

use crate::dedup::{filter_new, known_urls};
use crate::enrichment::{EnrichmentConfig, EnrichmentHandle, Enricher};
use crate::scraper::ArticleScraper;

pub const DEFAULT_DEDUP_WINDOW_HOURS: i64 = 24;

/// Result of one scrape run. Enrichment of `stored` continues in the
/// background behind `enrichment`.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub stored: Vec<Article>,
    pub skipped: usize,
    pub enrichment: EnrichmentHandle,
}

pub struct ScraperManager {
    storage: Arc<dyn ArticleStorage>,
    inference: Arc<dyn InferenceModel>,
    scraper: ArticleScraper,
    enricher: Enricher,
    dedup_window: Duration,
}

impl ScraperManager {
    pub fn new(
        storage: Arc<dyn ArticleStorage>,
        inference: Arc<dyn InferenceModel>,
        sink: Arc<dyn ProgressSink>,
        scraper: ArticleScraper,
        enrichment: &EnrichmentConfig,
    ) -> Self {
        let enricher = Enricher::new(storage.clone(), inference.clone(), sink, enrichment);
        Self {
            storage,
            inference,
            scraper,
            enricher,
            dedup_window: Duration::hours(DEFAULT_DEDUP_WINDOW_HOURS),
        }
    }

    pub fn with_dedup_window(mut self, window: Duration) -> Self {
        self.dedup_window = window;
        self
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    pub fn scraper(&self) -> &ArticleScraper {
        &self.scraper
    }

    /// Scrape, drop what is already known, persist the rest and start
    /// summarizing it. Returns once the new articles are stored.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape(&self, limit: usize, model: Option<String>) -> Result<ScrapeOutcome> {
        let candidates = self.scraper.fetch_latest(limit).await?;
        let found = candidates.len();

        let known = known_urls(&self.recent_articles().await?);
        let fresh = filter_new(candidates, &known);
        let mut skipped = found - fresh.len();

        let source = self.scraper.source().name.clone();
        let mut stored = Vec::with_capacity(fresh.len());
        for candidate in fresh {
            let url = candidate.url.clone();
            match self.storage.insert_if_new(NewArticle::from_candidate(candidate, &source)).await {
                Ok(Some(article)) => {
                    info!(article_id = article.id, title = %article.title, "💾 Stored article");
                    stored.push(article);
                }
                Ok(None) => skipped += 1,
                Err(e) => {
                    warn!(%url, error = %e, "Failed to store article");
                    skipped += 1;
                }
            }
        }

        info!(found, stored = stored.len(), skipped, "📰 Scrape finished");
        let enrichment = self.enricher.enrich(stored.clone(), model).await;

        Ok(ScrapeOutcome {
            stored,
            skipped,
            enrichment,
        })
    }

    /// Regenerate the summary of one stored article.
    pub async fn resummarize(&self, id: i64, model: Option<String>) -> Result<EnrichmentHandle> {
        let article = self.article(id).await?;
        info!(article_id = id, "🔄 Re-summarizing article");
        Ok(self.enricher.enrich(vec![article], model).await)
    }

    /// Answer a question over the articles inside the dedup window.
    pub async fn query(&self, question: &str, model: Option<&str>) -> Result<String> {
        let articles = self.recent_articles().await?;
        if articles.is_empty() {
            warn!("Query with an empty corpus");
            return Err(Error::NotFound(
                "No articles available. Please scrape articles first.".to_string(),
            ));
        }

        let corpus: Vec<CorpusEntry> = articles
            .into_iter()
            .map(|a| CorpusEntry {
                title: a.title,
                content: a.content,
            })
            .collect();
        info!(articles = corpus.len(), "🔍 Answering question");
        self.inference.answer(&corpus, question, model).await
    }

    /// Articles inside the dedup window, newest first.
    pub async fn recent_articles(&self) -> Result<Vec<Article>> {
        self.storage
            .list_recent(ContentType::Article, Utc::now() - self.dedup_window)
            .await
    }

    pub async fn article(&self, id: i64) -> Result<Article> {
        self.storage
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Article {} not found", id)))
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        self.inference.list_models().await
    }
}
