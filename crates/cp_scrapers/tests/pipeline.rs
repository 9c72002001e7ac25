use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use cp_core::{
    ArticleStorage, CorpusEntry, Error, InferenceModel, NewArticle, PageFetcher, ProgressEvent, ProgressState, Result,
};
use cp_progress::NotificationHub;
use cp_scrapers::{ArticleScraper, EnrichmentConfig, HtmlExtractor, ScraperManager, SourceConfig};
use cp_storage::MemoryStorage;

const BASE: &str = "https://blockworks.co";

struct SiteFetcher {
    pages: HashMap<String, String>,
}

impl SiteFetcher {
    fn with_stories(count: usize) -> Self {
        let mut pages = HashMap::new();
        let listing: String = (0..count)
            .map(|i| format!("<li><a href=\"/news/story-{}\">Story {}</a></li>", i, i))
            .chain(std::iter::once("<a href=\"/about\">About</a>".to_string()))
            .collect();
        pages.insert(format!("{}/news", BASE), format!("<ul>{}</ul>", listing));
        for i in 0..count {
            pages.insert(
                format!("{}/news/story-{}", BASE, i),
                format!(
                    "<html><h1>Story {}</h1><div class=\"article-content\"><p>Paragraph {}.</p><h2>More</h2></div></html>",
                    i, i
                ),
            );
        }
        Self { pages }
    }
}

#[async_trait]
impl PageFetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[derive(Default)]
struct CountingModel {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl InferenceModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    async fn summarize(&self, text: &str, _model: Option<&str>) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(format!("Summary: {}", text))
    }

    async fn answer(&self, _corpus: &[CorpusEntry], _question: &str, _model: Option<&str>) -> Result<String> {
        Ok(String::new())
    }
}

#[tokio::test]
async fn test_scrape_dedup_persist_enrich() {
    let storage = Arc::new(MemoryStorage::new());
    for i in 0..2 {
        let known = NewArticle {
            kind: cp_core::ContentType::Article,
            url: format!("{}/news/story-{}", BASE, i),
            title: format!("Story {}", i),
            content: "Already here.".to_string(),
            source: "blockworks".to_string(),
            scraped_at: Utc::now(),
            metadata: Default::default(),
        };
        storage.insert_if_new(known).await.unwrap();
    }

    let hub = Arc::new(NotificationHub::new());
    let (_id, mut messages) = hub.subscribe_channel().await;
    let model = Arc::new(CountingModel::default());

    let scraper = ArticleScraper::new(
        SourceConfig::default(),
        Arc::new(SiteFetcher::with_stories(5)),
        Arc::new(HtmlExtractor::new()),
    )
    .unwrap();
    let manager = ScraperManager::new(
        storage.clone(),
        model.clone(),
        hub.clone(),
        scraper,
        &EnrichmentConfig { max_concurrent: 2 },
    );

    let outcome = manager.scrape(5, None).await.unwrap();
    assert_eq!(outcome.stored.len(), 3);
    assert_eq!(outcome.skipped, 2);

    let report = outcome.enrichment.wait().await.unwrap();
    assert_eq!(report.succeeded, 3);
    assert_eq!(report.failed, 0);

    let mut events = Vec::new();
    while let Ok(message) = messages.try_recv() {
        events.push(serde_json::from_str::<ProgressEvent>(&message).unwrap());
    }
    let started = events.iter().filter(|e| e.state == ProgressState::InProgress).count();
    let completed = events.iter().filter(|e| e.state == ProgressState::Completed).count();
    assert_eq!(started, 3);
    assert_eq!(completed, 3);
    assert_eq!(model.peak.load(Ordering::SeqCst), 2);

    for article in &outcome.stored {
        let stored = storage.get_by_id(article.id).await.unwrap().unwrap();
        assert_eq!(stored.summary.as_deref(), Some(format!("Summary: {}", stored.content).as_str()));
        assert!(stored.content.starts_with("Paragraph"));
    }
}
