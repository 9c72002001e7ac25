use std::sync::Arc;

use cp_core::{ArticleCandidate, ArticleExtractor, PageFetcher, Result};
use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::discover::LinkDiscoverer;
use crate::utils::parse_url;

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Label stored with every article from this source.
    pub name: String,
    pub base_url: String,
    /// Section listing page, relative to `base_url`.
    pub listing_path: String,
    /// Cap on simultaneous article fetches against the source.
    pub max_concurrent_fetches: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            name: "blockworks".to_string(),
            base_url: "https://blockworks.co".to_string(),
            listing_path: "/news".to_string(),
            max_concurrent_fetches: 4,
        }
    }
}

/// Scrape Orchestrator: listing page → links → concurrent extraction.
pub struct ArticleScraper {
    source: SourceConfig,
    base_url: Url,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn ArticleExtractor>,
    discoverer: LinkDiscoverer,
}

impl ArticleScraper {
    pub fn new(
        source: SourceConfig,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn ArticleExtractor>,
    ) -> Result<Self> {
        let base_url = parse_url(&source.base_url)?;
        let discoverer = LinkDiscoverer::new(&source.listing_path);
        Ok(Self {
            source,
            base_url,
            fetcher,
            extractor,
            discoverer,
        })
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub fn listing_url(&self) -> Result<Url> {
        Ok(self.base_url.join(&self.source.listing_path)?)
    }

    /// Fetch the listing and extract up to `limit` articles. Only an
    /// unreachable listing fails the call; failed articles are dropped.
    #[instrument(level = "info", skip(self), fields(source = %self.source.name))]
    pub async fn fetch_latest(&self, limit: usize) -> Result<Vec<ArticleCandidate>> {
        let listing_url = self.listing_url()?;
        info!(%listing_url, limit, "🦗 Getting latest articles");

        let listing = self.fetcher.fetch(listing_url.as_str()).await.map_err(|e| {
            error!(%listing_url, error = %e, "Listing page unreachable");
            e
        })?;

        let urls = self.discoverer.discover(&listing, &self.base_url, limit);
        if urls.is_empty() {
            warn!(%listing_url, "No article links found on the page");
            return Ok(Vec::new());
        }

        let attempted = urls.len();
        let articles: Vec<ArticleCandidate> = stream::iter(urls)
            .map(|url| async move {
                match self.scrape_article(&url).await {
                    Ok(article) => Some(article),
                    Err(e) => {
                        warn!(%url, error = %e, "Failed to scrape article");
                        None
                    }
                }
            })
            .buffer_unordered(self.source.max_concurrent_fetches.max(1))
            .filter_map(|article| async move { article })
            .collect()
            .await;

        info!(attempted, succeeded = articles.len(), "📰 Finished extracting articles");
        Ok(articles)
    }

    pub async fn scrape_article(&self, url: &str) -> Result<ArticleCandidate> {
        let document = self.fetcher.fetch(url).await?;
        self.extractor.extract(&document, url)
    }
}
