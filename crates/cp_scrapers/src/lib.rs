pub mod dedup;
pub mod discover;
pub mod enrichment;
pub mod extractor;
pub mod fetcher;
pub mod manager;
pub mod scraper;
pub mod utils;

pub use dedup::{filter_new, known_urls};
pub use discover::LinkDiscoverer;
pub use enrichment::{EnrichmentConfig, EnrichmentHandle, EnrichmentReport, Enricher};
pub use extractor::HtmlExtractor;
pub use fetcher::HttpFetcher;
pub use manager::{ScrapeOutcome, ScraperManager, DEFAULT_DEDUP_WINDOW_HOURS};
pub use scraper::{ArticleScraper, SourceConfig};

pub mod prelude {
    pub use super::{
        ArticleScraper, EnrichmentConfig, Enricher, HtmlExtractor, HttpFetcher, ScraperManager, SourceConfig,
    };
    pub use cp_core::{Article, ArticleStorage, InferenceModel, ProgressSink, Result};
}
