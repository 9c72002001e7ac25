use async_trait::async_trait;

use crate::types::ArticleCandidate;
use crate::Result;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a document. Non-2xx responses surface as `Error::Fetch`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub trait ArticleExtractor: Send + Sync {
    /// Parse a fetched document into a candidate article.
    fn extract(&self, document: &str, url: &str) -> Result<ArticleCandidate>;
}
