use std::collections::HashSet;

use cp_core::{Article, ArticleCandidate};
use tracing::debug;

/// Urls of already ingested articles.
pub fn known_urls(articles: &[Article]) -> HashSet<String> {
    articles.iter().map(|a| a.url.clone()).collect()
}

/// Drop candidates whose url is already known.
pub fn filter_new(candidates: Vec<ArticleCandidate>, known: &HashSet<String>) -> Vec<ArticleCandidate> {
    let before = candidates.len();
    let fresh: Vec<_> = candidates.into_iter().filter(|c| !known.contains(&c.url)).collect();
    debug!(before, after = fresh.len(), "Deduplicated candidates");
    fresh
}
