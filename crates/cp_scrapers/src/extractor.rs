use chrono::Utc;
use cp_core::{ArticleCandidate, ArticleExtractor, Error, Result};
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::utils::{element_text, first_attr, first_text};

pub const NO_TITLE: &str = "No title found";

lazy_static! {
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref OG_TITLE: Selector = Selector::parse("meta[property='og:title']").unwrap();
    static ref META_TITLE: Selector = Selector::parse("meta[name='title']").unwrap();
    static ref CONTAINERS: Vec<Selector> = ["article", "div.article-content", "div.post-content", "main"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect();
    static ref TEXT_BLOCKS: Selector = Selector::parse("p, h2, h3, h4").unwrap();
}

/// Heuristic title/body extraction for news article pages.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }

    fn title(document: &Html) -> String {
        first_text(document, &H1)
            .or_else(|| first_attr(document, &OG_TITLE, "content"))
            .or_else(|| first_attr(document, &META_TITLE, "content"))
            .unwrap_or_else(|| NO_TITLE.to_string())
    }

    /// Text blocks of the first content container that yields any text.
    fn content(document: &Html) -> String {
        for selector in CONTAINERS.iter() {
            let Some(container) = document.select(selector).next() else {
                continue;
            };
            let content = container
                .select(&TEXT_BLOCKS)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !content.is_empty() {
                return content;
            }
        }
        String::new()
    }
}

impl ArticleExtractor for HtmlExtractor {
    fn extract(&self, document: &str, url: &str) -> Result<ArticleCandidate> {
        let document = Html::parse_document(document);
        let title = Self::title(&document);
        let content = Self::content(&document);

        if content.is_empty() {
            warn!(%url, "No article content found");
            return Err(Error::Extraction(format!("No article content found for {}", url)));
        }
        debug!(%url, %title, chars = content.chars().count(), "Extracted article");

        Ok(ArticleCandidate {
            url: url.to_string(),
            title,
            content,
            discovered_at: Utc::now(),
        })
    }
}
