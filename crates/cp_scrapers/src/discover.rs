use std::collections::HashSet;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

lazy_static! {
    static ref LINK_SELECTOR: Selector = Selector::parse("a[href]").unwrap();
}

/// Finds article detail links on a section listing page such as `/news`.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    /// `/news/`: detail pages live below this prefix.
    prefix: String,
    /// `/news/page/`: paginated variants of the listing itself.
    pagination_prefix: String,
}

impl LinkDiscoverer {
    pub fn new(section: &str) -> Self {
        let prefix = format!("/{}/", section.trim_matches('/'));
        let pagination_prefix = format!("{}page/", prefix);
        Self { prefix, pagination_prefix }
    }

    /// Resolve, filter and deduplicate links in first-seen order, keeping at
    /// most `limit`.
    pub fn discover(&self, listing_html: &str, base_url: &Url, limit: usize) -> Vec<String> {
        let document = Html::parse_document(listing_html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&LINK_SELECTOR) {
            if links.len() >= limit {
                break;
            }
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(mut url) = base_url.join(href.trim()) else {
                debug!(href, "Skipping unparseable link");
                continue;
            };
            url.set_fragment(None);
            if !self.qualifies(&url, base_url) {
                continue;
            }
            let url = url.to_string();
            if seen.insert(url.clone()) {
                debug!(%url, "Found article");
                links.push(url);
            }
        }

        info!(count = links.len(), limit, "🔗 Discovered article links");
        links
    }

    fn qualifies(&self, url: &Url, base_url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") || url.host_str() != base_url.host_str() {
            return false;
        }
        let path = url.path();
        path.starts_with(&self.prefix) && path != self.prefix && !path.starts_with(&self.pagination_prefix)
    }
}

impl Default for LinkDiscoverer {
    fn default() -> Self {
        Self::new("/news")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://blockworks.co").unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
          <nav>
            <a href="/news">News</a>
            <a href="/news/">News</a>
            <a href="/news/page/2">Next</a>
            <a href="/podcasts/empire">Podcast</a>
          </nav>
          <a href="/news/bitcoin-etf-flows">Bitcoin ETF flows</a>
          <a href="https://blockworks.co/news/solana-upgrade">Solana</a>
          <a href="/news/bitcoin-etf-flows#comments">Comments</a>
          <a href="https://elsewhere.com/news/mirror">Mirror</a>
          <a href="/news/ethereum-dencun">Ethereum</a>
          <a>no href</a>
        </body></html>
    "#;

    #[test]
    fn test_discovers_in_first_seen_order() {
        let links = LinkDiscoverer::default().discover(LISTING, &base(), 10);
        assert_eq!(
            links,
            vec![
                "https://blockworks.co/news/bitcoin-etf-flows",
                "https://blockworks.co/news/solana-upgrade",
                "https://blockworks.co/news/ethereum-dencun",
            ]
        );
    }

    #[test]
    fn test_limit_applies_after_dedup() {
        let links = LinkDiscoverer::default().discover(LISTING, &base(), 2);
        assert_eq!(links.len(), 2);
        assert_eq!(links[1], "https://blockworks.co/news/solana-upgrade");
    }

    #[test]
    fn test_returns_min_of_distinct_and_limit() {
        let html: String = (0..8)
            .flat_map(|i| [format!("<a href=\"/news/story-{i}\">s</a>"), format!("<a href=\"/news/story-{i}\">again</a>")])
            .collect();
        for limit in [0, 3, 8, 20] {
            let links = LinkDiscoverer::default().discover(&html, &base(), limit);
            assert_eq!(links.len(), limit.min(8));
            let unique: HashSet<_> = links.iter().collect();
            assert_eq!(unique.len(), links.len());
            for (i, link) in links.iter().enumerate() {
                assert_eq!(*link, format!("https://blockworks.co/news/story-{i}"));
            }
        }
    }

    #[test]
    fn test_no_links_is_empty_not_error() {
        assert!(LinkDiscoverer::default().discover("<html><p>nothing</p></html>", &base(), 5).is_empty());
    }

    #[test]
    fn test_custom_section() {
        let html = r#"<a href="/markets/">m</a><a href="/markets/btc">btc</a><a href="/news/x">x</a>"#;
        let links = LinkDiscoverer::new("markets").discover(html, &base(), 5);
        assert_eq!(links, vec!["https://blockworks.co/markets/btc"]);
    }
}
