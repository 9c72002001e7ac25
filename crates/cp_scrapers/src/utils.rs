use cp_core::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::Scraping(format!("Failed to parse URL: {}", e)))
}

pub fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))
}

/// Whitespace-trimmed text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first element matching `selector`, if non-empty.
pub fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// `content` attribute of the first matching element, if non-empty.
pub fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
