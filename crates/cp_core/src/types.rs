use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Reddit,
    Tweet,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Reddit => "reddit",
            ContentType::Tweet => "tweet",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentType::Article),
            "reddit" => Ok(ContentType::Reddit),
            "tweet" => Ok(ContentType::Tweet),
            other => Err(Error::Storage(format!("Unknown content type: {}", other))),
        }
    }
}

/// A freshly extracted page, not yet known to be new.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleCandidate {
    pub url: String,
    pub title: String,
    pub content: String,
    pub discovered_at: DateTime<Utc>,
}

/// Insert payload for the store; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewArticle {
    pub kind: ContentType,
    pub url: String,
    pub title: String,
    pub content: String,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

impl NewArticle {
    pub fn from_candidate(candidate: ArticleCandidate, source: &str) -> Self {
        Self {
            kind: ContentType::Article,
            url: candidate.url,
            title: candidate.title,
            content: candidate.content,
            source: source.to_string(),
            scraped_at: candidate.discovered_at,
            metadata: Map::new(),
        }
    }

    pub fn into_article(self, id: i64) -> Article {
        Article {
            id,
            kind: self.kind,
            url: self.url,
            title: self.title,
            content: self.content,
            summary: None,
            source: self.source,
            scraped_at: self.scraped_at,
            metadata: self.metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ContentType,
    pub url: String,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}
