use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{Article, ContentType, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Store an article unless its url is already known. A duplicate is not
    /// an error: it yields `Ok(None)`.
    async fn insert_if_new(&self, article: NewArticle) -> Result<Option<Article>>;

    /// Articles of `kind` scraped at or after `since`, newest first.
    async fn list_recent(&self, kind: ContentType, since: DateTime<Utc>) -> Result<Vec<Article>>;

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>>;

    /// Overwrite the summary; `Error::NotFound` when the id is unknown.
    async fn update_summary(&self, id: i64, summary: &str) -> Result<()>;
}
