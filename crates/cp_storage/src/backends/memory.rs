use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cp_core::{Article, ArticleStorage, ContentType, Error, NewArticle, Result};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    articles: Vec<Article>,
    next_id: i64,
}

impl MemoryStore {
    pub fn insert_if_new(&mut self, article: NewArticle) -> Option<Article> {
        if self.articles.iter().any(|a| a.url == article.url) {
            return None;
        }
        self.next_id += 1;
        let stored = article.into_article(self.next_id);
        self.articles.push(stored.clone());
        Some(stored)
    }

    pub fn list_recent(&self, kind: ContentType, since: DateTime<Utc>) -> Vec<Article> {
        let mut articles = self
            .articles
            .iter()
            .filter(|a| a.kind == kind && a.scraped_at >= since)
            .cloned()
            .collect::<Vec<_>>();
        articles.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at));
        articles
    }

    pub fn get_by_id(&self, id: i64) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    pub fn update_summary(&mut self, id: i64, summary: &str) -> Result<()> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;
        article.summary = Some(summary.to_string());
        Ok(())
    }
}

/// Process-local store. Handles are cheap to clone and share one registry.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn insert_if_new(&self, article: NewArticle) -> Result<Option<Article>> {
        let mut store = self.store.write().await;
        Ok(store.insert_if_new(article))
    }

    async fn list_recent(&self, kind: ContentType, since: DateTime<Utc>) -> Result<Vec<Article>> {
        let store = self.store.read().await;
        Ok(store.list_recent(kind, since))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let store = self.store.read().await;
        Ok(store.get_by_id(id))
    }

    async fn update_summary(&self, id: i64, summary: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.update_summary(id, summary)
    }
}
