use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cp_core::{Article, ArticleStorage, ContentType, Error, NewArticle, Result};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_DB_PATH: &str = "contentpulse.db";

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS content (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        type TEXT NOT NULL,
        url TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        summary TEXT,
        source TEXT NOT NULL,
        scraped_at INTEGER NOT NULL,
        extra_data TEXT NOT NULL DEFAULT '{}'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_type_scraped_at ON content (type, scraped_at)",
    // Add future migrations here
];

pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl SQLiteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
            .map_err(|e| Error::Database(format!("Invalid database path: {}", e)))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name)
        .map_err(|e| Error::Database(format!("Failed to decode column {}: {}", name, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let kind: String = column(row, "type")?;
    let scraped_at: i64 = column(row, "scraped_at")?;
    let extra_data: String = column(row, "extra_data")?;
    let summary: Option<String> = column(row, "summary")?;
    let metadata = match serde_json::from_str::<Value>(&extra_data)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Ok(Article {
        id: column(row, "id")?,
        kind: kind.parse()?,
        url: column(row, "url")?,
        title: column(row, "title")?,
        content: column(row, "content")?,
        summary,
        source: column(row, "source")?,
        scraped_at: DateTime::from_timestamp_millis(scraped_at)
            .ok_or_else(|| Error::Database(format!("Invalid timestamp: {}", scraped_at)))?,
        metadata,
    })
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn insert_if_new(&self, article: NewArticle) -> Result<Option<Article>> {
        let extra_data = serde_json::to_string(&article.metadata)?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO content
            (type, url, title, content, source, scraped_at, extra_data)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.kind.as_str())
        .bind(&article.url)
        .bind(&article.title)
        .bind(&article.content)
        .bind(&article.source)
        .bind(article.scraped_at.timestamp_millis())
        .bind(extra_data)
        .execute(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store article: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(article.into_article(result.last_insert_rowid())))
    }

    async fn list_recent(&self, kind: ContentType, since: DateTime<Utc>) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM content
            WHERE type = ? AND scraped_at >= ?
            ORDER BY scraped_at DESC
            "#,
        )
        .bind(kind.as_str())
        .bind(since.timestamp_millis())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to list recent articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query("SELECT * FROM content WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to get article {}: {}", id, e)))?;

        row.as_ref().map(row_to_article).transpose()
    }

    async fn update_summary(&self, id: i64, summary: &str) -> Result<()> {
        let result = sqlx::query("UPDATE content SET summary = ? WHERE id = ?")
            .bind(summary)
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to update summary for {}: {}", id, e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("article {}", id)));
        }
        Ok(())
    }
}
