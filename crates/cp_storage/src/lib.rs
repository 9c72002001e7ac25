use std::sync::Arc;

use cp_core::{ArticleStorage, Error, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

/// Build a store by name. `url` is the database location for persistent
/// backends and ignored by the memory backend.
pub async fn create_storage(kind: &str, url: Option<&str>) -> Result<Arc<dyn ArticleStorage>> {
    let storage: Arc<dyn ArticleStorage> = match kind {
        "memory" => Arc::new(MemoryStorage::new()),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = std::path::PathBuf::from(url.unwrap_or(sqlite::DEFAULT_DB_PATH));
            Arc::new(SQLiteStorage::new_with_path(&path).await?)
        }
        other => {
            return Err(Error::Storage(format!(
                "Unsupported storage backend '{}' (url: {})",
                other,
                url.unwrap_or("-")
            )))
        }
    };
    info!(backend = kind, "🏦 Storage backend ready");
    Ok(storage)
}
