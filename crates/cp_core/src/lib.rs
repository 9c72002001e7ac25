pub mod error;
pub mod models;
pub mod progress;
pub mod scraping;
pub mod storage;
pub mod types;

pub use error::Error;
pub use models::{CorpusEntry, InferenceModel};
pub use progress::{ProgressEvent, ProgressSink, ProgressState};
pub use scraping::{ArticleExtractor, PageFetcher};
pub use storage::ArticleStorage;
pub use types::{Article, ArticleCandidate, ContentType, NewArticle};

pub type Result<T> = std::result::Result<T, Error>;

/// Placeholder persisted (and broadcast) when summary generation fails.
pub const SUMMARY_ERROR_PLACEHOLDER: &str = "Error generating summary";
