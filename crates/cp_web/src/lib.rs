use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;
pub mod ws;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/articles/:id/summarize", post(handlers::summarize_article))
        .route("/api/scrape", post(handlers::scrape))
        .route("/api/query", post(handlers::query))
        .route("/api/models", get(handlers::list_models))
        .route("/ws", get(ws::progress_socket))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> cp_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "🌐 Listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, ApiError, AppState};
    pub use cp_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use cp_core::{
        Article, ArticleStorage, ContentType, CorpusEntry, Error, InferenceModel, NewArticle, PageFetcher, Result,
    };
    use cp_progress::NotificationHub;
    use cp_scrapers::{ArticleScraper, EnrichmentConfig, HtmlExtractor, ScraperManager, SourceConfig};
    use cp_storage::MemoryStorage;
    use serde_json::Value;
    use tower::ServiceExt;

    struct OnePageSite;

    #[async_trait]
    impl PageFetcher for OnePageSite {
        async fn fetch(&self, url: &str) -> Result<String> {
            match url {
                "https://blockworks.co/news" => Ok("<a href=\"/news/fresh\">Fresh</a>".to_string()),
                "https://blockworks.co/news/fresh" => {
                    Ok("<h1>Fresh</h1><article><p>Fresh news.</p></article>".to_string())
                }
                _ => Err(Error::Fetch {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    struct FixedModel {
        fail: bool,
    }

    #[async_trait]
    impl InferenceModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn summarize(&self, _text: &str, _model: Option<&str>) -> Result<String> {
            Ok("short".to_string())
        }

        async fn answer(&self, _corpus: &[CorpusEntry], question: &str, _model: Option<&str>) -> Result<String> {
            if self.fail {
                return Err(Error::Generation("API returned status code 500".to_string()));
            }
            Ok(format!("re: {}", question))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["llama3.2".to_string(), "mistral".to_string()])
        }
    }

    async fn app_with(storage: Arc<MemoryStorage>, fail: bool) -> Router {
        let hub = Arc::new(NotificationHub::new());
        let scraper = ArticleScraper::new(
            SourceConfig::default(),
            Arc::new(OnePageSite),
            Arc::new(HtmlExtractor::new()),
        )
        .unwrap();
        let manager = ScraperManager::new(
            storage,
            Arc::new(FixedModel { fail }),
            hub.clone(),
            scraper,
            &EnrichmentConfig::default(),
        );
        create_app(AppState::new(Arc::new(manager), hub)).await
    }

    async fn seeded() -> (Arc<MemoryStorage>, Article) {
        let storage = Arc::new(MemoryStorage::new());
        let article = storage
            .insert_if_new(NewArticle {
                kind: ContentType::Article,
                url: "https://blockworks.co/news/seeded".to_string(),
                title: "Seeded".to_string(),
                content: "Seeded body.".to_string(),
                source: "blockworks".to_string(),
                scraped_at: chrono::Utc::now(),
                metadata: Default::default(),
            })
            .await
            .unwrap()
            .unwrap();
        (storage, article)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_and_get_articles() {
        let (storage, article) = seeded().await;
        let app = app_with(storage, false).await;

        let response = app
            .clone()
            .oneshot(Request::get("/api/articles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["type"], "article");

        let response = app
            .oneshot(
                Request::get(format!("/api/articles/{}", article.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["title"], "Seeded");
    }

    #[tokio::test]
    async fn test_unknown_article_is_404() {
        let app = app_with(Arc::new(MemoryStorage::new()), false).await;
        let response = app
            .oneshot(Request::get("/api/articles/999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_body(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_scrape_returns_stored_articles() {
        let app = app_with(Arc::new(MemoryStorage::new()), false).await;
        let response = app
            .oneshot(
                Request::post("/api/scrape?limit=3")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Successfully scraped 1 articles");
        assert_eq!(body["articles"][0]["url"], "https://blockworks.co/news/fresh");
    }

    #[tokio::test]
    async fn test_summarize_is_accepted() {
        let (storage, article) = seeded().await;
        let app = app_with(storage, false).await;
        let response = app
            .oneshot(
                Request::post(format!("/api/articles/{}/summarize?model=mistral", article.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(json_body(response).await["article_id"], article.id);
    }

    #[tokio::test]
    async fn test_query_paths() {
        let empty = app_with(Arc::new(MemoryStorage::new()), false).await;
        let request = || {
            Request::post("/api/query")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"question":"what happened?"}"#))
                .unwrap()
        };
        let response = empty.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await["detail"],
            "No articles available. Please scrape articles first."
        );

        let (storage, _) = seeded().await;
        let response = app_with(storage, false).await.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["response"], "re: what happened?");

        let (storage, _) = seeded().await;
        let response = app_with(storage, true).await.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_models() {
        let app = app_with(Arc::new(MemoryStorage::new()), false).await;
        let response = app
            .oneshot(Request::get("/api/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["models"][1], "mistral");
    }
}
