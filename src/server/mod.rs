//! 편집 UI용 HTTP API
//!
//! 번역 데이터 조회, 초안 관리, 게시/언어 추가를 노출합니다.
//! 게시 계열 요청은 `Authorization: Bearer <token>` 헤더가 필요합니다.

pub mod error;
mod handlers;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use translations_publisher::Publisher;

use crate::drafts::DraftStore;
use crate::provider::TranslationProvider;

pub use error::ApiError;

/// API 서버 상태
#[derive(Clone)]
pub struct ApiServer {
    pub provider: Arc<TranslationProvider>,
    pub publisher: Arc<Publisher>,
    pub drafts: Arc<DraftStore>,
}

impl ApiServer {
    pub fn new(
        provider: Arc<TranslationProvider>,
        publisher: Arc<Publisher>,
        drafts: Arc<DraftStore>,
    ) -> Self {
        Self {
            provider,
            publisher,
            drafts,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(
                "/api/languages",
                get(handlers::content::list_languages).post(handlers::publish::add_language),
            )
            .route("/api/template", get(handlers::content::get_template))
            .route("/api/refresh", post(handlers::content::refresh))
            .route("/api/locale/:locale", get(handlers::content::get_locale))
            .route("/api/locale/:locale/diff", get(handlers::content::get_locale_diff))
            .route(
                "/api/drafts/:locale",
                get(handlers::drafts::get_draft)
                    .put(handlers::drafts::save_draft)
                    .delete(handlers::drafts::clear_draft),
            )
            .route(
                "/api/drafts/:locale/purge-orphaned",
                post(handlers::drafts::purge_orphaned_keys),
            )
            .route("/api/publish", post(handlers::publish::publish))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// 리스너 바인딩 후 서비스. `shutdown`이 끝나면 정상 종료
    pub async fn start(
        self,
        listen_addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        tracing::info!("API server starting on {}", listen_addr);

        let router = self.router();
        let listener = tokio::net::TcpListener::bind(listen_addr).await?;
        tracing::info!("API listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        tracing::info!("API server stopped");
        Ok(())
    }
}
