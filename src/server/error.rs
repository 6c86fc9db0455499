//! API 전용 에러 타입. 핸들러가 그대로 반환하면 상태 코드 + JSON 본문으로 변환됩니다.

use axum::http::StatusCode;
use translations_publisher::{LocaleError, RegistryError};

use crate::diff::PlaceholderMismatch;
use crate::provider::ProviderError;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Invalid locale: {0}")]
    InvalidLocale(#[from] LocaleError),

    #[error("Invalid language: {0}")]
    InvalidLanguage(#[from] RegistryError),

    #[error("Language '{0}' already exists")]
    LanguageExists(String),

    #[error("Missing or empty bearer token")]
    Unauthorized,

    #[error(transparent)]
    Placeholder(#[from] PlaceholderMismatch),

    #[error("Upstream content unavailable: {0}")]
    Upstream(#[from] ProviderError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidLocale(_) | Self::InvalidLanguage(_) => StatusCode::BAD_REQUEST,
            Self::LanguageExists(_) => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Placeholder(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 머신 리더블 에러 코드
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLocale(_) => "INVALID_LOCALE",
            Self::InvalidLanguage(_) => "INVALID_LANGUAGE",
            Self::LanguageExists(_) => "LANGUAGE_EXISTS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Placeholder(_) => "PLACEHOLDER_MISMATCH",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "error_code": self.error_code(),
        });
        if let Self::Placeholder(mismatch) = self {
            body["key"] = serde_json::Value::String(mismatch.key.clone());
            body["expected"] = mismatch.expected.into();
            body["actual"] = mismatch.actual.into();
        }
        body
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            Self::Internal(e) => tracing::error!("API internal error: {}", e),
            Self::Upstream(e) => tracing::warn!("API upstream error: {}", e),
            _ => {}
        }
        let status = self.status_code();
        let body = axum::Json(self.to_json());
        (status, body).into_response()
    }
}
