use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::super::{ApiError, ApiServer};
use super::parse_locale;
use crate::diff::DiffReport;

/// GET /api/languages - 정규화된 언어 목록 (`lang` / `lang-sub`)
pub async fn list_languages(State(state): State<ApiServer>) -> impl IntoResponse {
    let snapshot = state.provider.snapshot().await;
    Json(snapshot.languages.clone())
}

/// GET /api/template - 기준(en) 템플릿
pub async fn get_template(State(state): State<ApiServer>) -> impl IntoResponse {
    let snapshot = state.provider.snapshot().await;
    Json(snapshot.template.clone())
}

/// POST /api/refresh - 언어 목록/템플릿 다시 읽기
pub async fn refresh(State(state): State<ApiServer>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.provider.refresh().await?;
    Ok(Json(json!({
        "success": true,
        "languages": snapshot.languages.len(),
        "templateKeys": snapshot.template.len(),
        "refreshedAt": snapshot.refreshed_at,
    })))
}

/// GET /api/locale/:locale - 현재 번역 (파일이 아직 없으면 null)
pub async fn get_locale(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    let translations = state.provider.locale_data(&locale).await?;
    Ok(Json(json!({
        "locale": locale,
        "translations": translations,
    })))
}

/// GET /api/locale/:locale/diff - 누락/고아 키
pub async fn get_locale_diff(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    let current = state.provider.locale_data(&locale).await?;
    let snapshot = state.provider.snapshot().await;
    Ok(Json(DiffReport::compute(&snapshot.template, current.as_ref(), &locale)))
}
