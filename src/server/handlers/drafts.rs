use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::super::{ApiError, ApiServer};
use super::parse_locale;
use crate::diff::{compute_orphaned, purge_orphaned};
use crate::drafts::Draft;

/// GET /api/drafts/:locale
pub async fn get_draft(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    Ok(Json(state.drafts.load(&locale)?))
}

/// PUT /api/drafts/:locale - 초안 전체 교체
pub async fn save_draft(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
    Json(draft): Json<Draft>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    Ok(Json(state.drafts.save(&locale, draft)?))
}

/// DELETE /api/drafts/:locale
pub async fn clear_draft(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    let cleared = state.drafts.clear(&locale)?;
    Ok(Json(json!({ "success": true, "cleared": cleared })))
}

/// POST /api/drafts/:locale/purge-orphaned - 템플릿에 없는 키를 삭제 목록으로
pub async fn purge_orphaned_keys(
    Path(raw): Path<String>,
    State(state): State<ApiServer>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = parse_locale(&raw)?;
    let current = state.provider.locale_data(&locale).await?.unwrap_or_default();
    let snapshot = state.provider.snapshot().await;

    let mut draft = state.drafts.load(&locale)?;
    let orphaned = compute_orphaned(&snapshot.template, &current);
    let deletions = purge_orphaned(&orphaned, &mut draft.edits);
    tracing::info!("Purging {} orphaned keys from {}", deletions.len(), locale);
    draft.deletions.extend(deletions);

    Ok(Json(state.drafts.save(&locale, draft)?))
}
