use axum::{extract::State, http::HeaderMap, response::IntoResponse, Json};
use serde::Deserialize;
use translations_publisher::{NewLanguage, TranslationMap};

use super::super::{ApiError, ApiServer};
use super::{bearer_token, parse_locale};
use crate::diff::{merge_final, validate_placeholders};

#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub locale: String,
    /// 없으면 현재 로케일 내용 + 저장된 초안으로 최종 맵을 만듦
    #[serde(default)]
    pub translations: Option<TranslationMap>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLanguageBody {
    pub code: String,
    pub english_name: String,
    pub native_name: String,
}

/// POST /api/publish - 최종 번역 게시 (직접 커밋 또는 포크 + PR)
pub async fn publish(
    State(state): State<ApiServer>,
    headers: HeaderMap,
    Json(body): Json<PublishBody>,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let locale = parse_locale(&body.locale)?;

    // 초안으로 게시하면 그 초안의 updated_at을 기억해 둠
    let (final_map, draft_version) = match body.translations {
        Some(translations) => (translations, None),
        None => {
            let current = state.provider.locale_data(&locale).await?.unwrap_or_default();
            let draft = state.drafts.load(&locale)?;
            let merged = merge_final(&current, &draft.edits, &draft.deletions);
            (merged, Some(draft.updated_at))
        }
    };

    validate_placeholders(&final_map)?;

    tracing::info!("Publishing {} keys for {}", final_map.len(), locale);
    let token = token.to_string();
    let publisher = state.publisher.clone();
    let drafts = state.drafts.clone();

    // 요청이 끊겨도 시작된 게시는 끝까지 진행
    let task = tokio::spawn(async move {
        let outcome = publisher
            .publish_translations(Some(&token), final_map, &locale)
            .await?;
        if let (true, Some(version)) = (outcome.success, draft_version) {
            if let Err(e) = drafts.clear_if_unchanged(&locale, version) {
                tracing::warn!("Published {} but failed to clear its draft: {}", locale, e);
            }
        }
        Some(outcome)
    });

    let outcome = task
        .await
        .map_err(|e| anyhow::anyhow!("Publish task failed: {}", e))?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(outcome))
}

/// POST /api/languages - 언어 목록에 새 언어/로케일 추가
pub async fn add_language(
    State(state): State<ApiServer>,
    headers: HeaderMap,
    Json(body): Json<NewLanguageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    let code = parse_locale(&body.code)?;
    let new = NewLanguage::new(code, &body.english_name, &body.native_name)?;

    let snapshot = state.provider.snapshot().await;
    if snapshot.registry.contains(&new.code) {
        return Err(ApiError::LanguageExists(new.code.to_string()));
    }

    tracing::info!("Requesting new language {}", new.code);
    let token = token.to_string();
    let publisher = state.publisher.clone();
    let task = tokio::spawn(async move { publisher.create_language(Some(&token), &new).await });

    let outcome = task
        .await
        .map_err(|e| anyhow::anyhow!("Language task failed: {}", e))?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(outcome))
}
