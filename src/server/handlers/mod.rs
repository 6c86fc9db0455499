pub mod content;
pub mod drafts;
pub mod publish;

use axum::http::{header, HeaderMap};
use translations_publisher::LocaleId;

use super::ApiError;

/// 경로의 로케일 검증 (잘못되면 400)
pub(crate) fn parse_locale(raw: &str) -> Result<LocaleId, ApiError> {
    Ok(LocaleId::parse(raw)?)
}

/// `Authorization: Bearer <token>` 추출. 없거나 비어 있으면 None
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
