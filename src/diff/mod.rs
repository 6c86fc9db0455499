//! 템플릿 대비 로케일 비교, 편집 병합, `%s` 개수 검증
//!
//! 게시 전에 최종 맵을 만드는 순서:
//! 1. `merge_final`: 현재 로케일 내용 위에 편집을 덮고 삭제 목록을 제거
//! 2. `validate_placeholders`: 통과해야만 게시 가능

use serde::Serialize;
use translations_publisher::{LocaleId, TranslationMap};

/// 포맷 자리 표시자
pub const PLACEHOLDER: &str = "%s";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[error("The translation '{key}' expected {expected} '%s' but got {actual}")]
pub struct PlaceholderMismatch {
    pub key: String,
    pub expected: usize,
    pub actual: usize,
}

/// 템플릿에는 있는데 로케일에 없거나 (기준 언어가 아닐 때) 공백뿐인 키
pub fn compute_missing(
    template: &TranslationMap,
    current: &TranslationMap,
    locale: &LocaleId,
) -> TranslationMap {
    template
        .iter()
        .filter(|(key, _)| match current.get(*key) {
            None => true,
            Some(value) => value.trim().is_empty() && !locale.is_template_language(),
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// 로케일에는 있지만 템플릿에서 사라진 키
pub fn compute_orphaned(template: &TranslationMap, current: &TranslationMap) -> TranslationMap {
    current
        .iter()
        .filter(|(key, _)| !template.contains_key(*key))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// 현재 내용 + 편집(공백만 있는 값은 무시) − 삭제
pub fn merge_final(
    current: &TranslationMap,
    edits: &TranslationMap,
    deletions: &[String],
) -> TranslationMap {
    let mut merged = current.clone();
    for (key, value) in edits {
        if value.trim().is_empty() {
            continue;
        }
        merged.insert(key.clone(), value.clone());
    }
    for key in deletions {
        merged.remove(key);
    }
    merged
}

pub fn count_placeholders(text: &str) -> usize {
    text.matches(PLACEHOLDER).count()
}

/// 키(원문)의 `%s` 개수와 최종 값의 개수가 같은지 확인
///
/// 키 자체가 원문이므로 키에 `%s`가 없으면 검사하지 않습니다.
/// 첫 번째 불일치 키를 돌려줍니다 (키 순서).
pub fn validate_placeholders(final_map: &TranslationMap) -> Result<(), PlaceholderMismatch> {
    for (key, value) in final_map {
        let expected = count_placeholders(key);
        if expected == 0 {
            continue;
        }

        let actual = count_placeholders(value);
        if actual != expected {
            return Err(PlaceholderMismatch {
                key: key.clone(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// 누락/고아 키 묶음
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub missing: TranslationMap,
    pub orphaned: TranslationMap,
}

impl DiffReport {
    /// `current`가 None이면 로케일 파일이 아직 없는 것: 기준 언어가 아니면 전부 누락
    pub fn compute(
        template: &TranslationMap,
        current: Option<&TranslationMap>,
        locale: &LocaleId,
    ) -> Self {
        match current {
            Some(current) => Self {
                missing: compute_missing(template, current, locale),
                orphaned: compute_orphaned(template, current),
            },
            None if locale.is_template_language() => Self::default(),
            None => Self {
                missing: template.clone(),
                orphaned: TranslationMap::new(),
            },
        }
    }
}

/// 고아 키를 편집 목록에서 빼고 삭제 목록으로 돌려줌
pub fn purge_orphaned(orphaned: &TranslationMap, edits: &mut TranslationMap) -> Vec<String> {
    orphaned
        .keys()
        .map(|key| {
            edits.remove(key);
            key.clone()
        })
        .collect()
}
