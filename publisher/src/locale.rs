//! 로케일 식별자와 번역 파일 경로 변환
//!
//! `"fr"` → `fr.json`, `"zh-cn"` → `zh/cn.json` 처럼 로케일을
//! 번역 저장소 안의 상대 경로로 바꿉니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// 언어와 서브로케일을 구분하는 문자
pub const LOCALE_SEPARATOR: char = '-';

/// 템플릿(Template.json)의 기준 언어
pub const TEMPLATE_LANGUAGE: &str = "en";

/// 로케일을 번역 파일 경로로 변환
///
/// 구분자가 있으면 첫 번째 구분자에서 나눠 `{main}/{sub}.json`,
/// 없으면 `{locale}.json`. 입력 검증은 하지 않습니다 (잘못된 값은 이후 404로 드러남).
pub fn resolve(locale: &str) -> String {
    match locale.split_once(LOCALE_SEPARATOR) {
        Some((main, sub)) => format!("{}/{}.json", main, sub),
        None => format!("{}.json", locale),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocaleError {
    #[error("Locale identifier is empty")]
    Empty,

    #[error("Invalid language code '{0}' (expected 2-3 lowercase letters or digits)")]
    InvalidLanguage(String),

    #[error("Invalid sublocale '{0}' (expected 2-3 lowercase letters or digits)")]
    InvalidSublocale(String),
}

fn segment_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"^[a-z0-9]{2,3}$").expect("static locale pattern"))
}

/// 검증된 로케일 식별자 (`language[-sublocale]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId {
    language: String,
    sublocale: Option<String>,
}

impl LocaleId {
    /// 생성 시점에 검증. 앞뒤 공백은 제거하고 소문자로 정규화합니다.
    pub fn parse(raw: &str) -> Result<Self, LocaleError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(LocaleError::Empty);
        }

        let (language, sublocale) = match normalized.split_once(LOCALE_SEPARATOR) {
            Some((lang, sub)) => (lang.to_string(), Some(sub.to_string())),
            None => (normalized, None),
        };

        if !segment_pattern().is_match(&language) {
            return Err(LocaleError::InvalidLanguage(language));
        }
        if let Some(ref sub) = sublocale {
            if !segment_pattern().is_match(sub) {
                return Err(LocaleError::InvalidSublocale(sub.clone()));
            }
        }

        Ok(Self { language, sublocale })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn sublocale(&self) -> Option<&str> {
        self.sublocale.as_deref()
    }

    /// 템플릿 기준 언어(en)인지
    pub fn is_template_language(&self) -> bool {
        self.sublocale.is_none() && self.language == TEMPLATE_LANGUAGE
    }

    /// 저장소 내 상대 경로 (`resolve` 결과)
    pub fn file_path(&self) -> String {
        resolve(&self.to_string())
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sublocale {
            Some(sub) => write!(f, "{}{}{}", self.language, LOCALE_SEPARATOR, sub),
            None => write!(f, "{}", self.language),
        }
    }
}

impl FromStr for LocaleId {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocaleId {
    type Error = LocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocaleId> for String {
    fn from(value: LocaleId) -> Self {
        value.to_string()
    }
}
