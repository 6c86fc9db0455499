//! 언어 목록(Languages.json) 문서
//!
//! 최상위는 언어 코드 → 항목 객체입니다. 항목은 두 가지 형태:
//! ```json
//! {
//!   "fr": { "EnglishName": "French", "NativeName": "Français" },
//!   "zh": {
//!     "Default": "cn",
//!     "cn": { "EnglishName": "Chinese (Simplified)", "NativeName": "简体中文" },
//!     "tw": { "EnglishName": "Chinese (Traditional)", "NativeName": "繁體中文" }
//!   }
//! }
//! ```
//! 문서 순서를 유지하기 위해 최상위는 `serde_json::Map`(preserve_order)으로 다루고,
//! 수정하는 항목만 타입으로 디코딩/인코딩합니다.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::locale::{LocaleId, LOCALE_SEPARATOR};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Language registry is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Language registry must be a JSON object")]
    NotAnObject,

    #[error("Registry entry '{0}' is neither a language nor a language with locales")]
    MalformedEntry(String),

    #[error("'{0}' already exists in the language list")]
    AlreadyExists(String),

    #[error("{0} must not be empty")]
    EmptyName(&'static str),
}

/// 표시 이름 쌍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageName {
    #[serde(rename = "EnglishName")]
    pub english_name: String,
    #[serde(rename = "NativeName")]
    pub native_name: String,
}

/// Languages.json 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryEntry {
    /// 서브로케일이 없는 언어
    Standalone(LanguageName),
    /// 서브로케일이 있는 언어. `default`는 언어 코드만 쓸 때 대표할 서브로케일
    Localized {
        #[serde(rename = "Default")]
        default: String,
        #[serde(flatten)]
        locales: BTreeMap<String, LanguageName>,
    },
}

/// 새 언어/로케일 추가 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLanguage {
    pub code: LocaleId,
    pub english_name: String,
    pub native_name: String,
}

impl NewLanguage {
    pub fn new(
        code: LocaleId,
        english_name: &str,
        native_name: &str,
    ) -> Result<Self, RegistryError> {
        let lang = Self {
            code,
            english_name: english_name.trim().to_string(),
            native_name: native_name.trim().to_string(),
        };
        lang.display_name()?;
        Ok(lang)
    }

    /// 공백을 정리한 이름 (비어 있으면 에러)
    pub fn display_name(&self) -> Result<LanguageName, RegistryError> {
        let english_name = self.english_name.trim();
        let native_name = self.native_name.trim();
        if english_name.is_empty() {
            return Err(RegistryError::EmptyName("EnglishName"));
        }
        if native_name.is_empty() {
            return Err(RegistryError::EmptyName("NativeName"));
        }
        Ok(LanguageName {
            english_name: english_name.to_string(),
            native_name: native_name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageRegistry {
    entries: Map<String, Value>,
}

impl LanguageRegistry {
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(RegistryError::NotAnObject),
        }
    }

    /// 2칸 들여쓰기 JSON (번역 파일과 같은 형식)
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, language: &str) -> Result<Option<RegistryEntry>, RegistryError> {
        match self.entries.get(language) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| RegistryError::MalformedEntry(language.to_string())),
        }
    }

    /// 로케일이 이미 등록되어 있는지
    pub fn contains(&self, locale: &LocaleId) -> bool {
        match (self.entry(locale.language()), locale.sublocale()) {
            (Ok(Some(_)), None) => true,
            (Ok(Some(RegistryEntry::Localized { locales, .. })), Some(sub)) => {
                locales.contains_key(sub)
            }
            _ => false,
        }
    }

    /// `lang` / `lang-sub` 키로 펼친 목록 (UI 언어 선택용)
    ///
    /// 형식이 잘못된 항목은 건너뜁니다.
    pub fn normalized(&self) -> BTreeMap<String, LanguageName> {
        let mut out = BTreeMap::new();
        for (language, value) in &self.entries {
            match serde_json::from_value::<RegistryEntry>(value.clone()) {
                Ok(RegistryEntry::Standalone(name)) => {
                    out.insert(language.clone(), name);
                }
                Ok(RegistryEntry::Localized { locales, .. }) => {
                    for (sub, name) in locales {
                        out.insert(format!("{}{}{}", language, LOCALE_SEPARATOR, sub), name);
                    }
                }
                Err(_) => {
                    tracing::warn!("Skipping malformed language registry entry '{}'", language);
                }
            }
        }
        out
    }

    /// 새 언어 또는 기존 언어의 서브로케일 추가
    ///
    /// 서브로케일은 언어 항목 아래에 중첩되며 기존 항목을 덮어쓰지 않습니다.
    /// 서브로케일이 없던 언어에 추가하면, 기존 이름은 언어 코드와 같은 키로 옮기고
    /// `Default`가 그것을 가리키게 합니다.
    pub fn insert(&mut self, new: &NewLanguage) -> Result<(), RegistryError> {
        let name = new.display_name()?;
        let language = new.code.language();

        let entry = match (self.entry(language)?, new.code.sublocale()) {
            (Some(_), None) => return Err(RegistryError::AlreadyExists(new.code.to_string())),
            (None, None) => RegistryEntry::Standalone(name),
            (None, Some(sub)) => RegistryEntry::Localized {
                default: sub.to_string(),
                locales: BTreeMap::from([(sub.to_string(), name)]),
            },
            (Some(RegistryEntry::Standalone(existing)), Some(sub)) => {
                if sub == language {
                    return Err(RegistryError::AlreadyExists(new.code.to_string()));
                }
                RegistryEntry::Localized {
                    default: language.to_string(),
                    locales: BTreeMap::from([
                        (language.to_string(), existing),
                        (sub.to_string(), name),
                    ]),
                }
            }
            (Some(RegistryEntry::Localized { default, mut locales }), Some(sub)) => {
                if locales.contains_key(sub) {
                    return Err(RegistryError::AlreadyExists(new.code.to_string()));
                }
                locales.insert(sub.to_string(), name);
                RegistryEntry::Localized { default, locales }
            }
        };

        self.entries
            .insert(language.to_string(), serde_json::to_value(entry)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "en": { "EnglishName": "English", "NativeName": "English" },
        "fr": { "EnglishName": "French", "NativeName": "Français" },
        "zh": {
            "Default": "cn",
            "cn": { "EnglishName": "Chinese (Simplified)", "NativeName": "简体中文" },
            "tw": { "EnglishName": "Chinese (Traditional)", "NativeName": "繁體中文" }
        }
    }"#;

    fn new_language(code: &str, english: &str, native: &str) -> NewLanguage {
        NewLanguage::new(LocaleId::parse(code).unwrap(), english, native).unwrap()
    }

    #[test]
    fn parse_and_normalize() {
        let registry = LanguageRegistry::parse(SAMPLE).unwrap();
        assert_eq!(registry.len(), 3);

        let normalized = registry.normalized();
        assert_eq!(normalized.len(), 4);
        assert_eq!(normalized["fr"].native_name, "Français");
        assert_eq!(normalized["zh-tw"].english_name, "Chinese (Traditional)");
        // 서브로케일이 있는 언어는 lang-sub 키로만 노출
        assert!(!normalized.contains_key("zh"));
        assert!(!registry.is_empty());
        assert!(LanguageRegistry::parse("{}").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_non_object() {
        assert!(matches!(
            LanguageRegistry::parse("[1, 2]"),
            Err(RegistryError::NotAnObject)
        ));
        assert!(matches!(
            LanguageRegistry::parse("{oops"),
            Err(RegistryError::Parse(_))
        ));
    }

    #[test]
    fn contains_checks_language_and_sublocale() {
        let registry = LanguageRegistry::parse(SAMPLE).unwrap();
        assert!(registry.contains(&LocaleId::parse("fr").unwrap()));
        assert!(registry.contains(&LocaleId::parse("zh").unwrap()));
        assert!(registry.contains(&LocaleId::parse("zh-cn").unwrap()));
        assert!(!registry.contains(&LocaleId::parse("zh-hk").unwrap()));
        assert!(!registry.contains(&LocaleId::parse("fr-ca").unwrap()));
        assert!(!registry.contains(&LocaleId::parse("de").unwrap()));
    }

    #[test]
    fn insert_standalone_language_appends_entry() {
        let mut registry = LanguageRegistry::parse(SAMPLE).unwrap();
        registry.insert(&new_language("de", "German", " Deutsch ")).unwrap();

        let keys: Vec<&String> = registry.entries.keys().collect();
        assert_eq!(keys, ["en", "fr", "zh", "de"]);
        assert_eq!(
            registry.entry("de").unwrap(),
            Some(RegistryEntry::Standalone(LanguageName {
                english_name: "German".to_string(),
                native_name: "Deutsch".to_string(),
            }))
        );
    }

    #[test]
    fn insert_sublocale_under_existing_localized_language() {
        let mut registry = LanguageRegistry::parse(SAMPLE).unwrap();
        registry
            .insert(&new_language("zh-hk", "Chinese (Hong Kong)", "香港中文"))
            .unwrap();

        match registry.entry("zh").unwrap() {
            Some(RegistryEntry::Localized { default, locales }) => {
                assert_eq!(default, "cn");
                assert_eq!(locales.len(), 3);
                assert_eq!(locales["hk"].native_name, "香港中文");
                assert_eq!(locales["cn"].native_name, "简体中文");
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn insert_sublocale_for_new_language_sets_default() {
        let mut registry = LanguageRegistry::parse(SAMPLE).unwrap();
        registry
            .insert(&new_language("pt-br", "Portuguese (Brazil)", "Português (Brasil)"))
            .unwrap();

        let value = &registry.entries["pt"];
        assert_eq!(value["Default"], "br");
        assert_eq!(value["br"]["EnglishName"], "Portuguese (Brazil)");
    }

    #[test]
    fn insert_sublocale_converts_standalone_without_losing_it() {
        let mut registry = LanguageRegistry::parse(SAMPLE).unwrap();
        registry
            .insert(&new_language("fr-ca", "French (Canada)", "Français (Canada)"))
            .unwrap();

        match registry.entry("fr").unwrap() {
            Some(RegistryEntry::Localized { default, locales }) => {
                assert_eq!(default, "fr");
                assert_eq!(locales["fr"].english_name, "French");
                assert_eq!(locales["ca"].english_name, "French (Canada)");
            }
            other => panic!("unexpected entry: {:?}", other),
        }
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut registry = LanguageRegistry::parse(SAMPLE).unwrap();
        assert!(matches!(
            registry.insert(&new_language("fr", "French", "Français")),
            Err(RegistryError::AlreadyExists(code)) if code == "fr"
        ));
        assert!(matches!(
            registry.insert(&new_language("zh-tw", "x", "y")),
            Err(RegistryError::AlreadyExists(_))
        ));
        assert!(matches!(
            registry.insert(&new_language("zh", "Chinese", "中文")),
            Err(RegistryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn insert_rejects_malformed_entry() {
        let mut registry = LanguageRegistry::parse(r#"{ "ko": "Korean" }"#).unwrap();
        assert!(matches!(
            registry.insert(&new_language("ko-kr", "Korean", "한국어")),
            Err(RegistryError::MalformedEntry(lang)) if lang == "ko"
        ));
    }

    #[test]
    fn new_language_requires_names() {
        let code = LocaleId::parse("it").unwrap();
        assert!(matches!(
            NewLanguage::new(code.clone(), "  ", "Italiano"),
            Err(RegistryError::EmptyName("EnglishName"))
        ));
        assert!(matches!(
            NewLanguage::new(code, "Italian", ""),
            Err(RegistryError::EmptyName("NativeName"))
        ));
    }

    #[test]
    fn new_language_deserializes_from_camel_case() {
        let lang: NewLanguage = serde_json::from_str(
            r#"{ "code": "nl", "englishName": "Dutch", "nativeName": "Nederlands" }"#,
        )
        .unwrap();
        assert_eq!(lang.code.to_string(), "nl");
        assert_eq!(lang.native_name, "Nederlands");
    }

    #[test]
    fn pretty_json_round_trips_document_order() {
        let registry = LanguageRegistry::parse(SAMPLE).unwrap();
        let text = registry.to_pretty_json().unwrap();
        assert!(text.starts_with("{\n  \"en\": {"));
        assert!(text.find("\"en\"").unwrap() < text.find("\"zh\"").unwrap());
        assert_eq!(LanguageRegistry::parse(&text).unwrap(), registry);
    }
}
