//! 번역 데이터 로딩 서비스
//!
//! 공개 raw 콘텐츠에서 언어 목록(Languages.json)과 템플릿(Template.json)을 읽어
//! 불변 스냅샷으로 보관합니다. `refresh()`가 스냅샷을 통째로 교체하고,
//! 소비자는 `snapshot()`으로 받은 `Arc`를 그대로 씁니다.
//! 로케일 파일은 캐시하지 않고 요청마다 새로 가져옵니다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use translations_publisher::{LanguageName, LanguageRegistry, LocaleId, PublisherConfig, TranslationMap};

use crate::config::ContentConfig;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Failed to fetch {path}: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("{path} is not a valid translation document: {message}")]
    Malformed { path: String, message: String },
}

/// 새로고침 시점의 언어 목록 + 템플릿
#[derive(Debug, Clone, Serialize)]
pub struct TranslationSnapshot {
    #[serde(skip)]
    pub registry: LanguageRegistry,
    /// `lang` / `lang-sub` → 표시 이름
    pub languages: BTreeMap<String, LanguageName>,
    pub template: TranslationMap,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl TranslationSnapshot {
    /// 첫 새로고침 전 상태: 영어만 있는 목록
    pub fn empty() -> Self {
        let english = LanguageName {
            english_name: "English".to_string(),
            native_name: "English".to_string(),
        };
        Self {
            registry: LanguageRegistry::default(),
            languages: BTreeMap::from([("en".to_string(), english)]),
            template: TranslationMap::new(),
            refreshed_at: None,
        }
    }
}

/// raw 콘텐츠 엔드포인트 (인증 없음)
#[derive(Debug, Clone)]
pub struct ContentSource {
    http: reqwest::Client,
    base_url: String,
    template_path: String,
    registry_path: String,
    translations_dir: String,
    request_timeout: Duration,
}

impl ContentSource {
    pub fn new(content: &ContentConfig, forge: &PublisherConfig) -> Self {
        // 포지 API와 같은 요청 타임아웃을 따름
        let request_timeout = Duration::from_secs(forge.request_timeout_secs.max(1));
        let http = reqwest::Client::builder()
            .user_agent(concat!("translations-core/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .build()
            .expect("Failed to create HTTP client for raw content");

        Self {
            http,
            base_url: content.raw_base_url.trim_end_matches('/').to_string(),
            template_path: content.template_path.clone(),
            registry_path: forge.registry_path.clone(),
            translations_dir: forge.translations_dir.trim_matches('/').to_string(),
            request_timeout,
        }
    }

    /// 파일 본문 (404면 None)
    async fn fetch_text(&self, path: &str) -> Result<Option<String>, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("raw GET {}", url);

        let request_error = |source| ProviderError::Request {
            path: path.to_string(),
            source,
        };
        let response = self.http.get(&url).send().await.map_err(request_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }
        let text = response.text().await.map_err(request_error)?;
        Ok(Some(text))
    }

    async fn fetch_required(&self, path: &str) -> Result<String, ProviderError> {
        self.fetch_text(path).await?.ok_or_else(|| ProviderError::Status {
            path: path.to_string(),
            status: 404,
        })
    }

    pub async fn fetch_registry(&self) -> Result<LanguageRegistry, ProviderError> {
        let text = self.fetch_required(&self.registry_path).await?;
        LanguageRegistry::parse(&text).map_err(|e| ProviderError::Malformed {
            path: self.registry_path.clone(),
            message: e.to_string(),
        })
    }

    pub async fn fetch_template(&self) -> Result<TranslationMap, ProviderError> {
        let text = self.fetch_required(&self.template_path).await?;
        parse_translation_map(&self.template_path, &text)
    }

    /// 로케일 파일. 404는 "아직 번역 없음"이므로 None
    pub async fn fetch_locale(&self, locale: &LocaleId) -> Result<Option<TranslationMap>, ProviderError> {
        let path = if self.translations_dir.is_empty() {
            locale.file_path()
        } else {
            format!("{}/{}", self.translations_dir, locale.file_path())
        };
        match self.fetch_text(&path).await? {
            Some(text) => parse_translation_map(&path, &text).map(Some),
            None => Ok(None),
        }
    }
}

/// 평면 key → 문자열 JSON만 허용
fn parse_translation_map(path: &str, text: &str) -> Result<TranslationMap, ProviderError> {
    serde_json::from_str(text).map_err(|e| ProviderError::Malformed {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// 스냅샷 보관 + 새로고침
pub struct TranslationProvider {
    source: ContentSource,
    snapshot: RwLock<Arc<TranslationSnapshot>>,
}

impl TranslationProvider {
    pub fn new(source: ContentSource) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(TranslationSnapshot::empty())),
        }
    }

    pub async fn snapshot(&self) -> Arc<TranslationSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// 언어 목록과 템플릿을 다시 가져와 스냅샷 교체. 실패하면 이전 스냅샷 유지
    pub async fn refresh(&self) -> Result<Arc<TranslationSnapshot>, ProviderError> {
        let registry = self.source.fetch_registry().await?;
        if registry.is_empty() {
            return Err(ProviderError::Malformed {
                path: self.source.registry_path.clone(),
                message: "language registry has no entries".to_string(),
            });
        }
        let template = self.source.fetch_template().await?;

        let snapshot = Arc::new(TranslationSnapshot {
            languages: registry.normalized(),
            registry,
            template,
            refreshed_at: Some(Utc::now()),
        });

        tracing::info!(
            "Translations refreshed: {} languages, {} template keys",
            snapshot.languages.len(),
            snapshot.template.len()
        );
        *self.snapshot.write().await = snapshot.clone();
        Ok(snapshot)
    }

    /// 로케일의 현재 번역. 기준 언어(en)는 템플릿 자체
    pub async fn locale_data(&self, locale: &LocaleId) -> Result<Option<TranslationMap>, ProviderError> {
        if locale.is_template_language() {
            return Ok(Some(self.snapshot().await.template.clone()));
        }
        self.source.fetch_locale(locale).await
    }
}
