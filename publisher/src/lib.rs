//! # 번역 게시 라이브러리
//!
//! 편집한 번역(평면 key → 문자열 맵)을 Forge(GitHub 호환) 저장소에 반영합니다.
//!
//! ## 동작 원리
//! - 토큰 소유자가 정식 저장소에 push 권한이 있으면 기본 브랜치에 **직접 커밋**
//! - 없으면 **포크 → 브랜치 → 파일 쓰기 → PR** 순서로 진행
//! - 어느 단계든 실패하면 그 단계에서 멈추고 `PublishOutcome{success:false}`를 반환
//! - 재시도는 없음: 사용자가 다시 게시하면 새 브랜치/새 PR이 만들어짐
//!   (멱등성은 브랜치 단위이지 로케일 단위가 아님. PR 중복은 허용된 결과)
//!
//! ## 모듈
//! - **locale**: 로케일 식별자 검증, 로케일 → 파일 경로 변환
//! - **forge**: 상태 없는 REST API 클라이언트
//! - **orchestrator**: 게시 상태 흐름
//! - **language**: 언어 목록(Languages.json) 갱신 흐름
//! - **registry**: 언어 목록 문서 모델
//! - **outcome / error**: 결과 및 에러 타입

pub mod error;
pub mod forge;
pub mod language;
pub mod locale;
pub mod orchestrator;
pub mod outcome;
pub mod registry;


pub use error::{ForgeError, PublishError, PublishStep};
pub use forge::ForgeClient;
pub use locale::{resolve, LocaleError, LocaleId, TEMPLATE_LANGUAGE};
pub use orchestrator::{Orchestrator, PublishRequest};
pub use outcome::{ActionKind, OutcomeAction, OutcomeMessage, PublishOutcome};
pub use registry::{LanguageName, LanguageRegistry, NewLanguage, RegistryEntry, RegistryError};

use error::StepExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// 평면 번역 맵 (key → 번역 문자열). 중첩 없음, 출력은 키 순서로 정렬
pub type TranslationMap = BTreeMap<String, String>;

const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Forge 연동 설정 (`[forge]` 섹션)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// 정식 저장소 소유자
    pub upstream_owner: String,
    /// 저장소 이름 (포크도 같은 이름이라고 가정)
    pub repo: String,
    pub default_branch: String,
    /// 로케일 파일이 들어 있는 디렉터리 (저장소 루트 기준)
    pub translations_dir: String,
    /// 언어 목록 문서 경로 (저장소 루트 기준)
    pub registry_path: String,
    /// API 베이스 URL 오버라이드 (테스트용 로컬 서버 지원,
    /// 예: "http://127.0.0.1:9876" 처럼 GitHub API 대신 사용할 URL)
    pub api_base_url: Option<String>,
    /// 커밋 기록 링크를 만들 웹 URL
    pub web_base_url: String,
    /// 포크 생성 요청 후 대기 시간 (밀리초)
    pub fork_settle_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            upstream_owner: "mspaint-cc".to_string(),
            repo: "translations".to_string(),
            default_branch: "main".to_string(),
            translations_dir: "translations".to_string(),
            registry_path: "Languages.json".to_string(),
            api_base_url: None,
            web_base_url: "https://github.com".to_string(),
            fork_settle_delay_ms: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl PublisherConfig {
    pub fn api_base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn fork_settle_delay(&self) -> Duration {
        Duration::from_millis(self.fork_settle_delay_ms)
    }

    /// 로케일 파일의 저장소 내 경로 (예: `translations/zh/cn.json`)
    pub fn translation_path(&self, locale: &LocaleId) -> String {
        let dir = self.translations_dir.trim_matches('/');
        if dir.is_empty() {
            locale.file_path()
        } else {
            format!("{}/{}", dir, locale.file_path())
        }
    }

    /// 기본 브랜치 커밋 기록 페이지
    pub fn commits_url(&self) -> String {
        format!(
            "{}/{}/{}/commits/{}/",
            self.web_base_url.trim_end_matches('/'),
            self.upstream_owner,
            self.repo,
            self.default_branch
        )
    }
}

/// UI 계층에 노출하는 진입점
///
/// 토큰이 없으면(로그인 안 됨) 아무것도 하지 않고 `None`을 반환합니다.
#[derive(Debug, Clone)]
pub struct Publisher {
    config: PublisherConfig,
    forge: ForgeClient,
}

impl Publisher {
    pub fn new(config: PublisherConfig) -> Self {
        let forge = ForgeClient::new(&config);
        Self { config, forge }
    }

    fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(&self.forge, &self.config)
    }

    async fn username(&self, token: &str) -> Result<String, PublishError> {
        let user = self
            .forge
            .get_user(token)
            .await
            .at(PublishStep::Identify)?;
        Ok(user.login)
    }

    pub async fn publish_translations(
        &self,
        token: Option<&str>,
        translations: TranslationMap,
        locale: &LocaleId,
    ) -> Option<PublishOutcome> {
        let token = token.filter(|t| !t.trim().is_empty())?;

        let username = match self.username(token).await {
            Ok(username) => username,
            Err(e) => return Some(orchestrator::failure(e)),
        };

        let request = PublishRequest {
            final_translations: translations,
            locale: locale.clone(),
            bearer_token: token.to_string(),
            username,
        };
        Some(self.orchestrator().publish(&request).await)
    }

    pub async fn create_language(
        &self,
        token: Option<&str>,
        new: &NewLanguage,
    ) -> Option<PublishOutcome> {
        let token = token.filter(|t| !t.trim().is_empty())?;

        let username = match self.username(token).await {
            Ok(username) => username,
            Err(e) => return Some(orchestrator::failure(e)),
        };

        Some(self.orchestrator().add_language(token, &username, new).await)
    }
}
