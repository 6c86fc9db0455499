//! 언어 목록 갱신: 새 언어/로케일을 Languages.json에 추가
//!
//! 쓰기 권한 판단과 직접 커밋/포크 PR 경로는 번역 게시와 같고,
//! 로케일 파일 대신 공용 목록 문서를 읽고 → 항목을 추가하고 → 다시 씁니다.
//! 문서는 쓸 위치에서 읽습니다 (직접 커밋이면 정식 저장소 기본 브랜치,
//! PR 경로면 방금 만든 포크 브랜치). 그래야 함께 읽은 sha로 갱신할 수 있습니다.

use crate::error::{PublishError, PublishStep, StepExt};
use crate::forge::RemoteFile;
use crate::orchestrator::{branch_stamp, failure, ChangePlan, Orchestrator, PlannedContent};
use crate::outcome::PublishOutcome;
use crate::registry::{LanguageRegistry, NewLanguage};

/// 기존 문서(없으면 빈 목록)에 항목을 추가한 새 본문
fn render_registry(
    existing: Option<&RemoteFile>,
    read_step: PublishStep,
    new: &NewLanguage,
) -> Result<String, PublishError> {
    let mut registry = match existing {
        Some(file) => LanguageRegistry::parse(&file.decoded_content().at(read_step)?)?,
        None => LanguageRegistry::default(),
    };
    registry.insert(new)?;
    Ok(registry.to_pretty_json()?)
}

impl Orchestrator<'_> {
    pub async fn add_language(
        &self,
        token: &str,
        username: &str,
        new: &NewLanguage,
    ) -> PublishOutcome {
        // 입력 자체가 잘못됐으면 Forge를 건드리지 않음
        if let Err(e) = new.display_name() {
            return failure(e.into());
        }

        let code = new.code.to_string();
        let plan = ChangePlan {
            path: self.config.registry_path.clone(),
            commit_message: format!("feat: add {} language", code),
            branch_name: format!("add-{}-language-{}", code, branch_stamp()),
            pr_title: format!("Add {} language", code),
            pr_body: format!(
                "This PR adds {} ({} / {}) to the language list",
                code,
                new.english_name.trim(),
                new.native_name.trim()
            ),
            direct_success: ("Language added!", "The language list has been updated."),
            review_success: (
                "Your language is in review!",
                "We have forked the repo and created a PR. Please wait for the changes to be reviewed.",
            ),
            content: PlannedContent::Edit(&|existing: Option<&RemoteFile>, step: PublishStep| {
                render_registry(existing, step, new)
            }),
        };

        tracing::info!("Adding language {} as {}", code, username);
        self.deliver(token, username, &plan)
            .await
            .unwrap_or_else(failure)
    }
}
