//! 게시 오케스트레이터
//!
//! ## 상태 흐름
//! ```text
//! CheckPermission ─┬─ push 가능 ─→ DirectCommit (종료)
//!                  └─ 불가 ─→ EnsureFork → EnsureBranch → ReadExistingFile
//!                                → WriteFile → CreatePR (종료)
//! ```
//! 각 단계는 앞 단계가 성공했을 때만 진행하고, 실패하면 그 단계의
//! `PublishError`로 바로 종료합니다. 재시도는 하지 않습니다 (사용자가 다시 게시).
//!
//! 포크/브랜치/파일 존재 여부는 로컬에 캐시하지 않고 매번 Forge에 다시 묻습니다.
//! 이전 실행의 상태를 가정하지 않아야 동시 게시나 재시도에서도 어긋나지 않습니다.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{ForgeError, PublishError, PublishStep, StepExt};
use crate::forge::{FileWrite, ForgeClient, PullRequestDraft, RemoteFile};
use crate::locale::LocaleId;
use crate::outcome::{OutcomeAction, PublishOutcome};
use crate::{PublisherConfig, TranslationMap};

/// 게시 한 번에 필요한 입력. 게시 때마다 만들고 버립니다.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub final_translations: TranslationMap,
    pub locale: LocaleId,
    pub bearer_token: String,
    pub username: String,
}

/// 기존 파일(없을 수 있음)을 받아 새로 쓸 본문을 만드는 함수.
/// 두 번째 인자는 그 파일을 읽은 단계 (본문 디코딩 실패를 그 단계로 보고하기 위함)
pub(crate) type RenderFn<'a> =
    dyn Fn(Option<&RemoteFile>, PublishStep) -> Result<String, PublishError> + Send + Sync + 'a;

/// 새로 쓸 본문을 정하는 방식
pub(crate) enum PlannedContent<'a> {
    /// 기존 내용과 무관하게 통째로 교체 (sha만 조회)
    Replace(String),
    /// 기존 파일을 읽어 고쳐 씀
    Edit(&'a RenderFn<'a>),
}

/// 커밋 하나로 반영할 변경
pub(crate) struct ChangePlan<'a> {
    pub path: String,
    pub commit_message: String,
    pub branch_name: String,
    pub pr_title: String,
    pub pr_body: String,
    pub direct_success: (&'static str, &'static str),
    pub review_success: (&'static str, &'static str),
    pub content: PlannedContent<'a>,
}

static LAST_BRANCH_STAMP: AtomicI64 = AtomicI64::new(0);

/// 브랜치 이름용 밀리초 타임스탬프. 같은 밀리초에 두 번 불려도 값이 겹치지 않게
/// 프로세스 안에서 단조 증가시킵니다.
pub fn branch_stamp() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_BRANCH_STAMP.load(Ordering::SeqCst);
    loop {
        let next = now.max(last + 1);
        match LAST_BRANCH_STAMP.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// 번역 파일 본문: 2칸 들여쓰기 JSON
pub fn render_translations(translations: &TranslationMap) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(translations)
}

pub struct Orchestrator<'a> {
    pub(crate) forge: &'a ForgeClient,
    pub(crate) config: &'a PublisherConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(forge: &'a ForgeClient, config: &'a PublisherConfig) -> Self {
        Self { forge, config }
    }

    /// 번역 게시. 실패도 `PublishOutcome{success:false}`로 돌려줍니다.
    pub async fn publish(&self, request: &PublishRequest) -> PublishOutcome {
        let locale = request.locale.to_string();
        let content = match render_translations(&request.final_translations) {
            Ok(content) => content,
            Err(e) => return failure(e.into()),
        };

        let plan = ChangePlan {
            path: self.config.translation_path(&request.locale),
            commit_message: format!("feat: updated {} translation", locale),
            branch_name: format!("update-{}-translations-{}", locale, branch_stamp()),
            pr_title: format!("Update {} translations", locale),
            pr_body: format!("This PR updates translations for {}", locale),
            direct_success: (
                "Translations updated!",
                "Your translations have been successfully updated.",
            ),
            review_success: (
                "Your changes are in review!",
                "We have forked the repo and created a PR. Please wait for the changes to be reviewed.",
            ),
            content: PlannedContent::Replace(content),
        };

        tracing::info!(
            "Publishing {} translations ({} keys) as {}",
            locale,
            request.final_translations.len(),
            request.username
        );
        self.deliver(&request.bearer_token, &request.username, &plan)
            .await
            .unwrap_or_else(failure)
    }

    /// 쓰기 권한에 따라 직접 커밋 또는 포크→브랜치→PR
    pub(crate) async fn deliver(
        &self,
        token: &str,
        username: &str,
        plan: &ChangePlan<'_>,
    ) -> Result<PublishOutcome, PublishError> {
        let permissions = self
            .forge
            .get_repo_permissions(token)
            .await
            .at(PublishStep::CheckPermission)?;

        if permissions.push {
            tracing::info!("[Publish] {} has write access → direct commit", username);
            self.direct_commit(token, plan).await
        } else {
            tracing::info!("[Publish] {} has no write access → fork/branch/PR", username);
            self.review_via_fork(token, username, plan).await
        }
    }

    async fn direct_commit(
        &self,
        token: &str,
        plan: &ChangePlan<'_>,
    ) -> Result<PublishOutcome, PublishError> {
        let owner = self.forge.upstream_owner();
        let branch = self.config.default_branch.as_str();

        let (sha, content) = self
            .prepare_write(token, owner, branch, plan, PublishStep::ReadUpstreamFile)
            .await?;

        self.forge
            .put_file(
                token,
                owner,
                &FileWrite {
                    path: &plan.path,
                    message: &plan.commit_message,
                    content: &content,
                    branch,
                    sha: sha.as_deref(),
                },
            )
            .await
            .at(PublishStep::DirectCommit)?;

        tracing::info!("[Publish] Committed {} to {}/{}@{}", plan.path, owner, self.forge.repo(), branch);
        let (message, description) = plan.direct_success;
        Ok(PublishOutcome::success(
            message,
            description,
            Some(OutcomeAction::open_link("Show changes", self.config.commits_url())),
        ))
    }

    async fn review_via_fork(
        &self,
        token: &str,
        username: &str,
        plan: &ChangePlan<'_>,
    ) -> Result<PublishOutcome, PublishError> {
        let base = self.config.default_branch.as_str();

        // ── EnsureFork ──
        self.ensure_fork(token, username).await?;

        // ── EnsureBranch ──
        let head_sha = self
            .forge
            .get_branch_head_sha(token, username, base)
            .await
            .and_then(|sha| sha.ok_or_else(|| ForgeError::NotFound(format!("branch '{}' of {}'s fork", base, username))))
            .at(PublishStep::ReadBaseRef)?;

        self.forge
            .create_branch(token, username, &plan.branch_name, &head_sha)
            .await
            .at(PublishStep::CreateBranch)?;
        tracing::info!("[Publish] Created branch {} at {}", plan.branch_name, head_sha);

        // ── ReadExistingFile ── (없으면 생성, 있으면 그 sha로 갱신)
        let (sha, content) = self
            .prepare_write(token, username, &plan.branch_name, plan, PublishStep::ReadForkFile)
            .await?;

        // ── WriteFile ──
        self.forge
            .put_file(
                token,
                username,
                &FileWrite {
                    path: &plan.path,
                    message: &plan.commit_message,
                    content: &content,
                    branch: &plan.branch_name,
                    sha: sha.as_deref(),
                },
            )
            .await
            .at(PublishStep::WriteForkFile)?;

        // ── CreatePR ──
        let pr = self
            .forge
            .create_pull_request(
                token,
                &PullRequestDraft {
                    title: plan.pr_title.clone(),
                    body: plan.pr_body.clone(),
                    head: format!("{}:{}", username, plan.branch_name),
                    base: base.to_string(),
                },
            )
            .await
            .at(PublishStep::CreatePullRequest)?;

        match pr.number {
            Some(number) => tracing::info!("[Publish] Opened pull request #{} {}", number, pr.html_url),
            None => tracing::info!("[Publish] Opened pull request {}", pr.html_url),
        }
        let (message, description) = plan.review_success;
        Ok(PublishOutcome::success(
            message,
            description,
            Some(OutcomeAction::open_link("View PR", pr.html_url)),
        ))
    }

    /// 쓰기 직전 상태: 현재 파일 sha (없으면 None)와 새 본문
    async fn prepare_write(
        &self,
        token: &str,
        owner: &str,
        branch: &str,
        plan: &ChangePlan<'_>,
        step: PublishStep,
    ) -> Result<(Option<String>, String), PublishError> {
        match &plan.content {
            PlannedContent::Replace(content) => {
                let sha = self
                    .forge
                    .get_file_sha(token, owner, &plan.path, Some(branch))
                    .await
                    .at(step)?;
                Ok((sha, content.clone()))
            }
            PlannedContent::Edit(render) => {
                let existing = self
                    .forge
                    .get_file(token, owner, &plan.path, Some(branch))
                    .await
                    .at(step)?;
                let content = render(existing.as_ref(), step)?;
                Ok((existing.map(|f| f.sha), content))
            }
        }
    }

    /// 사용자의 포크가 있으면 upstream과 동기화(실패 무시), 없으면 생성 후 고정 시간 대기
    async fn ensure_fork(&self, token: &str, username: &str) -> Result<(), PublishError> {
        let forks = self
            .forge
            .list_forks(token)
            .await
            .at(PublishStep::ListForks)?;

        if forks.iter().any(|f| f.owner.login.eq_ignore_ascii_case(username)) {
            if let Err(e) = self
                .forge
                .sync_fork_with_upstream(token, username, &self.config.default_branch)
                .await
            {
                tracing::warn!("[Publish] Syncing {}'s fork with upstream failed, continuing: {}", username, e);
            }
            return Ok(());
        }

        self.forge
            .create_fork(token)
            .await
            .at(PublishStep::CreateFork)?;

        // 포크 생성은 비동기라 완료 신호가 없음: 고정 시간만 기다린다 (충분하다는 보장 없음)
        let delay = self.config.fork_settle_delay();
        tracing::info!("[Publish] Fork requested for {}, waiting {:?}", username, delay);
        tokio::time::sleep(delay).await;
        Ok(())
    }
}

pub(crate) fn failure(err: PublishError) -> PublishOutcome {
    match (err.step(), err.http_status()) {
        (Some(step), Some(status)) => {
            tracing::error!("[Publish] {} failed with HTTP {}: {}", step, status, err)
        }
        _ => tracing::error!("[Publish] {}", err),
    }
    err.into()
}
