//! 에러 타입
//!
//! - `ForgeError`: Forge REST API 호출 하나가 실패한 이유 (HTTP 상태, 전송 오류, 응답 파싱 오류)
//! - `PublishError`: 오케스트레이터 단계(`PublishStep`)와 원인을 묶은 단일 에러 타입.
//!   모든 단계가 `?`로 이 타입을 전파하고, 경계에서 `PublishOutcome`으로 변환됩니다.

use std::fmt;

use crate::registry::RegistryError;

/// Forge API 호출 실패
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error("forge returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response body: {0}")]
    Decode(String),
}

impl ForgeError {
    /// 실패 신호로 쓰이는 HTTP 상태 코드 (전송/파싱 오류면 None)
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }
}

/// 게시 시퀀스의 각 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    /// 토큰 소유자 조회 (GET /user)
    Identify,
    CheckPermission,
    /// 쓰기 권한이 있을 때: 정식 저장소에서 파일 sha 읽기
    ReadUpstreamFile,
    /// 쓰기 권한이 있을 때: 정식 저장소 기본 브랜치에 바로 커밋
    DirectCommit,
    ListForks,
    CreateFork,
    ReadBaseRef,
    CreateBranch,
    ReadForkFile,
    WriteForkFile,
    CreatePullRequest,
}

impl PublishStep {
    /// 사용자에게 보여줄 실패 제목
    pub fn failure_title(&self) -> &'static str {
        match self {
            Self::Identify => "Failed to identify user",
            Self::CheckPermission => "Failed to check permissions",
            Self::ReadUpstreamFile => "Failed to fetch file",
            Self::DirectCommit => "Failed to commit changes",
            Self::ListForks => "Failed to list forks",
            Self::CreateFork => "Failed to create fork",
            Self::ReadBaseRef => "Failed to get reference",
            Self::CreateBranch => "Failed to create branch",
            Self::ReadForkFile => "Failed to fetch file",
            Self::WriteForkFile => "Failed to update file",
            Self::CreatePullRequest => "Failed to create PR",
        }
    }

    /// 실패 설명 (무엇을 하다 실패했는지)
    pub fn failure_action(&self) -> &'static str {
        match self {
            Self::Identify => "looking up your forge account",
            Self::CheckPermission => "checking your permissions on the translations repository",
            Self::ReadUpstreamFile => "fetching the current translations file",
            Self::DirectCommit => "committing changes to the translations file",
            Self::ListForks => "looking up your fork of the translations repository",
            Self::CreateFork => "forking the translations repository",
            Self::ReadBaseRef => "reading the main branch reference of your fork",
            Self::CreateBranch => "creating a new branch in your fork",
            Self::ReadForkFile => "fetching the translations file from your fork",
            Self::WriteForkFile => "updating the translations file in your fork",
            Self::CreatePullRequest => "creating a pull request",
        }
    }
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Identify => "identify",
            Self::CheckPermission => "check-permission",
            Self::ReadUpstreamFile => "read-upstream-file",
            Self::DirectCommit => "direct-commit",
            Self::ListForks => "list-forks",
            Self::CreateFork => "create-fork",
            Self::ReadBaseRef => "read-base-ref",
            Self::CreateBranch => "create-branch",
            Self::ReadForkFile => "read-fork-file",
            Self::WriteForkFile => "write-fork-file",
            Self::CreatePullRequest => "create-pull-request",
        };
        f.write_str(name)
    }
}

/// 게시 시퀀스 실패: 첫 번째로 실패한 단계에서 멈춘 결과
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("{step} failed: {source}")]
    Forge {
        step: PublishStep,
        #[source]
        source: ForgeError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to encode file content: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PublishError {
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            Self::Forge { step, .. } => Some(*step),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Forge { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// `Result<T, ForgeError>`에 단계 정보를 붙이는 확장
pub trait StepExt<T> {
    fn at(self, step: PublishStep) -> Result<T, PublishError>;
}

impl<T> StepExt<T> for Result<T, ForgeError> {
    fn at(self, step: PublishStep) -> Result<T, PublishError> {
        self.map_err(|source| PublishError::Forge { step, source })
    }
}
