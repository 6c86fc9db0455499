//! Forge(GitHub 호환) REST API 클라이언트
//!
//! 상태를 갖지 않는 얇은 래퍼입니다. 모든 호출은 호출자의 Bearer 토큰을 받고,
//! 재시도하지 않으며, 실패는 HTTP 상태 코드가 담긴 `ForgeError`로 돌려줍니다.
//! "없음"이 정상 상태인 조회(브랜치 ref, 파일)는 `Ok(None)`을 반환합니다.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ForgeError;
use crate::PublisherConfig;

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";
const FORKS_PER_PAGE: usize = 100;
const MAX_FORK_PAGES: u32 = 10;

/// GET /user 응답 (필요한 필드만)
#[derive(Debug, Clone, Deserialize)]
pub struct ForgeUser {
    pub login: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoPermissions {
    #[serde(default)]
    pub push: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    permissions: Option<RepoPermissions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgeAccount {
    pub login: String,
}

/// 포크 목록의 항목
#[derive(Debug, Clone, Deserialize)]
pub struct ForkInfo {
    pub owner: ForgeAccount,
}

#[derive(Debug, Clone, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
struct GitObject {
    sha: String,
}

/// contents API로 읽은 파일
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFile {
    pub sha: String,
    /// base64 (GitHub는 60자마다 줄바꿈을 넣음)
    #[serde(default)]
    pub content: Option<String>,
}

impl RemoteFile {
    /// base64 본문을 UTF-8 문자열로 디코딩
    pub fn decoded_content(&self) -> Result<String, ForgeError> {
        let raw = self.content.as_deref().unwrap_or_default();
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| ForgeError::Decode(format!("file content is not base64: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| ForgeError::Decode(format!("file content is not UTF-8: {}", e)))
    }
}

/// PUT contents 요청: `sha`가 없으면 생성, 있으면 그 리비전 기준 갱신
#[derive(Debug, Clone)]
pub struct FileWrite<'a> {
    pub path: &'a str,
    pub message: &'a str,
    pub content: &'a str,
    pub branch: &'a str,
    pub sha: Option<&'a str>,
}

#[derive(Serialize)]
struct FileWriteBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    /// `{username}:{branch}`
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub html_url: String,
    #[serde(default)]
    pub number: Option<u64>,
}

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Serialize)]
struct MergeUpstreamBody<'a> {
    branch: &'a str,
}

/// Forge API 클라이언트
#[derive(Debug, Clone)]
pub struct ForgeClient {
    upstream_owner: String,
    repo: String,
    http: reqwest::Client,
    /// API 베이스 URL (기본: "https://api.github.com").
    /// 테스트에서는 로컬 mock 서버 주소로 오버라이드
    base_url: String,
}

impl ForgeClient {
    pub fn new(config: &PublisherConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(concat!("translations-publisher/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .expect("Failed to create HTTP client for forge API");

        Self {
            upstream_owner: config.upstream_owner.clone(),
            repo: config.repo.clone(),
            http,
            base_url: config.api_base_url().trim_end_matches('/').to_string(),
        }
    }

    pub fn upstream_owner(&self) -> &str {
        &self.upstream_owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn repo_url(&self, owner: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url, owner, self.repo)
    }

    fn request(&self, method: reqwest::Method, url: &str, token: &str) -> reqwest::RequestBuilder {
        tracing::debug!("forge {} {}", method, url);
        self.http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    /// 토큰 소유자 조회
    pub async fn get_user(&self, token: &str) -> Result<ForgeUser, ForgeError> {
        let url = format!("{}/user", self.base_url);
        let response = self.request(reqwest::Method::GET, &url, token).send().await?;
        read_json(ensure_success(response).await?).await
    }

    /// 정식 저장소에 대한 push 권한 조회
    pub async fn get_repo_permissions(&self, token: &str) -> Result<RepoPermissions, ForgeError> {
        let url = self.repo_url(&self.upstream_owner);
        let response = self.request(reqwest::Method::GET, &url, token).send().await?;
        let info: RepoInfo = read_json(ensure_success(response).await?).await?;
        Ok(info.permissions.unwrap_or_default())
    }

    /// 정식 저장소의 포크 목록 (페이지를 따라가며 전부)
    pub async fn list_forks(&self, token: &str) -> Result<Vec<ForkInfo>, ForgeError> {
        let mut forks = Vec::new();

        for page in 1..=MAX_FORK_PAGES {
            let url = format!(
                "{}/forks?per_page={}&page={}",
                self.repo_url(&self.upstream_owner),
                FORKS_PER_PAGE,
                page
            );
            let response = self.request(reqwest::Method::GET, &url, token).send().await?;
            let batch: Vec<ForkInfo> = read_json(ensure_success(response).await?).await?;
            let last_page = batch.len() < FORKS_PER_PAGE;
            forks.extend(batch);
            if last_page {
                break;
            }
        }

        Ok(forks)
    }

    /// 포크 생성 요청. Forge 쪽에서 비동기로 처리되므로 바로 사용할 수 있다는 보장은 없음
    pub async fn create_fork(&self, token: &str) -> Result<(), ForgeError> {
        let url = format!("{}/forks", self.repo_url(&self.upstream_owner));
        let response = self.request(reqwest::Method::POST, &url, token).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// 포크 브랜치를 upstream과 동기화
    pub async fn sync_fork_with_upstream(
        &self,
        token: &str,
        owner: &str,
        branch: &str,
    ) -> Result<(), ForgeError> {
        let url = format!("{}/merge-upstream", self.repo_url(owner));
        let response = self
            .request(reqwest::Method::POST, &url, token)
            .json(&MergeUpstreamBody { branch })
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// 브랜치 head 커밋 sha (브랜치가 없으면 None)
    pub async fn get_branch_head_sha(
        &self,
        token: &str,
        owner: &str,
        branch: &str,
    ) -> Result<Option<String>, ForgeError> {
        let url = format!("{}/git/refs/heads/{}", self.repo_url(owner), branch);
        let response = self.request(reqwest::Method::GET, &url, token).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let git_ref: GitRef = read_json(ensure_success(response).await?).await?;
        Ok(Some(git_ref.object.sha))
    }

    pub async fn create_branch(
        &self,
        token: &str,
        owner: &str,
        new_branch: &str,
        from_sha: &str,
    ) -> Result<(), ForgeError> {
        let url = format!("{}/git/refs", self.repo_url(owner));
        let body = CreateRefBody {
            reference: format!("refs/heads/{}", new_branch),
            sha: from_sha,
        };
        let response = self
            .request(reqwest::Method::POST, &url, token)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// 파일 조회 (sha + 본문). 파일이 없으면 None: 새 로케일의 첫 게시는 정상 상태
    pub async fn get_file(
        &self,
        token: &str,
        owner: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<RemoteFile>, ForgeError> {
        let mut url = format!("{}/contents/{}", self.repo_url(owner), path);
        if let Some(branch) = branch {
            url.push_str(&format!("?ref={}", branch));
        }
        let response = self.request(reqwest::Method::GET, &url, token).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let file: RemoteFile = read_json(ensure_success(response).await?).await?;
        Ok(Some(file))
    }

    /// 파일 sha만 필요할 때 (본문을 통째로 바꾸는 쓰기). 없으면 None
    pub async fn get_file_sha(
        &self,
        token: &str,
        owner: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<String>, ForgeError> {
        Ok(self.get_file(token, owner, path, branch).await?.map(|f| f.sha))
    }

    /// 파일 생성/갱신. sha가 최신이 아니면 Forge가 거부함 (낙관적 동시성)
    pub async fn put_file(
        &self,
        token: &str,
        owner: &str,
        write: &FileWrite<'_>,
    ) -> Result<(), ForgeError> {
        let url = format!("{}/contents/{}", self.repo_url(owner), write.path);
        let body = FileWriteBody {
            message: write.message,
            content: base64::engine::general_purpose::STANDARD.encode(write.content.as_bytes()),
            branch: write.branch,
            sha: write.sha,
        };
        let response = self
            .request(reqwest::Method::PUT, &url, token)
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// 정식 저장소에 PR 생성
    pub async fn create_pull_request(
        &self,
        token: &str,
        draft: &PullRequestDraft,
    ) -> Result<PullRequest, ForgeError> {
        let url = format!("{}/pulls", self.repo_url(&self.upstream_owner));
        let response = self
            .request(reqwest::Method::POST, &url, token)
            .json(draft)
            .send()
            .await?;
        read_json(ensure_success(response).await?).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ForgeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ForgeError::Status {
        status: status.as_u16(),
        body,
    })
}

/// 본문을 텍스트로 받은 뒤 파싱: 파싱 실패를 전송 오류와 구분하기 위함
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ForgeError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ForgeError::Decode(e.to_string()))
}
