use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use translations_publisher::{LocaleId, TranslationMap};

/// 게시 전 로케일별 작업 내용
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// key → 새 번역 (빈 값은 병합 시 무시됨)
    #[serde(default)]
    pub edits: TranslationMap,
    /// 최종 맵에서 제거할 키 (고아 키 정리 결과)
    #[serde(default)]
    pub deletions: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Draft {
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty() && self.deletions.is_empty()
    }

    /// 삭제 목록 중복 제거 (입력 순서 유지)
    fn dedup_deletions(&mut self) {
        let mut seen = std::collections::BTreeSet::new();
        self.deletions.retain(|key| seen.insert(key.clone()));
    }
}

/// 초안 저장소 - `{dir}/{locale}.json` 파일 하나씩
pub struct DraftStore {
    dir: PathBuf,
    /// save와 조건부 삭제가 서로 끼어들지 않게 직렬화
    write_lock: Mutex<()>,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow::anyhow!("Draft store lock poisoned"))
    }

    fn file_path(&self, locale: &LocaleId) -> PathBuf {
        self.dir.join(format!("{}.json", locale))
    }

    /// 초안 로드. 파일이 없으면 빈 초안
    pub fn load(&self, locale: &LocaleId) -> Result<Draft> {
        let path = self.file_path(locale);
        if !path.exists() {
            return Ok(Draft::default());
        }

        let content = fs::read_to_string(&path)?;
        let draft: Draft = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Corrupted draft {}: {}", path.display(), e))?;
        tracing::debug!("Loaded draft for {} ({} edits)", locale, draft.edits.len());
        Ok(draft)
    }

    /// 초안 저장 (updated_at 갱신). 저장된 초안을 돌려줌
    pub fn save(&self, locale: &LocaleId, mut draft: Draft) -> Result<Draft> {
        draft.dedup_deletions();
        draft.updated_at = Some(Utc::now());

        let _guard = self.lock()?;
        fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(&draft)?;
        fs::write(self.file_path(locale), content)?;
        tracing::info!(
            "Saved draft for {}: {} edits, {} deletions",
            locale,
            draft.edits.len(),
            draft.deletions.len()
        );
        Ok(draft)
    }

    /// 초안 삭제. 없었으면 false
    pub fn clear(&self, locale: &LocaleId) -> Result<bool> {
        let _guard = self.lock()?;
        self.remove(locale)
    }

    /// 초안이 `seen_at` 이후 다시 저장되지 않았을 때만 삭제
    ///
    /// 게시가 진행되는 동안 들어온 편집은 게시된 내용에 없으므로 남겨 둡니다.
    pub fn clear_if_unchanged(&self, locale: &LocaleId, seen_at: Option<DateTime<Utc>>) -> Result<bool> {
        let _guard = self.lock()?;
        let current = self.load(locale)?;
        if current.updated_at != seen_at {
            tracing::warn!(
                "Draft for {} changed while publishing, keeping {} edits",
                locale,
                current.edits.len()
            );
            return Ok(false);
        }
        self.remove(locale)
    }

    fn remove(&self, locale: &LocaleId) -> Result<bool> {
        let path = self.file_path(locale);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::info!("Cleared draft for {}", locale);
        Ok(true)
    }
}
