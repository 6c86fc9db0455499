use serde::Deserialize;
use std::path::Path;
use translations_publisher::PublisherConfig;

const DEFAULT_CONFIG_PATH: &str = "config/global.toml";

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct GlobalConfig {
    pub server: ServerConfig,
    pub forge: PublisherConfig,
    pub content: ContentConfig,
    pub drafts: DraftsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:57480".to_string(),
        }
    }
}

/// 공개 raw 콘텐츠(템플릿/언어 목록/로케일 파일) 위치
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ContentConfig {
    pub raw_base_url: String,
    pub template_path: String,
    /// 백그라운드 새로고침 주기 (0이면 끔)
    pub refresh_interval_secs: u64,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            raw_base_url: "https://raw.githubusercontent.com/mspaint-cc/translations/refs/heads/main"
                .to_string(),
            template_path: "Template.json".to_string(),
            refresh_interval_secs: 300,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DraftsConfig {
    pub dir: String,
}

impl Default for DraftsConfig {
    fn default() -> Self {
        Self {
            dir: "drafts".to_string(),
        }
    }
}

impl GlobalConfig {
    /// `TRANSLATIONS_CONFIG`(기본 config/global.toml)에서 로드.
    /// 파일이 없으면 기본값, 형식이 잘못됐으면 에러
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("TRANSLATIONS_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load_from(Path::new(&path))?;

        if let Ok(addr) = std::env::var("TRANSLATIONS_LISTEN_ADDR") {
            if !addr.trim().is_empty() {
                cfg.server.listen_addr = addr.trim().to_string();
            }
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let s = std::fs::read_to_string(path)?;
        Self::from_toml(&s)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
