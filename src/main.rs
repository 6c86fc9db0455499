use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use translations_core::config::GlobalConfig;
use translations_core::drafts::DraftStore;
use translations_core::provider::{ContentSource, TranslationProvider};
use translations_core::server::ApiServer;
use translations_publisher::Publisher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Translations core starting");

    let cfg = GlobalConfig::load()?;

    let source = ContentSource::new(&cfg.content, &cfg.forge);
    let provider = Arc::new(TranslationProvider::new(source));
    let publisher = Arc::new(Publisher::new(cfg.forge.clone()));
    let drafts = Arc::new(DraftStore::new(&cfg.drafts.dir));

    // 첫 로드 실패 시 빈 스냅샷으로 시작, 다음 주기에 재시도
    if let Err(e) = provider.refresh().await {
        tracing::warn!("Initial translation refresh failed: {}", e);
    }

    if cfg.content.refresh_interval_secs > 0 {
        let provider_refresh = provider.clone();
        let interval = Duration::from_secs(cfg.content.refresh_interval_secs);
        tokio::spawn(async move {
            let mut error_count: u32 = 0;
            loop {
                tokio::time::sleep(interval).await;
                match provider_refresh.refresh().await {
                    Ok(_) => {
                        if error_count > 0 {
                            tracing::info!("Refresh recovered after {} errors", error_count);
                        }
                        error_count = 0;
                    }
                    Err(e) => {
                        error_count += 1;
                        // 처음 3번과 이후 10번마다만 로깅
                        if error_count <= 3 || error_count % 10 == 0 {
                            tracing::error!("Refresh error (count: {}): {}", error_count, e);
                        }
                    }
                }
            }
        });
    }

    let server = ApiServer::new(provider, publisher, drafts);
    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
    };

    if let Err(e) = server.start(&cfg.server.listen_addr, shutdown).await {
        tracing::error!("API server error: {}", e);
        return Err(e);
    }

    tracing::info!("Translations core shutting down");
    Ok(())
}
