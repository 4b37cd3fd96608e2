use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::BotResult,
    platform::{InstagramScraper, MediaScraper, PlatformError},
    runtime::{Downloader, Pipeline},
    utils::http,
};

/// Everything a handler needs, injected into the dispatcher as a dependency.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(config: AppConfig) -> BotResult<Self> {
        let scraper = InstagramScraper::new(&config.instagram).map_err(PlatformError::from)?;

        Self::with_scraper(config, Arc::new(scraper))
    }

    pub fn with_scraper(config: AppConfig, scraper: Arc<dyn MediaScraper>) -> BotResult<Self> {
        info!("Initializing AppState with {} scraper", scraper.name());

        let client = http::create_download_client(config.instagram.proxy_url.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to build download client: {}", e))?;
        let downloader = Downloader::new(
            client,
            config.dispatch.download_dir.clone(),
            config.dispatch.max_upload_bytes,
        );
        let pipeline = Pipeline::new(scraper, downloader, &config);

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
        })
    }
}
