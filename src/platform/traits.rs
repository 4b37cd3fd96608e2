use async_trait::async_trait;

use super::{InstagramLink, MediaFile, PlatformError};

/// Resolves a link to downloadable media. The bot never talks to Instagram except through this.
#[async_trait]
pub trait MediaScraper: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, link: &InstagramLink) -> Result<MediaFile, PlatformError>;
}
