mod active;
mod download;
mod error;
mod progress;
pub mod relay;

use std::sync::Arc;

use teloxide::{
    prelude::Requester,
    types::{ChatId, MessageId},
    Bot,
};
use tokio::task::{JoinError, JoinHandle};

pub use active::*;
pub use download::*;
pub use error::*;
pub use progress::*;

use crate::{
    config::AppConfig,
    platform::{ContentKind, InstagramLink, MediaScraper, MediaType},
};

/// Takes detected links from a chat to media files back in that chat.
pub struct Pipeline {
    scraper: Arc<dyn MediaScraper>,
    downloader: Downloader,
    progress: ProgressBar,
    active: ActiveRequests,
    keep_downloads: bool,
    max_upload_bytes: u64,
}

impl Pipeline {
    pub fn new(scraper: Arc<dyn MediaScraper>, downloader: Downloader, config: &AppConfig) -> Self {
        Self {
            scraper,
            downloader,
            progress: ProgressBar::new(&config.progress),
            active: ActiveRequests::new(),
            keep_downloads: config.dispatch.keep_downloads,
            max_upload_bytes: config.dispatch.max_upload_bytes,
        }
    }

    /// Handles links one after another. A failed link never stops the rest.
    /// Returns how many links were relayed successfully.
    pub async fn dispatch_all(&self, bot: &Bot, chat_id: ChatId, links: Vec<InstagramLink>) -> usize {
        let total = links.len();
        let mut succeeded = 0;

        for link in links {
            match self.dispatch(bot, chat_id, &link).await {
                Ok(_) => succeeded += 1,
                Err(RuntimeError::AlreadyProcessing(key)) => info!("Skipped {} for chat {}: in flight", key, chat_id),
                Err(e) => warn!("Link {} failed for chat {}: {}", link.key(), chat_id, e),
            }
        }

        info!("Chat {}: {}/{} link(s) relayed", chat_id, succeeded, total);

        succeeded
    }

    pub async fn dispatch(&self, bot: &Bot, chat_id: ChatId, link: &InstagramLink) -> Result<usize, RuntimeError> {
        let Some(_guard) = self.active.try_acquire(chat_id, link) else {
            bot.send_message(chat_id, t!("messages.download.already_processing"))
                .await?;
            return Err(RuntimeError::AlreadyProcessing(link.key()));
        };

        info!("Dispatching {} {} for chat {}", link.kind, link.shortcode, chat_id);

        let wait_message = bot.send_message(chat_id, self.progress.render(0)).await?;

        let task = self.spawn_download(chat_id, link.clone());

        let outcome = match self.animate(bot, chat_id, wait_message.id, task).await {
            Ok(Ok(downloaded)) => self.relay(bot, chat_id, link, downloaded).await,
            Ok(Err(e)) => Err(e),
            Err(e) => Err(e.into()),
        };

        if let Err(e) = bot.delete_message(chat_id, wait_message.id).await {
            warn!("Failed to delete wait message in chat {}: {}", chat_id, e);
        }

        match outcome {
            Ok(sent) => Ok(sent),
            Err(e) => {
                error!("Error downloading {} {}: {:?}", link.kind, link.shortcode, e);
                bot.send_message(chat_id, error_text(link.kind, &e)).await?;
                Err(e)
            }
        }
    }

    fn spawn_download(&self, chat_id: ChatId, link: InstagramLink) -> JoinHandle<Result<DownloadedMedia, RuntimeError>> {
        let scraper = Arc::clone(&self.scraper);
        let downloader = self.downloader.clone();
        let keep_downloads = self.keep_downloads;

        tokio::spawn(async move {
            let media = scraper.fetch(&link).await?;

            info!(
                "{} {}: {} video(s), {} photo(s)",
                scraper.name(),
                media.download_dir_name(),
                media.count_of(MediaType::Video),
                media.count_of(MediaType::Image)
            );

            let folder = downloader.folder_for(chat_id, &media);

            match downloader.download(chat_id, media).await {
                Ok(downloaded) => Ok(downloaded),
                Err(e) => {
                    if !keep_downloads {
                        remove_folder(&folder).await;
                    }
                    Err(e)
                }
            }
        })
    }

    /// Walks the wait message through every step, racing each delay against `task`.
    /// Once the task is done the bar jumps to 100% and its output is returned.
    async fn animate<T>(
        &self,
        bot: &Bot,
        chat_id: ChatId,
        message_id: MessageId,
        mut task: JoinHandle<T>,
    ) -> Result<T, JoinError> {
        let delay = self.progress.step_delay();

        for step in 1..=self.progress.steps() {
            tokio::select! {
                biased;

                output = &mut task => {
                    self.edit_progress(bot, chat_id, message_id, self.progress.render_done())
                        .await;
                    return output;
                }
                _ = tokio::time::sleep(delay) => {
                    self.edit_progress(bot, chat_id, message_id, self.progress.render(step))
                        .await;
                }
            }
        }

        task.await
    }

    async fn edit_progress(&self, bot: &Bot, chat_id: ChatId, message_id: MessageId, text: String) {
        if let Err(e) = bot.edit_message_text(chat_id, message_id, text).await {
            warn!("Failed to update progress in chat {}: {}", chat_id, e);
        }
    }

    async fn relay(
        &self,
        bot: &Bot,
        chat_id: ChatId,
        link: &InstagramLink,
        downloaded: DownloadedMedia,
    ) -> Result<usize, RuntimeError> {
        let result = self.relay_folder(bot, chat_id, link, &downloaded).await;

        if !self.keep_downloads {
            remove_folder(&downloaded.folder).await;
        }

        result
    }

    async fn relay_folder(
        &self,
        bot: &Bot,
        chat_id: ChatId,
        link: &InstagramLink,
        downloaded: &DownloadedMedia,
    ) -> Result<usize, RuntimeError> {
        for size in &downloaded.oversized {
            relay::send_too_large(bot, chat_id, *size, &link.url).await?;
        }

        let files = relay::collect(&downloaded.folder).await?;

        if files.is_empty() {
            if downloaded.oversized.is_empty() {
                bot.send_message(chat_id, t!("messages.download.nothing_to_send"))
                    .await?;
            }
            return Ok(0);
        }

        info!(
            "Relaying {} file(s) from {}",
            files.len(),
            downloaded.media.download_dir_name()
        );

        relay::send(bot, chat_id, &files, &link.url, self.max_upload_bytes).await
    }
}

pub fn error_text(kind: ContentKind, error: &RuntimeError) -> String {
    let error = error.to_string();

    match kind {
        ContentKind::Post => t!("messages.error.post", error = error),
        ContentKind::Reel => t!("messages.error.reel", error = error),
        ContentKind::Story => t!("messages.error.story", error = error),
    }
    .to_string()
}
