use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::DateTime;
use teloxide::{dptree, types::ChatId};
use teloxide_tests::{MockBot, MockMessageText};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};
use url::Url;

use crate::{
    config::AppConfig,
    handler::get_handler,
    platform::{instagram::InstagramError, ContentKind, InstagramLink, MediaFile, MediaItem, MediaScraper, MediaType, PlatformError},
    state::AppState,
};

/// Scraper stand-in: either resolves every link to the same items or fails with "not found".
pub struct FakeScraper {
    items: Option<Vec<(MediaType, Url)>>,
    delay: Duration,
}

impl FakeScraper {
    pub fn returning(videos: Vec<Url>) -> Self {
        Self::with_items(videos.into_iter().map(|url| (MediaType::Video, url)).collect())
    }

    pub fn returning_photos(photos: Vec<Url>) -> Self {
        Self::with_items(photos.into_iter().map(|url| (MediaType::Image, url)).collect())
    }

    pub fn failing() -> Self {
        Self {
            items: None,
            delay: Duration::ZERO,
        }
    }

    /// Holds every fetch for `delay` before answering.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn with_items(items: Vec<(MediaType, Url)>) -> Self {
        Self {
            items: Some(items),
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl MediaScraper for FakeScraper {
    fn name(&self) -> &str {
        "Fake"
    }

    async fn fetch(&self, link: &InstagramLink) -> Result<MediaFile, PlatformError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.items {
            Some(items) => {
                let mut media = sample_media(Vec::new());
                media.kind = link.kind;
                media.shortcode = link.shortcode.clone();
                media.items = items
                    .iter()
                    .enumerate()
                    .map(|(i, (media_type, url))| MediaItem {
                        id: i.to_string(),
                        media_type: *media_type,
                        url: url.clone(),
                    })
                    .collect();
                Ok(media)
            }
            None => Err(InstagramError::NotFound(link.shortcode.clone()).into()),
        }
    }
}

pub fn sample_media(videos: Vec<Url>) -> MediaFile {
    MediaFile {
        shortcode: "ABC123".to_string(),
        owner_username: "someone".to_string(),
        caption: None,
        kind: ContentKind::Reel,
        taken_at: DateTime::from_timestamp(1_709_316_250, 0).unwrap(),
        items: videos
            .into_iter()
            .enumerate()
            .map(|(i, url)| MediaItem {
                id: i.to_string(),
                media_type: MediaType::Video,
                url,
            })
            .collect(),
    }
}

/// Serves `body` to every request on a random local port.
pub async fn serve_bytes(body: Vec<u8>) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = Arc::new(body);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = Arc::clone(&body);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: video/mp4\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    Url::parse(&format!("http://{}/media.mp4", addr)).unwrap()
}

pub fn test_state(download_dir: &Path, scraper: FakeScraper, configure: impl FnOnce(&mut AppConfig)) -> AppState {
    let mut config = AppConfig::new_test_config(download_dir.to_path_buf());
    configure(&mut config);

    AppState::with_scraper(config, Arc::new(scraper)).expect("Failed to build test state")
}

/// Chat every mocked message is sent from.
pub fn test_chat_id() -> ChatId {
    MockMessageText::new().build().chat.id
}

pub fn setup_test_bot(msg: &str, state: AppState) -> MockBot {
    let bot = MockBot::new(MockMessageText::new().text(msg), get_handler());

    bot.dependencies(dptree::deps![state]);

    bot
}
