use std::path::{Path, PathBuf};

use reqwest::Client;
use teloxide::types::ChatId;
use tokio::{fs, io::AsyncWriteExt};

use crate::platform::MediaFile;

use super::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub media: MediaFile,
    pub folder: PathBuf,
    pub files: Vec<PathBuf>,
    /// Sizes of items that were over the upload limit and never kept.
    pub oversized: Vec<u64>,
}

enum Fetched {
    Saved(u64),
    TooLarge(u64),
}

/// Writes every item of a resolved link into a folder of its own under `download_dir`.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    download_dir: PathBuf,
    max_bytes: u64,
}

impl Downloader {
    pub fn new(client: Client, download_dir: PathBuf, max_bytes: u64) -> Self {
        Self {
            client,
            download_dir,
            max_bytes,
        }
    }

    /// `<download_dir>/<chat id>/<kind>_<owner>_<shortcode>`
    pub fn folder_for(&self, chat_id: ChatId, media: &MediaFile) -> PathBuf {
        self.download_dir
            .join(chat_id.0.to_string())
            .join(media.download_dir_name())
    }

    pub async fn download(&self, chat_id: ChatId, media: MediaFile) -> Result<DownloadedMedia, RuntimeError> {
        let folder = self.folder_for(chat_id, &media);
        fs::create_dir_all(&folder).await?;

        let mut files = Vec::with_capacity(media.items.len());
        let mut oversized = Vec::new();

        for (index, item) in media.items.iter().enumerate() {
            let file_name = media
                .item_file_name(index)
                .ok_or_else(|| RuntimeError::TaskError(format!("No item at index {}", index)))?;
            let path = folder.join(file_name);

            debug!("Downloading {} {} to {}", item.media_type, item.id, path.display());

            match self.fetch_to_file(item.url.as_str(), &path).await? {
                Fetched::Saved(written) => {
                    info!("Saved {} ({} bytes)", path.display(), written);
                    files.push(path);
                }
                Fetched::TooLarge(size) => {
                    warn!("Skipped {} {}: {} bytes is over the upload limit", item.media_type, item.id, size);
                    oversized.push(size);
                }
            }
        }

        Ok(DownloadedMedia {
            media,
            folder,
            files,
            oversized,
        })
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<Fetched, RuntimeError> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        if let Some(length) = response.content_length().filter(|length| *length > self.max_bytes) {
            return Ok(Fetched::TooLarge(length));
        }

        let mut file = fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;

            if written > self.max_bytes {
                drop(file);
                fs::remove_file(path).await?;
                return Ok(Fetched::TooLarge(written));
            }

            file.write_all(&chunk).await?;
        }

        file.flush().await?;

        Ok(Fetched::Saved(written))
    }
}

pub async fn remove_folder(folder: &Path) {
    match fs::remove_dir_all(folder).await {
        Ok(()) => debug!("Removed {}", folder.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", folder.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::relay;
    use crate::utils::test::{sample_media, serve_bytes};

    const MAX_BYTES: u64 = 1024;

    #[tokio::test]
    async fn test_download_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_bytes(b"fake video bytes".to_vec()).await;
        let media = sample_media(vec![url.clone(), url]);

        let downloader = Downloader::new(Client::new(), dir.path().to_path_buf(), MAX_BYTES);
        let downloaded = downloader.download(ChatId(42), media).await.unwrap();

        assert_eq!(downloaded.folder, dir.path().join("42").join("reel_someone_ABC123"));
        assert_eq!(downloaded.files.len(), 2);
        assert!(downloaded.oversized.is_empty());
        assert!(downloaded.files[0].ends_with("2024-03-01_18-04-10_UTC_1.mp4"));

        let content = fs::read(&downloaded.files[1]).await.unwrap();
        assert_eq!(content, b"fake video bytes");

        remove_folder(&downloaded.folder).await;
        assert!(!downloaded.folder.exists());
    }

    #[tokio::test]
    async fn test_same_link_in_two_chats_keeps_separate_folders() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_bytes(b"fake video bytes".to_vec()).await;
        let downloader = Downloader::new(Client::new(), dir.path().to_path_buf(), MAX_BYTES);

        let first = downloader.download(ChatId(1), sample_media(vec![url.clone()])).await.unwrap();
        let second = downloader.download(ChatId(2), sample_media(vec![url])).await.unwrap();

        assert_ne!(first.folder, second.folder);

        // Cleaning up after the first chat leaves the second chat's files alone
        remove_folder(&first.folder).await;

        let files = relay::collect(&second.folder).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].size, 16);
    }

    #[tokio::test]
    async fn test_oversized_item_is_not_kept() {
        let dir = tempfile::tempdir().unwrap();
        let url = serve_bytes(vec![0u8; 64]).await;

        let downloader = Downloader::new(Client::new(), dir.path().to_path_buf(), 16);
        let downloaded = downloader.download(ChatId(42), sample_media(vec![url])).await.unwrap();

        assert!(downloaded.files.is_empty());
        assert_eq!(downloaded.oversized, vec![64]);
        assert!(relay::collect(&downloaded.folder).await.unwrap().is_empty());
    }
}
