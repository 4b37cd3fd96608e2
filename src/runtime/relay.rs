use std::path::{Path, PathBuf};

use teloxide::{
    payloads::{SendPhotoSetters, SendVideoSetters},
    prelude::Requester,
    types::{ChatId, InputFile},
    Bot,
};
use tokio::fs;
use url::Url;

use crate::platform::MediaType;

use super::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFile {
    pub path: PathBuf,
    pub media_type: MediaType,
    pub size: u64,
}

/// Lists the files in `folder` that can go back to the chat, in name order.
pub async fn collect(folder: &Path) -> Result<Vec<RelayFile>, RuntimeError> {
    let mut entries = fs::read_dir(folder).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        let media_type = match path.extension().and_then(|e| e.to_str()) {
            Some("mp4") => MediaType::Video,
            Some("jpg") => MediaType::Image,
            _ => continue,
        };

        let size = entry.metadata().await?.len();
        files.push(RelayFile { path, media_type, size });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

/// Uploads each file, or a notice with the original link when it is over `max_upload_bytes`.
/// Returns how many files were uploaded.
pub async fn send(
    bot: &Bot,
    chat_id: ChatId,
    files: &[RelayFile],
    source: &Url,
    max_upload_bytes: u64,
) -> Result<usize, RuntimeError> {
    let mut sent = 0;

    for file in files {
        if file.size > max_upload_bytes {
            warn!("{} is {} bytes, over the upload limit", file.path.display(), file.size);
            send_too_large(bot, chat_id, file.size, source).await?;
            continue;
        }

        info!("Relaying {} {}", file.media_type, file.path.display());

        match file.media_type {
            MediaType::Video => {
                bot.send_video(chat_id, InputFile::file(file.path.clone()))
                    .caption(t!("messages.download.video_caption"))
                    .await
            }
            MediaType::Image => {
                bot.send_photo(chat_id, InputFile::file(file.path.clone()))
                    .caption(t!("messages.download.photo_caption"))
                    .await
            }
        }?;

        sent += 1;
    }

    Ok(sent)
}

/// Tells the chat a file could not be uploaded and points at `source` instead.
pub async fn send_too_large(bot: &Bot, chat_id: ChatId, size: u64, source: &Url) -> Result<(), RuntimeError> {
    bot.send_message(
        chat_id,
        t!(
            "messages.download.too_large",
            size = size / (1024 * 1024),
            url = source.as_str()
        ),
    )
    .await?;

    Ok(())
}
