use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use url::Url;

use super::ContentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "mp4",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub id: String,
    pub media_type: MediaType,
    pub url: Url,
}

/// A resolved link: who posted it, when, and where each media item lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub shortcode: String,
    pub owner_username: String,
    pub caption: Option<String>,
    pub kind: ContentKind,
    pub taken_at: DateTime<Utc>,
    pub items: Vec<MediaItem>,
}

impl MediaFile {
    pub fn download_dir_name(&self) -> String {
        format!("{}_{}_{}", self.kind, self.owner_username, self.shortcode)
    }

    /// File name for the item at `index`, e.g. `2024-03-01_18-04-10_UTC_2.jpg`.
    pub fn item_file_name(&self, index: usize) -> Option<String> {
        let item = self.items.get(index)?;
        let stamp = self.taken_at.format("%Y-%m-%d_%H-%M-%S");

        if self.items.len() == 1 {
            Some(format!("{}_UTC.{}", stamp, item.media_type.extension()))
        } else {
            Some(format!("{}_UTC_{}.{}", stamp, index + 1, item.media_type.extension()))
        }
    }

    pub fn count_of(&self, media_type: MediaType) -> usize {
        self.items.iter().filter(|item| item.media_type == media_type).count()
    }
}
