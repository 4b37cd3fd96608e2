use std::{
    collections::HashSet,
    fmt::{self, Display},
    str::FromStr,
    sync::LazyLock,
};

use anyhow::Context;
use regex::Regex;
use url::Url;

use super::PlatformError;

static INSTAGRAM_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?instagram\.com/[^\s]+")
        .context("Failed to create Instagram URL regex")
        .unwrap()
});

static INSTAGRAM_MEDIA_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?instagram\.com/(?:(?:p|reels?)/[A-Za-z0-9_-]+|stories/[A-Za-z0-9._]+/[0-9]+)/?(?:\?\S*)?$",
    )
    .context("Failed to create Instagram media URL regex")
    .unwrap()
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', ')', ']', '}', '>', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Post,
    Reel,
    Story,
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Reel => write!(f, "reel"),
            Self::Story => write!(f, "story"),
        }
    }
}

/// Whether a message must be exactly one link, or may carry any number of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkScope {
    Single,
    #[default]
    All,
}

impl FromStr for LinkScope {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "all" => Ok(Self::All),
            _ => Err(PlatformError::ParsingError(format!("Unknown link scope: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstagramLink {
    pub url: Url,
    pub kind: ContentKind,
    /// Post/reel shortcode, or the media id for stories.
    pub shortcode: String,
    pub username: Option<String>,
}

impl InstagramLink {
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.shortcode)
    }
}

pub fn is_valid_instagram_url(text: &str) -> bool {
    INSTAGRAM_MEDIA_URL_REGEX.is_match(text.trim())
}

pub fn parse_link(text: &str) -> Result<InstagramLink, PlatformError> {
    let text = text.trim();

    if !is_valid_instagram_url(text) {
        return Err(PlatformError::ParsingError(format!("Not an Instagram media link: {}", text)));
    }

    let url = Url::parse(text).map_err(|e| PlatformError::ParsingError(e.to_string()))?;

    match url.host_str() {
        Some("instagram.com") | Some("www.instagram.com") => {}
        _ => return Err(PlatformError::ParsingError("Not an Instagram URL".into())),
    }

    let segments: Vec<String> = url
        .path_segments()
        .ok_or_else(|| PlatformError::ParsingError("No path segments".into()))?
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let (kind, shortcode, username) = match segments.as_slice() {
        [marker, shortcode, ..] if marker == "p" => (ContentKind::Post, shortcode.clone(), None),
        [marker, shortcode, ..] if marker == "reel" || marker == "reels" => {
            (ContentKind::Reel, shortcode.clone(), None)
        }
        [marker, username, story_id, ..] if marker == "stories" && username != "highlights" => {
            (ContentKind::Story, story_id.clone(), Some(username.clone()))
        }
        _ => return Err(PlatformError::ParsingError("Invalid URL format".into())),
    };

    Ok(InstagramLink {
        url,
        kind,
        shortcode,
        username,
    })
}

pub fn detect_links(text: &str, scope: LinkScope) -> Vec<InstagramLink> {
    match scope {
        LinkScope::Single => parse_link(text).into_iter().collect(),
        LinkScope::All => {
            let mut seen = HashSet::new();

            INSTAGRAM_URL_REGEX
                .find_iter(text)
                .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
                .filter_map(|candidate| match parse_link(candidate) {
                    Ok(link) => Some(link),
                    Err(e) => {
                        debug!("Skipping {}: {}", candidate, e);
                        None
                    }
                })
                .filter(|link| seen.insert(link.key()))
                .collect()
        }
    }
}
