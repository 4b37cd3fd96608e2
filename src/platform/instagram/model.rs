use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;

use crate::platform::{ContentKind, MediaFile, MediaItem, MediaType};

use super::InstagramError;

fn parse_url(raw: &str) -> Result<Url, InstagramError> {
    Url::parse(raw).map_err(|e| InstagramError::InvalidUrl(format!("{}: {}", e, raw)))
}

fn parse_timestamp(timestamp: i64) -> Result<DateTime<Utc>, InstagramError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| InstagramError::UnexpectedResponse(format!("Invalid timestamp: {}", timestamp)))
}

// --- Common ---

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: String,
    pub username: String,
}

// --- XDTGraphMedia (GraphQL shortcode query) ---

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum XDTGraphMedia {
    #[serde(rename = "XDTGraphImage")]
    Image(XDTGraphImage),
    #[serde(rename = "XDTGraphVideo")]
    Video(XDTGraphVideo),
    #[serde(rename = "XDTGraphSidecar")]
    Sidecar(XDTGraphSidecar),
}

#[derive(Debug, Clone, Deserialize)]
pub struct XDTGraphImage {
    pub id: String,
    pub shortcode: String,
    pub display_url: String,
    pub owner: Owner,
    pub edge_media_to_caption: EdgeMediaToCaption,
    pub taken_at_timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XDTGraphVideo {
    pub id: String,
    pub shortcode: String,
    pub display_url: String,
    pub video_url: String,
    pub owner: Owner,
    pub edge_media_to_caption: EdgeMediaToCaption,
    pub taken_at_timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XDTGraphSidecar {
    pub id: String,
    pub shortcode: String,
    pub owner: Owner,
    pub edge_media_to_caption: EdgeMediaToCaption,
    pub taken_at_timestamp: i64,
    pub edge_sidecar_to_children: EdgeSidecarToChildren,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EdgeMediaToCaption {
    #[serde(default)]
    pub edges: Vec<EdgeMediaToCaptionEdge>,
}

impl EdgeMediaToCaption {
    fn first_text(&self) -> Option<String> {
        self.edges.first().map(|edge| edge.node.text.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeMediaToCaptionEdge {
    pub node: EdgeMediaToCaptionNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeMediaToCaptionNode {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeSidecarToChildren {
    pub edges: Vec<SidecarEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SidecarEdge {
    pub node: SidecarNode,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "__typename")]
pub enum SidecarNode {
    #[serde(rename = "XDTGraphImage")]
    Image { id: String, display_url: String },
    #[serde(rename = "XDTGraphVideo")]
    Video {
        id: String,
        display_url: String,
        video_url: String,
    },
}

impl XDTGraphMedia {
    pub fn into_media_file(self, kind: ContentKind) -> Result<MediaFile, InstagramError> {
        match self {
            XDTGraphMedia::Image(image) => Ok(MediaFile {
                shortcode: image.shortcode,
                owner_username: image.owner.username,
                caption: image.edge_media_to_caption.first_text(),
                kind,
                taken_at: parse_timestamp(image.taken_at_timestamp)?,
                items: vec![MediaItem {
                    id: image.id,
                    media_type: MediaType::Image,
                    url: parse_url(&image.display_url)?,
                }],
            }),
            XDTGraphMedia::Video(video) => Ok(MediaFile {
                shortcode: video.shortcode,
                owner_username: video.owner.username,
                caption: video.edge_media_to_caption.first_text(),
                kind,
                taken_at: parse_timestamp(video.taken_at_timestamp)?,
                items: vec![MediaItem {
                    id: video.id,
                    media_type: MediaType::Video,
                    url: parse_url(&video.video_url)?,
                }],
            }),
            XDTGraphMedia::Sidecar(sidecar) => {
                let items = sidecar
                    .edge_sidecar_to_children
                    .edges
                    .into_iter()
                    .map(|edge| match edge.node {
                        SidecarNode::Image { id, display_url } => Ok(MediaItem {
                            id,
                            media_type: MediaType::Image,
                            url: parse_url(&display_url)?,
                        }),
                        SidecarNode::Video { id, video_url, .. } => Ok(MediaItem {
                            id,
                            media_type: MediaType::Video,
                            url: parse_url(&video_url)?,
                        }),
                    })
                    .collect::<Result<Vec<_>, InstagramError>>()?;

                if items.is_empty() {
                    return Err(InstagramError::UnexpectedResponse(format!(
                        "Sidecar {} has no children",
                        sidecar.id
                    )));
                }

                Ok(MediaFile {
                    shortcode: sidecar.shortcode,
                    owner_username: sidecar.owner.username,
                    caption: sidecar.edge_media_to_caption.first_text(),
                    kind,
                    taken_at: parse_timestamp(sidecar.taken_at_timestamp)?,
                    items,
                })
            }
        }
    }
}

// --- Media info (private API, used for stories) ---

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfoResponse {
    #[serde(default)]
    pub items: Vec<ApiMediaItem>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMediaItem {
    pub id: String,
    pub taken_at: i64,
    /// 1 = image, 2 = video, 8 = carousel
    pub media_type: u8,
    pub user: Owner,
    pub caption: Option<ApiCaption>,
    pub image_versions2: Option<ImageVersions>,
    pub video_versions: Option<Vec<VideoVersion>>,
    pub carousel_media: Option<Vec<ApiMediaItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCaption {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageVersions {
    pub candidates: Vec<ImageCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageCandidate {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoVersion {
    pub url: String,
}

impl ApiMediaItem {
    fn best_image_url(&self) -> Option<&str> {
        self.image_versions2.as_ref().and_then(|versions| {
            versions
                .candidates
                .iter()
                .max_by_key(|c| u64::from(c.width) * u64::from(c.height))
                .map(|c| c.url.as_str())
        })
    }

    fn to_items(&self) -> Result<Vec<MediaItem>, InstagramError> {
        match self.media_type {
            1 => {
                let url = self
                    .best_image_url()
                    .ok_or_else(|| InstagramError::UnexpectedResponse(format!("Image {} has no candidates", self.id)))?;
                Ok(vec![MediaItem {
                    id: self.id.clone(),
                    media_type: MediaType::Image,
                    url: parse_url(url)?,
                }])
            }
            2 => {
                let url = self
                    .video_versions
                    .as_ref()
                    .and_then(|versions| versions.first())
                    .ok_or_else(|| InstagramError::UnexpectedResponse(format!("Video {} has no versions", self.id)))?;
                Ok(vec![MediaItem {
                    id: self.id.clone(),
                    media_type: MediaType::Video,
                    url: parse_url(&url.url)?,
                }])
            }
            8 => {
                let children = self.carousel_media.as_deref().unwrap_or_default();
                let mut items = Vec::with_capacity(children.len());
                for child in children {
                    items.extend(child.to_items()?);
                }
                Ok(items)
            }
            other => Err(InstagramError::UnexpectedResponse(format!("Unknown media type {}", other))),
        }
    }

    pub fn into_media_file(self, kind: ContentKind, shortcode: &str) -> Result<MediaFile, InstagramError> {
        let items = self.to_items()?;

        if items.is_empty() {
            return Err(InstagramError::NotFound(shortcode.to_string()));
        }

        Ok(MediaFile {
            shortcode: shortcode.to_string(),
            owner_username: self.user.username,
            caption: self.caption.map(|c| c.text),
            kind,
            taken_at: parse_timestamp(self.taken_at)?,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_xdt_video() {
        let value = serde_json::json!({
            "__typename": "XDTGraphVideo",
            "id": "3300000000000000001",
            "shortcode": "C_x9yZ",
            "display_url": "https://scontent.cdninstagram.com/thumb.jpg",
            "video_url": "https://scontent.cdninstagram.com/video.mp4",
            "is_video": true,
            "owner": { "id": "42", "username": "someone" },
            "edge_media_to_caption": { "edges": [{ "node": { "text": "hello" } }] },
            "taken_at_timestamp": 1709316250
        });

        let media = serde_json::from_value::<XDTGraphMedia>(value).unwrap();
        let file = media.into_media_file(ContentKind::Reel).unwrap();

        assert_eq!(file.shortcode, "C_x9yZ");
        assert_eq!(file.owner_username, "someone");
        assert_eq!(file.caption.as_deref(), Some("hello"));
        assert_eq!(file.kind, ContentKind::Reel);
        assert_eq!(file.items.len(), 1);
        assert_eq!(file.items[0].media_type, MediaType::Video);
        assert_eq!(file.items[0].url.as_str(), "https://scontent.cdninstagram.com/video.mp4");
    }

    #[test]
    fn test_deserialize_xdt_sidecar() {
        let value = serde_json::json!({
            "__typename": "XDTGraphSidecar",
            "id": "1",
            "shortcode": "ABC123",
            "owner": { "id": "42", "username": "someone" },
            "edge_media_to_caption": { "edges": [] },
            "taken_at_timestamp": 1709316250,
            "edge_sidecar_to_children": { "edges": [
                { "node": { "__typename": "XDTGraphImage", "id": "2", "display_url": "https://cdn.example.com/a.jpg" } },
                { "node": { "__typename": "XDTGraphVideo", "id": "3", "display_url": "https://cdn.example.com/b.jpg",
                            "video_url": "https://cdn.example.com/b.mp4" } }
            ]}
        });

        let file = serde_json::from_value::<XDTGraphMedia>(value)
            .unwrap()
            .into_media_file(ContentKind::Post)
            .unwrap();

        assert_eq!(file.caption, None);
        assert_eq!(file.items.len(), 2);
        assert_eq!(file.items[0].media_type, MediaType::Image);
        assert_eq!(file.items[1].media_type, MediaType::Video);
        assert_eq!(file.items[1].url.as_str(), "https://cdn.example.com/b.mp4");
    }

    #[test]
    fn test_story_media_info() {
        let value = serde_json::json!({
            "items": [{
                "id": "3312345678901234567_42",
                "taken_at": 1709316250,
                "media_type": 2,
                "user": { "username": "someone" },
                "image_versions2": { "candidates": [
                    { "url": "https://cdn.example.com/small.jpg", "width": 320, "height": 568 },
                    { "url": "https://cdn.example.com/large.jpg", "width": 1080, "height": 1920 }
                ]},
                "video_versions": [{ "url": "https://cdn.example.com/story.mp4" }]
            }],
            "status": "ok"
        });

        let response = serde_json::from_value::<MediaInfoResponse>(value).unwrap();
        let item = response.items.into_iter().next().unwrap();
        assert_eq!(item.best_image_url(), Some("https://cdn.example.com/large.jpg"));

        let file = item.into_media_file(ContentKind::Story, "3312345678901234567").unwrap();
        assert_eq!(file.download_dir_name(), "story_someone_3312345678901234567");
        assert_eq!(file.items[0].media_type, MediaType::Video);
        assert_eq!(file.items[0].url.as_str(), "https://cdn.example.com/story.mp4");
    }

    #[test]
    fn test_unknown_media_type() {
        let value = serde_json::json!({
            "id": "1", "taken_at": 1709316250, "media_type": 11, "user": { "username": "someone" }
        });
        let item = serde_json::from_value::<ApiMediaItem>(value).unwrap();
        assert!(item.into_media_file(ContentKind::Story, "1").is_err());
    }
}
