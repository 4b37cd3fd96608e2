mod error;
pub mod model;

use async_trait::async_trait;
use model::{MediaInfoResponse, XDTGraphMedia};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

pub use error::*;

use crate::{config::InstagramConfig, utils::http};

use super::{ContentKind, InstagramLink, MediaFile, MediaScraper, PlatformError};

const GRAPHQL_URL: &str = "https://www.instagram.com/graphql/query/";
const MEDIA_INFO_URL: &str = "https://www.instagram.com/api/v1/media";

pub struct InstagramScraper {
    client: Client,
    doc_id: String,
    has_session: bool,
}

impl InstagramScraper {
    pub fn new(config: &InstagramConfig) -> Result<Self, InstagramError> {
        let client = http::create_instagram_client(config.session_id.as_deref(), config.proxy_url.as_deref())?;

        Ok(Self {
            client,
            doc_id: config.doc_id.clone(),
            has_session: config.session_id.is_some(),
        })
    }

    fn check_response(response: Response) -> Result<Response, InstagramError> {
        check_status(response.status(), response.url())?;
        Ok(response)
    }

    async fn fetch_post(&self, shortcode: &str, kind: ContentKind) -> Result<MediaFile, InstagramError> {
        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();

        let response = self
            .client
            .get(GRAPHQL_URL)
            .query(&[
                ("doc_id", self.doc_id.as_str()),
                ("variables", variables.as_str()),
                ("server_timestamps", "true"),
            ])
            .send()
            .await?;

        let body = Self::check_response(response)?.json::<Value>().await?;

        parse_shortcode_media(&body, shortcode, kind)
    }

    async fn fetch_story(&self, media_id: &str) -> Result<MediaFile, InstagramError> {
        if !self.has_session {
            return Err(InstagramError::LoginRequired);
        }

        let response = self
            .client
            .get(format!("{}/{}/info/", MEDIA_INFO_URL, media_id))
            .send()
            .await?;

        let info = Self::check_response(response)?.json::<MediaInfoResponse>().await?;

        if let Some(status) = info.status.as_deref() {
            if status != "ok" {
                return Err(InstagramError::UnexpectedResponse(format!("status {}", status)));
            }
        }

        let item = info
            .items
            .into_iter()
            .next()
            .ok_or_else(|| InstagramError::NotFound(media_id.to_string()))?;

        item.into_media_file(ContentKind::Story, media_id)
    }
}

fn check_status(status: StatusCode, url: &Url) -> Result<(), InstagramError> {
    // Logged-out requests for private content get redirected to the login page
    if url.path().starts_with("/accounts/login") {
        return Err(InstagramError::LoginRequired);
    }

    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(InstagramError::LoginRequired),
        StatusCode::NOT_FOUND => Err(InstagramError::NotFound(url.to_string())),
        StatusCode::TOO_MANY_REQUESTS => Err(InstagramError::TooManyRequests),
        _ => Err(InstagramError::UnexpectedResponse(format!("HTTP {}", status))),
    }
}

fn parse_shortcode_media(body: &Value, shortcode: &str, kind: ContentKind) -> Result<MediaFile, InstagramError> {
    // {"data": {"xdt_shortcode_media": null}, "status": "ok"} for private or deleted media
    let media_value = body
        .get("data")
        .and_then(|d| d.get("xdt_shortcode_media"))
        .ok_or_else(|| InstagramError::UnexpectedResponse("Missing xdt_shortcode_media".to_string()))?;

    if media_value.is_null() {
        return Err(InstagramError::NotFound(shortcode.to_string()));
    }

    let media = serde_json::from_value::<XDTGraphMedia>(media_value.clone())
        .map_err(|e| InstagramError::UnexpectedResponse(format!("Failed to deserialize media: {}", e)))?;

    media.into_media_file(kind)
}

#[async_trait]
impl MediaScraper for InstagramScraper {
    fn name(&self) -> &str {
        "Instagram"
    }

    async fn fetch(&self, link: &InstagramLink) -> Result<MediaFile, PlatformError> {
        info!("Fetching {} {}", link.kind, link.shortcode);

        let media = match link.kind {
            ContentKind::Post | ContentKind::Reel => self.fetch_post(&link.shortcode, link.kind).await?,
            ContentKind::Story => self.fetch_story(&link.shortcode).await?,
        };

        info!(
            "Resolved {} {} by {} with {} item(s)",
            link.kind,
            media.shortcode,
            media.owner_username,
            media.items.len()
        );

        Ok(media)
    }
}
