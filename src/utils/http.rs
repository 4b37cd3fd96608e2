use reqwest::{
    cookie::Jar,
    header::{self, HeaderMap, HeaderValue},
    Client, ClientBuilder, Url,
};
use std::{sync::Arc, time::Duration};
use teloxide::Bot;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const INSTAGRAM_APP_ID: &str = "936619743392459";

/// The client has to come from teloxide's own reqwest, which is not the one this crate depends on.
/// Uploads go through it too, so `upload_timeout_secs` must cover a full-size video.
pub fn create_telegram_bot(token: String, connect_timeout_secs: u64, upload_timeout_secs: u64) -> anyhow::Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .timeout(Duration::from_secs(upload_timeout_secs))
        .pool_idle_timeout(Duration::from_secs(60))
        .tcp_keepalive(Duration::from_secs(30))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build Telegram client: {}", e))?;

    Ok(Bot::with_client(token, client))
}

pub fn create_instagram_client(session_id: Option<&str>, proxy_url: Option<&str>) -> Result<Client, reqwest::Error> {
    let cookie_store = Arc::new(Jar::default());

    if let Some(session_id) = session_id {
        if let Ok(url) = "https://www.instagram.com".parse::<Url>() {
            cookie_store.add_cookie_str(
                &format!("sessionid={}; Domain=.instagram.com; Path=/; Secure", session_id),
                &url,
            );
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert("X-IG-App-ID", HeaderValue::from_static(INSTAGRAM_APP_ID));
    headers.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(header::ORIGIN, HeaderValue::from_static("https://www.instagram.com"));
    headers.insert(header::REFERER, HeaderValue::from_static("https://www.instagram.com/"));

    let builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(30))
        .cookie_provider(cookie_store)
        .default_headers(headers)
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder, proxy_url)
}

/// Plain client for pulling media bytes off the CDN.
pub fn create_download_client(proxy_url: Option<&str>) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .read_timeout(Duration::from_secs(30))
        .user_agent(DEFAULT_USER_AGENT);

    build_client(builder, proxy_url)
}

fn build_client(builder: ClientBuilder, proxy_url: Option<&str>) -> Result<Client, reqwest::Error> {
    match proxy_url {
        Some(proxy_url) => {
            info!("Configuring client with proxy {}", proxy_url);
            builder.proxy(reqwest::Proxy::all(proxy_url)?).build()
        }
        None => builder.build(),
    }
}
