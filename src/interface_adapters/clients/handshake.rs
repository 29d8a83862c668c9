use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, HeaderMap, PRAGMA, REFERER,
    USER_AGENT,
};
use std::time::Duration;
use url::Url;

use crate::domain::errors::SettingsError;
use crate::domain::ports::{HandshakeGateway, HandshakeReply};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";
pub const WEBSOCKET_URL_HEADER: &str = "x-websocket-url";

#[derive(Debug, Clone)]
pub struct HandshakeSettings {
    /// Full handshake URL, poll id included.
    pub url: Url,
    pub referer: String,
    pub user_agent: String,
    pub timeout: Duration,
}

// Thin reqwest client for the access-token handshake. The request mimics the
// embedded poll widget's own XHR.
#[derive(Clone)]
pub struct HandshakeClient {
    http: Client,
    url: Url,
    referer: String,
    user_agent: String,
}

impl HandshakeClient {
    pub fn new(settings: HandshakeSettings) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            http,
            url: settings.url,
            referer: settings.referer,
            user_agent: settings.user_agent,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl HandshakeGateway for HandshakeClient {
    async fn request_handshake(&self) -> Result<HandshakeReply, SettingsError> {
        tracing::debug!(url = %self.url, "requesting handshake");
        let res = self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "application/json, text/plain, */*")
            .header(ACCEPT_ENCODING, "gzip")
            .header(ACCEPT_LANGUAGE, "en-GB,en;q=0.9")
            .header("appToken", "none")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .header("Priority", "u=3, i")
            .header(REFERER, &self.referer)
            .header("Sec-Fetch-Dest", "empty")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Site", "same-origin")
            .header(USER_AGENT, &self.user_agent)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| SettingsError::Request(e.to_string()))?;

        let status = res.status();
        tracing::debug!(%status, "handshake response received");

        // Only headers matter; the body is never read.
        Ok(HandshakeReply {
            status: status.as_u16(),
            access_token: header_value(res.headers(), ACCESS_TOKEN_HEADER),
            websocket_url: header_value(res.headers(), WEBSOCKET_URL_HEADER),
        })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
