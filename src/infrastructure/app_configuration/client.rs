//! Azure App Configuration REST client

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use super::connection_string::ConnectionString;
use crate::domain::config::{ConfigSetting, LabelFilter, SettingsStore};
use crate::domain::DomainError;

type HmacSha256 = Hmac<Sha256>;

const STORE_NAME: &str = "app_configuration";
const SIGNED_HEADERS: &str = "x-ms-date;host;x-ms-content-sha256";
const ACCEPT: &str = "application/vnd.microsoft.appconfig.kvset+json, application/problem+json";

/// App Configuration client configuration
#[derive(Debug, Clone)]
pub struct AppConfigurationConfig {
    pub connection: ConnectionString,
    pub api_version: String,
    pub request_timeout: Duration,
}

impl AppConfigurationConfig {
    pub fn new(connection: ConnectionString) -> Self {
        Self {
            connection,
            api_version: "1.0".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// One page of the key-value listing
#[derive(Debug, Deserialize)]
struct KeyValuePage {
    #[serde(default)]
    items: Vec<ConfigSetting>,
    #[serde(rename = "@nextLink")]
    next_link: Option<String>,
}

/// Settings store backed by the App Configuration `/kv` endpoint
#[derive(Debug, Clone)]
pub struct AppConfigurationClient {
    http: reqwest::Client,
    config: AppConfigurationConfig,
}

impl AppConfigurationClient {
    pub fn new(config: AppConfigurationConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http, config })
    }

    fn list_url(&self, label: &LabelFilter) -> Result<reqwest::Url, DomainError> {
        let mut url = self
            .config
            .connection
            .endpoint()
            .join("kv")
            .map_err(|e| DomainError::configuration(format!("Invalid endpoint: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("label", label.as_str())
            .append_pair("api-version", &self.config.api_version);

        Ok(url)
    }

    fn next_url(&self, next_link: &str) -> Result<reqwest::Url, DomainError> {
        self.config
            .connection
            .endpoint()
            .join(next_link)
            .map_err(|e| DomainError::store(STORE_NAME, format!("Invalid next link: {}", e)))
    }

    /// Builds the HMAC-SHA256 authentication headers for a body-less GET
    fn auth_headers(&self, url: &reqwest::Url, date: &str) -> Result<Vec<(&'static str, String)>, DomainError> {
        let content_hash = content_sha256(b"");
        let host = host_header(url);
        let to_sign = string_to_sign("GET", &path_and_query(url), date, &host, &content_hash);
        let signature = sign(self.config.connection.secret(), &to_sign)?;

        Ok(vec![
            ("x-ms-date", date.to_string()),
            ("x-ms-content-sha256", content_hash),
            (
                "Authorization",
                format!(
                    "HMAC-SHA256 Credential={}&SignedHeaders={}&Signature={}",
                    self.config.connection.credential(),
                    SIGNED_HEADERS,
                    signature
                ),
            ),
        ])
    }

    async fn get_page(&self, url: &reqwest::Url) -> Result<KeyValuePage, DomainError> {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();

        let mut request = self.http.get(url.clone()).header("Accept", ACCEPT);

        for (name, value) in self.auth_headers(url, &date)? {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::store(STORE_NAME, format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "App Configuration request failed");
            return Err(DomainError::store(STORE_NAME, format!("HTTP {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::store(STORE_NAME, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl SettingsStore for AppConfigurationClient {
    fn name(&self) -> &'static str {
        STORE_NAME
    }

    async fn list_settings(&self, label: &LabelFilter) -> Result<Vec<ConfigSetting>, DomainError> {
        let mut url = self.list_url(label)?;
        let mut visited = HashSet::new();
        let mut settings = Vec::new();
        let mut pages = 0usize;

        loop {
            visited.insert(url.to_string());
            let page = self.get_page(&url).await?;
            pages += 1;
            settings.extend(page.items);

            match page.next_link.as_deref().filter(|link| !link.is_empty()) {
                Some(link) => {
                    url = self.next_url(link)?;
                    if visited.contains(url.as_str()) {
                        error!(
                            label = %label,
                            pages,
                            next_link = link,
                            "Paging loops back to a visited page"
                        );
                        return Err(DomainError::store(
                            STORE_NAME,
                            "Next link repeats a visited page",
                        ));
                    }
                }
                None => break,
            }
        }

        debug!(label = %label, settings = settings.len(), pages, "Listed settings");
        Ok(settings)
    }
}

fn content_sha256(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

fn host_header(url: &reqwest::Url) -> String {
    let host = url.host_str().unwrap_or_default();

    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn path_and_query(url: &reqwest::Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

fn string_to_sign(method: &str, path_and_query: &str, date: &str, host: &str, content_hash: &str) -> String {
    format!("{}\n{}\n{};{};{}", method, path_and_query, date, host, content_hash)
}

fn sign(secret: &[u8], to_sign: &str) -> Result<String, DomainError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| DomainError::internal(format!("Invalid signing key: {}", e)))?;
    mac.update(to_sign.as_bytes());

    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
