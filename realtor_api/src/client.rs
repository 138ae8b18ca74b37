//! HTTP client for the agent directory pages.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::{
    query::{DirectoryQuery, Query},
    user_agent::get_user_agent,
    Error,
};

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Text the site's anti-bot interstitial always carries.
const BLOCK_MARKER: &str = "Reference ID";

const GEO_LOCATION_HEADER: &str = "x-oxylabs-geo-location";

/// Authenticated forward proxy used for both `http` and `https` requests.
#[derive(Clone)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyConfig {
    fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Transport settings applied to every request.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub proxy: Option<ProxyConfig>,
    /// Sent as the proxy's geo-location header when set.
    pub geo_location: Option<String>,
    /// `false` accepts invalid certificates (some unblocking proxies re-sign TLS).
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            proxy: None,
            geo_location: None,
            verify_tls: true,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the agent directory.
///
/// Sends requests with browser-like headers and a randomized user agent.
/// Each request builds a fresh `reqwest::Client` so the user agent rotates.
pub struct Client {
    /// Base URL for the site. Defaults to `https://www.realtor.com`.
    base_url: String,
    options: ClientOptions,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production site.
    pub fn new() -> Self {
        Self::with_base_url("https://www.realtor.com")
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            options: ClientOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    fn get_url(&self, query: &impl Query) -> Result<Url, Error> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            tracing::error!("Invalid base URL {}: {}", self.base_url, e);
            Error::Url(e)
        })?;
        Ok(query.add_to_url(&base))
    }

    fn build_http_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(self.options.timeout)
            .danger_accept_invalid_certs(!self.options.verify_tls);
        if let Some(proxy) = &self.options.proxy {
            let proxy = reqwest::Proxy::all(proxy.url())?
                .basic_auth(&proxy.username, &proxy.password);
            builder = builder.proxy(proxy);
        }
        builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Http(e)
        })
    }

    /// Fetches one directory page and returns its HTML.
    ///
    /// Non-success statuses, blank bodies and the site's block page are
    /// reported as errors so callers can stop paginating.
    pub async fn get_directory_page(&self, query: &DirectoryQuery) -> Result<String, Error> {
        let url = self.get_url(query)?;
        let client = self.build_http_client()?;

        let mut request = client
            .get(url.clone())
            .header(
                "accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("accept-language", "en-US,en;q=0.9")
            .header("upgrade-insecure-requests", "1");
        if let Some(geo) = &self.options.geo_location {
            request = request.header(GEO_LOCATION_HEADER, geo.as_str());
        }

        let resp = request.send().await.map_err(|e| {
            tracing::error!("Failed to get {}: {}", url, e);
            Error::Http(e)
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Http(e)
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }
        if body.trim().is_empty() {
            return Err(Error::EmptyBody);
        }
        if body.contains(BLOCK_MARKER) {
            return Err(Error::Blocked);
        }

        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
