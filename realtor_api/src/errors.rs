//! Error types for the directory client.

/// Errors that can occur when fetching a directory page.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a response (connect, proxy, TLS, timeout).
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The base URL or proxy address could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The site returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// A success status with nothing but whitespace in the body.
    #[error("Empty response body")]
    EmptyBody,
    /// The site served its anti-bot interstitial instead of the listing.
    #[error("Blocked by the site (anti-bot page)")]
    Blocked,
}

impl Error {
    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Url(_))
    }
}
