//! Authenticated session shared by the service clients
//!
//! Holds the access token, the service base URLs and one pooled HTTP client.
//! Built once at startup and handed to each adapter; nothing here is global.

use changeset_core::port::ServiceError;
use changeset_core::{AppError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Organizer service base URL
pub const DEFAULT_ORGANIZER_URL: &str = "https://org-api.connect.trimble.com/v1/";

/// Property set service base URL
pub const DEFAULT_PSET_URL: &str = "https://pset-api.connect.trimble.com/v1/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct Session {
    http: Arc<Client>,
    access_token: String,
    organizer_url: Url,
    pset_url: Url,
}

impl Session {
    /// Create a session against the given service base URLs
    ///
    /// # Errors
    /// - AppError::Config if the token is empty or a URL does not parse
    pub fn new(
        access_token: impl Into<String>,
        organizer_url: &str,
        pset_url: &str,
    ) -> Result<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(AppError::Config("access token cannot be empty".to_string()));
        }

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http: Arc::new(http),
            access_token,
            organizer_url: parse_base_url(organizer_url)?,
            pset_url: parse_base_url(pset_url)?,
        })
    }

    /// Session against the production services
    pub fn with_defaults(access_token: impl Into<String>) -> Result<Self> {
        Self::new(access_token, DEFAULT_ORGANIZER_URL, DEFAULT_PSET_URL)
    }

    pub fn http(&self) -> Arc<Client> {
        self.http.clone()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn organizer_url(&self) -> &Url {
        &self.organizer_url
    }

    pub fn pset_url(&self) -> &Url {
        &self.pset_url
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("organizer_url", &self.organizer_url.as_str())
            .field("pset_url", &self.pset_url.as_str())
            .finish()
    }
}

/// Parse a base URL, forcing a trailing slash so relative joins keep the path
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&normalized)
        .map_err(|e| AppError::Config(format!("Invalid service URL {}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(AppError::Config(format!("Service URL {} cannot be a base", raw)));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> std::result::Result<Url, ServiceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::transport(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
