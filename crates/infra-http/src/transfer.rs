// NDJSON Transfer Client (ContentTransfer)
//
// Upload and download URLs are pre-signed: no Authorization header is sent,
// and only the URL path is ever logged.

use crate::error::{check, transport};
use crate::session::Session;
use async_trait::async_trait;
use changeset_core::application::ndjson;
use changeset_core::domain::ChangeRecord;
use changeset_core::port::{ContentTransfer, NdjsonStream, ServiceError};
use futures::StreamExt;
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

pub struct NdjsonTransferClient {
    http: Arc<Client>,
}

impl NdjsonTransferClient {
    pub fn new(http: Arc<Client>) -> Self {
        Self { http }
    }

    /// Share the session's connection pool
    pub fn from_session(session: &Session) -> Self {
        Self::new(session.http())
    }
}

#[async_trait]
impl ContentTransfer for NdjsonTransferClient {
    async fn upload_ndjson(&self, url: &str, records: &[ChangeRecord]) -> Result<(), ServiceError> {
        let body = ndjson::encode(records)
            .map_err(|e| ServiceError::decode(format!("failed to encode change set: {}", e)))?;

        info!(
            target_url = %redact_url(url),
            records = records.len(),
            bytes = body.len(),
            "PUT change set contents"
        );

        let response = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, ndjson::CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| transport("upload change set contents", e))?;

        let status = response.status();
        check(response, "upload change set contents").await?;
        info!(
            target_url = %redact_url(url),
            status = status.as_u16(),
            "Change set contents uploaded"
        );
        Ok(())
    }

    async fn stream_ndjson(&self, url: &str) -> Result<NdjsonStream, ServiceError> {
        info!(target_url = %redact_url(url), "GET NDJSON document");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport("open NDJSON document", e))?;
        let response = check(response, "open NDJSON document").await?;

        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| transport("read NDJSON document", e)));
        Ok(ndjson::decode_stream(chunks))
    }
}

/// Drop the query string (pre-signed URLs carry their credentials there)
fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}
