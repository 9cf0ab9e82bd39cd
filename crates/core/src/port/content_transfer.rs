// Content Transfer Port
// NDJSON upload to pre-signed URLs and NDJSON download of results/errors

use super::service_error::ServiceError;
use crate::domain::ChangeRecord;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy sequence of decoded NDJSON values
pub type NdjsonStream = BoxStream<'static, Result<serde_json::Value, ServiceError>>;

/// Content transfer trait
#[async_trait]
pub trait ContentTransfer: Send + Sync {
    /// Serialize `records` as NDJSON and PUT them to `url`
    ///
    /// # Errors
    /// - ServiceError if the upload is rejected or the connection fails
    async fn upload_ndjson(&self, url: &str, records: &[ChangeRecord]) -> Result<(), ServiceError>;

    /// Open `url` and decode it incrementally as NDJSON
    ///
    /// Every call streams from the start of the document.
    async fn stream_ndjson(&self, url: &str) -> Result<NdjsonStream, ServiceError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::application::ndjson;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory transfer: records uploads, serves canned NDJSON documents
    #[derive(Default)]
    pub struct InMemoryTransfer {
        upload_error: Mutex<Option<ServiceError>>,
        upload_delay: Option<Duration>,
        uploads: Mutex<Vec<(String, Vec<u8>)>>,
        documents: Mutex<HashMap<String, Vec<Result<serde_json::Value, ServiceError>>>>,
        stream_count: Mutex<usize>,
    }

    impl InMemoryTransfer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_upload(error: ServiceError) -> Self {
            let transfer = Self::default();
            *transfer.upload_error.lock().unwrap() = Some(error);
            transfer
        }

        /// Hold every upload for `delay` before accepting it
        pub fn with_upload_delay(mut self, delay: Duration) -> Self {
            self.upload_delay = Some(delay);
            self
        }

        /// Serve `lines` when `url` is streamed
        pub fn with_document(
            self,
            url: impl Into<String>,
            lines: Vec<Result<serde_json::Value, ServiceError>>,
        ) -> Self {
            self.documents.lock().unwrap().insert(url.into(), lines);
            self
        }

        /// (url, NDJSON body) of every successful upload
        pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
            self.uploads.lock().unwrap().clone()
        }

        pub fn stream_count(&self) -> usize {
            *self.stream_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl ContentTransfer for InMemoryTransfer {
        async fn upload_ndjson(
            &self,
            url: &str,
            records: &[ChangeRecord],
        ) -> Result<(), ServiceError> {
            if let Some(delay) = self.upload_delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = self.upload_error.lock().unwrap().clone() {
                return Err(err);
            }
            let body = ndjson::encode(records).map_err(|e| ServiceError::decode(e.to_string()))?;
            self.uploads.lock().unwrap().push((url.to_string(), body));
            Ok(())
        }

        async fn stream_ndjson(&self, url: &str) -> Result<NdjsonStream, ServiceError> {
            *self.stream_count.lock().unwrap() += 1;
            let lines = self
                .documents
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| ServiceError::not_found(format!("document {}", url)))?;
            Ok(Box::pin(futures::stream::iter(lines)))
        }
    }
}
