// Result Fetcher - typed streams over change set results/errors documents

use crate::domain::{ErrorRecord, ResultRecord};
use crate::error::{AppError, Result};
use crate::port::{ContentTransfer, ServiceError};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::info;

/// Streams the results and errors of a finished change set
///
/// Each call opens the document again and streams it from the start; every
/// record is yielded once, in the order the service wrote it.
pub struct ResultFetcher {
    transfer: Arc<dyn ContentTransfer>,
}

impl ResultFetcher {
    pub fn new(transfer: Arc<dyn ContentTransfer>) -> Self {
        Self { transfer }
    }

    /// Stream the created/updated entities
    pub async fn stream_results(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<ResultRecord>>> {
        let stream = self.transfer.stream_ndjson(url).await.map_err(AppError::Fetch)?;
        Ok(stream
            .map(|item| item.map(ResultRecord::new).map_err(AppError::Fetch))
            .boxed())
    }

    /// Stream the records the service could not apply
    pub async fn stream_errors(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<ErrorRecord>>> {
        let stream = self.transfer.stream_ndjson(url).await.map_err(AppError::Fetch)?;
        Ok(stream
            .map(|item| {
                let value = item.map_err(AppError::Fetch)?;
                serde_json::from_value::<ErrorRecord>(value).map_err(|e| {
                    AppError::Fetch(ServiceError::decode(format!("invalid error record: {}", e)))
                })
            })
            .boxed())
    }

    /// Collect every result, failing on the first bad line
    pub async fn collect_results(&self, url: &str) -> Result<Vec<ResultRecord>> {
        let results: Vec<ResultRecord> = self.stream_results(url).await?.try_collect().await?;
        info!(count = results.len(), "Fetched change set results");
        Ok(results)
    }

    /// Collect every error record, failing on the first bad line
    pub async fn collect_errors(&self, url: &str) -> Result<Vec<ErrorRecord>> {
        let errors: Vec<ErrorRecord> = self.stream_errors(url).await?.try_collect().await?;
        info!(count = errors.len(), "Fetched change set errors");
        Ok(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::content_transfer::mocks::InMemoryTransfer;
    use crate::port::ServiceErrorKind;
    use serde_json::json;

    const RESULTS: &str = "https://results.example.com/cs-1";
    const ERRORS: &str = "https://errors.example.com/cs-1";

    fn fetcher(transfer: InMemoryTransfer) -> (ResultFetcher, Arc<InMemoryTransfer>) {
        let transfer = Arc::new(transfer);
        (ResultFetcher::new(transfer.clone()), transfer)
    }

    #[tokio::test]
    async fn test_results_in_server_order() {
        let (fetcher, _) = fetcher(InMemoryTransfer::new().with_document(
            RESULTS,
            vec![
                Ok(json!({"id": "ChangeSetNode_0", "name": "Change set node 0"})),
                Ok(json!({"id": "ChangeSetNode_1", "name": "Change set node 1"})),
            ],
        ));

        let results = fetcher.collect_results(RESULTS).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].identity(), Some("ChangeSetNode_0"));
        assert_eq!(results[1].identity(), Some("ChangeSetNode_1"));
    }

    #[tokio::test]
    async fn test_results_are_restartable() {
        let (fetcher, transfer) = fetcher(
            InMemoryTransfer::new()
                .with_document(RESULTS, vec![Ok(json!({"link": "frn:DemoLink-0"}))]),
        );

        let first = fetcher.collect_results(RESULTS).await.unwrap();
        let second = fetcher.collect_results(RESULTS).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transfer.stream_count(), 2);
    }

    #[tokio::test]
    async fn test_errors_decoded_with_item_identity() {
        let (fetcher, _) = fetcher(InMemoryTransfer::new().with_document(
            ERRORS,
            vec![Ok(json!({
                "code": "INVALID_LINK",
                "message": "link is malformed",
                "item": {"id": "ChangeSetNode_3", "name": "Change set node 3"}
            }))],
        ));

        let errors = fetcher.collect_errors(ERRORS).await.unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, "INVALID_LINK");
        assert_eq!(errors[0].message, "link is malformed");
        assert_eq!(errors[0].item.as_ref().unwrap()["id"], "ChangeSetNode_3");
    }

    #[tokio::test]
    async fn test_error_record_accepts_errorcode_spelling() {
        let (fetcher, _) = fetcher(InMemoryTransfer::new().with_document(
            ERRORS,
            vec![Ok(json!({"errorcode": "NOT_FOUND", "message": "definition missing"}))],
        ));

        let errors = fetcher.collect_errors(ERRORS).await.unwrap();
        assert_eq!(errors[0].code, "NOT_FOUND");
        assert!(errors[0].item.is_none());
    }

    #[tokio::test]
    async fn test_bad_line_fails_collection() {
        let (fetcher, _) = fetcher(InMemoryTransfer::new().with_document(
            RESULTS,
            vec![Ok(json!({"id": "a"})), Err(ServiceError::decode("invalid NDJSON at line 2"))],
        ));

        let err = fetcher.collect_results(RESULTS).await.unwrap_err();
        match err {
            AppError::Fetch(e) => assert_eq!(e.kind, ServiceErrorKind::Decode),
            other => panic!("Expected Fetch, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_document_is_fetch_error() {
        let (fetcher, _) = fetcher(InMemoryTransfer::new());

        let err = fetcher.stream_errors(ERRORS).await.err().unwrap();
        assert!(matches!(err, AppError::Fetch(_)));
    }
}
