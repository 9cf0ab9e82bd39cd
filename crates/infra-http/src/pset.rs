// Property Set Service Client (ChangeSetService)

use crate::error::{check, read_json, transport};
use crate::session::{endpoint, Session};
use async_trait::async_trait;
use changeset_core::domain::{ChangeSetHandle, ChangeSetRequest};
use changeset_core::port::{ChangeSetService, ServiceError, ServiceErrorKind};
use tracing::debug;

/// Property set change sets (service-wide, any library/definition)
///
/// - `POST changesets`
/// - `GET changesets/{changeSetId}`
pub struct PSetClient {
    session: Session,
}

impl PSetClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ChangeSetService for PSetClient {
    async fn create_change_set(
        &self,
        request: &ChangeSetRequest,
    ) -> Result<ChangeSetHandle, ServiceError> {
        if !matches!(request, ChangeSetRequest::PropertySet) {
            return Err(ServiceError::new(
                ServiceErrorKind::Unknown {
                    status: 400,
                    code: None,
                },
                format!("pset service cannot create a {} change set", request.service_name()),
            ));
        }

        let url = endpoint(self.session.pset_url(), &["changesets"])?;
        debug!("POST pset change set");

        let response = self
            .session
            .http()
            .post(url)
            .bearer_auth(self.session.access_token())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| transport("create pset change set", e))?;

        let response = check(response, "create pset change set").await?;
        read_json(response, "create pset change set").await
    }

    async fn get_change_set_status(&self, id: &str) -> Result<ChangeSetHandle, ServiceError> {
        let url = endpoint(self.session.pset_url(), &["changesets", id])?;
        debug!(change_set_id = %id, "GET pset change set status");

        let response = self
            .session
            .http()
            .get(url)
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(|e| transport("get pset change set", e))?;

        let response = check(response, "get pset change set").await?;
        read_json(response, "get pset change set").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changeset_core::domain::ChangeSetStatus;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_url: &str) -> PSetClient {
        let session = Session::new("test_token", mock_url, &format!("{}/v1", mock_url)).unwrap();
        PSetClient::new(session)
    }

    #[tokio::test]
    async fn test_create_change_set_success() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/v1/changesets"))
            .and(header("Authorization", "Bearer test_token"))
            .and(body_json(serde_json::json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pcs-1",
                "status": "waitingupload",
                "uploadUrl": "https://upload.example.com/pcs-1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let handle = client
            .create_change_set(&ChangeSetRequest::PropertySet)
            .await
            .unwrap();

        assert_eq!(handle.id, "pcs-1");
        assert_eq!(handle.status, ChangeSetStatus::AwaitingUpload);
        assert_eq!(handle.upload_url.as_deref(), Some("https://upload.example.com/pcs-1"));
    }

    #[tokio::test]
    async fn test_create_rejects_organizer_request() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server.uri());

        let err = client
            .create_change_set(&ChangeSetRequest::organizer("f", "t"))
            .await
            .unwrap_err();

        assert!(matches!(err.kind, ServiceErrorKind::Unknown { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_status_processing() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/changesets/pcs-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pcs-1",
                "status": "Processing"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let handle = client.get_change_set_status("pcs-1").await.unwrap();

        assert_eq!(handle.status, ChangeSetStatus::Processing);
        assert!(handle.results_url.is_none());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mock_server = MockServer::start().await;
        let client = create_test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/v1/changesets/pcs-1"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "TOKEN_EXPIRED",
                "message": "token expired"
            })))
            .mount(&mock_server)
            .await;

        let err = client.get_change_set_status("pcs-1").await.unwrap_err();

        assert_eq!(err.kind, ServiceErrorKind::Unauthorized);
        assert!(err.message.contains("token expired"));
    }
}
