// Organizer Service Client (ChangeSetService)

use crate::error::{check, read_json, transport};
use crate::session::{endpoint, Session};
use async_trait::async_trait;
use changeset_core::domain::{ChangeSetHandle, ChangeSetRequest};
use changeset_core::port::{ChangeSetService, ServiceError, ServiceErrorKind};
use tracing::debug;

/// Change sets applied to one organizer tree
///
/// - `POST forests/{forestId}/trees/{treeId}/changesets`
/// - `GET changesets/{changeSetId}`
pub struct OrganizerClient {
    session: Session,
}

impl OrganizerClient {
    pub fn new(session: Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ChangeSetService for OrganizerClient {
    async fn create_change_set(
        &self,
        request: &ChangeSetRequest,
    ) -> Result<ChangeSetHandle, ServiceError> {
        let ChangeSetRequest::Organizer { forest_id, tree_id } = request else {
            return Err(ServiceError::new(
                ServiceErrorKind::Unknown {
                    status: 400,
                    code: None,
                },
                format!("organizer cannot create a {} change set", request.service_name()),
            ));
        };

        let url = endpoint(
            self.session.organizer_url(),
            &["forests", forest_id.as_str(), "trees", tree_id.as_str(), "changesets"],
        )?;
        debug!(forest_id = %forest_id, tree_id = %tree_id, "POST organizer change set");

        let response = self
            .session
            .http()
            .post(url)
            .bearer_auth(self.session.access_token())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| transport("create organizer change set", e))?;

        let response = check(response, "create organizer change set").await?;
        read_json(response, "create organizer change set").await
    }

    async fn get_change_set_status(&self, id: &str) -> Result<ChangeSetHandle, ServiceError> {
        let url = endpoint(self.session.organizer_url(), &["changesets", id])?;
        debug!(change_set_id = %id, "GET organizer change set status");

        let response = self
            .session
            .http()
            .get(url)
            .bearer_auth(self.session.access_token())
            .send()
            .await
            .map_err(|e| transport("get organizer change set", e))?;

        let response = check(response, "get organizer change set").await?;
        read_json(response, "get organizer change set").await
    }
}
