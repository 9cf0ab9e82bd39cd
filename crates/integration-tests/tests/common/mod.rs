//! Shared fixtures: one wiremock server standing in for every remote endpoint

#![allow(dead_code)]

use std::sync::Arc;

use changeset_core::application::{ChangeSetWorkflow, PollConfig};
use changeset_core::port::{ChangeSetService, MonotonicTimeProvider, UniformJitter};
use changeset_infra_http::{NdjsonTransferClient, OrganizerClient, PSetClient, Session};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const TOKEN: &str = "it-token";

pub struct TestEnv {
    pub server: MockServer,
    pub session: Session,
    pub change_set_id: String,
}

impl TestEnv {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let uri = server.uri();
        let session = Session::new(TOKEN, &format!("{}/org/v1", uri), &format!("{}/pset/v1", uri))
            .expect("session");

        Self {
            server,
            session,
            change_set_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn upload_path(&self) -> String {
        format!("/upload/{}", self.change_set_id)
    }

    pub fn results_path(&self) -> String {
        format!("/results/{}", self.change_set_id)
    }

    pub fn errors_path(&self) -> String {
        format!("/errors/{}", self.change_set_id)
    }

    /// Creation response: awaiting upload with a signed upload URL
    pub fn created_body(&self) -> Value {
        json!({
            "id": self.change_set_id,
            "status": "WaitingUpload",
            "uploadURL": format!("{}{}?signature=s3cr3t", self.server.uri(), self.upload_path()),
        })
    }

    pub fn status_body(&self, status: &str) -> Value {
        json!({ "id": self.change_set_id, "status": status })
    }

    /// Done with both result documents attached
    pub fn done_body(&self) -> Value {
        json!({
            "id": self.change_set_id,
            "status": "Done",
            "resultsURL": format!("{}{}", self.server.uri(), self.results_path()),
            "errorsURL": format!("{}{}", self.server.uri(), self.errors_path()),
        })
    }

    pub fn organizer(&self) -> Arc<dyn ChangeSetService> {
        Arc::new(OrganizerClient::new(self.session.clone()))
    }

    pub fn pset(&self) -> Arc<dyn ChangeSetService> {
        Arc::new(PSetClient::new(self.session.clone()))
    }

    pub fn workflow(
        &self,
        service: Arc<dyn ChangeSetService>,
        config: PollConfig,
    ) -> ChangeSetWorkflow {
        ChangeSetWorkflow::new(
            service,
            Arc::new(NdjsonTransferClient::from_session(&self.session)),
            Arc::new(MonotonicTimeProvider::new()),
            Arc::new(UniformJitter),
            config,
        )
        .expect("valid poll config")
    }
}

/// Millisecond-scale schedule so tests run against real time
pub fn fast_config() -> PollConfig {
    PollConfig {
        initial_interval_ms: 10,
        max_interval_ms: 40,
        growth_factor: 2.0,
        max_jitter_ms: 5,
        timeout_ms: 2_000,
        max_status_errors: 0,
    }
}

pub fn ndjson(lines: &[Value]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}
