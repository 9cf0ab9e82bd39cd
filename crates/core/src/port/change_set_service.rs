// Change Set Service Port
// Submission and status checks against the organizer or property set service

use super::service_error::ServiceError;
use crate::domain::{ChangeSetHandle, ChangeSetRequest};
use async_trait::async_trait;

/// Change set service trait
///
/// Implementations:
/// - OrganizerClient: change sets applied to one organizer tree
/// - PSetClient: property set change sets
#[async_trait]
pub trait ChangeSetService: Send + Sync {
    /// Declare the intention to upload changes
    ///
    /// # Errors
    /// - ServiceError when the service rejects the request (e.g. unknown tree)
    async fn create_change_set(
        &self,
        request: &ChangeSetRequest,
    ) -> Result<ChangeSetHandle, ServiceError>;

    /// Fetch a fresh status snapshot
    ///
    /// # Errors
    /// - ServiceError with kind NotFound if the id is unknown
    /// - ServiceError with kind Transport if the service is unreachable
    async fn get_change_set_status(&self, id: &str) -> Result<ChangeSetHandle, ServiceError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ChangeSetStatus;
    use crate::port::TimeProvider;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted service: replays status responses in order, then repeats the last one
    pub struct ScriptedChangeSetService {
        created: Mutex<Option<Result<ChangeSetHandle, ServiceError>>>,
        script: Mutex<VecDeque<Result<ChangeSetHandle, ServiceError>>>,
        last: Mutex<Option<Result<ChangeSetHandle, ServiceError>>>,
        check_times: Mutex<Vec<i64>>,
        create_count: Mutex<usize>,
        clock: Option<Arc<dyn TimeProvider>>,
    }

    impl ScriptedChangeSetService {
        pub fn new(script: Vec<Result<ChangeSetHandle, ServiceError>>) -> Self {
            Self {
                created: Mutex::new(None),
                script: Mutex::new(script.into()),
                last: Mutex::new(None),
                check_times: Mutex::new(Vec::new()),
                create_count: Mutex::new(0),
                clock: None,
            }
        }

        /// Status responses with the given statuses for change set `id`
        pub fn with_statuses(id: &str, statuses: Vec<ChangeSetStatus>) -> Self {
            Self::new(
                statuses
                    .into_iter()
                    .map(|s| Ok(ChangeSetHandle::new(id, s)))
                    .collect(),
            )
        }

        /// Record the clock reading at every status check
        pub fn with_clock(mut self, clock: Arc<dyn TimeProvider>) -> Self {
            self.clock = Some(clock);
            self
        }

        /// Response returned by `create_change_set`
        pub fn with_created(self, created: Result<ChangeSetHandle, ServiceError>) -> Self {
            *self.created.lock().unwrap() = Some(created);
            self
        }

        pub fn call_count(&self) -> usize {
            self.check_times.lock().unwrap().len()
        }

        pub fn create_count(&self) -> usize {
            *self.create_count.lock().unwrap()
        }

        /// Clock readings (ms) at each status check, empty without a clock
        pub fn check_times(&self) -> Vec<i64> {
            self.check_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChangeSetService for ScriptedChangeSetService {
        async fn create_change_set(
            &self,
            _request: &ChangeSetRequest,
        ) -> Result<ChangeSetHandle, ServiceError> {
            *self.create_count.lock().unwrap() += 1;
            self.created
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ServiceError::not_found("no scripted creation response")))
        }

        async fn get_change_set_status(&self, id: &str) -> Result<ChangeSetHandle, ServiceError> {
            let now = self.clock.as_ref().map(|c| c.now_millis()).unwrap_or(0);
            self.check_times.lock().unwrap().push(now);

            let next = self.script.lock().unwrap().pop_front();
            let response = match next {
                Some(r) => {
                    *self.last.lock().unwrap() = Some(r.clone());
                    r
                }
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(|| Err(ServiceError::not_found(format!("change set {}", id)))),
            };
            response
        }
    }
}
