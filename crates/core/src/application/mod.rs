// Application Layer - Change set lifecycle use cases

pub mod backoff;
pub mod fetch;
pub mod ndjson;
pub mod poller;
pub mod workflow;

// Re-exports
pub use fetch::ResultFetcher;
pub use poller::{
    cancel_channel, CancelSender, CancelToken, ChangeSetPoller, PollConfig, PollExit, PollReport,
};
pub use workflow::{ChangeSetWorkflow, WorkflowSummary};
