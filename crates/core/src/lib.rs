// Change Set Core - Domain Logic & Ports
// NO HTTP dependencies: adapters live in changeset-infra-http

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
