// Change Set Infrastructure - HTTP Adapters
// Implements: ChangeSetService (organizer, property set), ContentTransfer

mod error;
pub mod organizer;
pub mod pset;
pub mod session;
pub mod transfer;

pub use organizer::OrganizerClient;
pub use pset::PSetClient;
pub use session::{Session, DEFAULT_ORGANIZER_URL, DEFAULT_PSET_URL};
pub use transfer::NdjsonTransferClient;
