//! Client credential parsing and the process-wide store

mod store;
mod types;

pub use store::{CredentialStore, PopulateOutcome};
pub use types::*;
