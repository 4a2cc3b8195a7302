//! Session storage
//!
//! The store is constructed once per process and handed to the components
//! that need it; there is no process-wide singleton.

mod manager;
mod messages;

pub use manager::SessionStore;
pub use messages::{SessionUpdate, StoreCommand, StoreError, StoreResponse};
