//! Write-once file store for captured GitHub Actions payloads.
//!
//! Entities are keyed by `(workflow_id, kind, id)` and laid out as
//! `<root>/workflows/<workflow_id>/<kind>/<id>.json`. Job lists are keyed by
//! the id of the run they belong to, not by job id.

mod error;
mod store;

pub use crate::error::StoreError;
pub use crate::store::EntityKind;
pub use crate::store::EntityStore;
