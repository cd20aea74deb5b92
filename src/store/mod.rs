//! Dedup state: which entries have already been announced.

use async_trait::async_trait;

use crate::models::{EntryIdentity, SeenRecord};
use crate::utils::error::Result;

mod json;
pub use json::JsonSeenStore;

/// The single source of truth for "has this entry been announced".
///
/// Implementations serialize the check-then-record sequence internally, so
/// one store may be shared across tasks.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn is_seen(&self, identity: &EntryIdentity) -> Result<bool>;

    /// Insert and persist before returning. Records are never overwritten.
    async fn record(&self, identity: EntryIdentity, record: SeenRecord) -> Result<()>;
}
