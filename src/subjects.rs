//! The `Subjects` contract shared by the remote client and the in-memory
//! catalog.

use tokio_util::sync::CancellationToken;

use crate::error::CatalogError;
use crate::feed::Handler;
use crate::query::Query;
use crate::subject::{Hints, Subject};

/// A catalog of subjects.
///
/// Implementations hold no per-call state, so one instance can serve many
/// concurrent calls.
#[tonic::async_trait]
pub trait Subjects: Send + Sync {
    /// Deliver every subject matching `query` to `handler`, in catalog order.
    ///
    /// Records already handled stay handled even if the call later fails.
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &Query,
        handler: &mut Handler<'_, Subject>,
    ) -> Result<(), CatalogError>;

    /// Add a subject if no subject with `id` exists.
    ///
    /// Returns the stored subject and `true` if this call created it. When the
    /// subject already exists it is returned unchanged with `false`, and
    /// `hints` are discarded.
    async fn add(
        &self,
        cancel: &CancellationToken,
        id: &str,
        hints: Option<Hints>,
    ) -> Result<(Subject, bool), CatalogError>;
}

/// Reject ids the catalog cannot store.
pub fn validate_id(id: &str) -> Result<(), CatalogError> {
    if id.is_empty() {
        return Err(CatalogError::InvalidId("id must not be empty".into()));
    }
    if id.trim().is_empty() {
        return Err(CatalogError::InvalidId("id must not be blank".into()));
    }
    if id.chars().any(char::is_control) {
        return Err(CatalogError::InvalidId(format!(
            "id {:?} contains control characters",
            id
        )));
    }
    Ok(())
}
