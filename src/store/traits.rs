//! `Store` trait: the async interface rules and actions use to resolve
//! references and persist message state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Group, Label, MessageId, Org};

/// Backend-agnostic store for labels, groups and message state.
///
/// Every lookup is scoped to an org; a reference that exists in another org
/// is reported as not found.
#[async_trait]
pub trait Store: Send + Sync {
    // ── Lookups ─────────────────────────────────────────────────────

    /// Get a label by UUID.
    async fn get_label(&self, org: &Org, uuid: Uuid) -> Result<Label, StoreError>;

    /// Get all labels of the org, ordered by id.
    async fn get_labels(&self, org: &Org) -> Result<Vec<Label>, StoreError>;

    /// Resolve group UUIDs, ordered by id.
    ///
    /// Fails with `NotFound` naming the first UUID that does not resolve.
    async fn get_groups(&self, org: &Org, uuids: &[Uuid]) -> Result<Vec<Group>, StoreError>;

    // ── Bulk updates ────────────────────────────────────────────────
    //
    // Each id must name a message of the org. If one does not, nothing is
    // updated and the call fails with `NotFound`.

    /// Associate `label` with every message in `ids`.
    async fn add_label(
        &self,
        org: &Org,
        ids: &[MessageId],
        label: &Label,
    ) -> Result<(), StoreError>;

    /// Mark every message in `ids` as flagged.
    async fn set_flagged(&self, org: &Org, ids: &[MessageId]) -> Result<(), StoreError>;

    /// Mark every message in `ids` as archived.
    async fn set_archived(&self, org: &Org, ids: &[MessageId]) -> Result<(), StoreError>;
}
