use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::models::{AuditLogEntry, Company, EntityKind, Group, Location, NewAuditEntry, UserProfile};

/// Storage-layer failure. Callers classify it by the step that produced it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("{0}")]
    Backend(String),
}

/// Pool-level access to the account hierarchy. Reads here run outside any
/// transaction; mutations only happen through [`HierarchyTx`].
#[async_trait]
pub trait HierarchyStore: Send + Sync {
    type Tx: HierarchyTx;

    /// Connectivity check for /health
    async fn ping(&self) -> Result<(), StoreError>;

    /// Live user whose email matches case-insensitively
    async fn find_live_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Live groups created by `user_id`, newest first
    async fn live_groups_by_owner(&self, user_id: &str) -> Result<Vec<Group>, StoreError>;

    async fn count_live_companies(&self, group_id: &str) -> Result<i64, StoreError>;

    /// Live locations whose live parent company belongs to `group_id`
    async fn count_live_locations(&self, group_id: &str) -> Result<i64, StoreError>;

    /// Audit entries, newest first
    async fn list_audit_logs(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, StoreError>;

    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One open transaction. Dropping it without `commit` discards every write.
#[async_trait]
pub trait HierarchyTx: Send + Sized {
    async fn live_companies_by_group(&mut self, group_id: &str) -> Result<Vec<Company>, StoreError>;

    async fn live_locations_by_company(&mut self, company_id: &str) -> Result<Vec<Location>, StoreError>;

    /// Flags one row deleted and returns the number of rows matched
    async fn soft_delete(
        &mut self,
        kind: EntityKind,
        id: &str,
        deleted_by: &str,
        deleted_on: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    async fn insert_audit(&mut self, entry: &NewAuditEntry) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
