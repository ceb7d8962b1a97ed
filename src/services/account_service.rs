use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::database::models::{AuditLogEntry, EntityKind, NewAuditEntry, ACCOUNT_DELETION};
use crate::database::store::{HierarchyStore, HierarchyTx, StoreError};
use crate::types::{AccountLookupResponse, DeleteAccountRequest, DeleteAccountResponse, GroupInfo};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("user not found with email: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to start transaction: {0}")]
    TransactionStartFailed(#[source] StoreError),

    #[error("query failed: {context}: {source}")]
    QueryFailed {
        context: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to delete {kind} {id}: {source}")]
    UpdateFailed {
        kind: EntityKind,
        id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to create audit log: {0}")]
    AuditWriteFailed(#[source] StoreError),

    #[error("failed to commit transaction: {0}")]
    CommitFailed(#[source] StoreError),
}

impl AccountError {
    fn query(context: impl Into<String>) -> impl FnOnce(StoreError) -> Self {
        let context = context.into();
        move |source| AccountError::QueryFailed { context, source }
    }
}

/// Rows flagged during one cascade
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CascadeCounts {
    groups: i32,
    companies: i32,
    locations: i32,
}

/// Lookup, preview counts, cascading soft delete and audit reads over a
/// hierarchy store
pub struct AccountService<S> {
    store: S,
}

impl<S: HierarchyStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Find a live user by email and preview the groups it owns
    pub async fn lookup_account(&self, email: &str) -> Result<AccountLookupResponse, AccountError> {
        let user = self
            .store
            .find_live_user_by_email(email)
            .await
            .map_err(AccountError::query("find user"))?
            .ok_or_else(|| AccountError::NotFound(email.to_string()))?;

        let groups = self
            .store
            .live_groups_by_owner(&user.id)
            .await
            .map_err(AccountError::query("find groups"))?;

        let mut infos = Vec::with_capacity(groups.len());
        for group in groups {
            let (company_count, location_count) = self.hierarchy_counts(&group.id).await?;
            infos.push(GroupInfo {
                id: group.id,
                name: group.name,
                company_count,
                location_count,
            });
        }

        debug!("Lookup for {} found user {} with {} groups", email, user.id, infos.len());

        Ok(AccountLookupResponse {
            user_id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            groups: infos,
        })
    }

    /// Live companies under a group, and live locations under those companies
    pub async fn hierarchy_counts(&self, group_id: &str) -> Result<(i64, i64), AccountError> {
        let companies = self
            .store
            .count_live_companies(group_id)
            .await
            .map_err(AccountError::query(format!("count companies for group {}", group_id)))?;

        let locations = self
            .store
            .count_live_locations(group_id)
            .await
            .map_err(AccountError::query(format!("count locations for group {}", group_id)))?;

        Ok((companies, locations))
    }

    /// Soft-delete the requested groups (locations, then companies, then the
    /// group), then the user, then append one audit entry. All of it commits
    /// together or not at all.
    pub async fn delete_account(&self, req: &DeleteAccountRequest) -> Result<DeleteAccountResponse, AccountError> {
        if req.group_ids.is_empty() {
            return Err(AccountError::InvalidRequest("group_ids must not be empty".to_string()));
        }

        let mut tx = self.store.begin().await.map_err(AccountError::TransactionStartFailed)?;
        let now = Utc::now();

        match Self::cascade(&mut tx, req, now).await {
            Ok(counts) => {
                tx.commit().await.map_err(AccountError::CommitFailed)?;

                info!(
                    "Account {} ({}) deleted by {}: groups={} companies={} locations={}",
                    req.email, req.user_id, req.deleted_by, counts.groups, counts.companies, counts.locations
                );

                Ok(DeleteAccountResponse {
                    success: true,
                    message: "Account and selected hierarchy deleted successfully".to_string(),
                    deleted_groups: counts.groups,
                    deleted_companies: counts.companies,
                    deleted_locations: counts.locations,
                    deleted_at: now,
                })
            }
            Err(err) => {
                warn!("Rolling back deletion of account {}: {}", req.user_id, err);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed for account {}: {}", req.user_id, rollback_err);
                }
                Err(err)
            }
        }
    }

    async fn cascade(
        tx: &mut S::Tx,
        req: &DeleteAccountRequest,
        now: DateTime<Utc>,
    ) -> Result<CascadeCounts, AccountError> {
        let mut counts = CascadeCounts::default();
        let actor = req.deleted_by.as_str();

        for group_id in &req.group_ids {
            let companies = tx
                .live_companies_by_group(group_id)
                .await
                .map_err(AccountError::query(format!("get companies for group {}", group_id)))?;

            for company in companies {
                let locations = tx
                    .live_locations_by_company(&company.id)
                    .await
                    .map_err(AccountError::query(format!("get locations for company {}", company.id)))?;

                for location in locations {
                    counts.locations += soft_delete(tx, EntityKind::Location, &location.id, actor, now).await?;
                }

                counts.companies += soft_delete(tx, EntityKind::Company, &company.id, actor, now).await?;
            }

            counts.groups += soft_delete(tx, EntityKind::Group, group_id, actor, now).await?;
        }

        if soft_delete(tx, EntityKind::User, &req.user_id, actor, now).await? == 0 {
            warn!("No user row matched id {} during deletion", req.user_id);
        }

        let entry = NewAuditEntry {
            action: ACCOUNT_DELETION,
            deleted_by_email: req.deleted_by.clone(),
            target_email: req.email.clone(),
            target_user_id: req.user_id.clone(),
            group_ids: req.group_ids.clone(),
            reason: req.reason.clone().filter(|r| !r.trim().is_empty()),
            deleted_groups: counts.groups,
            deleted_companies: counts.companies,
            deleted_locations: counts.locations,
            created_at: now,
        };
        tx.insert_audit(&entry).await.map_err(AccountError::AuditWriteFailed)?;

        Ok(counts)
    }

    /// Audit entries, newest first. Limit and offset are trusted as given.
    pub async fn list_audit_logs(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, AccountError> {
        self.store
            .list_audit_logs(limit, offset)
            .await
            .map_err(AccountError::query("list audit logs"))
    }
}

async fn soft_delete<T: HierarchyTx>(
    tx: &mut T,
    kind: EntityKind,
    id: &str,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<i32, AccountError> {
    let matched = tx
        .soft_delete(kind, id, actor, now)
        .await
        .map_err(|source| AccountError::UpdateFailed {
            kind,
            id: id.to_string(),
            source,
        })?;
    Ok(i32::try_from(matched).unwrap_or(i32::MAX))
}
