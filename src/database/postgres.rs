use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{AuditLogEntry, Company, EntityKind, Group, Location, NewAuditEntry, UserProfile};
use super::store::{HierarchyStore, HierarchyTx, StoreError};

/// Live-row predicate shared by every hierarchy read. Lookup counts and the
/// deletion enumeration must agree on it.
macro_rules! live {
    ($alias:literal) => {
        concat!("(", $alias, "is_deleted = false OR ", $alias, "is_deleted IS NULL)")
    };
}

const FIND_USER_SQL: &str = concat!(
    "SELECT id::text AS id, email, COALESCE(first_name, '') AS first_name, COALESCE(last_name, '') AS last_name \
     FROM saastack_user_v1.user_profile \
     WHERE LOWER(email) = LOWER($1) AND ",
    live!(""),
    " LIMIT 1"
);

const GROUPS_BY_OWNER_SQL: &str = concat!(
    "SELECT id::text AS id, name, parent::text AS parent \
     FROM saastack_group_v1.groups \
     WHERE created_by::text = $1 AND ",
    live!(""),
    " ORDER BY created_on DESC"
);

const COMPANIES_BY_GROUP_SQL: &str = concat!(
    "SELECT id::text AS id, name, parent::text AS parent \
     FROM saastack_company_v1.company \
     WHERE parent::text = $1 AND ",
    live!("")
);

const LOCATIONS_BY_COMPANY_SQL: &str = concat!(
    "SELECT id::text AS id, name, parent::text AS parent \
     FROM saastack_location_v1.location \
     WHERE parent::text = $1 AND ",
    live!("")
);

const COUNT_COMPANIES_SQL: &str = concat!(
    "SELECT COUNT(*) FROM saastack_company_v1.company WHERE parent::text = $1 AND ",
    live!("")
);

const COUNT_LOCATIONS_SQL: &str = concat!(
    "SELECT COUNT(l.*) FROM saastack_location_v1.location l \
     INNER JOIN saastack_company_v1.company c ON l.parent = c.id \
     WHERE c.parent::text = $1 AND ",
    live!("l."),
    " AND ",
    live!("c.")
);

const INSERT_AUDIT_SQL: &str = r#"
    INSERT INTO admin_deletion_audit_log
        (action, deleted_by_email, target_email, target_user_id, group_ids, reason,
         deleted_groups, deleted_companies, deleted_locations, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const LIST_AUDIT_SQL: &str = r#"
    SELECT id::text AS id, action, deleted_by_email, target_email, target_user_id,
           group_ids, reason, deleted_groups, deleted_companies, deleted_locations, created_at
    FROM admin_deletion_audit_log
    ORDER BY created_at DESC
    LIMIT $1 OFFSET $2
"#;

/// Postgres-backed hierarchy store
#[derive(Clone)]
pub struct PgHierarchyStore {
    pool: PgPool,
}

impl PgHierarchyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Soft-delete statement for one table. Table names come from a closed enum,
/// never from input.
fn soft_delete_sql(kind: EntityKind) -> String {
    format!(
        "UPDATE {} SET is_deleted = true, deleted_by = $1, deleted_on = $2 WHERE id::text = $3",
        kind.table()
    )
}

#[async_trait]
impl HierarchyStore for PgHierarchyStore {
    type Tx = PgHierarchyTx;

    async fn ping(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await.map_err(|e| match e {
            DatabaseError::Sqlx(err) => StoreError::Sqlx(err),
            other => StoreError::Backend(other.to_string()),
        })
    }

    async fn find_live_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        let user = sqlx::query_as::<_, UserProfile>(FIND_USER_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn live_groups_by_owner(&self, user_id: &str) -> Result<Vec<Group>, StoreError> {
        let groups = sqlx::query_as::<_, Group>(GROUPS_BY_OWNER_SQL)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    async fn count_live_companies(&self, group_id: &str) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as(COUNT_COMPANIES_SQL)
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn count_live_locations(&self, group_id: &str) -> Result<i64, StoreError> {
        let count: (i64,) = sqlx::query_as(COUNT_LOCATIONS_SQL)
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn list_audit_logs(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, StoreError> {
        let entries = sqlx::query_as::<_, AuditLogEntry>(LIST_AUDIT_SQL)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    async fn begin(&self) -> Result<PgHierarchyTx, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgHierarchyTx { tx })
    }
}

/// Open Postgres transaction. sqlx rolls back on drop if not committed.
pub struct PgHierarchyTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl HierarchyTx for PgHierarchyTx {
    async fn live_companies_by_group(&mut self, group_id: &str) -> Result<Vec<Company>, StoreError> {
        let companies = sqlx::query_as::<_, Company>(COMPANIES_BY_GROUP_SQL)
            .bind(group_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(companies)
    }

    async fn live_locations_by_company(&mut self, company_id: &str) -> Result<Vec<Location>, StoreError> {
        let locations = sqlx::query_as::<_, Location>(LOCATIONS_BY_COMPANY_SQL)
            .bind(company_id)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(locations)
    }

    async fn soft_delete(
        &mut self,
        kind: EntityKind,
        id: &str,
        deleted_by: &str,
        deleted_on: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let sql = soft_delete_sql(kind);
        let result = sqlx::query(&sql)
            .bind(deleted_by)
            .bind(deleted_on)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_audit(&mut self, entry: &NewAuditEntry) -> Result<(), StoreError> {
        sqlx::query(INSERT_AUDIT_SQL)
            .bind(entry.action)
            .bind(&entry.deleted_by_email)
            .bind(&entry.target_email)
            .bind(&entry.target_user_id)
            .bind(&entry.group_ids)
            .bind(&entry.reason)
            .bind(entry.deleted_groups)
            .bind(entry.deleted_companies)
            .bind(entry.deleted_locations)
            .bind(entry.created_at)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
