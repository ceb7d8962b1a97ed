//! In-memory hierarchy store for unit tests, with failure injection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::database::models::{
    AuditLogEntry, Company, EntityKind, Group, Location, NewAuditEntry, UserProfile,
};
use crate::database::store::{HierarchyStore, HierarchyTx, StoreError};

/// One row in any of the four hierarchy tables. For groups `parent` holds
/// the owning user id (`created_by`); for users it is empty.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub parent: String,
    pub email: String,
    pub created_on: DateTime<Utc>,
    pub is_deleted: Option<bool>,
    pub deleted_by: Option<String>,
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Node {
    fn is_live(&self) -> bool {
        self.is_deleted != Some(true)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub rows: HashMap<EntityKind, Vec<Node>>,
    pub audit: Vec<AuditLogEntry>,
}

impl Tables {
    fn table(&self, kind: EntityKind) -> &[Node] {
        self.rows.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn live_children(&self, kind: EntityKind, parent: &str) -> Vec<Node> {
        self.table(kind)
            .iter()
            .filter(|n| n.parent == parent && n.is_live())
            .cloned()
            .collect()
    }

    pub fn node(&self, kind: EntityKind, id: &str) -> Option<&Node> {
        self.table(kind).iter().find(|n| n.id == id)
    }
}

/// Failure points a test can arm
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub begin: bool,
    pub reads: bool,
    pub soft_delete: Option<(EntityKind, String)>,
    pub audit: bool,
    pub commit: bool,
}

#[derive(Debug, Default)]
struct Shared {
    tables: Tables,
    faults: Faults,
    commits: usize,
    rollbacks: usize,
    next_created: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, kind: EntityKind, id: &str, name: &str, parent: &str, email: &str) {
        let mut shared = self.shared.lock().unwrap();
        shared.next_created += 1;
        let created_on = Utc.timestamp_opt(1_700_000_000 + shared.next_created, 0).unwrap();
        shared.tables.rows.entry(kind).or_default().push(Node {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent.to_string(),
            email: email.to_string(),
            created_on,
            is_deleted: None,
            deleted_by: None,
            deleted_on: None,
        });
    }

    pub fn add_user(&self, id: &str, email: &str, first: &str, last: &str) {
        self.insert(EntityKind::User, id, &format!("{} {}", first, last), "", email);
    }

    /// Groups added later count as newer
    pub fn add_group(&self, id: &str, name: &str, owner: &str) {
        self.insert(EntityKind::Group, id, name, owner, "");
    }

    pub fn add_company(&self, id: &str, name: &str, group: &str) {
        self.insert(EntityKind::Company, id, name, group, "");
    }

    pub fn add_location(&self, id: &str, name: &str, company: &str) {
        self.insert(EntityKind::Location, id, name, company, "");
    }

    pub fn mark_deleted(&self, kind: EntityKind, id: &str) {
        let mut shared = self.shared.lock().unwrap();
        if let Some(node) = shared
            .tables
            .rows
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|n| n.id == id))
        {
            node.is_deleted = Some(true);
        }
    }

    pub fn push_audit(&self, entry: AuditLogEntry) {
        self.shared.lock().unwrap().tables.audit.push(entry);
    }

    pub fn set_faults(&self, faults: Faults) {
        self.shared.lock().unwrap().faults = faults;
    }

    pub fn snapshot(&self) -> Tables {
        self.shared.lock().unwrap().tables.clone()
    }

    pub fn commits(&self) -> usize {
        self.shared.lock().unwrap().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.shared.lock().unwrap().rollbacks
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        if self.shared.lock().unwrap().faults.reads {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl HierarchyStore for MemoryStore {
    type Tx = MemoryTx;

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_reads()
    }

    async fn find_live_user_by_email(&self, email: &str) -> Result<Option<UserProfile>, StoreError> {
        self.check_reads()?;
        let shared = self.shared.lock().unwrap();
        Ok(shared
            .tables
            .table(EntityKind::User)
            .iter()
            .find(|n| n.is_live() && n.email.to_lowercase() == email.to_lowercase())
            .map(|n| {
                let (first, last) = n.name.split_once(' ').unwrap_or((n.name.as_str(), ""));
                UserProfile {
                    id: n.id.clone(),
                    email: n.email.clone(),
                    first_name: first.to_string(),
                    last_name: last.to_string(),
                }
            }))
    }

    async fn live_groups_by_owner(&self, user_id: &str) -> Result<Vec<Group>, StoreError> {
        self.check_reads()?;
        let shared = self.shared.lock().unwrap();
        let mut groups = shared.tables.live_children(EntityKind::Group, user_id);
        groups.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        Ok(groups
            .into_iter()
            .map(|n| Group { id: n.id, name: n.name, parent: None })
            .collect())
    }

    async fn count_live_companies(&self, group_id: &str) -> Result<i64, StoreError> {
        self.check_reads()?;
        let shared = self.shared.lock().unwrap();
        Ok(shared.tables.live_children(EntityKind::Company, group_id).len() as i64)
    }

    async fn count_live_locations(&self, group_id: &str) -> Result<i64, StoreError> {
        self.check_reads()?;
        let shared = self.shared.lock().unwrap();
        let tables = &shared.tables;
        Ok(tables
            .live_children(EntityKind::Company, group_id)
            .iter()
            .map(|c| tables.live_children(EntityKind::Location, &c.id).len() as i64)
            .sum())
    }

    async fn list_audit_logs(&self, limit: i64, offset: i64) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.check_reads()?;
        let shared = self.shared.lock().unwrap();
        let mut entries = shared.tables.audit.clone();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn begin(&self) -> Result<MemoryTx, StoreError> {
        let shared = self.shared.lock().unwrap();
        if shared.faults.begin {
            return Err(StoreError::Backend("injected begin failure".to_string()));
        }
        Ok(MemoryTx {
            working: shared.tables.clone(),
            faults: shared.faults.clone(),
            store: self.clone(),
        })
    }
}

/// Works on a private copy of the tables; commit swaps it in
pub struct MemoryTx {
    working: Tables,
    faults: Faults,
    store: MemoryStore,
}

#[async_trait]
impl HierarchyTx for MemoryTx {
    async fn live_companies_by_group(&mut self, group_id: &str) -> Result<Vec<Company>, StoreError> {
        if self.faults.reads {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(self
            .working
            .live_children(EntityKind::Company, group_id)
            .into_iter()
            .map(|n| Company { id: n.id, name: n.name, parent: n.parent })
            .collect())
    }

    async fn live_locations_by_company(&mut self, company_id: &str) -> Result<Vec<Location>, StoreError> {
        if self.faults.reads {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(self
            .working
            .live_children(EntityKind::Location, company_id)
            .into_iter()
            .map(|n| Location { id: n.id, name: n.name, parent: n.parent })
            .collect())
    }

    async fn soft_delete(
        &mut self,
        kind: EntityKind,
        id: &str,
        deleted_by: &str,
        deleted_on: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if let Some((fail_kind, fail_id)) = &self.faults.soft_delete {
            if *fail_kind == kind && fail_id == id {
                return Err(StoreError::Backend(format!("injected update failure on {} {}", kind, id)));
            }
        }

        let mut matched = 0;
        for node in self.working.rows.entry(kind).or_default().iter_mut().filter(|n| n.id == id) {
            node.is_deleted = Some(true);
            node.deleted_by = Some(deleted_by.to_string());
            node.deleted_on = Some(deleted_on);
            matched += 1;
        }
        Ok(matched)
    }

    async fn insert_audit(&mut self, entry: &NewAuditEntry) -> Result<(), StoreError> {
        if self.faults.audit {
            return Err(StoreError::Backend("injected audit failure".to_string()));
        }
        let id = format!("audit-{}", self.working.audit.len() + 1);
        self.working.audit.push(AuditLogEntry {
            id,
            action: entry.action.to_string(),
            deleted_by_email: entry.deleted_by_email.clone(),
            target_email: entry.target_email.clone(),
            target_user_id: entry.target_user_id.clone(),
            group_ids: entry.group_ids.clone(),
            reason: entry.reason.clone(),
            deleted_groups: entry.deleted_groups,
            deleted_companies: entry.deleted_companies,
            deleted_locations: entry.deleted_locations,
            created_at: entry.created_at,
        });
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        if self.faults.commit {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        let mut shared = self.store.shared.lock().unwrap();
        shared.tables = self.working;
        shared.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.store.shared.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

/// Audit entry fixture with a fixed creation time
pub fn audit_entry(id: &str, target_email: &str, created_at: DateTime<Utc>) -> AuditLogEntry {
    AuditLogEntry {
        id: id.to_string(),
        action: crate::database::models::ACCOUNT_DELETION.to_string(),
        deleted_by_email: "admin@appointy.com".to_string(),
        target_email: target_email.to_string(),
        target_user_id: format!("user-{}", id),
        group_ids: vec![format!("group-{}", id)],
        reason: None,
        deleted_groups: 1,
        deleted_companies: 0,
        deleted_locations: 0,
        created_at,
    }
}
