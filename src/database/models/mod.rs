pub mod audit;
pub mod hierarchy;

pub use audit::{AuditLogEntry, NewAuditEntry, ACCOUNT_DELETION};
pub use hierarchy::{Company, EntityKind, Group, Location, UserProfile};
