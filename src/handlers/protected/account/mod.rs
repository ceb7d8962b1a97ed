// handlers/protected/account/mod.rs - Account lookup, deletion and audit trail

pub mod audit_logs; // GET /api/account/audit-logs
pub mod delete;     // POST /api/account/delete
pub mod lookup;     // POST /api/account/lookup

pub use audit_logs::audit_logs;
pub use delete::delete;
pub use lookup::lookup;
