pub mod me; // GET /api/auth/me

pub use me::me;
