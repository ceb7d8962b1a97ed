// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (JWT auth)

pub mod protected; // /api/auth/me, /api/account/*
pub mod public;    // /api/auth/login, /api/auth/callback, /api/auth/logout
