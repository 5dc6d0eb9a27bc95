// handlers/mod.rs - Handler tiers
//
// system: public, no authentication (/, /health)
// admin:  session + superadmin allowlist required (/api/admin/*)
pub mod admin;
pub mod system;
