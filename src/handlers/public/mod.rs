// handlers/public/mod.rs - Public handlers (no session required)
//
// Liveness endpoints plus the login round trip that establishes a session.

pub mod auth;
pub mod system;
