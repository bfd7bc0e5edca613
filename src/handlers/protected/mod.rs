// handlers/protected/mod.rs - Session-gated handlers
//
// Every route here sits behind `session_auth_middleware`, so handlers can
// take `Extension<Principal>` for the signed-in user.

pub mod auth;
pub mod videos;
