// handlers/public/auth/mod.rs - OIDC login round trip
//
// login -> identity provider -> callback -> frontend, with the session held
// in a signed cookie afterwards. Logout only clears that cookie.

pub mod login;
pub mod logout;

pub use login::{callback, login};
pub use logout::logout;
