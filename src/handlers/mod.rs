// handlers/mod.rs - Two-tier handler layout
//
// Public (no session) -> Protected (session cookie required)
pub mod public; // /, /health, /api/auth/{login,callback,logout}
pub mod protected; // /api/auth/profile, /api/videos/*
