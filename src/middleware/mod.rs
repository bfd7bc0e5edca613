pub mod auth;
pub mod response;

pub use auth::{authenticate, session_auth_middleware};
pub use response::{error_trace_middleware, ApiResponse, ApiResult};
