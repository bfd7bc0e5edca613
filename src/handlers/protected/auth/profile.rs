use axum::Extension;

use crate::auth::Principal;
use crate::middleware::ApiResponse;

/// GET /api/auth/profile - the signed-in user
///
/// ```json
/// { "id": "emp-7", "name": "Ravi", "email": "ravi@example.com" }
/// ```
pub async fn profile(Extension(principal): Extension<Principal>) -> ApiResponse<Principal> {
    ApiResponse::success(principal)
}
