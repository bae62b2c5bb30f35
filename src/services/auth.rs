use serde::{Deserialize, Serialize};

use crate::database::DbPool;
use crate::models::user::{User, UserResponse};
use crate::utils::crypto::verify_password;
use crate::utils::error::{AppError, AppResult};
use crate::utils::jwt::JwtService;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

// Checks credentials and issues a token for the directory endpoints.
// Unknown usernames and wrong passwords are indistinguishable on the wire.
pub async fn login_user(
    pool: &DbPool,
    request: LoginRequest,
    jwt_service: &JwtService,
) -> AppResult<LoginResponse> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&request.username)
        .fetch_optional(pool.as_ref())
        .await?
        .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

    let is_valid = verify_password(&request.password, &user.password_hash)?;

    if !is_valid {
        tracing::debug!("Failed login attempt for {}", request.username);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    let token = jwt_service.generate_token(user.id, &user.username)?;

    tracing::info!("User {} logged in", user.username);

    Ok(LoginResponse {
        user: UserResponse::from(user),
        token,
    })
}
