//! Authentication API handlers

use axum::{extract::State, Json};
use tracing::{info, warn};

use super::dto::{LoginRequest, LoginResponse, UserInfo};
use crate::application::ParkingEngine;
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::verify_password;
use crate::interfaces::http::common::{ApiError, ApiResult, ErrorBody, ValidatedJson};
use crate::shared::DomainError;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub engine: ParkingEngine,
    pub jwt_config: JwtConfig,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = LoginResponse),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .engine
        .repos
        .users()
        .find_by_username(&request.username)
        .await?;

    let Some(user) = user else {
        warn!(username = %request.username, "Login rejected: unknown user");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !user.active {
        warn!(username = %user.username, "Login rejected: account disabled");
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    // A malformed stored hash counts as a failed match.
    if !verify_password(&request.password, &user.password_hash).unwrap_or(false) {
        warn!(username = %user.username, "Login rejected: bad password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = create_token(&user, &state.jwt_config)
        .map_err(|e| ApiError(DomainError::Internal(format!("token signing failed: {}", e))))?;

    info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(user),
    }))
}
