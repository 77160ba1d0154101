use crate::auth::CurrentUser;
use crate::error::{ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::{CreateUserRequest, Role, UpdateUserRequest, UserDto};
use services::user::UserService;
use tracing::{debug, info, instrument, trace};

/// Get all active users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserDto>>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<UserDto>> {
    trace!("Entering list_users function");
    user.require(Role::Admin)?;

    let users = UserService::new(&state.db, state.identity.as_ref()).list_active().await?;
    info!("Successfully retrieved {} users", users.len());
    Ok(ApiResponse::ok(users, "Users retrieved successfully"))
}

/// Get soft-deleted users
#[utoipa::path(
    get,
    path = "/api/v1/users/deleted",
    tag = "users",
    responses(
        (status = 200, description = "Deleted users retrieved successfully", body = ApiResponse<Vec<UserDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<UserDto>> {
    user.require(Role::Admin)?;

    let users = UserService::new(&state.db, state.identity.as_ref()).list_deleted().await?;
    debug!("Found {} deleted users", users.len());
    Ok(ApiResponse::ok(users, "Deleted users retrieved successfully"))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserDto>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<UserDto> {
    user.require(Role::Admin)?;

    let found_user = UserService::new(&state.db, state.identity.as_ref()).get(user_id).await?;
    let found_user = found(found_user, "User not found.")?;
    Ok(ApiResponse::ok(found_user, "User retrieved successfully"))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), crate::error::ApiError> {
    trace!("Entering create_user function");
    user.require(Role::Admin)?;

    let created = UserService::new(&state.db, state.identity.as_ref()).create(request).await?;
    info!("User created successfully with ID: {}", created.id);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "User created successfully")))
}

/// Update a user and replace its role
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<UserDto> {
    user.require(Role::Admin)?;

    let updated = UserService::new(&state.db, state.identity.as_ref())
        .update(user_id, request)
        .await?;
    info!("User {} updated successfully", user_id);
    Ok(ApiResponse::ok(updated, "User updated successfully"))
}

/// Move a user to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = UserService::new(&state.db, state.identity.as_ref()).soft_delete(user_id).await?;
    affected(done, "User not found.")?;
    info!("User {} moved to the recycle bin", user_id);
    Ok(ApiResponse::ok(user_id, "User deleted successfully"))
}

/// Restore a soft-deleted user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/restore",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "Email taken by another account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = UserService::new(&state.db, state.identity.as_ref()).restore(user_id).await?;
    affected(done, "User not found.")?;
    info!("User {} restored", user_id);
    Ok(ApiResponse::ok(user_id, "User restored successfully"))
}

/// Permanently delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}/permanent",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "User is still referenced", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = UserService::new(&state.db, state.identity.as_ref()).hard_delete(user_id).await?;
    affected(done, "User not found.")?;
    info!("User {} permanently deleted", user_id);
    Ok(ApiResponse::ok(user_id, "User permanently deleted"))
}
