use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ProfileFormQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{FacultyDto, FacultyRequest, ProfileFormOptions, Role};
use services::faculty::FacultyService;
use tracing::{info, instrument, trace};

/// Get all active faculty profiles
#[utoipa::path(
    get,
    path = "/api/v1/faculties",
    tag = "faculties",
    responses(
        (status = 200, description = "Faculty retrieved successfully", body = ApiResponse<Vec<FacultyDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_faculties(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<FacultyDto>> {
    trace!("Entering list_faculties function");
    user.require(Role::Admin)?;

    let faculty = FacultyService::new(&state.db, state.identity.as_ref()).list_active().await?;
    info!("Successfully retrieved {} faculty profiles", faculty.len());
    Ok(ApiResponse::ok(faculty, "Faculty retrieved successfully"))
}

/// Get soft-deleted faculty profiles
#[utoipa::path(
    get,
    path = "/api/v1/faculties/deleted",
    tag = "faculties",
    responses(
        (status = 200, description = "Deleted faculty retrieved successfully", body = ApiResponse<Vec<FacultyDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_faculties(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<FacultyDto>> {
    user.require(Role::Admin)?;

    let faculty = FacultyService::new(&state.db, state.identity.as_ref()).list_deleted().await?;
    Ok(ApiResponse::ok(faculty, "Deleted faculty retrieved successfully"))
}

/// Faculty-role users that can still get a profile
#[utoipa::path(
    get,
    path = "/api/v1/faculties/form-options",
    tag = "faculties",
    params(ProfileFormQuery),
    responses(
        (status = 200, description = "Form options retrieved successfully", body = ApiResponse<ProfileFormOptions>)
    )
)]
#[instrument(skip(state))]
pub async fn faculty_form_options(
    Valid(Query(query)): Valid<Query<ProfileFormQuery>>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ProfileFormOptions> {
    user.require(Role::Admin)?;

    let options = FacultyService::new(&state.db, state.identity.as_ref())
        .form_options(query.keep_user_id)
        .await?;
    Ok(ApiResponse::ok(options, "Form options retrieved successfully"))
}

/// Get a specific faculty profile by ID
#[utoipa::path(
    get,
    path = "/api/v1/faculties/{faculty_id}",
    tag = "faculties",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Faculty retrieved successfully", body = ApiResponse<FacultyDto>),
        (status = 404, description = "Faculty profile not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<FacultyDto> {
    user.require(Role::Admin)?;

    let faculty = FacultyService::new(&state.db, state.identity.as_ref()).get(faculty_id).await?;
    let faculty = found(faculty, "Faculty profile not found.")?;
    Ok(ApiResponse::ok(faculty, "Faculty retrieved successfully"))
}

/// Create a faculty profile for a user in the Faculty role
#[utoipa::path(
    post,
    path = "/api/v1/faculties",
    tag = "faculties",
    request_body = FacultyRequest,
    responses(
        (status = 201, description = "Faculty created successfully", body = ApiResponse<FacultyDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_faculty(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<FacultyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FacultyDto>>), ApiError> {
    user.require(Role::Admin)?;

    let created = FacultyService::new(&state.db, state.identity.as_ref()).create(request).await?;
    info!("Faculty profile created successfully with ID: {}", created.id);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Faculty created successfully")))
}

/// Update a faculty profile
#[utoipa::path(
    put,
    path = "/api/v1/faculties/{faculty_id}",
    tag = "faculties",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    request_body = FacultyRequest,
    responses(
        (status = 200, description = "Faculty updated successfully", body = ApiResponse<FacultyDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Faculty profile not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<FacultyRequest>,
) -> ApiResult<FacultyDto> {
    user.require(Role::Admin)?;

    let updated = FacultyService::new(&state.db, state.identity.as_ref())
        .update(faculty_id, request)
        .await?;
    Ok(ApiResponse::ok(updated, "Faculty updated successfully"))
}

/// Move a faculty profile to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/faculties/{faculty_id}",
    tag = "faculties",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Faculty deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Faculty profile not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = FacultyService::new(&state.db, state.identity.as_ref())
        .soft_delete(faculty_id)
        .await?;
    affected(done, "Faculty profile not found.")?;
    Ok(ApiResponse::ok(faculty_id, "Faculty deleted successfully"))
}

/// Restore a soft-deleted faculty profile
#[utoipa::path(
    post,
    path = "/api/v1/faculties/{faculty_id}/restore",
    tag = "faculties",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Faculty restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "User already has another faculty profile", body = ErrorResponse),
        (status = 404, description = "Faculty profile not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = FacultyService::new(&state.db, state.identity.as_ref())
        .restore(faculty_id)
        .await?;
    affected(done, "Faculty profile not found.")?;
    Ok(ApiResponse::ok(faculty_id, "Faculty restored successfully"))
}

/// Permanently delete a faculty profile
#[utoipa::path(
    delete,
    path = "/api/v1/faculties/{faculty_id}/permanent",
    tag = "faculties",
    params(
        ("faculty_id" = i32, Path, description = "Faculty ID"),
    ),
    responses(
        (status = 200, description = "Faculty permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Faculty profile not found", body = ErrorResponse),
        (status = 500, description = "Faculty still teaches class sections", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_faculty(
    Path(faculty_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = FacultyService::new(&state.db, state.identity.as_ref())
        .hard_delete(faculty_id)
        .await?;
    affected(done, "Faculty profile not found.")?;
    info!("Faculty profile {} permanently deleted", faculty_id);
    Ok(ApiResponse::ok(faculty_id, "Faculty permanently deleted"))
}
