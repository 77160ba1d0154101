use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ProfileFormQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{ProfileFormOptions, Role, StudentDto, StudentOption, StudentRequest};
use services::student::StudentService;
use tracing::{info, instrument, trace};

/// Get all active students
#[utoipa::path(
    get,
    path = "/api/v1/students",
    tag = "students",
    responses(
        (status = 200, description = "Students retrieved successfully", body = ApiResponse<Vec<StudentDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_students(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<StudentDto>> {
    trace!("Entering list_students function");
    user.require(Role::Admin)?;

    let students = StudentService::new(&state.db, state.identity.as_ref()).list_active().await?;
    info!("Successfully retrieved {} students", students.len());
    Ok(ApiResponse::ok(students, "Students retrieved successfully"))
}

/// Get soft-deleted students
#[utoipa::path(
    get,
    path = "/api/v1/students/deleted",
    tag = "students",
    responses(
        (status = 200, description = "Deleted students retrieved successfully", body = ApiResponse<Vec<StudentDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_students(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<StudentDto>> {
    user.require(Role::Admin)?;

    let students = StudentService::new(&state.db, state.identity.as_ref()).list_deleted().await?;
    Ok(ApiResponse::ok(students, "Deleted students retrieved successfully"))
}

/// Active students for select lists
#[utoipa::path(
    get,
    path = "/api/v1/students/options",
    tag = "students",
    responses(
        (status = 200, description = "Student options retrieved successfully", body = ApiResponse<Vec<StudentOption>>)
    )
)]
#[instrument(skip(state))]
pub async fn student_options(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<StudentOption>> {
    user.require(Role::Admin)?;

    let options = StudentService::new(&state.db, state.identity.as_ref()).options().await?;
    Ok(ApiResponse::ok(options, "Student options retrieved successfully"))
}

/// Student-role users that can still get a profile
#[utoipa::path(
    get,
    path = "/api/v1/students/form-options",
    tag = "students",
    params(ProfileFormQuery),
    responses(
        (status = 200, description = "Form options retrieved successfully", body = ApiResponse<ProfileFormOptions>)
    )
)]
#[instrument(skip(state))]
pub async fn student_form_options(
    Valid(Query(query)): Valid<Query<ProfileFormQuery>>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ProfileFormOptions> {
    user.require(Role::Admin)?;

    let options = StudentService::new(&state.db, state.identity.as_ref())
        .form_options(query.keep_user_id)
        .await?;
    Ok(ApiResponse::ok(options, "Form options retrieved successfully"))
}

/// Get a specific student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student retrieved successfully", body = ApiResponse<StudentDto>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<StudentDto> {
    user.require(Role::Admin)?;

    let student = StudentService::new(&state.db, state.identity.as_ref()).get(student_id).await?;
    let student = found(student, "Student not found.")?;
    Ok(ApiResponse::ok(student, "Student retrieved successfully"))
}

/// Create a student profile for a user in the Student role
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "students",
    request_body = StudentRequest,
    responses(
        (status = 201, description = "Student created successfully", body = ApiResponse<StudentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_student(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<StudentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StudentDto>>), ApiError> {
    user.require(Role::Admin)?;

    let created = StudentService::new(&state.db, state.identity.as_ref()).create(request).await?;
    info!("Student created successfully with code {}", created.code);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Student created successfully")))
}

/// Relink a student profile to another user
#[utoipa::path(
    put,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    request_body = StudentRequest,
    responses(
        (status = 200, description = "Student updated successfully", body = ApiResponse<StudentDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<StudentRequest>,
) -> ApiResult<StudentDto> {
    user.require(Role::Admin)?;

    let updated = StudentService::new(&state.db, state.identity.as_ref())
        .update(student_id, request)
        .await?;
    Ok(ApiResponse::ok(updated, "Student updated successfully"))
}

/// Move a student to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Student not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = StudentService::new(&state.db, state.identity.as_ref())
        .soft_delete(student_id)
        .await?;
    affected(done, "Student not found.")?;
    Ok(ApiResponse::ok(student_id, "Student deleted successfully"))
}

/// Restore a soft-deleted student
#[utoipa::path(
    post,
    path = "/api/v1/students/{student_id}/restore",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "User already has another student profile", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = StudentService::new(&state.db, state.identity.as_ref())
        .restore(student_id)
        .await?;
    affected(done, "Student not found.")?;
    Ok(ApiResponse::ok(student_id, "Student restored successfully"))
}

/// Permanently delete a student
#[utoipa::path(
    delete,
    path = "/api/v1/students/{student_id}/permanent",
    tag = "students",
    params(
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Student not found", body = ErrorResponse),
        (status = 500, description = "Student still has enrollments or submissions", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_student(
    Path(student_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = StudentService::new(&state.db, state.identity.as_ref())
        .hard_delete(student_id)
        .await?;
    affected(done, "Student not found.")?;
    info!("Student {} permanently deleted", student_id);
    Ok(ApiResponse::ok(student_id, "Student permanently deleted"))
}
