use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::{CourseDto, CourseOption, CourseRequest, Role};
use services::course::CourseService;
use tracing::{debug, info, instrument, trace};

/// Get all active courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "courses",
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_courses(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<CourseDto>> {
    trace!("Entering list_courses function");
    user.require(Role::Admin)?;

    let courses = CourseService::new(&state.db).list_active().await?;
    info!("Successfully retrieved {} courses", courses.len());
    Ok(ApiResponse::ok(courses, "Courses retrieved successfully"))
}

/// Get soft-deleted courses
#[utoipa::path(
    get,
    path = "/api/v1/courses/deleted",
    tag = "courses",
    responses(
        (status = 200, description = "Deleted courses retrieved successfully", body = ApiResponse<Vec<CourseDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_courses(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<CourseDto>> {
    user.require(Role::Admin)?;

    let courses = CourseService::new(&state.db).list_deleted().await?;
    debug!("Found {} deleted courses", courses.len());
    Ok(ApiResponse::ok(courses, "Deleted courses retrieved successfully"))
}

/// Active courses for select lists
#[utoipa::path(
    get,
    path = "/api/v1/courses/options",
    tag = "courses",
    responses(
        (status = 200, description = "Course options retrieved successfully", body = ApiResponse<Vec<CourseOption>>)
    )
)]
#[instrument(skip(state))]
pub async fn course_options(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<CourseOption>> {
    user.require(Role::Admin)?;

    let options = CourseService::new(&state.db).options().await?;
    Ok(ApiResponse::ok(options, "Course options retrieved successfully"))
}

/// Get a specific course by ID
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course retrieved successfully", body = ApiResponse<CourseDto>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<CourseDto> {
    user.require(Role::Admin)?;

    let course = found(CourseService::new(&state.db).get(course_id).await?, "Course not found.")?;
    Ok(ApiResponse::ok(course, "Course retrieved successfully"))
}

/// Create a new course
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created successfully", body = ApiResponse<CourseDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseDto>>), ApiError> {
    user.require(Role::Admin)?;

    let created = CourseService::new(&state.db).create(request).await?;
    info!("Course created successfully with ID: {}, code: {}", created.id, created.code);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Course created successfully")))
}

/// Update a course
#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated successfully", body = ApiResponse<CourseDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CourseRequest>,
) -> ApiResult<CourseDto> {
    user.require(Role::Admin)?;

    let updated = CourseService::new(&state.db).update(course_id, request).await?;
    info!("Course {} updated successfully", course_id);
    Ok(ApiResponse::ok(updated, "Course updated successfully"))
}

/// Move a course to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(CourseService::new(&state.db).soft_delete(course_id).await?, "Course not found.")?;
    info!("Course {} moved to the recycle bin", course_id);
    Ok(ApiResponse::ok(course_id, "Course deleted successfully"))
}

/// Restore a soft-deleted course
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/restore",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "Course code taken by an active course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(CourseService::new(&state.db).restore(course_id).await?, "Course not found.")?;
    info!("Course {} restored", course_id);
    Ok(ApiResponse::ok(course_id, "Course restored successfully"))
}

/// Permanently delete a course
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}/permanent",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Course still has class sections", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(CourseService::new(&state.db).hard_delete(course_id).await?, "Course not found.")?;
    info!("Course {} permanently deleted", course_id);
    Ok(ApiResponse::ok(course_id, "Course permanently deleted"))
}
