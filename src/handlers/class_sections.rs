use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, SectionListQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::{
    ClassSectionDto, ClassSectionOptions, ClassSectionRequest, Role, StudentClassDto,
    TeachingClassDto,
};
use services::class_section::ClassSectionService;
use tracing::{debug, info, instrument, trace};

/// Get active class sections, optionally of one course
#[utoipa::path(
    get,
    path = "/api/v1/class-sections",
    tag = "class-sections",
    params(SectionListQuery),
    responses(
        (status = 200, description = "Class sections retrieved successfully", body = ApiResponse<Vec<ClassSectionDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_class_sections(
    Valid(Query(query)): Valid<Query<SectionListQuery>>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<ClassSectionDto>> {
    trace!("Entering list_class_sections function");
    user.require(Role::Admin)?;
    debug!("Course filter: {:?}", query.course_id);

    let sections = ClassSectionService::new(&state.db).list_active(query.course_id).await?;
    info!("Successfully retrieved {} class sections", sections.len());
    Ok(ApiResponse::ok(sections, "Class sections retrieved successfully"))
}

/// Get soft-deleted class sections
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/deleted",
    tag = "class-sections",
    responses(
        (status = 200, description = "Deleted class sections retrieved successfully", body = ApiResponse<Vec<ClassSectionDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_class_sections(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<ClassSectionDto>> {
    user.require(Role::Admin)?;

    let sections = ClassSectionService::new(&state.db).list_deleted().await?;
    Ok(ApiResponse::ok(sections, "Deleted class sections retrieved successfully"))
}

/// Courses and teachers selectable on the class section form
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/form-options",
    tag = "class-sections",
    responses(
        (status = 200, description = "Form options retrieved successfully", body = ApiResponse<ClassSectionOptions>)
    )
)]
#[instrument(skip(state))]
pub async fn class_section_form_options(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ClassSectionOptions> {
    user.require(Role::Admin)?;

    let options = ClassSectionService::new(&state.db).options().await?;
    Ok(ApiResponse::ok(options, "Form options retrieved successfully"))
}

/// Get a specific class section by ID
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/{section_id}",
    tag = "class-sections",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    responses(
        (status = 200, description = "Class section retrieved successfully", body = ApiResponse<ClassSectionDto>),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_class_section(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ClassSectionDto> {
    user.require(Role::Admin)?;

    let section = ClassSectionService::new(&state.db).get(section_id).await?;
    let section = found(section, "Class section not found.")?;
    Ok(ApiResponse::ok(section, "Class section retrieved successfully"))
}

/// Create a new class section
#[utoipa::path(
    post,
    path = "/api/v1/class-sections",
    tag = "class-sections",
    request_body = ClassSectionRequest,
    responses(
        (status = 201, description = "Class section created successfully", body = ApiResponse<ClassSectionDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_class_section(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ClassSectionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClassSectionDto>>), ApiError> {
    user.require(Role::Admin)?;

    let created = ClassSectionService::new(&state.db).create(request).await?;
    info!("Class section created successfully with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(created, "Class section created successfully"),
    ))
}

/// Update a class section
#[utoipa::path(
    put,
    path = "/api/v1/class-sections/{section_id}",
    tag = "class-sections",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    request_body = ClassSectionRequest,
    responses(
        (status = 200, description = "Class section updated successfully", body = ApiResponse<ClassSectionDto>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_class_section(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ClassSectionRequest>,
) -> ApiResult<ClassSectionDto> {
    user.require(Role::Admin)?;

    let updated = ClassSectionService::new(&state.db).update(section_id, request).await?;
    info!("Class section {} updated successfully", section_id);
    Ok(ApiResponse::ok(updated, "Class section updated successfully"))
}

/// Move a class section to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/class-sections/{section_id}",
    tag = "class-sections",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    responses(
        (status = 200, description = "Class section deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_class_section(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = ClassSectionService::new(&state.db).soft_delete(section_id).await?;
    affected(done, "Class section not found.")?;
    Ok(ApiResponse::ok(section_id, "Class section deleted successfully"))
}

/// Restore a soft-deleted class section
#[utoipa::path(
    post,
    path = "/api/v1/class-sections/{section_id}/restore",
    tag = "class-sections",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    responses(
        (status = 200, description = "Class section restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "Class code taken by an active section", body = ErrorResponse),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_class_section(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = ClassSectionService::new(&state.db).restore(section_id).await?;
    affected(done, "Class section not found.")?;
    Ok(ApiResponse::ok(section_id, "Class section restored successfully"))
}

/// Permanently delete a class section with its schedules
#[utoipa::path(
    delete,
    path = "/api/v1/class-sections/{section_id}/permanent",
    tag = "class-sections",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    responses(
        (status = 200, description = "Class section permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Class section not found", body = ErrorResponse),
        (status = 500, description = "Section still has enrollments or assignments", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_class_section(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = ClassSectionService::new(&state.db).hard_delete(section_id).await?;
    affected(done, "Class section not found.")?;
    info!("Class section {} permanently deleted", section_id);
    Ok(ApiResponse::ok(section_id, "Class section permanently deleted"))
}

/// Sections taught by the signed-in faculty member
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/teaching",
    tag = "class-sections",
    responses(
        (status = 200, description = "Teaching classes retrieved successfully", body = ApiResponse<Vec<TeachingClassDto>>),
        (status = 403, description = "Faculty role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn teaching_classes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<TeachingClassDto>> {
    user.require(Role::Faculty)?;

    let classes = ClassSectionService::new(&state.db).teaching_classes(user.user_id).await?;
    Ok(ApiResponse::ok(classes, "Teaching classes retrieved successfully"))
}

/// Sections the signed-in student is enrolled in
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/enrolled",
    tag = "class-sections",
    responses(
        (status = 200, description = "Enrolled classes retrieved successfully", body = ApiResponse<Vec<StudentClassDto>>),
        (status = 403, description = "Student role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn enrolled_classes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<StudentClassDto>> {
    user.require(Role::Student)?;

    let classes = ClassSectionService::new(&state.db).student_classes(user.user_id).await?;
    Ok(ApiResponse::ok(classes, "Enrolled classes retrieved successfully"))
}
