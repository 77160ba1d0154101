use crate::auth::CurrentUser;
use crate::error::{ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    response::Json,
};
use common::{AddStudentsRequest, EnrollmentDto, EnrollmentManageView, EnrollmentResult, Role};
use services::enrollment::EnrollmentService;
use tracing::{debug, info, instrument};

/// Roster of a class section and the students that can still join
#[utoipa::path(
    get,
    path = "/api/v1/class-sections/{section_id}/enrollments",
    tag = "enrollments",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    responses(
        (status = 200, description = "Enrollments retrieved successfully", body = ApiResponse<EnrollmentManageView>),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn manage_enrollments(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<EnrollmentManageView> {
    user.require(Role::Admin)?;

    let view = EnrollmentService::new(&state.db).manage_view(section_id).await?;
    let view = found(view, "Class section not found.")?;
    debug!(
        "Section {} has {} enrolled, {} available",
        section_id,
        view.enrolled.len(),
        view.available.len()
    );
    Ok(ApiResponse::ok(view, "Enrollments retrieved successfully"))
}

/// Enroll several students at once
#[utoipa::path(
    post,
    path = "/api/v1/class-sections/{section_id}/enrollments",
    tag = "enrollments",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
    ),
    request_body = AddStudentsRequest,
    responses(
        (status = 200, description = "Students enrolled", body = ApiResponse<EnrollmentResult>),
        (status = 400, description = "Empty or unknown selection", body = ErrorResponse),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_students(
    Path(section_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<AddStudentsRequest>,
) -> ApiResult<EnrollmentResult> {
    user.require(Role::Admin)?;

    let result = EnrollmentService::new(&state.db)
        .add_students(section_id, &request.student_ids)
        .await?;
    let message = format!(
        "Added {} new, restored {} enrollment(s).",
        result.created, result.restored
    );
    info!("{}", message);
    Ok(ApiResponse::ok(result, message))
}

/// Remove a student from a class section
#[utoipa::path(
    delete,
    path = "/api/v1/class-sections/{section_id}/enrollments/{student_id}",
    tag = "enrollments",
    params(
        ("section_id" = i32, Path, description = "Class section ID"),
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Student removed from the class", body = ApiResponse<i32>),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn remove_student(
    Path((section_id, student_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = EnrollmentService::new(&state.db)
        .remove_student(section_id, student_id)
        .await?;
    affected(done, "Enrollment not found.")?;
    info!("Removed student {} from section {}", student_id, section_id);
    Ok(ApiResponse::ok(student_id, "Student removed from the class"))
}

/// Get removed enrollments
#[utoipa::path(
    get,
    path = "/api/v1/enrollments/deleted",
    tag = "enrollments",
    responses(
        (status = 200, description = "Deleted enrollments retrieved successfully", body = ApiResponse<Vec<EnrollmentDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<EnrollmentDto>> {
    user.require(Role::Admin)?;

    let enrollments = EnrollmentService::new(&state.db).list_deleted().await?;
    Ok(ApiResponse::ok(enrollments, "Deleted enrollments retrieved successfully"))
}

/// Restore a removed enrollment
#[utoipa::path(
    post,
    path = "/api/v1/enrollments/{enrollment_id}/restore",
    tag = "enrollments",
    params(
        ("enrollment_id" = i32, Path, description = "Enrollment ID"),
    ),
    responses(
        (status = 200, description = "Enrollment restored successfully", body = ApiResponse<i32>),
        (status = 400, description = "Student is already enrolled again", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_enrollment(
    Path(enrollment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = EnrollmentService::new(&state.db).restore(enrollment_id).await?;
    affected(done, "Enrollment not found.")?;
    Ok(ApiResponse::ok(enrollment_id, "Enrollment restored successfully"))
}

/// Permanently delete an enrollment
#[utoipa::path(
    delete,
    path = "/api/v1/enrollments/{enrollment_id}/permanent",
    tag = "enrollments",
    params(
        ("enrollment_id" = i32, Path, description = "Enrollment ID"),
    ),
    responses(
        (status = 200, description = "Enrollment permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_enrollment(
    Path(enrollment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    let done = EnrollmentService::new(&state.db).hard_delete(enrollment_id).await?;
    affected(done, "Enrollment not found.")?;
    Ok(ApiResponse::ok(enrollment_id, "Enrollment permanently deleted"))
}
