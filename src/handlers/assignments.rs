//! Assignment endpoints. Faculty manage the assignments of the sections they
//! teach; students see and submit the assignments of their sections. Forms
//! carrying files are `multipart/form-data`.

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use common::{
    AssignmentDetailDto, AssignmentDto, AssignmentFormOptions, AssignmentRequest, GradeRequest,
    ResourceDto, Role, StudentAssignmentDetailDto, StudentAssignmentDto, SubmissionDto,
};
use services::ServiceError;
use services::assignment::{AssignmentMaterials, FacultyAssignmentService, StudentAssignmentService};
use services::storage::UploadedFile;
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

const DUE_AT_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Multipart body of the assignment create and edit forms
#[derive(Debug, ToSchema)]
pub struct AssignmentUpload {
    pub class_section_id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Local date and time, e.g. `2025-03-14T23:59`
    #[schema(value_type = String, example = "2025-03-14T23:59")]
    pub due_at: NaiveDateTime,
    /// Defaults to 100
    pub max_score: Option<i32>,
    /// Exercise sheet; leave empty to keep the current one
    #[schema(value_type = Option<String>, format = Binary)]
    pub exercise_file: Option<Vec<u8>>,
    /// Guide; leave empty to keep the current one
    #[schema(value_type = Option<String>, format = Binary)]
    pub guide_file: Option<Vec<u8>>,
}

/// Multipart body carrying a single file
#[derive(Debug, ToSchema)]
pub struct FileUpload {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Text fields and files of a multipart form, by field name.
#[derive(Debug, Default)]
struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid upload: {}", e)))?;
                    debug!("Received file field '{}' ({} bytes)", name, bytes.len());
                    form.files.insert(name, UploadedFile::new(file_name, bytes.to_vec()));
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid form field: {}", e)))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    /// The single `file` field, or an empty upload the services reject.
    fn single_file(mut self) -> UploadedFile {
        self.file("file")
            .unwrap_or_else(|| UploadedFile::new(String::new(), Vec::new()))
    }

    fn assignment(mut self) -> Result<(AssignmentRequest, AssignmentMaterials), ApiError> {
        let mut errors = Vec::new();

        let class_section_id = match self.text("class_section_id").map(str::parse::<i32>) {
            Some(Ok(id)) => id,
            Some(Err(_)) | None => {
                errors.push("Class section is required.".to_string());
                0
            }
        };
        let due_at = match self.text("due_at") {
            Some(raw) => DUE_AT_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok()),
            None => None,
        };
        if due_at.is_none() {
            errors.push("Due date is required.".to_string());
        }
        let max_score = match self.text("max_score").map(str::parse::<i32>) {
            Some(Ok(score)) => Some(score),
            Some(Err(_)) => {
                errors.push("Max score must be a number.".to_string());
                None
            }
            None => None,
        };

        let (Some(due_at), true) = (due_at, errors.is_empty()) else {
            warn!("Rejected assignment form: {:?}", errors);
            return Err(ServiceError::Validation(errors).into());
        };

        let request = AssignmentRequest {
            class_section_id,
            title: self.text("title").unwrap_or_default().to_string(),
            description: self.text("description").map(str::to_string),
            due_at,
            max_score,
        };
        let materials = AssignmentMaterials {
            exercise: self.file("exercise_file"),
            guide: self.file("guide_file"),
        };
        Ok((request, materials))
    }
}

/// Assignments of the sections the signed-in faculty member teaches
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    tag = "assignments",
    responses(
        (status = 200, description = "Assignments retrieved successfully", body = ApiResponse<Vec<AssignmentDto>>),
        (status = 403, description = "Faculty role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_assignments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<AssignmentDto>> {
    trace!("Entering list_assignments function");
    user.require(Role::Faculty)?;

    let assignments = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .list(user.user_id)
        .await?;
    info!("Successfully retrieved {} assignments", assignments.len());
    Ok(ApiResponse::ok(assignments, "Assignments retrieved successfully"))
}

/// Soft-deleted assignments of the signed-in faculty member
#[utoipa::path(
    get,
    path = "/api/v1/assignments/deleted",
    tag = "assignments",
    responses(
        (status = 200, description = "Deleted assignments retrieved successfully", body = ApiResponse<Vec<AssignmentDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_assignments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<AssignmentDto>> {
    user.require(Role::Faculty)?;

    let assignments = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .list_deleted(user.user_id)
        .await?;
    Ok(ApiResponse::ok(assignments, "Deleted assignments retrieved successfully"))
}

/// Sections the signed-in faculty member can create assignments in
#[utoipa::path(
    get,
    path = "/api/v1/assignments/form-options",
    tag = "assignments",
    responses(
        (status = 200, description = "Form options retrieved successfully", body = ApiResponse<AssignmentFormOptions>)
    )
)]
#[instrument(skip(state))]
pub async fn assignment_form_options(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<AssignmentFormOptions> {
    user.require(Role::Faculty)?;

    let options = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .form_options(user.user_id)
        .await?;
    Ok(ApiResponse::ok(options, "Form options retrieved successfully"))
}

/// An assignment with its resources and submissions
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{assignment_id}",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    responses(
        (status = 200, description = "Assignment retrieved successfully", body = ApiResponse<AssignmentDetailDto>),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<AssignmentDetailDto> {
    user.require(Role::Faculty)?;

    let detail = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .detail(user.user_id, assignment_id)
        .await?;
    let detail = found(detail, "Assignment not found.")?;
    Ok(ApiResponse::ok(detail, "Assignment retrieved successfully"))
}

/// Create an assignment, optionally with exercise and guide files
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    tag = "assignments",
    request_body(content = AssignmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Assignment created successfully", body = ApiResponse<AssignmentDto>),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Class section not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn create_assignment(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AssignmentDto>>), ApiError> {
    user.require(Role::Faculty)?;

    let (request, materials) = FormData::read(multipart).await?.assignment()?;
    let created = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .create(user.user_id, request, materials)
        .await?;
    info!("Assignment created successfully with ID: {}", created.id);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Assignment created successfully")))
}

/// Update an assignment; uploaded files replace the stored ones
#[utoipa::path(
    put,
    path = "/api/v1/assignments/{assignment_id}",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    request_body(content = AssignmentUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Assignment updated successfully", body = ApiResponse<AssignmentDto>),
        (status = 400, description = "Invalid form", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn update_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<AssignmentDto> {
    user.require(Role::Faculty)?;

    let (request, materials) = FormData::read(multipart).await?.assignment()?;
    let updated = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .update(user.user_id, assignment_id, request, materials)
        .await?;
    Ok(ApiResponse::ok(updated, "Assignment updated successfully"))
}

/// Move an assignment to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{assignment_id}",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    responses(
        (status = 200, description = "Assignment deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Faculty)?;

    let done = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .soft_delete(user.user_id, assignment_id)
        .await?;
    affected(done, "Assignment not found.")?;
    Ok(ApiResponse::ok(assignment_id, "Assignment deleted successfully"))
}

/// Restore a soft-deleted assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{assignment_id}/restore",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    responses(
        (status = 200, description = "Assignment restored successfully", body = ApiResponse<i32>),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Faculty)?;

    let done = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .restore(user.user_id, assignment_id)
        .await?;
    affected(done, "Assignment not found.")?;
    Ok(ApiResponse::ok(assignment_id, "Assignment restored successfully"))
}

/// Permanently delete an assignment with its submissions, resources and files
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{assignment_id}/permanent",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    responses(
        (status = 200, description = "Assignment permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Faculty)?;

    let done = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .hard_delete(user.user_id, assignment_id)
        .await?;
    affected(done, "Assignment not found.")?;
    info!("Assignment {} permanently deleted", assignment_id);
    Ok(ApiResponse::ok(assignment_id, "Assignment permanently deleted"))
}

/// Score a submission and leave a comment
#[utoipa::path(
    post,
    path = "/api/v1/submissions/{submission_id}/grade",
    tag = "assignments",
    params(
        ("submission_id" = i32, Path, description = "Submission ID"),
    ),
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Submission graded", body = ApiResponse<SubmissionDto>),
        (status = 400, description = "Score out of range", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn grade_submission(
    Path(submission_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<GradeRequest>,
) -> ApiResult<SubmissionDto> {
    user.require(Role::Faculty)?;

    let graded = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .grade(user.user_id, submission_id, request)
        .await?;
    Ok(ApiResponse::ok(graded, "Submission graded successfully"))
}

/// Attach a supplementary document to an assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{assignment_id}/resources",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Resource uploaded", body = ApiResponse<ResourceDto>),
        (status = 400, description = "No file chosen", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn add_resource(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ResourceDto>>), ApiError> {
    user.require(Role::Faculty)?;

    let file = FormData::read(multipart).await?.single_file();
    let resource = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .add_resource(user.user_id, assignment_id, file)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(resource, "Resource uploaded successfully")))
}

/// Remove a supplementary document and its file
#[utoipa::path(
    delete,
    path = "/api/v1/resources/{resource_id}",
    tag = "assignments",
    params(
        ("resource_id" = i32, Path, description = "Resource ID"),
    ),
    responses(
        (status = 200, description = "Resource deleted", body = ApiResponse<i32>),
        (status = 404, description = "Resource not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_resource(
    Path(resource_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Faculty)?;

    let done = FacultyAssignmentService::new(&state.db, state.storage.as_ref())
        .delete_resource(user.user_id, resource_id)
        .await?;
    affected(done, "Resource not found.")?;
    Ok(ApiResponse::ok(resource_id, "Resource deleted successfully"))
}

/// Assignments of the signed-in student's classes
#[utoipa::path(
    get,
    path = "/api/v1/my-assignments",
    tag = "assignments",
    responses(
        (status = 200, description = "Assignments retrieved successfully", body = ApiResponse<Vec<StudentAssignmentDto>>),
        (status = 403, description = "Student role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn my_assignments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<StudentAssignmentDto>> {
    user.require(Role::Student)?;

    let assignments = StudentAssignmentService::new(&state.db, state.storage.as_ref())
        .list(user.user_id)
        .await?;
    Ok(ApiResponse::ok(assignments, "Assignments retrieved successfully"))
}

/// One assignment with the signed-in student's own submission
#[utoipa::path(
    get,
    path = "/api/v1/my-assignments/{assignment_id}",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    responses(
        (status = 200, description = "Assignment retrieved successfully", body = ApiResponse<StudentAssignmentDetailDto>),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn my_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<StudentAssignmentDetailDto> {
    user.require(Role::Student)?;

    let detail = StudentAssignmentService::new(&state.db, state.storage.as_ref())
        .detail(user.user_id, assignment_id)
        .await?;
    let detail = found(detail, "Assignment not found.")?;
    Ok(ApiResponse::ok(detail, "Assignment retrieved successfully"))
}

/// Hand in (or replace) the signed-in student's file
#[utoipa::path(
    post,
    path = "/api/v1/my-assignments/{assignment_id}/submission",
    tag = "assignments",
    params(
        ("assignment_id" = i32, Path, description = "Assignment ID"),
    ),
    request_body(content = FileUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Submission saved", body = ApiResponse<SubmissionDto>),
        (status = 400, description = "No file chosen", body = ErrorResponse),
        (status = 403, description = "Not enrolled in the class", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
pub async fn submit_assignment(
    Path(assignment_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> ApiResult<SubmissionDto> {
    user.require(Role::Student)?;

    let file = FormData::read(multipart).await?.single_file();
    let submission = StudentAssignmentService::new(&state.db, state.storage.as_ref())
        .submit(user.user_id, assignment_id, file)
        .await?;
    let message = if submission.is_late {
        "Submission saved after the due date"
    } else {
        "Submission saved successfully"
    };
    Ok(ApiResponse::ok(submission, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> FormData {
        FormData {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: HashMap::new(),
        }
    }

    #[test]
    fn test_assignment_form_parsing() {
        let mut parsed = form(&[
            ("class_section_id", "3"),
            ("title", "  Lab 1 "),
            ("description", ""),
            ("due_at", "2025-03-14T23:59"),
        ]);
        parsed
            .files
            .insert("guide_file".into(), UploadedFile::new("guide.pdf", b"%PDF".to_vec()));

        let (request, materials) = parsed.assignment().unwrap();
        assert_eq!(request.class_section_id, 3);
        assert_eq!(request.title, "Lab 1");
        assert_eq!(request.description, None);
        assert_eq!(request.max_score, None);
        assert_eq!(request.due_at.format("%H:%M").to_string(), "23:59");
        assert!(materials.exercise.is_none());
        assert_eq!(materials.guide.unwrap().file_name, "guide.pdf");
    }

    #[test]
    fn test_assignment_form_reports_every_problem() {
        let err = form(&[("max_score", "lots")]).assignment().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
