use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult, affected, found};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::{PeriodSlot, Role, ScheduleDto, ScheduleFormOptions, ScheduleRequest, periods};
use services::Caller;
use services::schedule::ScheduleService;
use tracing::{debug, info, instrument, trace};

/// Get all active schedule slots
#[utoipa::path(
    get,
    path = "/api/v1/schedules",
    tag = "schedules",
    responses(
        (status = 200, description = "Schedules retrieved successfully", body = ApiResponse<Vec<ScheduleDto>>),
        (status = 403, description = "Admin role required", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_schedules(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<ScheduleDto>> {
    trace!("Entering list_schedules function");
    user.require(Role::Admin)?;

    let slots = ScheduleService::new(&state.db).list_active().await?;
    info!("Successfully retrieved {} schedule slots", slots.len());
    Ok(ApiResponse::ok(slots, "Schedules retrieved successfully"))
}

/// Get soft-deleted schedule slots
#[utoipa::path(
    get,
    path = "/api/v1/schedules/deleted",
    tag = "schedules",
    responses(
        (status = 200, description = "Deleted schedules retrieved successfully", body = ApiResponse<Vec<ScheduleDto>>)
    )
)]
#[instrument(skip(state))]
pub async fn list_deleted_schedules(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Vec<ScheduleDto>> {
    user.require(Role::Admin)?;

    let slots = ScheduleService::new(&state.db).list_deleted().await?;
    Ok(ApiResponse::ok(slots, "Deleted schedules retrieved successfully"))
}

/// Sections, periods and days selectable on the schedule form
#[utoipa::path(
    get,
    path = "/api/v1/schedules/form-options",
    tag = "schedules",
    responses(
        (status = 200, description = "Form options retrieved successfully", body = ApiResponse<ScheduleFormOptions>)
    )
)]
#[instrument(skip(state))]
pub async fn schedule_form_options(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ScheduleFormOptions> {
    user.require(Role::Admin)?;

    let options = ScheduleService::new(&state.db).form_options().await?;
    Ok(ApiResponse::ok(options, "Form options retrieved successfully"))
}

/// The fixed teaching periods of a school day
#[utoipa::path(
    get,
    path = "/api/v1/schedules/periods",
    tag = "schedules",
    responses(
        (status = 200, description = "Periods retrieved successfully", body = ApiResponse<Vec<PeriodSlot>>)
    )
)]
#[instrument]
pub async fn list_periods(user: CurrentUser) -> ApiResult<Vec<PeriodSlot>> {
    debug!("Listing periods for user {}", user.user_id);
    Ok(ApiResponse::ok(periods(), "Periods retrieved successfully"))
}

/// Weekly schedule of the signed-in user: the teaching schedule for
/// faculty, the class schedule for students, every slot for admins
#[utoipa::path(
    get,
    path = "/api/v1/schedules/mine",
    tag = "schedules",
    responses(
        (status = 200, description = "Schedule retrieved successfully", body = ApiResponse<Vec<ScheduleDto>>),
        (status = 403, description = "No usable role", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn my_schedule(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Vec<ScheduleDto>> {
    let service = ScheduleService::new(&state.db);
    let slots = match user.caller()? {
        Caller::Admin { .. } => service.list_active().await?,
        Caller::Faculty { user_id } => service.faculty_schedule(user_id).await?,
        Caller::Student { user_id } => service.student_schedule(user_id).await?,
    };
    debug!("User {} has {} schedule slots", user.user_id, slots.len());
    Ok(ApiResponse::ok(slots, "Schedule retrieved successfully"))
}

/// Get a specific schedule slot by ID
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{schedule_id}",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 200, description = "Schedule retrieved successfully", body = ApiResponse<ScheduleDto>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_schedule(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ScheduleDto> {
    user.require(Role::Admin)?;

    let slot = found(ScheduleService::new(&state.db).get(schedule_id).await?, "Schedule not found.")?;
    Ok(ApiResponse::ok(slot, "Schedule retrieved successfully"))
}

/// Stored slot as an edit form, with its period index
#[utoipa::path(
    get,
    path = "/api/v1/schedules/{schedule_id}/edit",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 200, description = "Edit form retrieved successfully", body = ApiResponse<ScheduleRequest>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn schedule_edit_form(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ScheduleRequest> {
    user.require(Role::Admin)?;

    let form = ScheduleService::new(&state.db).edit_form(schedule_id).await?;
    let form = found(form, "Schedule not found.")?;
    Ok(ApiResponse::ok(form, "Edit form retrieved successfully"))
}

/// Create a schedule slot from a period index
#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    tag = "schedules",
    request_body = ScheduleRequest,
    responses(
        (status = 201, description = "Schedule created successfully", body = ApiResponse<ScheduleDto>),
        (status = 400, description = "Invalid period or section", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduleDto>>), ApiError> {
    user.require(Role::Admin)?;

    let created = ScheduleService::new(&state.db).create(request).await?;
    info!("Schedule created successfully with ID: {}", created.id);
    Ok((StatusCode::CREATED, ApiResponse::ok(created, "Schedule created successfully")))
}

/// Update a schedule slot
#[utoipa::path(
    put,
    path = "/api/v1/schedules/{schedule_id}",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated successfully", body = ApiResponse<ScheduleDto>),
        (status = 400, description = "Invalid period or section", body = ErrorResponse),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_schedule(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<ScheduleRequest>,
) -> ApiResult<ScheduleDto> {
    user.require(Role::Admin)?;

    let updated = ScheduleService::new(&state.db).update(schedule_id, request).await?;
    Ok(ApiResponse::ok(updated, "Schedule updated successfully"))
}

/// Move a schedule slot to the recycle bin
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{schedule_id}",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 200, description = "Schedule deleted successfully", body = ApiResponse<i32>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_schedule(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(ScheduleService::new(&state.db).soft_delete(schedule_id).await?, "Schedule not found.")?;
    Ok(ApiResponse::ok(schedule_id, "Schedule deleted successfully"))
}

/// Restore a soft-deleted schedule slot
#[utoipa::path(
    post,
    path = "/api/v1/schedules/{schedule_id}/restore",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 200, description = "Schedule restored successfully", body = ApiResponse<i32>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn restore_schedule(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(ScheduleService::new(&state.db).restore(schedule_id).await?, "Schedule not found.")?;
    Ok(ApiResponse::ok(schedule_id, "Schedule restored successfully"))
}

/// Permanently delete a schedule slot
#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{schedule_id}/permanent",
    tag = "schedules",
    params(
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 200, description = "Schedule permanently deleted", body = ApiResponse<i32>),
        (status = 404, description = "Schedule not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn purge_schedule(
    Path(schedule_id): Path<i32>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<i32> {
    user.require(Role::Admin)?;

    affected(ScheduleService::new(&state.db).hard_delete(schedule_id).await?, "Schedule not found.")?;
    Ok(ApiResponse::ok(schedule_id, "Schedule permanently deleted"))
}
