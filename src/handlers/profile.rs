use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ProfileQuery};
use axum::extract::{Query, State};
use chrono::{Datelike, Utc};
use common::{DayOfWeek, ProfileDto};
use services::profile::ProfileService;
use tracing::{debug, instrument};

/// Dashboard of the signed-in user: classes and today's schedule for
/// students, teaching load for faculty, system totals for admins
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    tag = "profile",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileDto>),
        (status = 401, description = "Sign in required", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_profile(
    Query(query): Query<ProfileQuery>,
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ProfileDto> {
    let caller = user.caller()?;
    let today = query
        .day
        .unwrap_or_else(|| DayOfWeek::from(Utc::now().weekday()));
    debug!("Building {:?} dashboard for {:?}", caller.role(), today);

    let profile = ProfileService::new(&state.db).profile(caller, today).await?;
    Ok(ApiResponse::ok(profile, "Profile retrieved successfully"))
}
