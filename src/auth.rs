use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use common::Role;
use services::Caller;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// Header carrying the id of the signed-in user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The signed-in user of a request with every role they hold.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i32,
    pub roles: Vec<Role>,
    /// `None` for accounts that only hold the `Guest` role
    pub caller: Option<Caller>,
}

impl CurrentUser {
    /// Fails with 403 unless the user holds `role`.
    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.roles.contains(&role) {
            Ok(())
        } else {
            warn!("User {} lacks the {} role", self.user_id, role);
            Err(ApiError::forbidden(format!(
                "This action requires the {} role.",
                role
            )))
        }
    }

    pub fn caller(&self) -> Result<Caller, ApiError> {
        self.caller.ok_or_else(|| {
            warn!("User {} holds no usable role", self.user_id);
            ApiError::forbidden("Access denied.")
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i32>().ok())
            .ok_or_else(|| ApiError::unauthorized("Sign in required."))?;

        let user = state
            .identity
            .find_user(user_id)
            .await?
            .filter(|user| !user.is_deleted)
            .ok_or_else(|| {
                warn!("Rejected unknown user id {}", user_id);
                ApiError::unauthorized("Unknown user.")
            })?;

        let roles = state.identity.roles_for(user.id).await?;
        let caller = Caller::from_roles(user.id, &roles);
        debug!("Request by user {} as {:?}", user.id, caller);

        Ok(Self {
            user_id: user.id,
            roles,
            caller,
        })
    }
}
