use common::Role;
use tracing::{info, instrument};

use crate::error::Result;
use crate::identity::{IdentityProvider, NewUser};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123";
pub const DEFAULT_ADMIN_NAME: &str = "System Administrator";

/// Creates the default administrator unless an account with its email
/// exists. Returns whether an account was created.
#[instrument(skip(identity))]
pub async fn seed_default_admin(identity: &dyn IdentityProvider) -> Result<bool> {
    if let Some(existing) = identity.find_by_email(DEFAULT_ADMIN_EMAIL).await? {
        info!("Default admin already present as user {}", existing.id);
        return Ok(false);
    }

    let admin = identity
        .create_user(NewUser {
            full_name: DEFAULT_ADMIN_NAME.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            phone: None,
        })
        .await?;
    identity.add_role(admin.id, Role::Admin).await?;

    info!("Seeded default admin {}", admin.id);
    Ok(true)
}
