use anyhow::Result;
use services::identity::DbIdentityProvider;
use services::seed::{DEFAULT_ADMIN_EMAIL, seed_default_admin};
use tracing::{debug, info};

use super::initdb::run_migrations;

/// Migrates the database and makes sure the default administrator exists.
pub async fn seed(database_url: &str) -> Result<()> {
    debug!("Seeding database at {}", database_url);
    let db = run_migrations(database_url).await?;

    let identity = DbIdentityProvider::new(db.clone());
    if seed_default_admin(&identity).await? {
        info!("Created default administrator {}", DEFAULT_ADMIN_EMAIL);
    } else {
        info!("Default administrator {} already exists", DEFAULT_ADMIN_EMAIL);
    }

    db.close().await?;
    Ok(())
}
