use anyhow::Result;
use config::{Config, Environment, File};
use sea_orm::Database;
use serde::Deserialize;
use services::identity::DbIdentityProvider;
use services::storage::LocalFileStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::schemas::AppState;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://sims.db?mode=rwc";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_ROOT: &str = "wwwroot";

/// Runtime settings. Built from defaults, an optional `sims.toml` next to
/// the binary, then environment variables (`DATABASE_URL`, `BIND_ADDRESS`,
/// `UPLOAD_ROOT`), with command line flags applied last.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Directory holding the `uploads/` tree
    pub upload_root: PathBuf,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("upload_root", DEFAULT_UPLOAD_ROOT)?
            .add_source(File::with_name("sims").required(false))
            .add_source(Environment::default())
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Replaces settings given on the command line.
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        bind_address: Option<String>,
        upload_root: Option<PathBuf>,
    ) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        if let Some(upload_root) = upload_root {
            self.upload_root = upload_root;
        }
        self
    }
}

/// Connects to the database and wires the identity provider and file
/// storage.
pub async fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    tokio::fs::create_dir_all(config.upload_root.join("uploads")).await?;
    info!("Serving uploads from {}", config.upload_root.display());

    Ok(AppState {
        identity: Arc::new(DbIdentityProvider::new(db.clone())),
        storage: Arc::new(LocalFileStorage::new(config.upload_root.clone())),
        upload_root: config.upload_root.clone(),
        db,
    })
}
