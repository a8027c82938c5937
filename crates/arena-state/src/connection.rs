//! SurrealDB connection setup
//!
//! Supports three targets, tried in this order by [`connect_from_env`]:
//! - SurrealDB Cloud / remote server with credentials (`SURREALDB_ENDPOINT`, ...)
//! - an explicit engine URL (`SURREALDB_URL`, e.g. `ws://localhost:8000`)
//! - a local durable directory through the SurrealKV engine (`ARENA_DB_PATH`)

use std::path::Path;

use surrealdb::engine::any::Any;
use surrealdb::opt::auth::{Database, Root};
use surrealdb::Surreal;
use tracing::{info, instrument};

use crate::error::StateError;
use crate::migrations;
use crate::Result;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "arena";
/// Database used when none is configured
pub const DEFAULT_DATABASE: &str = "main";
/// Local database directory used when nothing else is configured
pub const DEFAULT_DB_PATH: &str = ".arena/db";

/// Configuration for a credentialed SurrealDB connection
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// WebSocket endpoint URL (e.g., "wss://xxx.aws-use1.surrealdb.cloud")
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Namespace (default: "arena")
    pub namespace: String,
    /// Database name (default: "main")
    pub database: String,
    /// Whether this is a root user (true) or database user (false)
    pub is_root: bool,
}

impl CloudConfig {
    /// Create a new cloud configuration for a database user
    pub fn new(
        endpoint: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            password: password.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            is_root: false,
        }
    }

    pub fn with_namespace(mut self, ns: impl Into<String>) -> Self {
        self.namespace = ns.into();
        self
    }

    pub fn with_database(mut self, db: impl Into<String>) -> Self {
        self.database = db.into();
        self
    }

    pub fn with_root(mut self, is_root: bool) -> Self {
        self.is_root = is_root;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SURREALDB_ENDPOINT (required)
    /// - SURREALDB_USERNAME (required)
    /// - SURREALDB_PASSWORD (required)
    /// - SURREALDB_NAMESPACE (optional, default: "arena")
    /// - SURREALDB_DATABASE (optional, default: "main")
    /// - SURREALDB_ROOT (optional, default: "false")
    pub fn from_env() -> std::result::Result<Self, String> {
        let endpoint =
            std::env::var("SURREALDB_ENDPOINT").map_err(|_| "SURREALDB_ENDPOINT not set")?;
        let username =
            std::env::var("SURREALDB_USERNAME").map_err(|_| "SURREALDB_USERNAME not set")?;
        let password =
            std::env::var("SURREALDB_PASSWORD").map_err(|_| "SURREALDB_PASSWORD not set")?;
        let namespace = std::env::var("SURREALDB_NAMESPACE")
            .unwrap_or_else(|_| DEFAULT_NAMESPACE.to_string());
        let database =
            std::env::var("SURREALDB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let is_root = std::env::var("SURREALDB_ROOT")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            endpoint,
            username,
            password,
            namespace,
            database,
            is_root,
        })
    }
}

/// Connect to an engine URL (`mem://`, `surrealkv://...`, `ws://...`) and prepare the schema.
#[instrument(skip_all, fields(url = %url))]
pub async fn connect_url(url: &str) -> Result<Surreal<Any>> {
    let db = surrealdb::engine::any::connect(url)
        .await
        .map_err(|e| StateError::Connection(format!("Failed to connect to {}: {}", url, e)))?;

    db.use_ns(DEFAULT_NAMESPACE)
        .use_db(DEFAULT_DATABASE)
        .await
        .map_err(|e| StateError::Connection(e.to_string()))?;

    migrations::init_schema(&db).await?;
    Ok(db)
}

/// Open (creating if needed) a durable database directory.
pub async fn connect_path(path: &Path) -> Result<Surreal<Any>> {
    std::fs::create_dir_all(path).map_err(|e| {
        StateError::Connection(format!(
            "Failed to create database directory {}: {}",
            path.display(),
            e
        ))
    })?;
    let url = format!("surrealkv://{}", path.display());
    connect_url(&url).await
}

/// Connect with credentials.
#[instrument(skip(config), fields(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database))]
pub async fn connect_cloud(config: &CloudConfig) -> Result<Surreal<Any>> {
    info!("Connecting to SurrealDB Cloud (root={})", config.is_root);

    let db = surrealdb::engine::any::connect(&config.endpoint)
        .await
        .map_err(|e| {
            StateError::Connection(format!("Failed to connect to {}: {}", config.endpoint, e))
        })?;

    if config.is_root {
        db.signin(Root {
            username: &config.username,
            password: &config.password,
        })
        .await
        .map_err(|e| StateError::Connection(format!("Root authentication failed: {}", e)))?;
    } else {
        db.signin(Database {
            namespace: &config.namespace,
            database: &config.database,
            username: &config.username,
            password: &config.password,
        })
        .await
        .map_err(|e| StateError::Connection(format!("Database authentication failed: {}", e)))?;
    }

    db.use_ns(&config.namespace)
        .use_db(&config.database)
        .await
        .map_err(|e| {
            StateError::Connection(format!("Failed to select namespace/database: {}", e))
        })?;

    migrations::init_schema(&db).await?;
    Ok(db)
}

/// Connect using environment variables.
///
/// Cloud credentials win, then `SURREALDB_URL`, then the local directory in
/// `ARENA_DB_PATH` (default `.arena/db`). The local fallback is durable, so
/// turn ids keep increasing across process restarts.
#[instrument(skip_all)]
pub async fn connect_from_env() -> Result<Surreal<Any>> {
    if let Ok(config) = CloudConfig::from_env() {
        info!("Cloud config found, connecting to SurrealDB Cloud");
        return connect_cloud(&config).await;
    }

    if let Ok(url) = std::env::var("SURREALDB_URL") {
        info!("SURREALDB_URL found, connecting to {}", url);
        return connect_url(&url).await;
    }

    let path = std::env::var("ARENA_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    info!(
        "No cloud config or SURREALDB_URL found, using local persistence: {}",
        path
    );
    connect_path(Path::new(&path)).await
}
