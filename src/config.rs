//! Service configuration
//!
//! One explicit struct passed into `setup_app`, so tests can inject
//! their own database file and tier paths instead of touching globals

use std::path::PathBuf;
use std::time::Duration;

use crate::database;
use crate::replication;
use crate::utils::env_var_or_else;
use crate::utils::env_var_parse_or;

/// Default number of rotated backups to keep around
const DEFAULT_BACKUP_RETENTION: usize = 30;

/// Default upper bound for remote store calls, in seconds
const DEFAULT_REMOTE_TIMEOUT: u64 = 10;

/// Everything the app needs to come up
pub struct Config {
    /// Local Store configuration
    pub database: database::DatabaseConfig,

    /// Snapshot, rotation, and remote tier configuration
    pub replication: replication::Config,

    /// Seed default content into an empty database on startup
    pub seed: bool,
}

impl Config {
    /// Build the configuration from environment variables
    ///
    /// `DATA_DIR` roots all file paths; `DATABASE_PATH` overrides the
    /// database file, `REMOTE_STORE_URL` enables the remote tier
    pub fn from_env() -> Self {
        let data_dir = PathBuf::from(env_var_or_else("DATA_DIR", || String::from("data")));

        let database_path = std::env::var("DATABASE_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .map_or_else(|| data_dir.join("jotter.db"), PathBuf::from);

        let remote = std::env::var("REMOTE_STORE_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| replication::RemoteConfig {
                url,
                timeout: Duration::from_secs(env_var_parse_or(
                    "REMOTE_STORE_TIMEOUT",
                    DEFAULT_REMOTE_TIMEOUT,
                )),
            });

        Self {
            database: database::DatabaseConfig::Path(database_path),
            replication: replication::Config {
                snapshot_path: data_dir.join("snapshot.json"),
                backup_dir: data_dir.join("backups"),
                backup_retention: env_var_parse_or("BACKUP_RETENTION", DEFAULT_BACKUP_RETENTION),
                remote,
            },
            seed: true,
        }
    }
}
