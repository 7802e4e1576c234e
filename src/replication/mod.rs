//! Replicated persistence across best-effort storage tiers
//!
//! Every save fans out to all configured tiers independently; a tier
//! failing never aborts another, and a save counts as durable when at
//! least one tier accepted it. Reads walk the tiers in fixed priority
//! order and take the first non-empty snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::async_trait;

pub use remote::RemoteTier;
pub use rotation::RotatedBackups;
pub use snapshot::NoteRecord;
pub use snapshot::Snapshot;
pub use snapshot::SnapshotFile;
pub use snapshot::TagRecord;

mod remote;
mod rotation;
mod snapshot;

/// Tier errors; the coordinator logs these, it never surfaces them
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a snapshot file failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The remote store misbehaved or was unreachable
    #[error("remote store error: {0}")]
    Remote(String),
}

/// Result type for all tier interactions
pub type Result<T> = core::result::Result<T, Error>;

/// One independent storage backend in the replication scheme
#[async_trait]
pub trait Tier: Send + Sync {
    /// Short tier name for log lines
    fn name(&self) -> &'static str;

    /// Write the snapshot, overwriting whatever the tier held before
    async fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Read the tier's snapshot, `None` when it has never stored one
    async fn load(&self) -> Result<Option<Snapshot>>;
}

/// Configuration for the replication tiers
pub struct Config {
    /// Path of the single live snapshot file
    pub snapshot_path: PathBuf,

    /// Directory holding the rotated, timestamp-named backups
    pub backup_dir: PathBuf,

    /// How many rotated backups to keep; `0` disables pruning
    pub backup_retention: usize,

    /// Remote store, absent unless explicitly configured
    pub remote: Option<RemoteConfig>,
}

/// Configuration for the remote store tier
pub struct RemoteConfig {
    /// Endpoint accepting `PUT`/`GET` of a snapshot document
    pub url: String,

    /// Upper bound for any remote call
    pub timeout: Duration,
}

/// Sequences writes across tiers and defines the read fallback order
#[derive(Clone)]
pub struct Coordinator {
    /// Tiers in priority order: remote, live snapshot, rotated backups
    tiers: Arc<Vec<Box<dyn Tier>>>,
}

impl Coordinator {
    /// Assemble the tiers from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut tiers: Vec<Box<dyn Tier>> = Vec::new();

        if let Some(remote) = &config.remote {
            tiers.push(Box::new(RemoteTier::new(remote)?));
        }

        tiers.push(Box::new(SnapshotFile::new(config.snapshot_path.clone())));
        tiers.push(Box::new(RotatedBackups::new(
            config.backup_dir.clone(),
            config.backup_retention,
        )));

        Ok(Self {
            tiers: Arc::new(tiers),
        })
    }

    /// Number of configured tiers
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Write the snapshot to every tier, returning how many accepted it
    ///
    /// Each attempt is isolated; failures are logged and swallowed
    pub async fn save_all(&self, snapshot: &Snapshot) -> usize {
        let mut succeeded = 0;

        for tier in self.tiers.iter() {
            match tier.save(snapshot).await {
                Ok(()) => {
                    tracing::debug!("snapshot written to {} tier", tier.name());
                    succeeded += 1;
                }
                Err(err) => {
                    tracing::warn!("{} tier rejected snapshot: {err}", tier.name());
                }
            }
        }

        succeeded
    }

    /// Read from the first tier holding data
    ///
    /// All tiers empty is a legitimate bootstrap state, not a fault
    pub async fn load_best(&self) -> Snapshot {
        for tier in self.tiers.iter() {
            match tier.load().await {
                Ok(Some(snapshot)) if !snapshot.is_empty() => {
                    tracing::debug!("snapshot loaded from {} tier", tier.name());
                    return snapshot;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("{} tier failed to load: {err}", tier.name());
                }
            }
        }

        Snapshot::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            captured_at: chrono::Utc::now().naive_utc(),
            notes: vec![NoteRecord {
                id: 1,
                title: "Standup".to_string(),
                body: "sync".to_string(),
                created_at: chrono::Utc::now().naive_utc(),
                updated_at: chrono::Utc::now().naive_utc(),
                tag_ids: vec![1],
            }],
            tags: vec![TagRecord {
                id: 1,
                name: "Work".to_string(),
                color: "#8b5cf6".to_string(),
            }],
        }
    }

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            snapshot_path: dir.join("snapshot.json"),
            backup_dir: dir.join("backups"),
            backup_retention: 10,
            remote: None,
        }
    }

    #[tokio::test]
    async fn save_all_counts_every_tier() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::from_config(&test_config(dir.path())).unwrap();

        let succeeded = coordinator.save_all(&sample_snapshot()).await;
        assert_eq!(2, succeeded);
        assert_eq!(2, coordinator.tier_count());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::from_config(&test_config(dir.path())).unwrap();

        let snapshot = sample_snapshot();
        coordinator.save_all(&snapshot).await;

        let loaded = coordinator.load_best().await;
        assert_eq!(1, loaded.notes.len());
        assert_eq!("Standup", loaded.notes[0].title);
        assert_eq!(vec![1], loaded.notes[0].tag_ids);
        assert_eq!("Work", loaded.tags[0].name);
    }

    #[tokio::test]
    async fn tier_failures_are_isolated() {
        let dir = tempfile::tempdir().unwrap();

        // a plain file where the backup directory should be makes the
        // rotation tier fail while the snapshot tier keeps working
        let mut config = test_config(dir.path());
        std::fs::write(&config.backup_dir, b"not a directory").unwrap();
        config.backup_retention = 10;

        let coordinator = Coordinator::from_config(&config).unwrap();

        let snapshot = sample_snapshot();
        let succeeded = coordinator.save_all(&snapshot).await;
        assert_eq!(1, succeeded);

        let loaded = coordinator.load_best().await;
        assert_eq!(1, loaded.notes.len());
    }

    #[tokio::test]
    async fn load_best_falls_back_to_rotated_backups() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::from_config(&test_config(dir.path())).unwrap();

        let snapshot = sample_snapshot();
        coordinator.save_all(&snapshot).await;

        // losing the live snapshot must not lose the data
        std::fs::remove_file(dir.path().join("snapshot.json")).unwrap();

        let loaded = coordinator.load_best().await;
        assert_eq!(1, loaded.notes.len());
    }

    #[tokio::test]
    async fn load_best_is_empty_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::from_config(&test_config(dir.path())).unwrap();

        let loaded = coordinator.load_best().await;
        assert!(loaded.is_empty());
    }
}
