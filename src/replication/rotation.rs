//! Rotated, timestamp-named backup copies with a retention limit

use std::path::PathBuf;

use axum::async_trait;
use chrono::Utc;
use tokio::fs;

use super::snapshot::write_atomically;
use super::Result;
use super::Snapshot;
use super::Tier;

const FILE_PREFIX: &str = "backup-";
const FILE_SUFFIX: &str = ".json";

/// One backup file per save, named `backup-<UTC stamp>-<seq>.json`
///
/// The sequence suffix breaks ties between saves within the same
/// second, so a rotation never overwrites an earlier file. File name
/// order is recency order.
pub struct RotatedBackups {
    /// Directory holding the rotated copies
    dir: PathBuf,

    /// How many files to keep; `0` keeps everything
    retention: usize,
}

impl RotatedBackups {
    pub fn new(dir: PathBuf, retention: usize) -> Self {
        Self { dir, retention }
    }

    /// All backup files, sorted oldest first
    async fn backup_files(&self) -> Result<Vec<PathBuf>> {
        let mut names = Vec::new();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
                names.push(name.to_string());
            }
        }

        names.sort();

        Ok(names.into_iter().map(|name| self.dir.join(name)).collect())
    }

    /// Drop the oldest files beyond the retention count
    async fn prune(&self) -> Result<()> {
        if self.retention == 0 {
            return Ok(());
        }

        let mut files = self.backup_files().await?;

        while files.len() > self.retention {
            let path = files.remove(0);
            fs::remove_file(&path).await?;
            tracing::debug!("pruned rotated backup {}", path.display());
        }

        Ok(())
    }
}

#[async_trait]
impl Tier for RotatedBackups {
    fn name(&self) -> &'static str {
        "rotation"
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S");

        let mut sequence = 0u32;
        let path = loop {
            let candidate = self
                .dir
                .join(format!("{FILE_PREFIX}{stamp}-{sequence:06}{FILE_SUFFIX}"));

            // an exclusive create reserves the name, so two saves racing
            // within the same second can never claim the same file
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(_) => break candidate,
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => sequence += 1,
                Err(err) => return Err(err.into()),
            }
        };

        // replaces the empty reservation with the complete document
        write_atomically(&path, &bytes).await?;

        if let Err(err) = self.prune().await {
            tracing::warn!("could not prune rotated backups: {err}");
        }

        Ok(())
    }

    async fn load(&self) -> Result<Option<Snapshot>> {
        let files = self.backup_files().await?;

        match files.last() {
            Some(path) => {
                let bytes = fs::read(path).await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rotation_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let tier = RotatedBackups::new(dir.path().to_path_buf(), 10);

        // both saves land within the same one-second stamp
        tier.save(&Snapshot::empty()).await.unwrap();
        tier.save(&Snapshot::empty()).await.unwrap();

        assert_eq!(2, tier.backup_files().await.unwrap().len());
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let tier = RotatedBackups::new(dir.path().to_path_buf(), 10);

        let (snap_a, snap_b) = (Snapshot::empty(), Snapshot::empty());
        let (first, second) = tokio::join!(tier.save(&snap_a), tier.save(&snap_b));
        first.unwrap();
        second.unwrap();

        assert_eq!(2, tier.backup_files().await.unwrap().len());
    }

    #[tokio::test]
    async fn retention_prunes_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let tier = RotatedBackups::new(dir.path().to_path_buf(), 3);

        for _ in 0..5 {
            tier.save(&Snapshot::empty()).await.unwrap();
        }

        let files = tier.backup_files().await.unwrap();
        assert_eq!(3, files.len());
    }

    #[tokio::test]
    async fn load_picks_the_newest_backup() {
        let dir = tempfile::tempdir().unwrap();
        let tier = RotatedBackups::new(dir.path().to_path_buf(), 10);

        let mut snapshot = Snapshot::empty();
        snapshot.tags.push(super::super::TagRecord {
            id: 1,
            name: "first".to_string(),
            color: "#ef4444".to_string(),
        });
        tier.save(&snapshot).await.unwrap();

        snapshot.tags[0].name = "second".to_string();
        tier.save(&snapshot).await.unwrap();

        let loaded = tier.load().await.unwrap().unwrap();
        assert_eq!("second", loaded.tags[0].name);
    }

    #[tokio::test]
    async fn empty_directory_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let tier = RotatedBackups::new(dir.path().join("backups"), 10);

        assert!(tier.load().await.unwrap().is_none());
    }
}
