//! Backup and reset endpoints

use axum::Extension;
use serde::Serialize;

use crate::database::Database;
use crate::replication::Coordinator;
use crate::replication::Snapshot;
use crate::seed;

use super::response;
use super::utils::storage_error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupResponse {
    tiers_succeeded: usize,
    tiers_total: usize,
    captured_at: String,
}

/// Capture the full data set and push it to every storage tier
pub async fn create_backup(
    Extension(database): Extension<Database>,
    Extension(coordinator): Extension<Coordinator>,
) -> Result<response::Success<BackupResponse>, response::Error> {
    let notes = database.find_all_notes().await.map_err(storage_error)?;

    let tags = database
        .find_all_tags()
        .await
        .map_err(storage_error)?
        .into_iter()
        .map(|tag| tag.tag)
        .collect::<Vec<_>>();

    let snapshot = Snapshot::capture(&notes, &tags);
    let succeeded = coordinator.save_all(&snapshot).await;

    if succeeded == 0 {
        return Err(response::Error::internal_server_error(
            "No storage tier accepted the backup",
        ));
    }

    Ok(response::Success::ok(BackupResponse {
        tiers_succeeded: succeeded,
        tiers_total: coordinator.tier_count(),
        captured_at: snapshot.captured_at.and_utc().to_rfc3339(),
    }))
}

/// Return the most recent snapshot any tier can produce
pub async fn latest_backup(
    Extension(coordinator): Extension<Coordinator>,
) -> response::Success<Snapshot> {
    response::Success::ok(coordinator.load_best().await)
}

#[derive(Serialize)]
pub struct ResetResponse {
    message: String,
}

/// Drop everything and restore the default notes and tags
pub async fn reset_data(
    Extension(database): Extension<Database>,
) -> Result<response::Success<ResetResponse>, response::Error> {
    seed::reseed(&database).await.map_err(storage_error)?;

    Ok(response::Success::ok(ResetResponse {
        message: "Data reset to defaults".to_string(),
    }))
}
