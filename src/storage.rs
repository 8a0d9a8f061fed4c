use crate::errors::LedgerError;
use crate::ingest::{Ingested, map_records};
use crate::models::ClientProfile;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info};

/// Reads and maps the purchases export. An unreadable file or a document
/// that is not an array aborts; individual bad records do not.
pub async fn read_purchases(path: &Path) -> Result<Ingested, LedgerError> {
    let bytes = fs::read(path).await.map_err(|source| LedgerError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<Value> =
        serde_json::from_slice(&bytes).map_err(|source| LedgerError::ParseInput {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(map_records(records))
}

/// Purchases used by the dashboard aggregates. A missing or broken export
/// leaves the server running with no data.
pub async fn load_purchases(path: &Path) -> Ingested {
    match read_purchases(path).await {
        Ok(ingested) => {
            info!(
                purchases = ingested.purchases.len(),
                skipped = ingested.skipped,
                path = %path.display(),
                "loaded purchases"
            );
            ingested
        }
        Err(LedgerError::ReadInput { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            Ingested::default()
        }
        Err(err) => {
            error!("failed to load purchases: {err}");
            Ingested::default()
        }
    }
}

/// Writes the ledger next to its final location and renames it into place,
/// so readers never observe a truncated file.
pub async fn persist_profiles(
    path: &Path,
    profiles: &[ClientProfile],
) -> Result<Vec<u8>, LedgerError> {
    let payload = serde_json::to_vec_pretty(profiles)?;
    let write_err = |source: std::io::Error| LedgerError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let staging = staging_path(path);
    let staged = match fs::write(&staging, &payload).await {
        Ok(()) => fs::rename(&staging, path).await,
        Err(err) => Err(err),
    };
    if let Err(source) = staged {
        // A failed write may leave a partial staging file behind.
        let _ = fs::remove_file(&staging).await;
        return Err(write_err(source));
    }

    Ok(payload)
}

pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(kind: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "retail_dashboard_storage_{kind}_{}_{nanos}",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn failed_persist_leaves_no_staging_file() {
        let dir = scratch_dir("blocked");
        // A non-empty directory at the target path makes the final rename fail.
        let target = dir.join("loyalty_points.json");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = persist_profiles(&target, &[]).await.unwrap_err();
        assert!(matches!(err, LedgerError::WriteOutput { .. }));
        assert!(!staging_path(&target).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn persist_replaces_target() {
        let dir = scratch_dir("ok");
        let target = dir.join("nested").join("loyalty_points.json");

        let payload = persist_profiles(&target, &[]).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), payload);
        assert!(!staging_path(&target).exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn staging_path_sits_beside_target() {
        assert_eq!(
            staging_path(Path::new("data/loyalty_points.json")),
            PathBuf::from("data/loyalty_points.json.tmp")
        );
    }
}
