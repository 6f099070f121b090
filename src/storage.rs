use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<AppData>(&bytes) {
            Ok(data) => {
                info!("loaded {} records from {}", data.records.len(), path.display());
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Writes the snapshot next to the target and renames it into place.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    write_snapshot(path, data)
        .await
        .inspect_err(|err| error!("failed to persist {}: {}", path.display(), err.message))
}

async fn write_snapshot(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, payload).await.map_err(AppError::internal)?;
    fs::rename(&staging, path).await.map_err(AppError::internal)?;
    Ok(())
}
