use crate::errors::DiscoveryError;
use crate::model::DeviceRecord;
use crate::registry::Registry;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::Path;

/// Write the registry's full record set to a JSON file keyed by address
pub async fn save_snapshot(registry: &Registry, path: impl AsRef<Path>) -> Result<(), DiscoveryError> {
    let path = path.as_ref();
    let snapshot = registry.snapshot().await;
    let raw = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| DiscoveryError::Other(format!("snapshot serialization: {}", e)))?;
    tokio::fs::write(path, raw).await?;
    tracing::info!(path = %path.display(), devices = snapshot.len(), "Saved device snapshot");
    Ok(())
}

/// Restore the registry from a snapshot file.
///
/// A missing file is not an error, just an empty starting registry. A
/// malformed file is surfaced to the caller.
pub async fn load_snapshot(registry: &Registry, path: impl AsRef<Path>) -> Result<(), DiscoveryError> {
    let path = path.as_ref();
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No snapshot file, starting empty");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let records: BTreeMap<IpAddr, DeviceRecord> = serde_json::from_str(&raw)
        .map_err(|e| DiscoveryError::Other(format!("snapshot parse {}: {}", path.display(), e)))?;
    tracing::info!(path = %path.display(), devices = records.len(), "Loaded device snapshot");
    registry.restore(records).await;
    Ok(())
}
