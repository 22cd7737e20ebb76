//! Almacén de entrada: recibe los bytes subidos y los persiste en disco
//! con un nombre resistente a colisiones.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::error::IngestError;
use crate::models::UploadHandle;

/// Crea el directorio de subidas si no existe (idempotente).
pub async fn ensure_uploads_dir(dir: &Path) -> Result<(), IngestError> {
    fs::create_dir_all(dir).await.map_err(|e| {
        IngestError::Intake(format!("No se puede crear el directorio de subidas: {e}"))
    })
}

/// Persiste los bytes subidos bajo `uploads_dir` y devuelve el handle.
///
/// El nombre almacenado es `{millis}-{uuid}-{nombre original saneado}`:
/// dos subidas concurrentes con el mismo nombre nunca se pisan. Se escribe
/// primero a un fichero `.part` y se renombra al final, de modo que una
/// escritura parcial nunca se confunde con una subida completa.
pub async fn store(
    uploads_dir: &Path,
    bytes: &[u8],
    original_name: &str,
) -> Result<UploadHandle, IngestError> {
    if bytes.is_empty() {
        return Err(IngestError::Intake("Uploaded file is empty".to_string()));
    }

    let sanitized = sanitize_name(original_name);
    if sanitized.is_empty() {
        return Err(IngestError::Intake("Invalid file name".to_string()));
    }

    let base_name = format!("{}-{}", Utc::now().timestamp_millis(), Uuid::new_v4());
    let stored_path = uploads_dir.join(format!("{base_name}-{sanitized}"));
    let partial_path = stored_path.with_extension("part");

    fs::write(&partial_path, bytes)
        .await
        .map_err(|e| IngestError::Intake(format!("No se pudo escribir la subida: {e}")))?;
    fs::rename(&partial_path, &stored_path)
        .await
        .map_err(|e| IngestError::Intake(format!("No se pudo completar la subida: {e}")))?;

    info!(
        "Subida almacenada: {} ({} bytes) -> {}",
        sanitized,
        bytes.len(),
        stored_path.display()
    );

    Ok(UploadHandle {
        original_name: sanitized,
        stored_path,
        base_name,
    })
}

/// Reduce el nombre original a su componente final, sin separadores de ruta.
fn sanitize_name(name: &str) -> String {
    PathBuf::from(name)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
