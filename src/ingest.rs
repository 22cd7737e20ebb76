//! Orquestación de una ingesta completa: subida → extracción → normalización
//! → persistencia, con semántica de fallo rápido en cada etapa.

use tracing::info;

use crate::config::AppConfig;
use crate::error::IngestError;
use crate::extractor;
use crate::intake;
use crate::models::{ExtractionRequest, PersistedGraph, UploadHandle};
use crate::normalize;
use crate::repository::GraphRepository;

/// Ejecuta el pipeline completo para una subida y devuelve el registro
/// persistido.
///
/// Cada etapa aborta las siguientes si falla: una subida inválida nunca
/// lanza el extractor, una extracción fallida nunca se normaliza y un
/// grafo que no se pudo persistir es un fallo global, no un éxito parcial.
/// Se lanza exactamente un subproceso extractor por ingesta.
pub async fn ingest(
    repo: &GraphRepository,
    cfg: &AppConfig,
    bytes: &[u8],
    original_name: &str,
) -> Result<PersistedGraph, IngestError> {
    let handle = intake::store(&cfg.uploads_dir, bytes, original_name).await?;
    info!("Ingesta de '{}' almacenada, extrayendo...", handle.original_name);

    let request = extraction_request(cfg, &handle);
    extractor::invoke(&cfg.extractor_cmd, cfg.extractor_timeout_secs, &request).await?;

    let graph_data = normalize::normalize(&request.structured_output_path).await?;

    let record = repo
        .save(
            &handle.original_name,
            graph_data,
            &request.rendered_output_path,
            &handle.stored_path,
        )
        .await?;

    info!(
        "Ingesta de '{}' completada: id {}",
        record.filename, record.id
    );
    Ok(record)
}

/// Deriva las rutas de salida del prefijo único de la subida, de modo que
/// dos ingestas concurrentes nunca comparten ficheros intermedios.
fn extraction_request(cfg: &AppConfig, handle: &UploadHandle) -> ExtractionRequest {
    ExtractionRequest {
        source_path: handle.stored_path.clone(),
        rendered_output_path: cfg.outputs_dir.join(format!("{}.html", handle.base_name)),
        structured_output_path: cfg.outputs_dir.join(format!("{}.json", handle.base_name)),
    }
}
