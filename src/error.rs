//! Taxonomía de errores del pipeline de ingesta y su mapeo a HTTP.

use axum::http::StatusCode;
use thiserror::Error;

/// Error terminal de una etapa del pipeline. Cada etapa falla rápido y
/// aborta las etapas restantes; ninguna sustituye el fallo por datos
/// por defecto.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Subida ausente, vacía o no escribible.
    #[error("Subida inválida: {0}")]
    Intake(String),

    /// El subproceso extractor terminó con estado distinto de cero.
    #[error("El extractor terminó con estado {status}")]
    ExtractionProcess { status: i32 },

    /// El extractor terminó bien pero no dejó el fichero de salida estructurada.
    #[error("El extractor no produjo el fichero de salida estructurada")]
    ExtractionOutputMissing,

    /// El extractor superó el tiempo máximo y fue terminado.
    #[error("El extractor superó el límite de {seconds} segundos")]
    ExtractionTimeout { seconds: u64 },

    /// La salida estructurada no tiene la forma esperada (nodos/aristas).
    #[error("Salida del extractor malformada: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    /// El almacén de grafos no está disponible o falló al leer/escribir.
    #[error("Error del repositorio de grafos: {0}")]
    Repository(#[source] std::io::Error),
}

impl IngestError {
    /// Código HTTP con el que se reporta el fallo en la frontera de la API.
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::Intake(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensaje apto para el cliente: legible y sin detalle interno
    /// (el stderr del subproceso solo va al log del operador).
    pub fn public_message(&self) -> String {
        match self {
            IngestError::Intake(msg) => msg.clone(),
            IngestError::ExtractionProcess { .. }
            | IngestError::ExtractionOutputMissing
            | IngestError::ExtractionTimeout { .. } => {
                "Error processing PDF file".to_string()
            }
            IngestError::MalformedOutput(_) => "Error reading graph data".to_string(),
            IngestError::Repository(_) => "Error saving graph data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_mapea_a_400_y_el_resto_a_500() {
        assert_eq!(
            IngestError::Intake("falta el fichero".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            IngestError::ExtractionProcess { status: 1 }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            IngestError::ExtractionOutputMissing.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn el_mensaje_publico_no_filtra_detalle_interno() {
        let err = IngestError::ExtractionProcess { status: 137 };
        assert!(!err.public_message().contains("137"));
    }
}
