//! Carga y gestión de configuración de la aplicación (rutas + extractor).

use std::env;
use std::path::PathBuf;
use anyhow::{anyhow, Result};

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_addr: String,

    /// Directorio donde se guardan los PDFs subidos.
    pub uploads_dir: PathBuf,
    /// Directorio donde el extractor escribe sus salidas (HTML + JSON).
    pub outputs_dir: PathBuf,
    /// Directorio donde se persisten los grafos normalizados.
    pub data_dir: PathBuf,

    /// Comando del extractor externo como vector de argumentos
    /// (programa + argumentos base). Las tres rutas posicionales se
    /// añaden en cada invocación.
    pub extractor_cmd: Vec<String>,
    /// Tiempo máximo de ejecución del extractor, en segundos (0 = sin límite).
    pub extractor_timeout_secs: u64,
    /// Tamaño máximo aceptado para el cuerpo de una subida, en bytes.
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        let server_addr =
            env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

        let uploads_dir =
            PathBuf::from(env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));
        let outputs_dir =
            PathBuf::from(env::var("OUTPUTS_DIR").unwrap_or_else(|_| "outputs".to_string()));
        let data_dir =
            PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data/graphs".to_string()));

        let extractor_cmd_str = env::var("EXTRACTOR_CMD")
            .unwrap_or_else(|_| "python3 scripts/pdf_to_kg.py".to_string());
        // Vector de argumentos, nunca una cadena interpretada por un shell.
        let extractor_cmd: Vec<String> = extractor_cmd_str
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if extractor_cmd.is_empty() {
            return Err(anyhow!("EXTRACTOR_CMD está vacío"));
        }

        let extractor_timeout_secs = match env::var("EXTRACTOR_TIMEOUT_SECS") {
            Ok(s) => s
                .parse::<u64>()
                .map_err(|_| anyhow!("EXTRACTOR_TIMEOUT_SECS no es un entero válido: {s}"))?,
            Err(_) => 120,
        };

        // Los PDFs reales superan con facilidad el límite por defecto de
        // axum (2 MB); el techo se fija aquí y se aplica en el router.
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(s) => s
                .parse::<usize>()
                .map_err(|_| anyhow!("MAX_UPLOAD_BYTES no es un entero válido: {s}"))?,
            Err(_) => 50 * 1024 * 1024,
        };

        Ok(Self {
            server_addr,
            uploads_dir,
            outputs_dir,
            data_dir,
            extractor_cmd,
            extractor_timeout_secs,
            max_upload_bytes,
        })
    }
}
