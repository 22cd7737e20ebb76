//! Modelos de dominio (registros crudos del extractor y grafo de presentación).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Fichero subido ya persistido en disco. El fichero sobrevive a la
/// petición que lo creó; el registro persistido guarda su ruta.
#[derive(Debug, Clone)]
pub struct UploadHandle {
    pub original_name: String,
    pub stored_path: PathBuf,
    /// Prefijo único (milisegundos + UUID) que evita colisiones entre
    /// subidas concurrentes con el mismo nombre.
    pub base_name: String,
}

/// Invocación única del extractor: fichero origen y las dos rutas de salida.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub source_path: PathBuf,
    pub rendered_output_path: PathBuf,
    pub structured_output_path: PathBuf,
}

/// Nodo tal y como lo escribe el extractor en el JSON de salida.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_underlined: bool,
}

/// Arista cruda; el extractor usa las claves "from"/"to".
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "to")]
    pub target: String,
}

/// Salida estructurada completa del extractor.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraphRecord {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

/// Nodo normalizado, listo para visualizar con vis-network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayNode {
    pub id: String,
    /// Id truncado a 30 caracteres con "..." si excede.
    pub label: String,
    /// Contenido del nodo, o un marcador fijo si no hay descripción.
    pub title: String,
    pub level: u32,
    /// Color hexadecimal, determinista en (nivel, subrayado).
    pub color: String,
}

/// Arista normalizada; se serializa como "from"/"to" para vis-network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEdge {
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "to")]
    pub target: String,
}

/// Grafo de presentación persistido y servido al frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayGraph {
    pub nodes: Vec<DisplayNode>,
    pub edges: Vec<DisplayEdge>,
}

/// Registro persistido de una ingesta completada. Inmutable tras su creación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedGraph {
    pub id: Uuid,
    /// Nombre original del fichero subido.
    pub filename: String,
    pub graph_data: DisplayGraph,
    /// Ruta del HTML renderizado por el extractor; no se interpreta aquí.
    pub rendered_output_path: PathBuf,
    /// Ruta del PDF subido, conservado para referencia posterior.
    pub source_path: PathBuf,
    pub created_at: DateTime<Utc>,
}
