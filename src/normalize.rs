//! Normalización de la salida estructurada del extractor a un grafo de
//! presentación: colores por nivel, etiquetas truncadas y descripciones.

use std::path::Path;

use tokio::fs;
use tracing::info;

use crate::error::IngestError;
use crate::models::{DisplayEdge, DisplayGraph, DisplayNode, RawGraphRecord};

/// Paleta fija indexada por nivel de encabezado (0 = raíz).
const LEVEL_COLORS: [&str; 5] = ["#ff0000", "#00cc00", "#0099ff", "#9933ff", "#ff9900"];
/// Color para niveles fuera de la paleta.
const FALLBACK_COLOR: &str = "#cccccc";
/// Los nodos subrayados se resaltan siempre en dorado, sea cual sea su nivel.
const HIGHLIGHT_COLOR: &str = "#FFD700";

/// Longitud máxima de etiqueta antes de truncar.
const MAX_LABEL_CHARS: usize = 30;
/// Descripción por si el nodo no trae contenido.
const NO_DESCRIPTION: &str = "(No description)";

/// Lee el JSON de salida del extractor y lo convierte en un `DisplayGraph`.
///
/// Función pura sobre el contenido del fichero: mismo JSON, mismo grafo.
/// Un JSON imparseable o sin la forma esperada es `MalformedOutput`; una
/// arista que apunta a un nodo inexistente no lo es (se deja pasar tal
/// cual, es un problema de calidad de datos del extractor).
pub async fn normalize(structured_output_path: &Path) -> Result<DisplayGraph, IngestError> {
    // El invocador ya comprobó que el fichero existe; si aun así no se
    // puede leer, el resultado del extractor se da por perdido.
    let contents = fs::read_to_string(structured_output_path)
        .await
        .map_err(|_| IngestError::ExtractionOutputMissing)?;

    let record: RawGraphRecord =
        serde_json::from_str(&contents).map_err(IngestError::MalformedOutput)?;

    let graph = normalize_record(record);
    info!(
        "Grafo normalizado: {} nodos, {} aristas",
        graph.nodes.len(),
        graph.edges.len()
    );
    Ok(graph)
}

/// Aplica las reglas de presentación a un registro crudo ya parseado.
pub fn normalize_record(record: RawGraphRecord) -> DisplayGraph {
    let nodes = record
        .nodes
        .into_iter()
        .map(|raw| {
            let title = match raw.content.as_deref() {
                Some(content) if !content.is_empty() => content.to_string(),
                _ => NO_DESCRIPTION.to_string(),
            };
            DisplayNode {
                label: truncate_label(&raw.id),
                title,
                color: node_color(raw.level, raw.is_underlined).to_string(),
                level: raw.level,
                id: raw.id,
            }
        })
        .collect();

    // Las aristas pasan por identidad, conservando el orden.
    let edges = record
        .edges
        .into_iter()
        .map(|raw| DisplayEdge {
            source: raw.source,
            target: raw.target,
        })
        .collect();

    DisplayGraph { nodes, edges }
}

/// Primeros 30 caracteres del id, con "..." solo si excede.
fn truncate_label(id: &str) -> String {
    if id.chars().count() <= MAX_LABEL_CHARS {
        id.to_string()
    } else {
        let mut label: String = id.chars().take(MAX_LABEL_CHARS).collect();
        label.push_str("...");
        label
    }
}

/// Color determinista: el subrayado manda; si no, paleta por nivel.
fn node_color(level: u32, is_underlined: bool) -> &'static str {
    if is_underlined {
        HIGHLIGHT_COLOR
    } else {
        LEVEL_COLORS
            .get(level as usize)
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }
}
