//! Repositorio de grafos persistidos: un registro JSON inmutable por
//! ingesta, con su propio UUID, que sobrevive a reinicios del proceso.

use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::IngestError;
use crate::models::{DisplayGraph, PersistedGraph};

/// Handle explícito sobre el directorio de datos. Se abre una vez en el
/// arranque y se pasa a quien lo necesita; no hay estado global.
#[derive(Debug, Clone)]
pub struct GraphRepository {
    data_dir: PathBuf,
}

impl GraphRepository {
    /// Abre el repositorio, creando el directorio de datos si no existe.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .await
            .map_err(IngestError::Repository)?;
        info!("Repositorio de grafos abierto en {}", data_dir.display());
        Ok(Self { data_dir })
    }

    /// Persiste un grafo normalizado y devuelve el registro con su id recién
    /// asignado. Cada registro recibe un UUID distinto, así que las
    /// escrituras concurrentes no compiten entre sí.
    pub async fn save(
        &self,
        filename: &str,
        graph_data: DisplayGraph,
        rendered_output_path: &Path,
        source_path: &Path,
    ) -> Result<PersistedGraph, IngestError> {
        let record = PersistedGraph {
            id: Uuid::new_v4(),
            filename: filename.to_string(),
            graph_data,
            rendered_output_path: rendered_output_path.to_path_buf(),
            source_path: source_path.to_path_buf(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| IngestError::Repository(io::Error::new(io::ErrorKind::Other, e)))?;

        // Escritura a temporal + rename: el registro o existe completo o
        // no existe.
        let final_path = self.record_path(&record.id);
        let tmp_path = final_path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .await
            .map_err(IngestError::Repository)?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(IngestError::Repository)?;

        info!("Grafo persistido con id {}", record.id);
        Ok(record)
    }

    /// Busca un grafo por id. Un id sintácticamente inválido y un id bien
    /// formado pero inexistente producen el mismo `Ok(None)`: el llamante
    /// no distingue validez de existencia.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<PersistedGraph>, IngestError> {
        let uuid = match Uuid::parse_str(id) {
            Ok(uuid) => uuid,
            Err(_) => return Ok(None),
        };

        let path = self.record_path(&uuid);
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IngestError::Repository(e)),
        };

        // Un registro ilegible es un fallo del almacén, no un "no encontrado".
        serde_json::from_slice(&contents).map(Some).map_err(|e| {
            warn!("Registro corrupto en {}: {e}", path.display());
            IngestError::Repository(io::Error::new(io::ErrorKind::InvalidData, e))
        })
    }

    fn record_path(&self, id: &Uuid) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DisplayEdge, DisplayNode};

    fn grafo_de_prueba() -> DisplayGraph {
        DisplayGraph {
            nodes: vec![DisplayNode {
                id: "Introduction".to_string(),
                label: "Introduction".to_string(),
                title: "(No description)".to_string(),
                level: 0,
                color: "#ff0000".to_string(),
            }],
            edges: vec![DisplayEdge {
                source: "Introduction".to_string(),
                target: "Background".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn guarda_y_recupera_el_mismo_grafo() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GraphRepository::open(dir.path()).await.unwrap();

        let saved = repo
            .save(
                "informe.pdf",
                grafo_de_prueba(),
                Path::new("outputs/x.html"),
                Path::new("uploads/x.pdf"),
            )
            .await
            .unwrap();

        let found = repo
            .find_by_id(&saved.id.to_string())
            .await
            .unwrap()
            .expect("el grafo recién guardado debe existir");
        assert_eq!(found.filename, "informe.pdf");
        assert_eq!(found.graph_data, saved.graph_data);
    }

    #[tokio::test]
    async fn la_recuperacion_repetida_es_identica() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GraphRepository::open(dir.path()).await.unwrap();
        let saved = repo
            .save(
                "doc.pdf",
                grafo_de_prueba(),
                Path::new("out.html"),
                Path::new("doc.pdf"),
            )
            .await
            .unwrap();

        let id = saved.id.to_string();
        let primera = repo.find_by_id(&id).await.unwrap().unwrap();
        let segunda = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(
            serde_json::to_string(&primera.graph_data).unwrap(),
            serde_json::to_string(&segunda.graph_data).unwrap()
        );
    }

    #[tokio::test]
    async fn id_invalido_e_id_desconocido_son_indistinguibles() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GraphRepository::open(dir.path()).await.unwrap();

        assert!(repo.find_by_id("no-es-un-uuid").await.unwrap().is_none());
        assert!(repo
            .find_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn los_registros_sobreviven_a_una_reapertura() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let repo = GraphRepository::open(dir.path()).await.unwrap();
            repo.save(
                "doc.pdf",
                grafo_de_prueba(),
                Path::new("out.html"),
                Path::new("doc.pdf"),
            )
            .await
            .unwrap()
            .id
        };

        let reopened = GraphRepository::open(dir.path()).await.unwrap();
        let found = reopened.find_by_id(&id.to_string()).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn guardados_concurrentes_no_colisionan() {
        let dir = tempfile::tempdir().unwrap();
        let repo = GraphRepository::open(dir.path()).await.unwrap();

        let mut tareas = Vec::new();
        for i in 0..8 {
            let repo = repo.clone();
            tareas.push(tokio::spawn(async move {
                repo.save(
                    &format!("doc-{i}.pdf"),
                    grafo_de_prueba(),
                    Path::new("out.html"),
                    Path::new("doc.pdf"),
                )
                .await
                .unwrap()
                .id
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for tarea in tareas {
            ids.insert(tarea.await.unwrap());
        }
        assert_eq!(ids.len(), 8);
    }
}
