use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, info};

use crate::{app_state::AppState, ingest};

// --- Router ---

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/upload", post(upload_handler))
        .route("/upload/:id", get(get_graph_handler))
        // El límite por defecto de axum (2 MB) se queda corto para un PDF
        // normal; el techo real viene de la configuración.
        .layer(DefaultBodyLimit::max(app_state.config.max_upload_bytes))
        .with_state(app_state)
}

// --- Handlers ---

/// Recibe un PDF por multipart, ejecuta el pipeline de ingesta y devuelve
/// el grafo normalizado junto con su id.
#[axum::debug_handler]
async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let mut file_name: Option<String> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        failure(
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart payload: {e}"),
        )
    })? {
        // Se acepta el primer campo que traiga fichero, sea cual sea su nombre.
        if let Some(name) = field.file_name().map(str::to_string) {
            let bytes = field.bytes().await.map_err(|e| {
                failure(
                    StatusCode::BAD_REQUEST,
                    format!("Could not read uploaded file: {e}"),
                )
            })?;
            file_name = Some(name);
            file_bytes = Some(bytes.to_vec());
            break;
        }
    }

    let (name, bytes) = match (file_name, file_bytes) {
        (Some(name), Some(bytes)) => (name, bytes),
        _ => {
            return Err(failure(
                StatusCode::BAD_REQUEST,
                "No file uploaded".to_string(),
            ));
        }
    };

    info!("Subida recibida: {} ({} bytes)", name, bytes.len());

    match ingest::ingest(&state.repository, &state.config, &bytes, &name).await {
        Ok(record) => Ok(Json(json!({
            "success": true,
            "message": "File processed successfully",
            "graphData": record.graph_data,
            "id": record.id,
        }))),
        Err(err) => {
            // El detalle interno (stderr del extractor, rutas) queda en el
            // log del operador; al cliente solo llega el mensaje público.
            error!("Fallo en la ingesta de '{}': {err}", name);
            Err(failure(err.status_code(), err.public_message()))
        }
    }
}

/// Sirve un grafo persistido por id. Un id inválido y uno desconocido
/// responden igual: 404.
#[axum::debug_handler]
async fn get_graph_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.repository.find_by_id(&id).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "graphData": record.graph_data,
            })),
        ),
        Ok(None) => failure(StatusCode::NOT_FOUND, "Graph not found".to_string()),
        Err(err) => {
            error!("Fallo recuperando el grafo {id}: {err}");
            failure(err.status_code(), err.public_message())
        }
    }
}

fn failure(status: StatusCode, message: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        status,
        Json(json!({ "success": false, "message": message })),
    )
}
