// Módulos de la aplicación
mod api;
mod app_state;
mod config;
mod error;
mod extractor;
mod ingest;
mod intake;
mod models;
mod normalize;
mod repository;

use std::sync::Arc;

use crate::app_state::AppState;
use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env().expect("Error al cargar la configuración");

    // 3. Preparar directorios de trabajo y abrir el repositorio de grafos
    intake::ensure_uploads_dir(&cfg.uploads_dir)
        .await
        .expect("Error creando el directorio de subidas");
    tokio::fs::create_dir_all(&cfg.outputs_dir)
        .await
        .expect("Error creando el directorio de salidas");
    let repository = repository::GraphRepository::open(cfg.data_dir.clone())
        .await
        .expect("Error abriendo el repositorio de grafos");

    // 4. Crear estado compartido de la aplicación
    let app_state = AppState {
        config: cfg.clone(),
        repository: Arc::new(repository),
    };

    // 5. Configurar el router de la API y el servicio de ficheros estáticos.
    // Los HTML renderizados por el extractor se sirven tal cual bajo /outputs.
    let app = Router::new()
        .merge(api::create_router(app_state.clone()))
        .nest_service("/outputs", ServeDir::new(&cfg.outputs_dir))
        .fallback_service(ServeDir::new("frontend"))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // 6. Iniciar el servidor
    let server_addr = &app_state.config.server_addr;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .expect("No se pudo abrir el puerto del servidor");
    info!("🚀 Servidor escuchando en http://{}", server_addr);

    axum::serve(listener, app)
        .await
        .expect("El servidor terminó con error");
}
