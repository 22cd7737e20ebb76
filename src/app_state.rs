use std::sync::Arc;
use crate::{config::AppConfig, repository::GraphRepository};

/// Estado compartido de la aplicación. El repositorio se construye una vez
/// en el arranque y viaja con el estado; no hay conexiones globales.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<GraphRepository>,
}
