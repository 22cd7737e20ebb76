//! Invocación del extractor externo como subproceso aislado.
//!
//! El extractor recibe exactamente tres rutas posicionales: el PDF origen,
//! el destino del HTML renderizado y el destino del JSON estructurado.
//! Debe terminar con estado 0 y dejar el JSON en la tercera ruta.

use std::process::Stdio;
use std::time::Duration;

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::IngestError;
use crate::models::ExtractionRequest;

/// Lanza una invocación del extractor y espera a que termine.
///
/// Cada invocación es independiente: no comparte estado mutable con otras
/// más allá de sus rutas, que son únicas por petición. No hay reintentos;
/// el orquestador decide qué hacer con el fallo.
pub async fn invoke(
    extractor_cmd: &[String],
    timeout_secs: u64,
    request: &ExtractionRequest,
) -> Result<(), IngestError> {
    // AppConfig::from_env rechaza un EXTRACTOR_CMD vacío.
    let (program, base_args) = extractor_cmd.split_first().ok_or_else(|| {
        error!("Comando del extractor vacío");
        IngestError::ExtractionProcess { status: -1 }
    })?;

    info!(
        "Invocando extractor: {} {}",
        program,
        request.source_path.display()
    );

    // Vector de argumentos explícito; los nombres de fichero nunca pasan
    // por un shell.
    let mut command = Command::new(program);
    command
        .args(base_args)
        .arg(&request.source_path)
        .arg(&request.rendered_output_path)
        .arg(&request.structured_output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|e| {
        error!("No se pudo lanzar el extractor '{program}': {e}");
        IngestError::ExtractionProcess { status: -1 }
    })?;

    let output = if timeout_secs == 0 {
        child
            .wait_with_output()
            .await
            .map_err(|_| IngestError::ExtractionProcess { status: -1 })?
    } else {
        match tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(result) => result.map_err(|_| IngestError::ExtractionProcess { status: -1 })?,
            Err(_) => {
                error!("El extractor superó el límite de {timeout_secs}s y fue terminado");
                return Err(IngestError::ExtractionTimeout {
                    seconds: timeout_secs,
                });
            }
        }
    };

    // La salida del subproceso es solo diagnóstico de operador; nunca
    // se devuelve al cliente.
    if !output.stdout.is_empty() {
        debug!(
            "stdout del extractor: {}",
            String::from_utf8_lossy(&output.stdout).trim()
        );
    }

    if !output.status.success() {
        let status = output.status.code().unwrap_or(-1);
        error!(
            "El extractor terminó con estado {status}. stderr: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Err(IngestError::ExtractionProcess { status });
    }

    // Estado 0 pero sin fichero estructurado: fallo igualmente terminal.
    match fs::try_exists(&request.structured_output_path).await {
        Ok(true) => Ok(()),
        _ => {
            error!(
                "El extractor terminó bien pero falta {}",
                request.structured_output_path.display()
            );
            Err(IngestError::ExtractionOutputMissing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn request_en(dir: &Path) -> ExtractionRequest {
        ExtractionRequest {
            source_path: dir.join("doc.pdf"),
            rendered_output_path: dir.join("doc.html"),
            structured_output_path: dir.join("doc.json"),
        }
    }

    /// Escribe un script de shell ejecutable que hace de extractor falso.
    fn extractor_falso(dir: &Path, body: &str) -> Vec<String> {
        let path = dir.join("extractor.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        vec![path.to_string_lossy().to_string()]
    }

    #[tokio::test]
    async fn estado_distinto_de_cero_es_fallo_de_proceso() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = extractor_falso(dir.path(), "echo 'fallo interno' >&2\nexit 3");
        let err = invoke(&cmd, 30, &request_en(dir.path())).await.unwrap_err();
        assert!(matches!(err, IngestError::ExtractionProcess { status: 3 }));
    }

    #[tokio::test]
    async fn exito_sin_fichero_de_salida_es_fallo() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = extractor_falso(dir.path(), "exit 0");
        let err = invoke(&cmd, 30, &request_en(dir.path())).await.unwrap_err();
        assert!(matches!(err, IngestError::ExtractionOutputMissing));
    }

    #[tokio::test]
    async fn exito_con_fichero_de_salida_es_ok() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = extractor_falso(
            dir.path(),
            "echo '{\"nodes\":[],\"edges\":[]}' > \"$3\"",
        );
        invoke(&cmd, 30, &request_en(dir.path())).await.unwrap();
        assert!(request_en(dir.path()).structured_output_path.exists());
    }

    #[tokio::test]
    async fn un_extractor_colgado_devuelve_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = extractor_falso(dir.path(), "sleep 30");
        let err = invoke(&cmd, 1, &request_en(dir.path())).await.unwrap_err();
        assert!(matches!(err, IngestError::ExtractionTimeout { seconds: 1 }));
    }
}
