use crate::app::AppState;
use crate::error::EngineError;
use crate::media::AudioFormat;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::synthesis::SynthesisRequest;

fn artifact_response(bytes: Vec<u8>, format: AudioFormat, id: &Uuid) -> Response {
    let filename = format!("output_{}.{}", id, format.extension());
    (
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// POST /tts: synthesize the request and answer with the audio file.
pub async fn synthesize_handler(
    State(state): State<AppState>,
    Json(request): Json<SynthesisRequest>,
) -> Result<Response, EngineError> {
    let artifact = state.pipeline.synthesize(&request).await?;
    info!(
        "tts: engine={} -> {}",
        request.engine.as_deref().unwrap_or("piper"),
        artifact.path.display()
    );
    let bytes = tokio::fs::read(&artifact.path).await?;
    Ok(artifact_response(bytes, artifact.format, &artifact.id))
}

/// GET /tts/{id}: re-serve a cached artifact until the sweep removes it.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, EngineError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| EngineError::NotFound(format!("unknown artifact id: {}", id)))?;
    let (path, format) = state
        .cache
        .artifact_path(&id)
        .await
        .ok_or_else(|| EngineError::NotFound(format!("artifact {} not found", id)))?;
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        // Swept between lookup and read.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EngineError::NotFound(format!("artifact {} not found", id)))
        }
        Err(e) => return Err(EngineError::Internal(e.to_string())),
    };
    Ok(artifact_response(bytes, format, &id))
}
