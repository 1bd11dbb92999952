use crate::app::AppState;
use crate::error::EngineError;
use crate::transcription::{create_transcription_client, TranscriptionOption};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SttParams {
    pub language: Option<String>,
    pub sample_rate: Option<u32>,
}

/// POST /stt: recognize raw LINEAR16 audio from the request body.
pub async fn transcribe_handler(
    State(state): State<AppState>,
    Query(params): Query<SttParams>,
    body: Bytes,
) -> Result<Response, EngineError> {
    if body.is_empty() {
        return Err(EngineError::InvalidArgument(
            "Audio payload is required.".to_string(),
        ));
    }
    let client = create_transcription_client(&state.config)?;
    let option = TranscriptionOption {
        language: params.language,
        sample_rate: params.sample_rate,
    };
    let text = client.transcribe(&body, &option).await?;
    Ok(Json(json!({ "text": text })).into_response())
}
