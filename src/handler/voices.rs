use crate::app::AppState;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

fn google_configured(state: &AppState) -> bool {
    state.config.google.api_key.is_some()
        || std::env::var("GOOGLE_API_KEY")
            .map(|key| !key.is_empty())
            .unwrap_or(false)
}

/// GET /voices: configured local voices and per-engine availability.
pub async fn list_voices(State(state): State<AppState>) -> Response {
    let mut voices: Vec<&str> = state
        .config
        .piper
        .voices
        .keys()
        .map(|k| k.as_str())
        .collect();
    voices.sort();

    Json(json!({
        "voices": voices,
        "defaultVoice": state.config.piper.default_voice,
        "engines": {
            "piper": {
                "available": cfg!(feature = "piper"),
                "chunking": "enforced",
            },
            "google": {
                "available": google_configured(&state),
                "chunking": "delegated",
            },
            "indic": {
                "available": state.config.indic.endpoint.is_some(),
                "chunking": "delegated",
            },
            "persian": {
                "available": state.config.persian.endpoint.is_some(),
                "chunking": "delegated",
            },
        },
    }))
    .into_response()
}
