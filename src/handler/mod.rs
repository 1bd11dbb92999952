use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub mod stt;
pub mod tts;
pub mod voices;

#[cfg(test)]
mod tests;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tts", post(tts::synthesize_handler))
        .route("/tts/{id}", get(tts::download_handler))
        .route("/stt", post(stt::transcribe_handler))
        .route("/voices", get(voices::list_voices))
}
