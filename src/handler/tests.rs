use crate::app::{AppState, AppStateBuilder};
use crate::config::Config;
use crate::handler::{stt, tts, voices};
use crate::media::AudioFormat;
use crate::synthesis::{SynthesisOption, SynthesisRequest};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::Json;
use bytes::Bytes;

fn test_state(dir: &std::path::Path) -> AppState {
    let mut config = Config::default();
    config.cache_path = dir.to_string_lossy().to_string();
    AppStateBuilder::new().config(config).build().unwrap()
}

fn request(text: &str) -> SynthesisRequest {
    SynthesisRequest {
        text: text.to_string(),
        engine: None,
        format: None,
        option: SynthesisOption::default(),
    }
}

#[tokio::test]
async fn test_invalid_format_rejected_before_any_engine() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let mut req = request("Hello world.");
    req.format = Some("ogg".to_string());
    let err = tts::synthesize_handler(State(state), Json(req))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_empty_text_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let err = tts::synthesize_handler(State(state), Json(request("  ")))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_engine_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let mut req = request("Hello world.");
    req.engine = Some("espeak".to_string());
    let err = tts::synthesize_handler(State(state), Json(req))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[cfg(not(feature = "piper"))]
#[tokio::test]
async fn test_unavailable_engine_returns_503_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    // Default engine is piper, which is not compiled into this build.
    let err = tts::synthesize_handler(State(state), Json(request("Hello world.")))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_download_cached_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let artifact = state
        .cache
        .write(b"RIFF fake wav bytes", AudioFormat::Wav)
        .await
        .unwrap();

    let response = tts::download_handler(State(state), Path(artifact.id.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/wav"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains(&format!("output_{}.wav", artifact.id)));
}

#[tokio::test]
async fn test_download_unknown_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let err = tts::download_handler(
        State(state.clone()),
        Path(uuid::Uuid::new_v4().to_string()),
    )
    .await
    .err()
    .unwrap();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let err = tts::download_handler(State(state), Path("not-a-uuid".to_string()))
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stt_requires_audio_payload() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let params = Query(stt::SttParams {
        language: None,
        sample_rate: None,
    });
    let err = stt::transcribe_handler(State(state), params, Bytes::new())
        .await
        .err()
        .unwrap();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_voices() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let response = voices::list_voices(State(state)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["voices"].as_array().unwrap().len() >= 3);
    assert_eq!(json["engines"]["google"]["chunking"], "delegated");
    assert_eq!(json["engines"]["piper"]["chunking"], "enforced");
}

#[tokio::test]
async fn test_request_deserializes_camel_case() {
    let raw = r#"{
        "text": "Hello world.",
        "engine": "piper",
        "format": "mp3",
        "voice": "en_us",
        "speakerId": 2,
        "sentenceSilence": 0.3
    }"#;
    let request: SynthesisRequest = serde_json::from_str(raw).unwrap();
    assert_eq!(request.engine.as_deref(), Some("piper"));
    assert_eq!(request.option.speaker_id, Some(2));
    assert_eq!(request.option.sentence_silence, Some(0.3));
}
