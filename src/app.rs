use crate::cache::{CacheStore, RETENTION, SWEEP_INTERVAL};
use crate::config::Config;
use crate::synthesis::SynthesisPipeline;
use anyhow::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub cache: Arc<CacheStore>,
    pub pipeline: SynthesisPipeline,
    pub token: CancellationToken,
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateBuilder {
    pub config: Option<Config>,
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        let cache = Arc::new(CacheStore::new(&config.cache_path));
        let pipeline = SynthesisPipeline::new(config.clone(), cache.clone());
        Ok(Arc::new(AppStateInner {
            config,
            cache,
            pipeline,
            token: CancellationToken::new(),
        }))
    }
}

pub async fn run(state: AppState) -> Result<()> {
    let token = state.token.clone();
    let app = create_router(state.clone());
    let addr: SocketAddr = state.config.http_addr.parse()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return Err(anyhow::anyhow!("Failed to bind to {}: {}", addr, e));
        }
    };

    let sweeper = tokio::spawn(sweep_loop(state.cache.clone(), token.clone()));

    let shutdown_token = token.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await;
    token.cancel();
    sweeper.abort();
    match result {
        Ok(_) => {
            info!("Server shut down gracefully");
            Ok(())
        }
        Err(e) => {
            error!("Server error: {}", e);
            Err(anyhow::anyhow!("Server error: {}", e))
        }
    }
}

/// Sweep once at startup and then on a fixed tick until shutdown. The sweep
/// runs concurrently with in-flight writes; the store tolerates that.
async fn sweep_loop(cache: Arc<CacheStore>, token: CancellationToken) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        select! {
            _ = interval.tick() => {
                let removed = cache.sweep(RETENTION).await;
                if removed > 0 {
                    info!("cache sweep removed {} artifacts", removed);
                }
            }
            _ = token.cancelled() => break,
        }
    }
}

fn create_router(state: AppState) -> Router {
    // CORS configuration to allow cross-origin requests
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::ORIGIN,
        ]);

    crate::handler::router().with_state(state).layer(cors)
}
