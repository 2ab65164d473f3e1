use axum::{
    extract::{State, WebSocketUpgrade},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod engine;
mod host;
mod protocol;
mod replay;
mod transport;

use app::config::{ServerConfig, ViewerOptions};
use engine::EngineClient;
use host::BroadcastHost;
use replay::scoreboard::order_snakes;
use replay::types::Snake;
use replay::viewer::Viewer;

type AppViewer = Viewer<EngineClient, BroadcastHost>;

#[derive(Clone)]
struct AppState {
    viewer: Arc<AppViewer>,
    host: BroadcastHost,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct ScoreboardResponse {
    turn: u32,
    snakes: Vec<Snake>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = ViewerOptions::from_env()?;
    let server = ServerConfig::from_env();

    let host = BroadcastHost::new();
    let engine = EngineClient::new(options.engine.clone());
    let viewer = Arc::new(Viewer::new(engine, host.clone(), options));
    tracing::info!(
        game = %viewer.options().game,
        engine = %viewer.options().engine,
        autoplay = viewer.options().autoplay,
        "viewer session created"
    );

    let session = Arc::clone(&viewer);
    tokio::spawn(async move {
        if let Err(error) = session.fetch_frames().await {
            tracing::warn!(?error, "frame stream failed");
        }
    });

    let state = Arc::new(AppState { viewer, host });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app: Router = Router::new()
        .route("/api/health", get(health))
        .route("/api/viewer", get(viewer_snapshot))
        .route("/api/viewer/ws", get(ws_handler))
        .route("/api/frame", get(current_frame))
        .route("/api/scoreboard", get(scoreboard))
        .layer(cors)
        .with_state(state);

    let address = server.address();
    tracing::info!("listening on {address}");
    let listener = tokio::net::TcpListener::bind(&address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

async fn viewer_snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.viewer.snapshot().await)
}

async fn current_frame(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.viewer.current_frame().await {
        Some(frame) => (StatusCode::OK, Json(frame)).into_response(),
        None => no_frame_yet(),
    }
}

async fn scoreboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Some(frame) = state.viewer.current_frame().await else {
        return no_frame_yet();
    };
    let snakes = order_snakes(&frame.snakes).into_iter().cloned().collect();
    (
        StatusCode::OK,
        Json(ScoreboardResponse {
            turn: frame.turn,
            snakes,
        }),
    )
        .into_response()
}

fn no_frame_yet() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            ok: false,
            error: "No frame received yet".to_string(),
        }),
    )
        .into_response()
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let viewer = Arc::clone(&state.viewer);
    let host = state.host.clone();
    ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, viewer, host))
}
