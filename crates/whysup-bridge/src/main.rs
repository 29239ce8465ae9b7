//! why-sup Bridge
//!
//! Local HTTP server that carries usage_stats channel calls from the host
//! shell to the engine.

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use whysup_core::{
    ChannelResult, Engine, EngineConfig, MethodCall, UsageStatsChannel, CHANNEL_NAME,
};
use whysup_device::DeviceProfile;

#[derive(Parser)]
#[command(name = "whysup-bridge")]
#[command(about = "Serve the usage_stats channel over HTTP")]
#[command(version)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:7891")]
    addr: String,

    /// Device profile (defaults to device.json in the data directory)
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

type SharedEngine = Arc<Engine<DeviceProfile>>;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whysup=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::load_default()?,
    };
    let path = args.device.unwrap_or_else(whysup_core::device_path);
    let device = DeviceProfile::load(&path)
        .with_context(|| format!("Failed to load device {}", path.display()))?;

    let app = router(Arc::new(Engine::new(device, config)));

    info!("Serving channel {} at http://{}", CHANNEL_NAME, args.addr);

    let listener = tokio::net::TcpListener::bind(&args.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/channel/*name", post(channel_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn channel_handler(
    State(engine): State<SharedEngine>,
    Path(name): Path<String>,
    Json(call): Json<MethodCall>,
) -> (StatusCode, Json<ChannelResult>) {
    if name.trim_start_matches('/') != CHANNEL_NAME {
        return (StatusCode::NOT_FOUND, Json(ChannelResult::NotImplemented));
    }

    // Engine calls block on OS services
    let task = tokio::task::spawn_blocking(move || {
        let channel = UsageStatsChannel::new(&*engine);
        channel.handle(&call)
    });

    match task.await {
        Ok(result) => (StatusCode::OK, Json(result)),
        Err(e) => {
            error!("Channel call panicked: {}", e);
            let result = ChannelResult::Error {
                code: "INTERNAL".to_string(),
                message: e.to_string(),
                details: serde_json::Value::Null,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(result))
        }
    }
}
