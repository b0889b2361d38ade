use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use study_backend::config::AppConfig;
use study_backend::export::EXPORT_RETENTION;
use study_backend::routes::create_router;
use study_backend::state::AppState;

const BANNER: &str = r#"
   _____ _             _         ____             _                  _
  / ____| |           | |       |  _ \           | |                | |
 | (___ | |_ _   _  __| |_   _  | |_) | __ _  ___| | _____ _ __   __| |
  \___ \| __| | | |/ _` | | | | |  _ < / _` |/ __| |/ / _ \ '_ \ / _` |
  ____) | |_| |_| | (_| | |_| | | |_) | (_| | (__|   <  __/ | | | (_| |
 |_____/ \__|\__,_|\__,_|\__, | |____/ \__,_|\___|_|\_\___|_| |_|\__,_|
                          __/ |
                         |___/   [AI Study Planner, Notes & Chat]
"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("study_backend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("{}", BANNER);

    let config = AppConfig::from_env().context("failed to load configuration")?;

    info!("🔧 SYSTEM CHECK");
    info!("    ├─ 🧠 Gemini models : {}", config.gemini.models.join(" → "));
    info!("    ├─ ⏱️  Model timeout : {}s", config.gemini.timeout.as_secs());
    info!("    ├─ 🎬 YouTube       : {}", config.youtube_base_url);
    info!("    ├─ 📄 Export dir    : {}", config.export_dir.display());
    info!("    └─ 🌐 CORS origins  : {}", config.allowed_origins.join(", "));

    let state = AppState::from_config(&config).context("failed to build application state")?;
    if let Err(e) = state.exporter.sweep_stale(EXPORT_RETENTION).await {
        warn!("Could not sweep stale exports: {}", e);
    }
    let app = create_router(state, &config.allowed_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("🚀 Study backend listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
