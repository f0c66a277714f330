use taskboard::{build_app, serve, store::Store, AppConfig, AppState};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "taskboard=debug,axum=info,tower_http=info,sqlx=warn";

/// `RUST_LOG` overrides the filter. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.with_target(false).json().init(),
        _ => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let state = AppState::init(AppConfig::from_env()?).await?;
    let store = state.store.clone();
    let config = state.config.clone();

    let served = serve(build_app(state), &config).await;
    store.close().await;
    served
}
