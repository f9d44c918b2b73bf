//! IRT gateway entrypoint.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use irt_cache::config::Config;
use irt_cache::gateway::CacheAsideGateway;
use irt_cache::key::TestId;
use irt_cache::payload::{InMemorySubjectSource, PayloadBuilder};
use irt_cache::scoring::HttpScoringClient;
use irt_cache::server::{HandlerState, create_router_with_state};
use irt_cache::store::{MemoryStore, RedisStore, RedisStoreConfig, Store};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Some(e) = unexpected_dotenv_error(dotenv) {
        tracing::warn!(error = %e, "Ignoring unreadable .env file");
    }

    let config = Config::from_env()?;
    config.validate()?;

    let one_shot = match args.iter().position(|arg| arg == "--resolve") {
        Some(i) => {
            let raw = args
                .get(i + 1)
                .context("--resolve requires a test id argument")?;
            Some(TestId::parse(raw)?)
        }
        None => None,
    };

    match config.redis_url()? {
        Some(url) => {
            let store = RedisStore::connect(&RedisStoreConfig::new(url))?;
            store
                .ping()
                .await
                .context("could not reach Redis at startup")?;
            tracing::info!(
                host = config.redis_host.as_deref().unwrap_or_default(),
                port = config.redis_port,
                db = config.redis_db,
                "Connected to Redis"
            );
            run(config, store, "redis", one_shot).await
        }
        None => {
            tracing::warn!("No REDIS_HOST configured, caching scores in process memory");
            run(config, MemoryStore::new(), "memory", one_shot).await
        }
    }
}

async fn run<S: Store + 'static>(
    config: Config,
    store: S,
    store_backend: &'static str,
    one_shot: Option<TestId>,
) -> anyhow::Result<()> {
    let client = HttpScoringClient::new(config.scoring_url.clone(), config.request_timeout)?;

    let source = match &config.subjects_path {
        Some(path) => InMemorySubjectSource::from_json_file(path)?,
        None => {
            tracing::warn!("No IRT_SUBJECTS_PATH configured, every test will be unavailable");
            InMemorySubjectSource::new()
        }
    };

    let gateway = CacheAsideGateway::new(store, client, PayloadBuilder::new(source))
        .with_default_deadline(config.resolve_deadline);

    if let Some(test_id) = one_shot {
        let resolution = gateway.resolve(&test_id).await?;
        tracing::info!(test_id = %test_id, status = %resolution.status, "Resolved");
        println!(
            "{}",
            serde_json::to_string_pretty(&resolution.into_response())?
        );
        return Ok(());
    }

    let addr: SocketAddr = config.socket_addr().parse()?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        scoring_url = %config.scoring_url,
        store = store_backend,
        "IRT gateway starting"
    );

    let app = create_router_with_state(HandlerState::new(gateway, store_backend));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("IRT gateway shutdown complete");
    Ok(())
}

/// A missing `.env` is normal; anything else is worth a warning.
fn unexpected_dotenv_error<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

async fn run_health_check() -> i32 {
    let port = std::env::var("IRT_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    probe_health(&format!("http://127.0.0.1:{}/healthz", port)).await
}

async fn probe_health(url: &str) -> i32 {
    let Ok(client) = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    else {
        return 1;
    };

    match client.get(url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
