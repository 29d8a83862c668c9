// Framework bootstrap for the vote runner.

use crate::domain::ports::ProgressLog;
use crate::frameworks::config::{self, PollConfig};
use crate::interface_adapters::clients::{HandshakeClient, HandshakeSettings, WsConnector};
use crate::interface_adapters::log::TracingLog;
use crate::use_cases::{CastVoteUseCase, FetchSettingsUseCase, RunSummary, VoteRunner};

use std::{io::Result, sync::Arc};
use tokio::sync::watch;

const DEFAULT_LOG_FILTER: &str = "info";

/// Output encoding for the tracing subscriber, picked by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    // A host that already installed a subscriber keeps it.
    let installed = match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "vote runner panicked");
    }));
}

/// Wires the reqwest and tokio-tungstenite adapters into a runner.
pub fn build_runner(
    config: &PollConfig,
    log: Arc<dyn ProgressLog>,
) -> Result<VoteRunner<HandshakeClient, WsConnector>> {
    let handshake = HandshakeClient::new(HandshakeSettings {
        url: config.handshake_url.clone(),
        referer: config.referer.clone(),
        user_agent: config.user_agent.clone(),
        timeout: config.http_timeout,
    })
    .map_err(|e| std::io::Error::other(format!("failed to initialize handshake client: {e}")))?;
    tracing::debug!(
        handshake_url = %config.handshake_url,
        riddle_id = config.riddle_id,
        answer = %config.answer,
        http_timeout_ms = config.http_timeout.as_millis(),
        exchange_timeout_ms = config.exchange_timeout.as_millis(),
        "vote runner configured"
    );

    Ok(VoteRunner {
        fetch_settings: FetchSettingsUseCase {
            gateway: handshake,
            log: log.clone(),
        },
        cast_vote: CastVoteUseCase {
            connector: WsConnector,
            ballot: config.ballot(),
            exchange_timeout: config.exchange_timeout,
            log: log.clone(),
        },
        delay: config.delay,
        repeat: config.repeat,
        log,
    })
}

pub async fn run(config: PollConfig, shutdown: watch::Receiver<bool>) -> Result<RunSummary> {
    let runner = build_runner(&config, Arc::new(TracingLog))?;
    Ok(runner.run(shutdown).await)
}

pub async fn run_with_config() -> Result<RunSummary> {
    init_runtime();

    let config = config::load()
        .inspect_err(|e| tracing::error!(error = %e, "failed to load configuration"))
        .map_err(std::io::Error::other)?;

    // Ctrl-C stops the repeat loop; an in-flight attempt still completes.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl-c received");
            let _ = shutdown_tx.send(true);
        }
    });

    run(config, shutdown_rx).await
}
