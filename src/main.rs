use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use line_responder::broadcast::{self, BroadcastScheduler};
use line_responder::channels::{DeliveryGateway, LineGateway};
use line_responder::clock::{Clock, SystemClock};
use line_responder::config::ResponderConfig;
use line_responder::pipeline::Dispatcher;
use line_responder::responder::{IntentClassifier, ResponseGenerator, ThreadRandom};
use line_responder::server::responder_routes;

/// Heartbeat log interval in production.
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(25 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ResponderConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export CHANNEL_ACCESS_TOKEN=... CHANNEL_SECRET=...");
        std::process::exit(1);
    });

    eprintln!("🤖 LINE Responder v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Port: {}", config.port);
    eprintln!("   Environment: {}", config.environment);
    eprintln!("   Timezone: {}", config.timezone);
    eprintln!("   LINE API: {}", config.api_base);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let gateway: Arc<dyn DeliveryGateway> = Arc::new(LineGateway::new(
        config.channel_access_token.clone(),
        config.api_base.clone(),
        config.delivery_timeout,
    )?);

    // ── Reply pipeline ──────────────────────────────────────────────────
    let classifier = Arc::new(IntentClassifier::default_rules());
    let generator = Arc::new(ResponseGenerator::with_default_catalog(
        config.timezone,
        Arc::new(ThreadRandom),
        Arc::clone(&clock),
    ));
    let dispatcher = Arc::new(Dispatcher::new(classifier, generator, Arc::clone(&gateway)));

    // ── Scheduled broadcasts ────────────────────────────────────────────
    let scheduler_handle = if config.broadcast_enabled {
        let triggers = broadcast::default_triggers(config.timezone)?;
        let scheduler = Arc::new(BroadcastScheduler::new(
            triggers,
            Arc::clone(&gateway),
            Arc::clone(&clock),
            config.scheduler_tick,
        ));

        eprintln!(
            "   Broadcasts: enabled (tick every {}s)",
            scheduler.tick_interval().as_secs()
        );
        for (name, next) in scheduler.upcoming(clock.now()) {
            let next = next
                .map(|t| t.with_timezone(&config.timezone).to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            eprintln!("     - {name}: next at {next}");
        }

        Some(broadcast::spawn_scheduler(scheduler))
    } else {
        eprintln!("   Broadcasts: disabled");
        None
    };

    if config.is_production() {
        tokio::spawn(async {
            let mut ticker = tokio::time::interval(KEEPALIVE_INTERVAL);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                tracing::info!(time = %chrono::Utc::now().to_rfc3339(), "Keep-alive");
            }
        });
    }

    // ── HTTP ────────────────────────────────────────────────────────────
    let app = responder_routes(
        dispatcher,
        config.channel_secret.clone(),
        config.environment.clone(),
    );
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    eprintln!("   Endpoints: GET / (health), GET /ping, POST /webhook\n");
    tracing::info!(port = config.port, "Server started");

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    let scheduler = async move {
        match scheduler_handle {
            Some(handle) => handle.await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server stopped");
        }
        joined = scheduler => {
            // The scheduler loop never returns on its own; reaching here means it died.
            let reason = match joined {
                Err(e) if e.is_panic() => "panicked",
                Err(_) => "was cancelled",
                Ok(()) => "exited",
            };
            tracing::error!("Broadcast scheduler {reason}, shutting down");
            anyhow::bail!("broadcast scheduler {reason}");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
