use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use back2u_match::config::{NotifierMode, ScoringBackend, Settings};
use back2u_match::core::{HeuristicScorer, MatchPipeline, MatchScorer};
use back2u_match::models::ScoringWeights;
use back2u_match::routes::{self, matches::AppState};
use back2u_match::services::{
    DisabledEmail, EmailSender, HttpNotifier, ItemStore, MatchStore, MemoryStore,
    NotificationService, NotificationStore, Notifier, OracleScorer, PostgresClient, ResendClient,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn io_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_logging("info", "compact");
            error!("Failed to load configuration: {}", e);
            return Err(io_error("Configuration error", e));
        }
    };

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&log_level, &log_format);

    info!("Starting Back2U match service...");

    // Storage
    let (items, matches, notification_store, postgres): (
        Arc<dyn ItemStore>,
        Arc<dyn MatchStore>,
        Arc<dyn NotificationStore>,
        Option<Arc<PostgresClient>>,
    ) = if settings.database.in_memory {
        warn!("Using in-memory store; nothing will survive a restart");
        let store = Arc::new(MemoryStore::new());
        (
            store.clone() as Arc<dyn ItemStore>,
            store.clone() as Arc<dyn MatchStore>,
            store as Arc<dyn NotificationStore>,
            None,
        )
    } else {
        let pg = PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            io_error("PostgreSQL connection error", e)
        })?;
        let pg = Arc::new(pg);
        info!("PostgreSQL client initialized");
        (
            pg.clone() as Arc<dyn ItemStore>,
            pg.clone() as Arc<dyn MatchStore>,
            pg.clone() as Arc<dyn NotificationStore>,
            Some(pg),
        )
    };

    // Email + in-process notification sink
    let email: Arc<dyn EmailSender> = match &settings.email.api_key {
        Some(key) if !key.is_empty() => Arc::new(
            ResendClient::new(
                settings.email.api_url.clone(),
                key.clone(),
                settings.email.from.clone(),
            )
            .map_err(|e| io_error("Email client error", e))?,
        ),
        _ => {
            warn!("No email API key configured, email notifications disabled");
            Arc::new(DisabledEmail)
        }
    };

    let notifications = Arc::new(NotificationService::new(
        notification_store,
        email,
        settings.email.app_url.clone(),
    ));

    let notifier: Arc<dyn Notifier> = match settings.notifier.mode {
        NotifierMode::Direct => notifications.clone() as Arc<dyn Notifier>,
        NotifierMode::Http => {
            let endpoint = settings
                .notifier
                .endpoint
                .clone()
                .ok_or_else(|| io_error("Configuration error", "notifier.endpoint is required in http mode"))?;
            info!("Forwarding notifications to {}", endpoint);
            Arc::new(
                HttpNotifier::new(
                    endpoint,
                    settings.notifier.service_key.clone(),
                    Duration::from_secs(settings.notifier.timeout_secs),
                )
                .map_err(|e| io_error("Notifier client error", e))?,
            )
        }
    };

    // Scorer
    let scorer: Arc<dyn MatchScorer> = match settings.scoring.backend {
        ScoringBackend::Oracle => {
            if settings.oracle.api_key.is_empty() {
                warn!("Oracle API key is empty; scoring requests will likely be rejected");
            }
            info!("Scoring with oracle model {}", settings.oracle.model);
            Arc::new(
                OracleScorer::new(
                    settings.oracle.endpoint.clone(),
                    settings.oracle.api_key.clone(),
                    settings.oracle.model.clone(),
                    Duration::from_secs(settings.oracle.timeout_secs),
                )
                .map_err(|e| io_error("Oracle client error", e))?,
            )
        }
        ScoringBackend::Heuristic => {
            let weights = ScoringWeights {
                text: settings.scoring.weights.text,
                location: settings.scoring.weights.location,
                date: settings.scoring.weights.date,
            };
            info!("Scoring with heuristic weights: {:?}", weights);
            Arc::new(HeuristicScorer::new(weights, settings.scoring.date_window_days))
        }
    };

    let pipeline = Arc::new(MatchPipeline::new(items, matches.clone(), scorer, notifier));

    // Build application state
    let app_state = AppState {
        pipeline,
        matches,
        notifications,
        postgres,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::extractor_configs)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
