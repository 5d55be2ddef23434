//! QC Release service host.
//!
//! Hosts any subset of the catalog, QC and QA services behind one message
//! endpoint. Co-hosted services call each other in-process; everything else
//! goes over HTTP to the configured base URLs.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use qc_release::adapters::events::TracingEventPublisher;
use qc_release::adapters::gateway::{
    GatewayDispositionSink, GatewayQcReader, GatewayTestCatalog, HttpGateway, InProcessGateway,
};
use qc_release::adapters::http::{messaging_router, MessagingAppState};
use qc_release::adapters::memory::{
    InMemoryReleaseRepository, InMemoryResultRepository, InMemorySampleRepository,
    InMemoryTestRepository,
};
use qc_release::adapters::messaging::{CatalogService, QaService, QcService};
use qc_release::adapters::postgres::{
    self, PostgresReleaseRepository, PostgresResultRepository, PostgresSampleRepository,
    PostgresTestRepository,
};
use qc_release::config::{AppConfig, DatabaseConfig};
use qc_release::ports::{
    EventPublisher, MessageHandler, ReleaseRepository, ResultRepository, SampleRepository,
    ServiceGateway, ServiceTarget, TestRepository,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct Repositories {
    tests: Arc<dyn TestRepository>,
    samples: Arc<dyn SampleRepository>,
    results: Arc<dyn ResultRepository>,
    releases: Arc<dyn ReleaseRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        let results = Arc::new(InMemoryResultRepository::new());
        Self {
            tests: Arc::new(InMemoryTestRepository::new()),
            samples: Arc::new(InMemorySampleRepository::with_results(results.clone())),
            results,
            releases: Arc::new(InMemoryReleaseRepository::new()),
        }
    }

    async fn postgres(config: &DatabaseConfig) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .connect(&config.url)
            .await?;

        if config.run_migrations {
            postgres::migrate(&pool).await?;
            info!("database migrations applied");
        }

        Ok(Self {
            tests: Arc::new(PostgresTestRepository::new(pool.clone())),
            samples: Arc::new(PostgresSampleRepository::new(pool.clone())),
            results: Arc::new(PostgresResultRepository::new(pool.clone())),
            releases: Arc::new(PostgresReleaseRepository::new(pool)),
        })
    }
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let hosted = config.server.hosted_services()?;
    let repositories = match &config.database {
        Some(database) => Repositories::postgres(database).await?,
        None => {
            warn!("no database configured, using in-memory repositories");
            Repositories::in_memory()
        }
    };

    let remote = HttpGateway::new(config.gateway.base_urls(), config.gateway.default_timeout());
    let in_process = Arc::new(
        InProcessGateway::new(config.gateway.default_timeout()).with_remote(Arc::new(remote)),
    );
    let gateway: Arc<dyn ServiceGateway> = in_process.clone();
    let publisher: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher::new());

    let mut handlers: Vec<Arc<dyn MessageHandler>> = Vec::new();
    for target in &hosted {
        let handler: Arc<dyn MessageHandler> = match target {
            ServiceTarget::Catalog => Arc::new(CatalogService::new(
                repositories.tests.clone(),
                publisher.clone(),
                config.catalog.require_unique_codes,
            )),
            ServiceTarget::Qc => Arc::new(QcService::new(
                repositories.samples.clone(),
                repositories.results.clone(),
                Arc::new(GatewayTestCatalog::new(gateway.clone())),
                publisher.clone(),
                config.evaluation.tolerance()?,
            )),
            ServiceTarget::Qa => Arc::new(QaService::new(
                repositories.releases.clone(),
                Arc::new(GatewayQcReader::new(gateway.clone())),
                Arc::new(
                    GatewayDispositionSink::new(gateway.clone())
                        .with_timeout(config.gateway.delivery_timeout()),
                ),
                publisher.clone(),
                config.release.policy(),
            )),
            ServiceTarget::Inventory | ServiceTarget::Batch => continue,
        };
        in_process.register(handler.clone());
        handlers.push(handler);
    }

    let app = messaging_router(
        MessagingAppState::new(handlers),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        services = ?hosted.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        persistence = if config.database.is_some() { "postgres" } else { "memory" },
        "qc-release listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("qc-release stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
