use std::sync::Arc;

use adevar::{
    api,
    app_state::AppState,
    auth::JwtService,
    config::Config,
    fetcher::Fetcher,
    inference::{
        Classifier, Classify, InferenceWorker, LabelTable, ModelCache, ModelSpec,
        RemoteModelLoader,
    },
    middleware::rate_limit::RateLimit,
    orchestrator::Orchestrator,
    passwords::Passwords,
    repositories::{DatasetRepository, UserRepository},
    safety::UrlValidator,
    telemetry,
};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    telemetry::init(config.log_format());

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let model_config = config.model();
    let labels = match &model_config.label_table_path {
        Some(path) => LabelTable::from_json_file(path)
            .with_context(|| format!("Failed to load label table from {}", path.display()))?,
        None => LabelTable::builtin(),
    };
    info!(labels = ?labels.iter().collect::<Vec<_>>(), "label table loaded");

    let loader = RemoteModelLoader::new(&model_config.inference_url, labels.len())
        .with_api_token(model_config.api_token.clone());
    let model = Arc::new(ModelCache::new(
        ModelSpec::new(&model_config.task, &model_config.model_id),
        Arc::new(loader),
        model_config.load_timeout,
    ));
    let classifier = Classifier::new(model.clone(), labels.clone(), model_config.inference_timeout);

    let shutdown = CancellationToken::new();
    let classify: Arc<dyn Classify> = if model_config.use_worker {
        let handle = InferenceWorker::spawn(
            classifier,
            model_config.queue_depth,
            shutdown.child_token(),
        );
        let mut status = handle.subscribe();
        tokio::spawn(
            async move {
                while let Ok(status) = status.recv().await {
                    debug!(?status, "inference worker status");
                }
            }
            .instrument(info_span!("worker_status")),
        );
        Arc::new(handle)
    } else {
        Arc::new(classifier)
    };

    let limits = config.limits();
    let orchestrator = Orchestrator::new(
        Arc::new(UrlValidator::new(config.safe_browsing().clone())),
        Fetcher::new(limits.fetch_timeout),
        classify,
        limits,
    );

    let (max_requests, window_secs) = config.rate_limit();
    let state = AppState {
        user_repo: Arc::new(UserRepository::new(pool.clone())),
        dataset_repo: Arc::new(DatasetRepository::new(pool.clone())),
        db_pool: pool,
        jwt: Arc::new(JwtService::new(config.jwt_secret(), config.jwt_ttl_hours())),
        passwords: Passwords::new(65536, 2, 1)?,
        orchestrator: Arc::new(orchestrator),
        labels,
        model,
        rate_limit: RateLimit::new(max_requests, window_secs),
    };

    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!(addr = config.bind_addr(), "adevar api listening");

    api::serve(listener, app, shutdown_signal(), shutdown).await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Received shutdown signal, initiating graceful shutdown...");
}
