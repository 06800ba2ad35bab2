use crate::cli::ServeArgs;
use crate::infra::{
    load_history, load_scholarships, AppState, InMemoryApplicationHistory,
    InMemoryScholarshipCatalog,
};
use crate::routes::with_scholarship_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scholarship_ai::config::AppConfig;
use scholarship_ai::error::AppError;
use scholarship_ai::telemetry;
use scholarship_ai::workflows::scholarship::{
    InMemoryModelRepository, ModelSelector, ModelStore, PredictionService, ScholarshipServices,
    TrainingService, WeightCache,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = Arc::new(InMemoryScholarshipCatalog::from_scholarships(
        load_scholarships(args.catalog.as_deref())?,
    ));
    let history = Arc::new(InMemoryApplicationHistory::from_applications(load_history(
        args.history.as_deref(),
    )?));
    let store = Arc::new(ModelStore::new(
        Arc::new(InMemoryModelRepository::default()),
        Arc::new(WeightCache::new()),
    ));
    let selector = Arc::new(ModelSelector::with_threshold(
        store.clone(),
        history.clone(),
        config.model.min_samples_per_scholarship,
    ));
    let services = Arc::new(ScholarshipServices {
        prediction: PredictionService::new(catalog.clone(), selector),
        training: TrainingService::new(
            catalog.clone(),
            history.clone(),
            store,
            config.model.training(),
        ),
    });

    if let Err(err) = services.training.ensure_global_model() {
        warn!(error = %err, "unable to seed default global model; predictions will degrade");
    }
    info!(
        scholarships = catalog.scholarship_ids().map(|ids| ids.len()).unwrap_or_default(),
        historical_applications = history.len(),
        "scholarship data loaded"
    );

    let app = with_scholarship_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scholarship prediction service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
