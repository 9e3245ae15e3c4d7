use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use crisis_coord::{
    api,
    config::{AppConfig, AttachmentBackend},
    db::connect_and_migrate,
    services::LifecyclePolicy,
    storage::{GcsAttachmentStore, LocalAttachmentStore, SharedAttachmentStore},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    crisis_coord::telemetry::init_telemetry("crisis-coord-server");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    let db = connect_and_migrate(config.database_url.as_str())
        .await
        .expect("Failed to connect to database");

    let attachments: SharedAttachmentStore = match &config.attachments {
        AttachmentBackend::Local { upload_dir } => Arc::new(
            LocalAttachmentStore::open(upload_dir)
                .await
                .expect("Failed to open upload directory"),
        ),
        AttachmentBackend::Gcs { bucket } => {
            let gcs_config = google_cloud_storage::client::ClientConfig::default()
                .with_auth()
                .await
                .expect("Failed to load GCS credentials");
            let client = google_cloud_storage::client::Client::new(gcs_config);
            Arc::new(GcsAttachmentStore::new(client, bucket.clone()))
        }
    };

    crisis_coord::metrics::init_metrics(&db).await;

    let services = api::Services::new(
        db,
        attachments,
        LifecyclePolicy::from_strict(config.strict_status_transitions),
    );

    let app = app(services, &config, prometheus_layer, metric_handle);

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    crisis_coord::telemetry::shutdown_telemetry();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn app(
    services: api::Services,
    config: &AppConfig,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let origin = config
        .frontend_url
        .parse::<HeaderValue>()
        .expect("FRONTEND_URL is not a valid header value");

    api::router(services, config.max_upload_bytes)
        .layer(prometheus_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|p| p.as_str());

                    let span_name = match matched_path {
                        Some(path) => format!("{} {}", request.method(), path),
                        None => format!("{} {}", request.method(), request.uri().path()),
                    };

                    let client_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    // Handlers fill in the empty fields.
                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        client_ip = client_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        incident_id = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {},
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
