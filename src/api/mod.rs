pub mod analytics;
pub mod error;
pub mod incidents;
pub mod officer;
pub mod volunteer;

pub use error::ApiError;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Extension, Router,
};
use sea_orm::DatabaseConnection;

use crate::services::{
    AnalyticsService, AssignmentService, IncidentService, LifecyclePolicy, TaskService,
};
use crate::storage::SharedAttachmentStore;

/// Services shared by every handler.
#[derive(Clone)]
pub struct Services {
    pub incidents: IncidentService,
    pub assignments: AssignmentService,
    pub tasks: TaskService,
    pub analytics: AnalyticsService,
}

impl Services {
    pub fn new(
        db: DatabaseConnection,
        attachments: SharedAttachmentStore,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            incidents: IncidentService::new(db.clone(), attachments, policy),
            assignments: AssignmentService::new(db.clone()),
            tasks: TaskService::new(db.clone()),
            analytics: AnalyticsService::new(db),
        }
    }
}

/// Fills the request span's business fields declared by the server's trace layer.
pub(crate) fn record_event(table: &str, action: &str, business_event: &str) {
    tracing::Span::current()
        .record("table", table)
        .record("action", action)
        .record("business_event", business_event);
}

async fn health_check() -> &'static str {
    "OK"
}

pub fn router(services: Services, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/incidents",
            get(incidents::list_incidents).post(incidents::create_incident),
        )
        .route("/api/incidents/report", post(incidents::report_incident))
        .route(
            "/api/incidents/:id",
            get(incidents::get_incident)
                .put(incidents::save_incident)
                .delete(incidents::delete_incident),
        )
        .route("/api/incidents/:id/status", put(incidents::update_status))
        .route("/api/incidents/:id/image", get(incidents::serve_image))
        .route("/api/incidents/:id/tasks", get(volunteer::list_incident_tasks))
        .route("/api/officer/assign", post(officer::assign))
        .route("/api/volunteer/tasks", post(volunteer::create_task))
        // Same segment carries the volunteer id on GET and the task id below.
        .route("/api/volunteer/tasks/:id", get(volunteer::list_volunteer_tasks))
        .route(
            "/api/volunteer/tasks/:id/status",
            put(volunteer::update_task_status),
        )
        .route("/api/analytics/severity", get(analytics::by_severity))
        .route("/api/analytics/status", get(analytics::by_status))
        .route("/api/analytics/summary", get(analytics::summary))
        .layer(Extension(services.incidents))
        .layer(Extension(services.assignments))
        .layer(Extension(services.tasks))
        .layer(Extension(services.analytics))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
