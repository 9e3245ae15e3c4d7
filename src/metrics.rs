use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait, QueryFilter};
use std::collections::BTreeMap;

use crate::entities::{incident, sea_orm_active_enums::IncidentStatus, Incident, VolunteerTask};

pub async fn init_metrics(db: &DatabaseConnection) {
    let incident_count = Incident::find().count(db).await.unwrap_or(0);
    metrics::gauge!("crisis_incidents_total").set(incident_count as f64);

    let task_count = VolunteerTask::find().count(db).await.unwrap_or(0);
    metrics::gauge!("crisis_volunteer_tasks_total").set(task_count as f64);

    // Status vocabulary is closed, so one small count per status is enough.
    for status in IncidentStatus::iter() {
        let count = Incident::find()
            .filter(incident::Column::Status.eq(status))
            .count(db)
            .await
            .unwrap_or(0);
        metrics::gauge!("crisis_incidents_by_status", "status" => status.as_str())
            .set(count as f64);
    }

    tracing::info!(
        "Initialized metrics: Incidents={}, Tasks={}",
        incident_count,
        task_count
    );
}

pub fn record_status_counts(counts: &BTreeMap<String, u64>) {
    for (status, count) in counts {
        metrics::gauge!("crisis_incidents_by_status", "status" => status.clone())
            .set(*count as f64);
    }
}

pub fn increment_incidents_reported(severity: Option<&str>) {
    let severity = severity.unwrap_or("null").to_string();
    metrics::counter!("crisis_incidents_reported_total", "severity" => severity).increment(1);
    metrics::gauge!("crisis_incidents_total").increment(1.0);
}

pub fn increment_attachments_stored() {
    metrics::counter!("crisis_attachments_stored_total").increment(1);
}

pub fn increment_status_changes(status: IncidentStatus) {
    metrics::counter!("crisis_status_changes_total", "status" => status.as_str()).increment(1);
}

pub fn increment_assignments() {
    metrics::counter!("crisis_assignments_total").increment(1);
}

pub fn increment_tasks_created() {
    metrics::counter!("crisis_tasks_created_total").increment(1);
    metrics::gauge!("crisis_volunteer_tasks_total").increment(1.0);
}
