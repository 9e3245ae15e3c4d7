use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use tracing::info;

use super::{LifecyclePolicy, ServiceError, ServiceResult};
use crate::entities::{incident, sea_orm_active_enums::IncidentStatus, Incident};
use crate::metrics;
use crate::storage::{Attachment, SharedAttachmentStore, INCIDENT_FOLDER};

/// Fields supplied by the reporter of a new incident.
#[derive(Clone, Debug, PartialEq)]
pub struct NewIncident {
    pub title: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub reporter_id: Option<i32>,
    pub status: Option<IncidentStatus>,
}

impl NewIncident {
    pub fn new(
        title: impl Into<String>,
        latitude: f64,
        longitude: f64,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            latitude,
            longitude,
            severity: severity.into(),
            reporter_id: None,
            status: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_reporter(mut self, reporter_id: i32) -> Self {
        self.reporter_id = Some(reporter_id);
        self
    }

    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = Some(status);
        self
    }
}

#[derive(Clone)]
pub struct IncidentService {
    db: DatabaseConnection,
    attachments: SharedAttachmentStore,
    policy: LifecyclePolicy,
}

impl IncidentService {
    pub fn new(
        db: DatabaseConnection,
        attachments: SharedAttachmentStore,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            db,
            attachments,
            policy,
        }
    }

    /// Persists a new incident, storing a non-empty attachment first.
    ///
    /// The attachment is written before the row; if the insert fails the
    /// stored file is left behind.
    pub async fn report(
        &self,
        new: NewIncident,
        attachment: Option<Attachment>,
    ) -> ServiceResult<incident::Model> {
        let image_path = match attachment.filter(|a| !a.is_empty()) {
            Some(attachment) => {
                let reference = self.attachments.store(&attachment, INCIDENT_FOLDER).await?;
                metrics::increment_attachments_stored();
                Some(reference)
            }
            None => None,
        };

        let active = incident::ActiveModel {
            title: Set(new.title),
            description: Set(new.description),
            latitude: Set(new.latitude),
            longitude: Set(new.longitude),
            severity: Set(Some(new.severity)),
            image_path: Set(image_path),
            status: Set(new.status.unwrap_or_default()),
            reported_at: Set(Utc::now().naive_utc()),
            reporter_id: Set(new.reporter_id),
            assigned_officer_id: Set(None),
            assigned_volunteer_id: Set(None),
            assignment_note: Set(None),
            ..Default::default()
        };

        let saved = active.insert(&self.db).await?;
        info!(
            "Reported incident {} (severity={:?}, attachment={})",
            saved.id,
            saved.severity,
            saved.image_path.is_some()
        );
        metrics::increment_incidents_reported(saved.severity.as_deref());

        Ok(saved)
    }

    pub async fn all(&self) -> ServiceResult<Vec<incident::Model>> {
        Ok(Incident::find()
            .order_by_asc(incident::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Option<incident::Model>> {
        Ok(Incident::find_by_id(id).one(&self.db).await?)
    }

    /// Full replace of an incident's mutable fields.
    ///
    /// `id` and `reported_at` keep their stored values. An id that does not
    /// exist yet is inserted as a new incident with a fresh id.
    pub async fn save(&self, incident: incident::Model) -> ServiceResult<incident::Model> {
        let existing = Incident::find_by_id(incident.id).one(&self.db).await?;
        let mut active = replaceable_fields(incident);

        let saved = match existing {
            Some(existing) => {
                active.id = Unchanged(existing.id);
                active.reported_at = Unchanged(existing.reported_at);
                active.update(&self.db).await?
            }
            None => {
                active.reported_at = Set(Utc::now().naive_utc());
                active.insert(&self.db).await?
            }
        };

        info!("Saved incident {}", saved.id);
        Ok(saved)
    }

    /// Removes an incident. Deleting an absent id succeeds and returns `false`.
    pub async fn delete(&self, id: i32) -> ServiceResult<bool> {
        let res = Incident::delete_by_id(id).exec(&self.db).await?;
        let removed = res.rows_affected > 0;
        if removed {
            info!("Deleted incident {}", id);
        }
        Ok(removed)
    }

    pub async fn by_status(&self, status: IncidentStatus) -> ServiceResult<Vec<incident::Model>> {
        Ok(Incident::find()
            .filter(incident::Column::Status.eq(status))
            .order_by_asc(incident::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Overwrites the status column only. Concurrent writers race; the last
    /// one to land wins.
    pub async fn update_status(
        &self,
        id: i32,
        status: IncidentStatus,
    ) -> ServiceResult<incident::Model> {
        let incident = self.get(id).await?.ok_or(ServiceError::NotFound {
            entity: "incident",
            id,
        })?;
        let previous = incident.status;
        self.policy.check(previous, status)?;

        let mut active = incident.into_active_model();
        active.status = Set(status);
        let updated = active.update(&self.db).await?;

        info!("Incident {} status {} -> {}", id, previous, status);
        metrics::increment_status_changes(status);

        Ok(updated)
    }

    pub async fn load_attachment(&self, reference: &str) -> ServiceResult<Vec<u8>> {
        Ok(self.attachments.load(reference).await?)
    }
}

fn replaceable_fields(incident: incident::Model) -> incident::ActiveModel {
    incident::ActiveModel {
        id: NotSet,
        title: Set(incident.title),
        description: Set(incident.description),
        latitude: Set(incident.latitude),
        longitude: Set(incident.longitude),
        severity: Set(incident.severity),
        image_path: Set(incident.image_path),
        status: Set(incident.status),
        reported_at: NotSet,
        reporter_id: Set(incident.reporter_id),
        assigned_officer_id: Set(incident.assigned_officer_id),
        assigned_volunteer_id: Set(incident.assigned_volunteer_id),
        assignment_note: Set(incident.assignment_note),
    }
}
