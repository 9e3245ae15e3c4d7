use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set};
use tracing::info;

use super::{ServiceError, ServiceResult};
use crate::entities::{incident, sea_orm_active_enums::IncidentStatus, Incident};
use crate::metrics;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignRequest {
    pub incident_id: i32,
    pub officer_id: Option<i32>,
    pub volunteer_id: Option<i32>,
    pub note: Option<String>,
}

#[derive(Clone)]
pub struct AssignmentService {
    db: DatabaseConnection,
}

impl AssignmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Binds an officer and/or volunteer to an incident and marks it ASSIGNED.
    ///
    /// Each supplied id goes to its own field; an absent id leaves the
    /// current assignment alone. The status changes even when neither id is
    /// given.
    pub async fn assign(&self, request: AssignRequest) -> ServiceResult<incident::Model> {
        let incident = Incident::find_by_id(request.incident_id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::InvalidReference(request.incident_id))?;

        let mut active = incident.into_active_model();
        if let Some(officer_id) = request.officer_id {
            active.assigned_officer_id = Set(Some(officer_id));
        }
        if let Some(volunteer_id) = request.volunteer_id {
            active.assigned_volunteer_id = Set(Some(volunteer_id));
        }
        if let Some(note) = request.note {
            active.assignment_note = Set(Some(note));
        }
        active.status = Set(IncidentStatus::Assigned);

        let updated = active.update(&self.db).await?;
        info!(
            "Assigned incident {} (officer={:?}, volunteer={:?})",
            updated.id, updated.assigned_officer_id, updated.assigned_volunteer_id
        );
        metrics::increment_assignments();
        metrics::increment_status_changes(IncidentStatus::Assigned);

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{IncidentService, LifecyclePolicy, NewIncident};
    use crate::test_support::{setup, TestContext};

    async fn reported_incident(ctx: &TestContext) -> incident::Model {
        IncidentService::new(ctx.db.clone(), ctx.attachments.clone(), LifecyclePolicy::default())
            .report(NewIncident::new("Collapsed wall", 12.97, 77.59, "CRITICAL"), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn volunteer_only_sets_volunteer_field() {
        let ctx = setup().await;
        let incident = reported_incident(&ctx).await;

        let updated = AssignmentService::new(ctx.db.clone())
            .assign(AssignRequest {
                incident_id: incident.id,
                volunteer_id: Some(31),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.status, IncidentStatus::Assigned);
        assert_eq!(updated.assigned_volunteer_id, Some(31));
        assert_eq!(updated.assigned_officer_id, None);
    }

    #[tokio::test]
    async fn officer_and_volunteer_go_to_separate_fields() {
        let ctx = setup().await;
        let incident = reported_incident(&ctx).await;

        let updated = AssignmentService::new(ctx.db.clone())
            .assign(AssignRequest {
                incident_id: incident.id,
                officer_id: Some(5),
                volunteer_id: Some(31),
                note: Some("Bring pumps".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.assigned_officer_id, Some(5));
        assert_eq!(updated.assigned_volunteer_id, Some(31));
        assert_eq!(updated.assignment_note.as_deref(), Some("Bring pumps"));
    }

    #[tokio::test]
    async fn neither_id_still_marks_assigned() {
        let ctx = setup().await;
        let incident = reported_incident(&ctx).await;

        let updated = AssignmentService::new(ctx.db.clone())
            .assign(AssignRequest {
                incident_id: incident.id,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.status, IncidentStatus::Assigned);
        assert_eq!(updated.assigned_officer_id, None);
        assert_eq!(updated.assigned_volunteer_id, None);
    }

    #[tokio::test]
    async fn later_assignment_keeps_unmentioned_field() {
        let ctx = setup().await;
        let incident = reported_incident(&ctx).await;
        let assignments = AssignmentService::new(ctx.db.clone());

        assignments
            .assign(AssignRequest {
                incident_id: incident.id,
                officer_id: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();
        let updated = assignments
            .assign(AssignRequest {
                incident_id: incident.id,
                volunteer_id: Some(40),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.assigned_officer_id, Some(5));
        assert_eq!(updated.assigned_volunteer_id, Some(40));
    }

    #[tokio::test]
    async fn unknown_incident_is_invalid_reference() {
        let ctx = setup().await;

        let err = AssignmentService::new(ctx.db.clone())
            .assign(AssignRequest {
                incident_id: 404,
                officer_id: Some(1),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::InvalidReference(404)));
    }
}
