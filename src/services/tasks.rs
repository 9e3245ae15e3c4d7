use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use super::{ServiceError, ServiceResult};
use crate::entities::{volunteer_task, VolunteerTask};
use crate::metrics;

/// Status every task starts in.
pub const PENDING: &str = "PENDING";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTask {
    pub volunteer_id: Option<i32>,
    pub incident_id: Option<i32>,
    pub task_name: Option<String>,
    /// Ignored on create.
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct TaskService {
    db: DatabaseConnection,
}

impl TaskService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, new: NewTask) -> ServiceResult<volunteer_task::Model> {
        if let Some(requested) = new.status.as_deref().filter(|s| *s != PENDING) {
            debug!("Ignoring requested task status {:?}", requested);
        }

        let task = volunteer_task::ActiveModel {
            volunteer_id: Set(new.volunteer_id),
            incident_id: Set(new.incident_id),
            task_name: Set(new.task_name),
            status: Set(PENDING.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        info!(
            "Created task {} for volunteer {:?} on incident {:?}",
            task.id, task.volunteer_id, task.incident_id
        );
        metrics::increment_tasks_created();

        Ok(task)
    }

    pub async fn for_volunteer(
        &self,
        volunteer_id: i32,
    ) -> ServiceResult<Vec<volunteer_task::Model>> {
        Ok(VolunteerTask::find()
            .filter(volunteer_task::Column::VolunteerId.eq(volunteer_id))
            .order_by_asc(volunteer_task::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn for_incident(
        &self,
        incident_id: i32,
    ) -> ServiceResult<Vec<volunteer_task::Model>> {
        Ok(VolunteerTask::find()
            .filter(volunteer_task::Column::IncidentId.eq(incident_id))
            .order_by_asc(volunteer_task::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Overwrites the task status with any value.
    pub async fn update_status(
        &self,
        id: i32,
        status: impl Into<String>,
    ) -> ServiceResult<volunteer_task::Model> {
        let task = VolunteerTask::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ServiceError::NotFound { entity: "task", id })?;

        let mut active = task.into_active_model();
        active.status = Set(status.into());
        let updated = active.update(&self.db).await?;

        info!("Task {} status -> {}", id, updated.status);
        Ok(updated)
    }
}
