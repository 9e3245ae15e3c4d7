use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use super::{record_event, ApiError};
use crate::entities::volunteer_task;
use crate::services::{NewTask, TaskService};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub volunteer_id: Option<i32>,
    pub incident_id: Option<i32>,
    pub task_name: Option<String>,
    pub status: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            volunteer_id: req.volunteer_id,
            incident_id: req.incident_id,
            task_name: req.task_name,
            status: req.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskStatusParam {
    pub status: String,
}

// GET /api/volunteer/tasks/:id - `id` is the volunteer
pub async fn list_volunteer_tasks(
    Extension(tasks): Extension<TaskService>,
    Path(volunteer_id): Path<i32>,
) -> Result<Json<Vec<volunteer_task::Model>>, ApiError> {
    Ok(Json(tasks.for_volunteer(volunteer_id).await?))
}

// GET /api/incidents/:id/tasks
pub async fn list_incident_tasks(
    Extension(tasks): Extension<TaskService>,
    Path(incident_id): Path<i32>,
) -> Result<Json<Vec<volunteer_task::Model>>, ApiError> {
    Ok(Json(tasks.for_incident(incident_id).await?))
}

// POST /api/volunteer/tasks
pub async fn create_task(
    Extension(tasks): Extension<TaskService>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let created = tasks.create(payload.into()).await?;

    record_event("volunteer_tasks", "create_task", "Volunteer task created");
    if let Some(incident_id) = created.incident_id {
        tracing::Span::current().record("incident_id", incident_id);
    }

    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/volunteer/tasks/:id/status?status=DONE - `id` is the task, status stored verbatim
pub async fn update_task_status(
    Extension(tasks): Extension<TaskService>,
    Path(task_id): Path<i32>,
    Query(param): Query<TaskStatusParam>,
) -> Result<Json<volunteer_task::Model>, ApiError> {
    let updated = tasks.update_status(task_id, param.status).await?;
    record_event("volunteer_tasks", "update_task_status", "Task status updated");

    Ok(Json(updated))
}
