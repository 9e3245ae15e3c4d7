use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::IncidentStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "incidents")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub latitude: f64,
    #[sea_orm(column_type = "Double")]
    pub longitude: f64,
    pub severity: Option<String>,
    pub image_path: Option<String>,
    pub status: IncidentStatus,
    pub reported_at: DateTime,
    pub reporter_id: Option<i32>,
    pub assigned_officer_id: Option<i32>,
    pub assigned_volunteer_id: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub assignment_note: Option<String>,
}

// Tasks point at incidents by id only; there is no foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
