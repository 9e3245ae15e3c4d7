pub use super::incident::Entity as Incident;
pub use super::sea_orm_active_enums::IncidentStatus;
pub use super::volunteer_task::Entity as VolunteerTask;
