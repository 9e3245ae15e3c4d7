pub mod incident;
pub mod sea_orm_active_enums;
pub mod volunteer_task;

pub use incident::Entity as Incident;
pub use volunteer_task::Entity as VolunteerTask;

pub mod prelude;
