//! Incident lifecycle, assignment, volunteer task and analytics operations.

pub mod analytics;
pub mod assignment;
pub mod incidents;
pub mod tasks;

pub use analytics::{AnalyticsService, IncidentSummary};
pub use assignment::{AssignRequest, AssignmentService};
pub use incidents::{IncidentService, NewIncident};
pub use tasks::{NewTask, TaskService};

use sea_orm::DbErr;

use crate::entities::sea_orm_active_enums::IncidentStatus;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },
    #[error("invalid incident id: {0}")]
    InvalidReference(i32),
    #[error("{0}")]
    Validation(String),
    #[error("status change {from} -> {to} is not allowed")]
    InvalidTransition {
        from: IncidentStatus,
        to: IncidentStatus,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Which incident status changes `update_status` accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LifecyclePolicy {
    /// Any status may replace any other.
    #[default]
    Unrestricted,
    /// Only forward moves along REPORTED -> ASSIGNED -> IN_PROGRESS -> RESOLVED.
    Forward,
}

impl LifecyclePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            Self::Forward
        } else {
            Self::Unrestricted
        }
    }

    pub fn check(&self, from: IncidentStatus, to: IncidentStatus) -> ServiceResult<()> {
        match self {
            Self::Unrestricted => Ok(()),
            Self::Forward if from.can_advance_to(to) => Ok(()),
            Self::Forward => Err(ServiceError::InvalidTransition { from, to }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_policy_allows_moving_backwards() {
        assert!(LifecyclePolicy::Unrestricted
            .check(IncidentStatus::Resolved, IncidentStatus::Reported)
            .is_ok());
    }

    #[test]
    fn forward_policy_rejects_moving_backwards() {
        let err = LifecyclePolicy::Forward
            .check(IncidentStatus::Resolved, IncidentStatus::Reported)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "status change RESOLVED -> REPORTED is not allowed"
        );
    }
}
