use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an incident. Stored as its SCREAMING_SNAKE name.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Deserialize,
    Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    #[default]
    #[sea_orm(string_value = "REPORTED")]
    Reported,
    #[sea_orm(string_value = "ASSIGNED")]
    Assigned,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "RESOLVED")]
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reported => "REPORTED",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::Resolved => "RESOLVED",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Reported => 0,
            Self::Assigned => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
        }
    }

    /// Forward-only ordering REPORTED -> ASSIGNED -> IN_PROGRESS -> RESOLVED.
    /// Skipping ahead and staying put are both allowed.
    pub fn can_advance_to(&self, next: IncidentStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown incident status: {0}")]
pub struct ParseIncidentStatusError(pub String);

impl FromStr for IncidentStatus {
    type Err = ParseIncidentStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REPORTED" => Ok(Self::Reported),
            "ASSIGNED" => Ok(Self::Assigned),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "RESOLVED" => Ok(Self::Resolved),
            _ => Err(ParseIncidentStatusError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("REPORTED", IncidentStatus::Reported)]
    #[case("assigned", IncidentStatus::Assigned)]
    #[case(" In_Progress ", IncidentStatus::InProgress)]
    #[case("RESOLVED", IncidentStatus::Resolved)]
    fn parses_known_statuses(#[case] raw: &str, #[case] expected: IncidentStatus) {
        assert_eq!(raw.parse::<IncidentStatus>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "CLOSED".parse::<IncidentStatus>().unwrap_err();
        assert_eq!(err, ParseIncidentStatusError("CLOSED".to_string()));
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&IncidentStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        assert_eq!(IncidentStatus::default(), IncidentStatus::Reported);
    }

    #[rstest]
    #[case(IncidentStatus::Reported, IncidentStatus::Resolved, true)]
    #[case(IncidentStatus::Assigned, IncidentStatus::Assigned, true)]
    #[case(IncidentStatus::InProgress, IncidentStatus::Reported, false)]
    #[case(IncidentStatus::Resolved, IncidentStatus::InProgress, false)]
    fn forward_ordering(
        #[case] from: IncidentStatus,
        #[case] to: IncidentStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_advance_to(to), allowed);
    }
}
