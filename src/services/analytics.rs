use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use std::collections::BTreeMap;

use super::ServiceResult;
use crate::entities::{incident, Incident};
use crate::metrics;

/// Group key used for incidents without a value in the grouped field.
pub const NULL_GROUP: &str = "null";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub total: u64,
    pub by_severity: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
}

/// Counts items per key in a single pass. `None` keys land in [`NULL_GROUP`].
pub fn count_by<'a, I, F>(items: I, key: F) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a incident::Model>,
    F: Fn(&'a incident::Model) -> Option<&'a str>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        let group = key(item).unwrap_or(NULL_GROUP);
        *counts.entry(group.to_string()).or_insert(0) += 1;
    }
    counts
}

fn severity_key(incident: &incident::Model) -> Option<&str> {
    incident.severity.as_deref()
}

fn status_key(incident: &incident::Model) -> Option<&str> {
    Some(incident.status.as_str())
}

/// Recomputes incident counts from a full scan on every call.
#[derive(Clone)]
pub struct AnalyticsService {
    db: DatabaseConnection,
}

impl AnalyticsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn scan(&self) -> ServiceResult<Vec<incident::Model>> {
        Ok(Incident::find().all(&self.db).await?)
    }

    pub async fn by_severity(&self) -> ServiceResult<BTreeMap<String, u64>> {
        let incidents = self.scan().await?;
        Ok(count_by(&incidents, severity_key))
    }

    pub async fn by_status(&self) -> ServiceResult<BTreeMap<String, u64>> {
        let incidents = self.scan().await?;
        Ok(count_by(&incidents, status_key))
    }

    pub async fn summary(&self) -> ServiceResult<IncidentSummary> {
        let incidents = self.scan().await?;
        let summary = IncidentSummary {
            total: incidents.len() as u64,
            by_severity: count_by(&incidents, severity_key),
            by_status: count_by(&incidents, status_key),
        };
        metrics::record_status_counts(&summary.by_status);
        Ok(summary)
    }
}
