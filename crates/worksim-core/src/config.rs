use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a single generation run.
///
/// Root counts (`users`, `teams`, `projects`, `tasks`) drive every derived
/// pool; the scheduler checks the documented ratio bands on top of the
/// shape checks performed by [`RunConfig::validate`]. `now` anchors the
/// simulation timeline so a run is fully determined by configuration and
/// seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Workspace name for the single organization.
    pub organization: String,
    /// Email domain for generated users.
    pub email_domain: String,
    /// Total employees.
    pub users: u32,
    /// Total teams; each team is sized within [8, 20].
    pub teams: u32,
    /// Total projects. When `None` the scheduler derives a count that
    /// keeps tasks-per-project and projects-per-team in band.
    pub projects: Option<u32>,
    /// Total parent tasks (subtasks are derived on top).
    pub tasks: u32,
    /// Months of history between simulation start and `now`.
    pub history_months: u32,
    /// Seed for the run's random stream.
    pub seed: u64,
    /// End of the simulation timeline. Pinned by default so that default
    /// runs are reproducible without further input.
    pub now: NaiveDateTime,
    /// Share of users that are deactivated accounts.
    pub inactive_rate: f64,
    /// Share of tasks left without an assignee.
    pub unassigned_rate: f64,
    /// Share of tasks with an empty description.
    pub empty_description_rate: f64,
    /// Share of parent tasks that receive subtasks.
    pub subtask_rate: f64,
    /// Share of old projects that end up archived.
    pub archived_rate: f64,
    /// Per-field share of parent tasks carrying a custom field value.
    pub field_coverage: f64,
    /// Share of parent tasks carrying at least one tag.
    pub tag_rate: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            organization: "Cloudvance Technologies".to_string(),
            email_domain: "cloudvance.com".to_string(),
            users: 500,
            teams: 35,
            projects: Some(100),
            tasks: 5000,
            history_months: 18,
            seed: 42,
            now: default_now(),
            inactive_rate: 0.05,
            unassigned_rate: 0.15,
            empty_description_rate: 0.20,
            subtask_rate: 0.25,
            archived_rate: 0.30,
            field_coverage: 0.80,
            tag_rate: 0.40,
        }
    }
}

fn default_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .unwrap_or_default()
        .and_hms_opt(12, 0, 0)
        .unwrap_or_default()
}

impl RunConfig {
    /// Check configuration shape. Ratio feasibility between counts is the
    /// scheduler's job; this rejects values that are malformed on their own.
    pub fn validate(&self) -> Result<()> {
        if self.organization.trim().is_empty() {
            return Err(Error::InvalidConfig("organization name is empty".into()));
        }
        if self.email_domain.trim().is_empty() || !self.email_domain.contains('.') {
            return Err(Error::InvalidConfig(format!(
                "email domain '{}' is not a domain",
                self.email_domain
            )));
        }
        for (name, value) in [
            ("users", self.users),
            ("teams", self.teams),
            ("tasks", self.tasks),
            ("history_months", self.history_months),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{name} must be positive")));
            }
        }
        if self.projects == Some(0) {
            return Err(Error::InvalidConfig("projects must be positive".into()));
        }
        for (name, rate) in [
            ("inactive_rate", self.inactive_rate),
            ("unassigned_rate", self.unassigned_rate),
            ("empty_description_rate", self.empty_description_rate),
            ("subtask_rate", self.subtask_rate),
            ("archived_rate", self.archived_rate),
            ("field_coverage", self.field_coverage),
            ("tag_rate", self.tag_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        RunConfig::default().validate().expect("default is valid");
    }

    #[test]
    fn rejects_out_of_range_rate() {
        let config = RunConfig {
            unassigned_rate: 1.5,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn rejects_zero_counts() {
        let config = RunConfig {
            teams: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }
}
