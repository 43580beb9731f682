//! Entity-type DAG and target-count planning.
//!
//! Root counts come from configuration; dependent counts are derived so
//! the documented ratio bands survive rescaling (changing the user count
//! alone must not strand the team-size or tasks-per-project bands).

use chrono::{Duration, NaiveDateTime};

use worksim_core::RunConfig;

use crate::errors::GenerationError;

pub const MIN_TEAM_SIZE: u64 = 8;
pub const MAX_TEAM_SIZE: u64 = 20;
pub const MIN_TASKS_PER_PROJECT: u64 = 30;
pub const MAX_TASKS_PER_PROJECT: u64 = 80;
pub const PROJECTS_PER_TEAM: u64 = 3;
/// Hard floor used when a project count is given explicitly; matches the
/// minimum per-project allocation of the task distribution.
pub const MIN_TASK_ALLOCATION: u64 = 5;
/// Days between organization founding and the start of recorded history.
pub const ORG_LEAD_DAYS: i64 = 180;

/// Entity types in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Organization,
    Team,
    User,
    Membership,
    Project,
    Section,
    Task,
    Subtask,
    Comment,
    FieldDefinition,
    FieldValue,
    Tag,
    TagLink,
}

impl EntityKind {
    /// Stage order of the pipeline; referencing kinds always come after
    /// their referents.
    pub const ORDER: [EntityKind; 13] = [
        EntityKind::Organization,
        EntityKind::Team,
        EntityKind::User,
        EntityKind::Membership,
        EntityKind::Project,
        EntityKind::Section,
        EntityKind::Task,
        EntityKind::Subtask,
        EntityKind::Comment,
        EntityKind::FieldDefinition,
        EntityKind::FieldValue,
        EntityKind::Tag,
        EntityKind::TagLink,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Organization => "organization",
            EntityKind::Team => "team",
            EntityKind::User => "user",
            EntityKind::Membership => "membership",
            EntityKind::Project => "project",
            EntityKind::Section => "section",
            EntityKind::Task => "task",
            EntityKind::Subtask => "subtask",
            EntityKind::Comment => "comment",
            EntityKind::FieldDefinition => "field_definition",
            EntityKind::FieldValue => "field_value",
            EntityKind::Tag => "tag",
            EntityKind::TagLink => "tag_link",
        }
    }

    /// Upstream kinds whose collections must be complete before this kind
    /// can be generated.
    pub fn dependencies(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Organization => &[],
            EntityKind::Team => &[EntityKind::Organization],
            EntityKind::User => &[EntityKind::Organization],
            EntityKind::Membership => &[EntityKind::Team, EntityKind::User],
            EntityKind::Project => &[EntityKind::Team, EntityKind::Membership],
            EntityKind::Section => &[EntityKind::Project],
            EntityKind::Task => &[EntityKind::Project, EntityKind::Section, EntityKind::Membership],
            EntityKind::Subtask => &[EntityKind::Task],
            EntityKind::Comment => &[EntityKind::Task, EntityKind::Membership],
            EntityKind::FieldDefinition => &[EntityKind::Organization],
            EntityKind::FieldValue => &[EntityKind::FieldDefinition, EntityKind::Task],
            EntityKind::Tag => &[EntityKind::Organization],
            EntityKind::TagLink => &[EntityKind::Tag, EntityKind::Task],
        }
    }
}

/// Resolved targets and timeline for one run.
#[derive(Debug, Clone)]
pub struct Plan {
    pub users: u64,
    pub teams: u64,
    pub projects: u64,
    pub tasks: u64,
    pub org_created: NaiveDateTime,
    pub sim_start: NaiveDateTime,
    pub sim_end: NaiveDateTime,
}

impl Plan {
    pub fn stages(&self) -> &'static [EntityKind] {
        &EntityKind::ORDER
    }
}

/// Resolve configuration into a feasible plan, or fail before any
/// generation starts.
pub fn plan(config: &RunConfig) -> Result<Plan, GenerationError> {
    config.validate()?;

    let users = config.users as u64;
    let teams = config.teams as u64;
    let tasks = config.tasks as u64;

    if users < teams.saturating_mul(MIN_TEAM_SIZE) {
        return Err(GenerationError::Configuration(format!(
            "{users} users cannot staff {teams} teams at the minimum team size of {MIN_TEAM_SIZE}"
        )));
    }
    if users > teams.saturating_mul(MAX_TEAM_SIZE) {
        return Err(GenerationError::Configuration(format!(
            "{users} users exceed the capacity of {teams} teams at the maximum team size of {MAX_TEAM_SIZE}"
        )));
    }

    let projects = match config.projects {
        Some(projects) => {
            let projects = projects as u64;
            if tasks < projects.saturating_mul(MIN_TASK_ALLOCATION) {
                return Err(GenerationError::Configuration(format!(
                    "{tasks} tasks cannot fill {projects} projects at the minimum allocation of {MIN_TASK_ALLOCATION}"
                )));
            }
            projects
        }
        None => derive_project_count(teams, tasks)?,
    };

    let sim_end = config.now;
    let sim_start = sim_end - Duration::days(config.history_months as i64 * 30);
    let org_created = sim_start - Duration::days(ORG_LEAD_DAYS);

    Ok(Plan {
        users,
        teams,
        projects,
        tasks,
        org_created,
        sim_start,
        sim_end,
    })
}

/// Derive a project count that keeps both the tasks-per-project band
/// [30, 80] and roughly three projects per team.
fn derive_project_count(teams: u64, tasks: u64) -> Result<u64, GenerationError> {
    let lo = tasks.div_ceil(MAX_TASKS_PER_PROJECT).max(1);
    let hi = (tasks / MIN_TASKS_PER_PROJECT).max(1);
    if lo > hi {
        return Err(GenerationError::Configuration(format!(
            "{tasks} tasks cannot satisfy the tasks-per-project band [{MIN_TASKS_PER_PROJECT}, {MAX_TASKS_PER_PROJECT}]"
        )));
    }
    Ok((teams * PROJECTS_PER_TEAM).clamp(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_projects_inside_both_bands() {
        let config = RunConfig {
            users: 50,
            teams: 5,
            projects: None,
            tasks: 500,
            ..RunConfig::default()
        };
        let plan = plan(&config).expect("feasible config");
        assert_eq!(plan.projects, 15);
        let per_project = plan.tasks / plan.projects;
        assert!((MIN_TASKS_PER_PROJECT..=MAX_TASKS_PER_PROJECT).contains(&per_project));
    }

    #[test]
    fn rejects_understaffed_teams() {
        let config = RunConfig {
            users: 30,
            teams: 5,
            ..RunConfig::default()
        };
        let err = plan(&config).expect_err("too few users");
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn rejects_overcrowded_teams() {
        let config = RunConfig {
            users: 500,
            teams: 10,
            ..RunConfig::default()
        };
        let err = plan(&config).expect_err("too many users");
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn rejects_projects_starved_of_tasks() {
        let config = RunConfig {
            projects: Some(2000),
            tasks: 5000,
            ..RunConfig::default()
        };
        let err = plan(&config).expect_err("too many projects");
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[test]
    fn timeline_orders_org_before_history() {
        let plan = plan(&RunConfig::default()).expect("feasible config");
        assert!(plan.org_created < plan.sim_start);
        assert!(plan.sim_start < plan.sim_end);
    }

    #[test]
    fn stage_order_respects_dependencies() {
        for (index, kind) in EntityKind::ORDER.iter().enumerate() {
            for dependency in kind.dependencies() {
                let position = EntityKind::ORDER
                    .iter()
                    .position(|candidate| candidate == dependency)
                    .expect("dependency listed in order");
                assert!(position < index, "{:?} scheduled after {:?}", dependency, kind);
            }
        }
    }
}
