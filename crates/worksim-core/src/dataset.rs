use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{
    Comment, CustomFieldDefinition, CustomFieldValue, Organization, Project, Section, Tag, Task,
    TaskTag, Team, TeamMembership, User,
};

/// Complete output of a generation run.
///
/// Collections are stored in dependency order; iterating them in struct
/// order never yields a referencing record before its referent, which is
/// what downstream persistence relies on. Within each collection records
/// keep their creation order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    pub organizations: Vec<Organization>,
    pub teams: Vec<Team>,
    pub users: Vec<User>,
    pub memberships: Vec<TeamMembership>,
    pub projects: Vec<Project>,
    pub sections: Vec<Section>,
    pub tasks: Vec<Task>,
    pub comments: Vec<Comment>,
    pub field_definitions: Vec<CustomFieldDefinition>,
    pub field_values: Vec<CustomFieldValue>,
    pub tags: Vec<Tag>,
    pub task_tags: Vec<TaskTag>,
}

impl Dataset {
    /// Row counts per collection, keyed by table-style names.
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("organizations", self.organizations.len()),
            ("teams", self.teams.len()),
            ("users", self.users.len()),
            ("team_memberships", self.memberships.len()),
            ("projects", self.projects.len()),
            ("sections", self.sections.len()),
            ("tasks", self.tasks.len()),
            ("comments", self.comments.len()),
            ("custom_field_definitions", self.field_definitions.len()),
            ("custom_field_values", self.field_values.len()),
            ("tags", self.tags.len()),
            ("task_tags", self.task_tags.len()),
        ])
    }

    pub fn total_rows(&self) -> usize {
        self.counts().values().sum()
    }

    /// Parent tasks only (rows without a parent marker).
    pub fn parent_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| !task.is_subtask())
    }

    /// Subtask rows only.
    pub fn subtasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.is_subtask())
    }
}
