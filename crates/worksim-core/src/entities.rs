use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Department a team (and its members) belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Engineering,
    Product,
    Marketing,
    Sales,
    Operations,
    Hr,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Engineering,
        Department::Product,
        Department::Marketing,
        Department::Sales,
        Department::Operations,
        Department::Hr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Engineering => "Engineering",
            Department::Product => "Product",
            Department::Marketing => "Marketing",
            Department::Sales => "Sales",
            Department::Operations => "Operations",
            Department::Hr => "HR",
        }
    }
}

/// Seniority of a user within the organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Junior,
    Mid,
    Senior,
    Lead,
}

impl UserRole {
    /// Senior and lead users can own projects and anchor teams.
    pub fn is_senior(&self) -> bool {
        matches!(self, UserRole::Senior | UserRole::Lead)
    }
}

/// Role a user holds inside a specific team.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipRole {
    Member,
    Lead,
}

/// Lifecycle status of a project. Independent of the `archived` flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Paused,
    Completed,
}

/// Value type of a custom field definition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Enum,
    Number,
    Text,
    Date,
}

/// Top-level workspace container. Exactly one per run; root of the
/// temporal ordering chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Department squad within the organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub organization_id: Uuid,
    pub department: Department,
    pub created_at: NaiveDateTime,
}

/// Employee in the workspace. `created_at` is the hire time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub department: Department,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// User-team association. Unique per (team, user) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamMembership {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub role: MembershipRole,
    pub joined_at: NaiveDateTime,
}

/// Collection of tasks organized around a goal, owned by a team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub team_id: Uuid,
    pub owner_id: Uuid,
    pub status: ProjectStatus,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDate>,
    pub archived: bool,
}

/// Kanban column within a project. Positions are dense per project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    pub project_id: Uuid,
    pub position: u32,
}

/// The unit of work. A row with `parent_task_id` set is a subtask; it
/// inherits its project from the parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub project_id: Uuid,
    pub section_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_by_id: Uuid,
    pub parent_task_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub completed: bool,
    pub completed_at: Option<NaiveDateTime>,
    pub position: u32,
}

impl Task {
    pub fn is_subtask(&self) -> bool {
        self.parent_task_id.is_some()
    }
}

/// Discussion entry on a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: NaiveDateTime,
}

/// Schema for a custom field. `options` is populated for enum fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomFieldDefinition {
    pub id: Uuid,
    pub name: String,
    pub field_type: FieldType,
    pub options: Option<Vec<String>>,
    pub organization_id: Uuid,
}

/// Value of a custom field on a task. Unique per (definition, task).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomFieldValue {
    pub id: Uuid,
    pub field_id: Uuid,
    pub task_id: Uuid,
    pub value: String,
}

/// Cross-project label owned by the organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub organization_id: Uuid,
}

/// Task-tag association. Unique per (task, tag) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTag {
    pub task_id: Uuid,
    pub tag_id: Uuid,
}
