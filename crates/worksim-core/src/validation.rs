use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dataset::Dataset;

/// A single integrity finding against a generated dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub entity: &'static str,
    pub ordinal: usize,
    pub rule: String,
}

impl IntegrityIssue {
    fn new(entity: &'static str, ordinal: usize, rule: impl Into<String>) -> Self {
        Self {
            entity,
            ordinal,
            rule: rule.into(),
        }
    }
}

/// Validate referential and temporal integrity of a complete dataset.
///
/// Checks the creation-order chain, foreign keys across every collection,
/// completion semantics, comment bounds, subtask inheritance, position
/// uniqueness, and email uniqueness. Returns every finding rather than
/// stopping at the first, so test failures show the full picture.
pub fn validate_dataset(dataset: &Dataset, now: NaiveDateTime) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let org_ids: HashSet<Uuid> = dataset.organizations.iter().map(|o| o.id).collect();
    let team_created: HashMap<Uuid, NaiveDateTime> = dataset
        .teams
        .iter()
        .map(|t| (t.id, t.created_at))
        .collect();
    let user_created: HashMap<Uuid, NaiveDateTime> = dataset
        .users
        .iter()
        .map(|u| (u.id, u.created_at))
        .collect();
    let project_index: HashMap<Uuid, &crate::entities::Project> =
        dataset.projects.iter().map(|p| (p.id, p)).collect();
    let section_project: HashMap<Uuid, Uuid> = dataset
        .sections
        .iter()
        .map(|s| (s.id, s.project_id))
        .collect();
    let task_index: HashMap<Uuid, &crate::entities::Task> =
        dataset.tasks.iter().map(|t| (t.id, t)).collect();
    let field_ids: HashSet<Uuid> = dataset.field_definitions.iter().map(|f| f.id).collect();
    let tag_ids: HashSet<Uuid> = dataset.tags.iter().map(|t| t.id).collect();

    if dataset.organizations.len() != 1 {
        issues.push(IntegrityIssue::new(
            "organization",
            0,
            format!("expected exactly one organization, found {}", dataset.organizations.len()),
        ));
    }
    let org = dataset.organizations.first();

    for (i, team) in dataset.teams.iter().enumerate() {
        if !org_ids.contains(&team.organization_id) {
            issues.push(IntegrityIssue::new("team", i, "dangling organization_id"));
        }
        if let Some(org) = org
            && team.created_at < org.created_at
        {
            issues.push(IntegrityIssue::new(
                "team",
                i,
                "created before owning organization",
            ));
        }
    }

    let mut emails = HashSet::new();
    for (i, user) in dataset.users.iter().enumerate() {
        if !emails.insert(user.email.clone()) {
            issues.push(IntegrityIssue::new(
                "user",
                i,
                format!("duplicate email '{}'", user.email),
            ));
        }
        if let Some(org) = org
            && user.created_at < org.created_at
        {
            issues.push(IntegrityIssue::new(
                "user",
                i,
                "hired before the organization existed",
            ));
        }
    }

    let mut membership_pairs = HashSet::new();
    for (i, membership) in dataset.memberships.iter().enumerate() {
        let team = team_created.get(&membership.team_id);
        let user = user_created.get(&membership.user_id);
        if team.is_none() {
            issues.push(IntegrityIssue::new("membership", i, "dangling team_id"));
        }
        if user.is_none() {
            issues.push(IntegrityIssue::new("membership", i, "dangling user_id"));
        }
        if !membership_pairs.insert((membership.team_id, membership.user_id)) {
            issues.push(IntegrityIssue::new(
                "membership",
                i,
                "duplicate (team, user) membership",
            ));
        }
        if let (Some(team), Some(user)) = (team, user) {
            let floor = (*team).max(*user);
            if membership.joined_at < floor {
                issues.push(IntegrityIssue::new(
                    "membership",
                    i,
                    "joined before team or user existed",
                ));
            }
        }
    }

    for (i, project) in dataset.projects.iter().enumerate() {
        match team_created.get(&project.team_id) {
            None => issues.push(IntegrityIssue::new("project", i, "dangling team_id")),
            Some(team) => {
                if project.created_at < *team {
                    issues.push(IntegrityIssue::new(
                        "project",
                        i,
                        "created before owning team",
                    ));
                }
            }
        }
        if !user_created.contains_key(&project.owner_id) {
            issues.push(IntegrityIssue::new("project", i, "dangling owner_id"));
        }
        if let Some(due) = project.due_date
            && due < project.created_at.date()
        {
            issues.push(IntegrityIssue::new("project", i, "due date before creation"));
        }
    }

    let mut section_positions: BTreeMap<Uuid, BTreeSet<u32>> = BTreeMap::new();
    for (i, section) in dataset.sections.iter().enumerate() {
        if !project_index.contains_key(&section.project_id) {
            issues.push(IntegrityIssue::new("section", i, "dangling project_id"));
        }
        if !section_positions
            .entry(section.project_id)
            .or_default()
            .insert(section.position)
        {
            issues.push(IntegrityIssue::new(
                "section",
                i,
                format!("duplicate position {} within project", section.position),
            ));
        }
    }

    let mut task_positions: HashMap<(Uuid, Option<Uuid>), HashSet<u32>> = HashMap::new();
    for (i, task) in dataset.tasks.iter().enumerate() {
        let project = project_index.get(&task.project_id).copied();
        if project.is_none() {
            issues.push(IntegrityIssue::new("task", i, "dangling project_id"));
        }
        match section_project.get(&task.section_id) {
            None => issues.push(IntegrityIssue::new("task", i, "dangling section_id")),
            Some(owner) if *owner != task.project_id => {
                issues.push(IntegrityIssue::new(
                    "task",
                    i,
                    "section belongs to a different project",
                ));
            }
            Some(_) => {}
        }
        if let Some(assignee) = task.assignee_id
            && !user_created.contains_key(&assignee)
        {
            issues.push(IntegrityIssue::new("task", i, "dangling assignee_id"));
        }
        if !user_created.contains_key(&task.created_by_id) {
            issues.push(IntegrityIssue::new("task", i, "dangling created_by_id"));
        }
        if let Some(project) = project
            && task.created_at < project.created_at
        {
            issues.push(IntegrityIssue::new(
                "task",
                i,
                "created before owning project",
            ));
        }
        match (task.completed, task.completed_at) {
            (true, None) => {
                issues.push(IntegrityIssue::new(
                    "task",
                    i,
                    "completed without completion time",
                ));
            }
            (false, Some(_)) => {
                issues.push(IntegrityIssue::new(
                    "task",
                    i,
                    "completion time on an open task",
                ));
            }
            (true, Some(completed_at)) => {
                if completed_at <= task.created_at {
                    issues.push(IntegrityIssue::new(
                        "task",
                        i,
                        "completed no later than created",
                    ));
                }
                if completed_at > now {
                    issues.push(IntegrityIssue::new("task", i, "future-dated completion"));
                }
            }
            (false, None) => {}
        }
        if let Some(parent_id) = task.parent_task_id {
            match task_index.get(&parent_id) {
                None => issues.push(IntegrityIssue::new("task", i, "dangling parent_task_id")),
                Some(parent) => {
                    if parent.project_id != task.project_id {
                        issues.push(IntegrityIssue::new(
                            "task",
                            i,
                            "subtask project differs from parent",
                        ));
                    }
                    if task.created_at < parent.created_at {
                        issues.push(IntegrityIssue::new(
                            "task",
                            i,
                            "subtask created before parent",
                        ));
                    }
                    if let (Some(parent_done), Some(done)) =
                        (parent.completed_at, task.completed_at)
                        && done > parent_done
                    {
                        issues.push(IntegrityIssue::new(
                            "task",
                            i,
                            "subtask completed after parent completion",
                        ));
                    }
                }
            }
        }
        if !task_positions
            .entry((task.section_id, task.parent_task_id))
            .or_default()
            .insert(task.position)
        {
            issues.push(IntegrityIssue::new(
                "task",
                i,
                format!("duplicate position {} within section", task.position),
            ));
        }
    }

    let mut last_comment_at: HashMap<Uuid, NaiveDateTime> = HashMap::new();
    for (i, comment) in dataset.comments.iter().enumerate() {
        match task_index.get(&comment.task_id) {
            None => issues.push(IntegrityIssue::new("comment", i, "dangling task_id")),
            Some(task) => {
                if comment.created_at < task.created_at {
                    issues.push(IntegrityIssue::new(
                        "comment",
                        i,
                        "created before its task",
                    ));
                }
                let upper = task.completed_at.unwrap_or(now);
                if comment.created_at > upper {
                    issues.push(IntegrityIssue::new(
                        "comment",
                        i,
                        "created after task completion",
                    ));
                }
            }
        }
        if !user_created.contains_key(&comment.author_id) {
            issues.push(IntegrityIssue::new("comment", i, "dangling author_id"));
        }
        if let Some(previous) = last_comment_at.get(&comment.task_id)
            && comment.created_at < *previous
        {
            issues.push(IntegrityIssue::new(
                "comment",
                i,
                "out of chronological order for its task",
            ));
        }
        last_comment_at.insert(comment.task_id, comment.created_at);
    }

    for (i, definition) in dataset.field_definitions.iter().enumerate() {
        if !org_ids.contains(&definition.organization_id) {
            issues.push(IntegrityIssue::new(
                "field_definition",
                i,
                "dangling organization_id",
            ));
        }
    }

    let mut value_pairs = HashSet::new();
    for (i, value) in dataset.field_values.iter().enumerate() {
        if !field_ids.contains(&value.field_id) {
            issues.push(IntegrityIssue::new("field_value", i, "dangling field_id"));
        }
        if !task_index.contains_key(&value.task_id) {
            issues.push(IntegrityIssue::new("field_value", i, "dangling task_id"));
        }
        if !value_pairs.insert((value.field_id, value.task_id)) {
            issues.push(IntegrityIssue::new(
                "field_value",
                i,
                "duplicate (definition, task) value",
            ));
        }
    }

    for (i, tag) in dataset.tags.iter().enumerate() {
        if !org_ids.contains(&tag.organization_id) {
            issues.push(IntegrityIssue::new("tag", i, "dangling organization_id"));
        }
    }

    let mut tag_pairs = HashSet::new();
    for (i, link) in dataset.task_tags.iter().enumerate() {
        if !task_index.contains_key(&link.task_id) {
            issues.push(IntegrityIssue::new("task_tag", i, "dangling task_id"));
        }
        if !tag_ids.contains(&link.tag_id) {
            issues.push(IntegrityIssue::new("task_tag", i, "dangling tag_id"));
        }
        if !tag_pairs.insert((link.task_id, link.tag_id)) {
            issues.push(IntegrityIssue::new(
                "task_tag",
                i,
                "duplicate (task, tag) link",
            ));
        }
    }

    issues
}
