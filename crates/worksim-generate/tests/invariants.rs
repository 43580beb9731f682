use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use worksim_core::{Dataset, RunConfig, validate_dataset};
use worksim_generate::temporal::min_completion_gap;
use worksim_generate::{GenerateOptions, GenerationEngine};

fn scenario_run() -> (RunConfig, Dataset) {
    let config = RunConfig {
        users: 50,
        teams: 5,
        projects: None,
        tasks: 500,
        seed: 42,
        ..RunConfig::default()
    };
    let engine = GenerationEngine::new(GenerateOptions::default());
    let dataset = engine.run(&config).expect("scenario run").dataset;
    (config, dataset)
}

#[test]
fn scenario_counts_and_bands_hold() {
    let (_, dataset) = scenario_run();

    assert_eq!(dataset.organizations.len(), 1);
    assert_eq!(dataset.users.len(), 50);
    assert_eq!(dataset.teams.len(), 5);
    assert_eq!(dataset.parent_tasks().count(), 500);

    for team in &dataset.teams {
        let size = dataset
            .memberships
            .iter()
            .filter(|membership| membership.team_id == team.id)
            .count();
        assert!((8..=20).contains(&size), "team '{}' sized {size}", team.name);
    }
}

#[test]
fn scenario_has_zero_integrity_issues() {
    let (config, dataset) = scenario_run();
    let issues = validate_dataset(&dataset, config.now);
    assert!(issues.is_empty(), "integrity issues: {issues:?}");
}

#[test]
fn completions_respect_the_minimum_gap() {
    let (config, dataset) = scenario_run();
    for task in &dataset.tasks {
        if let Some(done) = task.completed_at {
            assert!(done >= task.created_at + min_completion_gap());
            assert!(done <= config.now);
        }
    }
}

#[test]
fn assignees_belong_to_the_owning_team() {
    let (_, dataset) = scenario_run();
    let team_by_project: BTreeMap<Uuid, Uuid> = dataset
        .projects
        .iter()
        .map(|project| (project.id, project.team_id))
        .collect();
    let mut members: BTreeMap<Uuid, BTreeSet<Uuid>> = BTreeMap::new();
    for membership in &dataset.memberships {
        members
            .entry(membership.team_id)
            .or_default()
            .insert(membership.user_id);
    }

    for task in &dataset.tasks {
        let team_id = team_by_project[&task.project_id];
        let roster = &members[&team_id];
        if let Some(assignee) = task.assignee_id {
            assert!(roster.contains(&assignee), "assignee outside owning team");
        }
        assert!(
            roster.contains(&task.created_by_id),
            "creator outside owning team"
        );
    }
}

#[test]
fn project_owners_are_senior_members_of_their_team() {
    let (_, dataset) = scenario_run();
    let senior: BTreeSet<Uuid> = dataset
        .users
        .iter()
        .filter(|user| user.role.is_senior())
        .map(|user| user.id)
        .collect();
    let mut members: BTreeMap<Uuid, BTreeSet<Uuid>> = BTreeMap::new();
    for membership in &dataset.memberships {
        members
            .entry(membership.team_id)
            .or_default()
            .insert(membership.user_id);
    }

    for project in &dataset.projects {
        assert!(senior.contains(&project.owner_id));
        assert!(members[&project.team_id].contains(&project.owner_id));
    }
}

#[test]
fn subtasks_inherit_and_stay_inside_parent_bounds() {
    let (_, dataset) = scenario_run();
    let parents: BTreeMap<Uuid, _> = dataset
        .parent_tasks()
        .map(|task| (task.id, task))
        .collect();

    let mut seen_subtasks = 0;
    for subtask in dataset.subtasks() {
        let parent = parents[&subtask.parent_task_id.expect("subtask marker")];
        assert_eq!(subtask.project_id, parent.project_id);
        assert_eq!(subtask.section_id, parent.section_id);
        assert!(subtask.created_at >= parent.created_at);
        if let Some(parent_done) = parent.completed_at {
            let done = subtask
                .completed_at
                .expect("subtasks of a completed parent are completed");
            assert!(done <= parent_done);
        }
        seen_subtasks += 1;
    }
    assert!(seen_subtasks > 0, "scenario produced no subtasks");
}

#[test]
fn sections_are_dense_per_project() {
    let (_, dataset) = scenario_run();
    let mut positions: BTreeMap<Uuid, Vec<u32>> = BTreeMap::new();
    for section in &dataset.sections {
        positions
            .entry(section.project_id)
            .or_default()
            .push(section.position);
    }
    for (_, mut found) in positions {
        found.sort();
        let expected: Vec<u32> = (0..found.len() as u32).collect();
        assert_eq!(found, expected);
    }
}

#[test]
fn output_collections_emit_referents_before_referencing_rows() {
    let (_, dataset) = scenario_run();
    // Subtasks are the only intra-collection references; a parent must
    // appear earlier in the task collection than its subtasks.
    let mut seen: BTreeSet<Uuid> = BTreeSet::new();
    for task in &dataset.tasks {
        if let Some(parent) = task.parent_task_id {
            assert!(seen.contains(&parent), "subtask emitted before its parent");
        }
        seen.insert(task.id);
    }
}
