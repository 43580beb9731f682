//! Large-N statistical conformance, tolerance-bounded.

use std::collections::BTreeMap;

use uuid::Uuid;

use worksim_core::{Dataset, RunConfig};
use worksim_generate::{GenerateOptions, GenerationEngine};

fn default_run() -> Dataset {
    let engine = GenerationEngine::new(GenerateOptions::default());
    engine
        .run(&RunConfig::default())
        .expect("default run")
        .dataset
}

#[test]
fn unassigned_task_rate_is_near_fifteen_percent() {
    let dataset = default_run();
    let parents: Vec<_> = dataset.parent_tasks().collect();
    let unassigned = parents
        .iter()
        .filter(|task| task.assignee_id.is_none())
        .count();
    let rate = unassigned as f64 / parents.len() as f64;
    assert!(
        (0.10..=0.20).contains(&rate),
        "unassigned rate {rate} outside 15% +/- 5%"
    );
}

#[test]
fn zero_comment_rate_is_near_thirty_percent() {
    let dataset = default_run();
    let mut commented: BTreeMap<Uuid, u64> = BTreeMap::new();
    for comment in &dataset.comments {
        *commented.entry(comment.task_id).or_insert(0) += 1;
    }
    let zero = dataset
        .tasks
        .iter()
        .filter(|task| !commented.contains_key(&task.id))
        .count();
    let rate = zero as f64 / dataset.tasks.len() as f64;
    assert!(
        (0.20..=0.40).contains(&rate),
        "zero-comment rate {rate} outside 30% +/- 10%"
    );
}

#[test]
fn team_size_mean_is_in_band() {
    let dataset = default_run();
    let mean = dataset.memberships.len() as f64 / dataset.teams.len() as f64;
    assert!(
        (11.5..=17.5).contains(&mean),
        "team size mean {mean} outside 14.5 +/- 3.0"
    );
}

#[test]
fn tasks_per_project_average_stays_in_band() {
    let dataset = default_run();
    let mean = dataset.parent_tasks().count() as f64 / dataset.projects.len() as f64;
    assert!(
        (30.0..=80.0).contains(&mean),
        "tasks-per-project mean {mean} outside [30, 80]"
    );
}

#[test]
fn report_serializes_with_counts_and_injections() {
    let engine = GenerationEngine::new(GenerateOptions::default());
    let report = engine
        .run(&RunConfig {
            users: 50,
            teams: 5,
            projects: None,
            tasks: 500,
            ..RunConfig::default()
        })
        .expect("scenario run")
        .report;
    let json = serde_json::to_string(&report).expect("report serializes");
    assert!(json.contains("\"tasks\""));
    assert!(json.contains("overdue_tasks"));
    assert_eq!(report.counts.get("users").copied(), Some(50));
}

#[test]
fn some_overdue_tasks_were_injected() {
    let engine = GenerationEngine::new(GenerateOptions::default());
    let result = engine.run(&RunConfig::default()).expect("default run");
    let now = RunConfig::default().now.date();
    let overdue = result
        .dataset
        .tasks
        .iter()
        .filter(|task| {
            !task.completed && task.due_date.is_some_and(|due| due < now)
        })
        .count();
    assert!(overdue > 0, "no overdue open tasks in the dataset");
    assert!(result.report.injected.get("overdue_tasks").copied().unwrap_or(0) > 0);
}

#[test]
fn archived_projects_lean_heavily_completed() {
    let dataset = default_run();
    let mut completion_by_project: BTreeMap<Uuid, (u64, u64)> = BTreeMap::new();
    for task in dataset.parent_tasks() {
        let entry = completion_by_project.entry(task.project_id).or_insert((0, 0));
        entry.1 += 1;
        if task.completed {
            entry.0 += 1;
        }
    }

    // Statistical target, not a per-record rule: archived projects should
    // average a clearly higher completion share than the whole population.
    let mut archived_rates = Vec::new();
    for project in dataset.projects.iter().filter(|project| project.archived) {
        if let Some((done, total)) = completion_by_project.get(&project.id)
            && *total > 0
        {
            archived_rates.push(*done as f64 / *total as f64);
        }
    }
    assert!(!archived_rates.is_empty(), "no archived projects generated");
    let mean = archived_rates.iter().sum::<f64>() / archived_rates.len() as f64;
    assert!(mean > 0.60, "archived completion mean {mean} too low");
}
