//! Edge-case injection post-pass.
//!
//! Operates on the fully-bound, temporally-valid dataset and converts a
//! sampled subset into documented anomalies by adjusting specific fields.
//! Every mutation is gated so the core ordering and referential rules
//! keep holding, and every category draws from its own keyed sub-stream,
//! so re-running the pass on the same pre-injection batch with the same
//! seed selects identical subsets.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use worksim_core::{Dataset, Department};

use crate::errors::GenerationError;
use crate::sampler::{self, LogNormalDays};
use crate::stream::RunStream;

/// Additive overdue-probability factors. The factors can sum past 1.0, so
/// the computed probability is clamped into [0, 1] before use.
#[derive(Debug, Clone, Copy)]
pub struct OverdueModel {
    /// Base rate for any open task with a due date.
    pub base: f64,
    /// Engineering team during a release window.
    pub release_window: f64,
    /// Task open for more than 14 days.
    pub stale: f64,
    /// Effort L or XL.
    pub heavy_effort: f64,
    /// Priority P3.
    pub low_priority: f64,
}

impl Default for OverdueModel {
    fn default() -> Self {
        Self {
            base: 0.05,
            release_window: 0.03,
            stale: 0.02,
            heavy_effort: 0.02,
            low_priority: 0.015,
        }
    }
}

/// Per-task inputs to the overdue model.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskSignals<'a> {
    pub department: Option<Department>,
    pub in_release_window: bool,
    pub open_days: i64,
    pub effort: Option<&'a str>,
    pub priority: Option<&'a str>,
}

impl OverdueModel {
    /// Sum of the applicable factors, clamped into [0, 1].
    pub fn probability(&self, signals: &TaskSignals<'_>) -> f64 {
        let mut p = self.base;
        if signals.department == Some(Department::Engineering) && signals.in_release_window {
            p += self.release_window;
        }
        if signals.open_days > 14 {
            p += self.stale;
        }
        if matches!(signals.effort, Some("L" | "XL")) {
            p += self.heavy_effort;
        }
        if signals.priority.is_some_and(|value| value.starts_with("P3")) {
            p += self.low_priority;
        }
        p.clamp(0.0, 1.0)
    }
}

/// Target rates for the injected anomaly categories.
#[derive(Debug, Clone, Copy)]
pub struct InjectionPolicy {
    pub overdue: OverdueModel,
    /// Open tasks older than two weeks that lose their due date.
    pub stalled_rate: f64,
    /// Old projects flipped to archived while not completed.
    pub abandoned_rate: f64,
    /// Referenced users deactivated after the fact.
    pub dormant_user_rate: f64,
    /// Projects that get one non-standard section name.
    pub nonstandard_section_rate: f64,
    /// Projects generated with no tasks at all. Honored by the task
    /// distribution, since a post-pass cannot delete records.
    pub empty_project_rate: f64,
}

impl Default for InjectionPolicy {
    fn default() -> Self {
        Self {
            overdue: OverdueModel::default(),
            stalled_rate: 0.05,
            abandoned_rate: 0.05,
            dormant_user_rate: 0.02,
            nonstandard_section_rate: 0.05,
            empty_project_rate: 0.03,
        }
    }
}

const NONSTANDARD_SECTION_NAMES: [&str; 5] = [
    "Icebox",
    "Parking Lot",
    "Someday / Maybe",
    "Waiting on Vendor",
    "Graveyard",
];

/// True inside the release window: the last 14 days of a calendar quarter.
pub fn in_release_window(date: NaiveDate) -> bool {
    let (month, day) = match date.month() {
        1..=3 => (3, 31),
        4..=6 => (6, 30),
        7..=9 => (9, 30),
        _ => (12, 31),
    };
    let Some(quarter_end) = NaiveDate::from_ymd_opt(date.year(), month, day) else {
        return false;
    };
    (quarter_end - date).num_days() < 14
}

/// Run the injection pass. Returns per-category mutation counts.
pub fn run(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
    department_by_project: &BTreeMap<Uuid, Department>,
    now: NaiveDateTime,
) -> Result<BTreeMap<&'static str, u64>, GenerationError> {
    let mut summary = BTreeMap::new();

    let overdue_touched = inject_overdue(stream, policy, dataset, department_by_project, now)?;
    summary.insert("overdue_tasks", overdue_touched.len() as u64);
    summary.insert(
        "stalled_tasks",
        inject_stalled(stream, policy, dataset, &overdue_touched, now),
    );
    summary.insert(
        "abandoned_projects",
        inject_abandoned(stream, policy, dataset, now),
    );
    summary.insert("dormant_users", inject_dormant_users(stream, policy, dataset));
    summary.insert(
        "nonstandard_sections",
        inject_nonstandard_sections(stream, policy, dataset),
    );

    Ok(summary)
}

fn inject_overdue(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
    department_by_project: &BTreeMap<Uuid, Department>,
    now: NaiveDateTime,
) -> Result<BTreeSet<Uuid>, GenerationError> {
    let offsets = LogNormalDays::from_mean_std(3.0, 5.0)?;
    let (efforts, priorities) = field_signals(dataset);
    let release_window = in_release_window(now.date());

    let mut rng = stream.derive("inject.overdue", 0);
    let mut touched = BTreeSet::new();

    for task in dataset.tasks.iter_mut() {
        if task.completed || task.due_date.is_none() {
            continue;
        }
        let signals = TaskSignals {
            department: department_by_project.get(&task.project_id).copied(),
            in_release_window: release_window,
            open_days: (now - task.created_at).num_days(),
            effort: efforts.get(&task.id).map(String::as_str),
            priority: priorities.get(&task.id).map(String::as_str),
        };
        if !sampler::bernoulli(&mut rng, policy.overdue.probability(&signals)) {
            continue;
        }
        let days = offsets.sample_days(&mut rng).round().max(1.0) as i64;
        let candidate = now.date() - Duration::days(days);
        // Gated: the shifted due date must stay after creation and remain
        // in the past, otherwise the task is left untouched.
        if candidate > task.created_at.date() && candidate < now.date() {
            task.due_date = Some(candidate);
            touched.insert(task.id);
        }
    }

    Ok(touched)
}

fn inject_stalled(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
    overdue_touched: &BTreeSet<Uuid>,
    now: NaiveDateTime,
) -> u64 {
    let mut rng = stream.derive("inject.stalled", 0);
    let mut count = 0;
    for task in dataset.tasks.iter_mut() {
        if task.completed
            || task.due_date.is_none()
            || overdue_touched.contains(&task.id)
            || (now - task.created_at).num_days() <= 14
        {
            continue;
        }
        if sampler::bernoulli(&mut rng, policy.stalled_rate) {
            task.due_date = None;
            count += 1;
        }
    }
    count
}

fn inject_abandoned(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
    now: NaiveDateTime,
) -> u64 {
    let mut rng = stream.derive("inject.abandoned", 0);
    let mut count = 0;
    for project in dataset.projects.iter_mut() {
        if project.archived || (now - project.created_at).num_days() <= 90 {
            continue;
        }
        if sampler::bernoulli(&mut rng, policy.abandoned_rate) {
            // Archived while status stays wherever it was; archived but
            // not completed is legal.
            project.archived = true;
            count += 1;
        }
    }
    count
}

fn inject_dormant_users(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
) -> u64 {
    let mut referenced: BTreeSet<Uuid> = BTreeSet::new();
    for project in &dataset.projects {
        referenced.insert(project.owner_id);
    }
    for task in &dataset.tasks {
        referenced.insert(task.created_by_id);
        if let Some(assignee) = task.assignee_id {
            referenced.insert(assignee);
        }
    }
    for comment in &dataset.comments {
        referenced.insert(comment.author_id);
    }

    let mut rng = stream.derive("inject.dormant", 0);
    let mut count = 0;
    for user in dataset.users.iter_mut() {
        if !user.is_active || !referenced.contains(&user.id) {
            continue;
        }
        if sampler::bernoulli(&mut rng, policy.dormant_user_rate) {
            user.is_active = false;
            count += 1;
        }
    }
    count
}

fn inject_nonstandard_sections(
    stream: &RunStream,
    policy: &InjectionPolicy,
    dataset: &mut Dataset,
) -> u64 {
    use rand::Rng;

    let mut by_project: BTreeMap<Uuid, Vec<usize>> = BTreeMap::new();
    for (index, section) in dataset.sections.iter().enumerate() {
        by_project.entry(section.project_id).or_default().push(index);
    }

    let mut rng = stream.derive("inject.sections", 0);
    let mut count = 0;
    for project in &dataset.projects {
        let Some(indices) = by_project.get(&project.id) else {
            continue;
        };
        // Keep the first and terminal columns intact.
        if indices.len() < 3 || !sampler::bernoulli(&mut rng, policy.nonstandard_section_rate) {
            continue;
        }
        let slot = rng.random_range(1..indices.len() - 1);
        let name = NONSTANDARD_SECTION_NAMES
            [rng.random_range(0..NONSTANDARD_SECTION_NAMES.len())];
        dataset.sections[indices[slot]].name = name.to_string();
        count += 1;
    }
    count
}

/// Effort and priority values per task, pulled from the custom-field
/// collections.
fn field_signals(dataset: &Dataset) -> (BTreeMap<Uuid, String>, BTreeMap<Uuid, String>) {
    let mut effort_field = None;
    let mut priority_field = None;
    for definition in &dataset.field_definitions {
        match definition.name.as_str() {
            "Effort" => effort_field = Some(definition.id),
            "Priority" => priority_field = Some(definition.id),
            _ => {}
        }
    }

    let mut efforts = BTreeMap::new();
    let mut priorities = BTreeMap::new();
    for value in &dataset.field_values {
        if Some(value.field_id) == effort_field {
            efforts.insert(value.task_id, value.value.clone());
        } else if Some(value.field_id) == priority_field {
            priorities.insert(value.task_id, value.value.clone());
        }
    }
    (efforts, priorities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_probability_sums_all_five_factors() {
        let model = OverdueModel::default();
        let signals = TaskSignals {
            department: Some(Department::Engineering),
            in_release_window: true,
            open_days: 20,
            effort: Some("XL"),
            priority: Some("P3 - Low"),
        };
        let expected = 0.05 + 0.03 + 0.02 + 0.02 + 0.015;
        assert!((model.probability(&signals) - expected).abs() < 1e-12);
    }

    #[test]
    fn overdue_probability_base_only_for_a_plain_task() {
        let model = OverdueModel::default();
        let signals = TaskSignals {
            department: Some(Department::Sales),
            in_release_window: true,
            open_days: 3,
            effort: Some("M"),
            priority: Some("P1 - High"),
        };
        assert!((model.probability(&signals) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn overdue_probability_clamps_to_one() {
        let model = OverdueModel {
            base: 0.95,
            release_window: 0.30,
            ..OverdueModel::default()
        };
        let signals = TaskSignals {
            department: Some(Department::Engineering),
            in_release_window: true,
            ..TaskSignals::default()
        };
        assert_eq!(model.probability(&signals), 1.0);
    }

    #[test]
    fn release_window_covers_quarter_tails() {
        let inside = NaiveDate::from_ymd_opt(2025, 3, 25).expect("valid date");
        let boundary = NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date");
        let outside = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");
        assert!(in_release_window(inside));
        assert!(in_release_window(boundary));
        assert!(!in_release_window(outside));
    }
}
