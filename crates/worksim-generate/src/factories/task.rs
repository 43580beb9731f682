use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use worksim_core::{Project, Section, Task};

use crate::binder::Binder;
use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler::{self, LogNormalDays};
use crate::scheduler::MIN_TASK_ALLOCATION;
use crate::temporal::Window;

use super::project::ProjectProfile;
use super::{FactoryContext, deterministic_uuid};

/// Cycle time from creation to completion, log-normal in day-space.
pub fn cycle_time_dist() -> Result<LogNormalDays, GenerationError> {
    LogNormalDays::from_mean_std(5.0, 4.0)
}

/// Build all parent tasks. Task counts are distributed across projects
/// with a small quota of deliberately empty projects; names draw their
/// component vocabulary from the owning project's declared focus.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    projects: &[Project],
    profiles: &[ProjectProfile],
    sections: &[Section],
    binder: &Binder,
    empty_project_rate: f64,
) -> Result<Vec<Task>, GenerationError> {
    let cycle = cycle_time_dist()?;
    let sections_by_project = group_sections(sections);

    let mut quota_rng = ctx.stream.derive("task.quota", 0);
    let empty = pick_empty_projects(&mut quota_rng, projects.len(), empty_project_rate);
    let populated: Vec<usize> = (0..projects.len())
        .filter(|index| !empty.contains(index))
        .collect();
    if populated.is_empty() {
        return Err(GenerationError::Configuration(
            "every project was selected as empty".to_string(),
        ));
    }

    let counts = sampler::distribute_among(
        &mut quota_rng,
        ctx.plan.tasks,
        populated.len(),
        MIN_TASK_ALLOCATION,
    );

    let mut tasks = Vec::with_capacity(ctx.plan.tasks as usize);
    let mut positions: BTreeMap<Uuid, u32> = BTreeMap::new();
    let mut ordinal = 0_u64;

    for (slot, project_index) in populated.into_iter().enumerate() {
        let project = &projects[project_index];
        let profile = &profiles[project_index];
        let project_sections = sections_by_project.get(&project.id).ok_or_else(|| {
            GenerationError::ReferentialGap(format!(
                "project '{}' has no sections at bind time",
                project.name
            ))
        })?;

        for _ in 0..counts[slot] {
            let mut rng = ctx.stream.derive("task", ordinal);
            let task = build_one(
                ctx,
                &mut rng,
                ordinal,
                project,
                profile,
                project_sections,
                binder,
                &cycle,
                &mut positions,
            )?;
            tasks.push(task);
            ordinal += 1;
        }
    }

    Ok(tasks)
}

fn group_sections<'a>(sections: &'a [Section]) -> BTreeMap<Uuid, Vec<&'a Section>> {
    let mut grouped: BTreeMap<Uuid, Vec<&'a Section>> = BTreeMap::new();
    for section in sections {
        grouped.entry(section.project_id).or_default().push(section);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|section| section.position);
    }
    grouped
}

fn pick_empty_projects(
    rng: &mut ChaCha8Rng,
    project_count: usize,
    rate: f64,
) -> Vec<usize> {
    let target = ((project_count as f64 * rate).floor() as usize).min(project_count.saturating_sub(1));
    let mut indices: Vec<usize> = (0..project_count).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.random_range(0..=i);
        indices.swap(i, j);
    }
    let mut empty: Vec<usize> = indices.into_iter().take(target).collect();
    empty.sort();
    empty
}

#[allow(clippy::too_many_arguments)]
fn build_one(
    ctx: &FactoryContext<'_>,
    rng: &mut ChaCha8Rng,
    ordinal: u64,
    project: &Project,
    profile: &ProjectProfile,
    project_sections: &[&Section],
    binder: &Binder,
    cycle: &LogNormalDays,
    positions: &mut BTreeMap<Uuid, u32>,
) -> Result<Task, GenerationError> {
    let templates = corpus::task_templates(profile.department);
    let template = corpus::pick(rng, templates);
    let name = corpus::fill_template(rng, template, &profile.focus);
    let description = description(ctx, rng, &name);

    let window = Window::new(
        project.created_at.max(ctx.plan.sim_start),
        ctx.plan.sim_end - Duration::hours(1),
    );
    let created_at = ctx
        .temporal
        .creation_within(rng, "task", ordinal as usize, window)?;

    let completed = sampler::bernoulli(rng, profile.completion_rate);
    let section = pick_section(rng, project_sections, completed)?;
    let completed_at = if completed {
        Some(ctx.temporal.completion_within(
            rng,
            "task",
            ordinal as usize,
            created_at,
            ctx.plan.sim_end,
            cycle,
        )?)
    } else {
        None
    };

    let due_date = due_date(rng, created_at, ctx.plan.sim_end);
    let assignee_id = binder.pick_assignee(rng, project.team_id, ctx.config.unassigned_rate)?;
    let created_by_id = binder.pick_creator(rng, project.team_id, assignee_id)?;

    let position = positions.entry(section.id).or_insert(0);
    let task = Task {
        id: deterministic_uuid(rng),
        name,
        description,
        project_id: project.id,
        section_id: section.id,
        assignee_id,
        created_by_id,
        parent_task_id: None,
        due_date,
        created_at,
        completed,
        completed_at,
        position: *position,
    };
    *position += 1;
    Ok(task)
}

fn description(
    ctx: &FactoryContext<'_>,
    rng: &mut ChaCha8Rng,
    name: &str,
) -> Option<String> {
    if sampler::bernoulli(rng, ctx.config.empty_description_rate) {
        return None;
    }
    // Among non-empty descriptions, ~62% are one-liners and the rest are
    // short acceptance checklists.
    if sampler::bernoulli(rng, 0.625) {
        if sampler::bernoulli(rng, 0.4) {
            return Some(format!("Complete the task: {name}."));
        }
        return Some(corpus::pick(rng, &corpus::BRIEF_DESCRIPTIONS).to_string());
    }
    let take = rng.random_range(2..=4);
    let mut indices: Vec<usize> = (0..corpus::CHECKLIST_ITEMS.len()).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.random_range(0..=i);
        indices.swap(i, j);
    }
    indices.truncate(take);
    indices.sort();
    let bullets: Vec<&str> = indices
        .into_iter()
        .map(|index| corpus::CHECKLIST_ITEMS[index])
        .collect();
    Some(format!("Acceptance criteria:\n{}", bullets.join("\n")))
}

/// Completed tasks live in the terminal section; open work is weighted
/// toward earlier columns.
fn pick_section<'a>(
    rng: &mut ChaCha8Rng,
    project_sections: &[&'a Section],
    completed: bool,
) -> Result<&'a Section, GenerationError> {
    let Some((last, rest)) = project_sections.split_last() else {
        return Err(GenerationError::ReferentialGap(
            "empty section pool at bind time".to_string(),
        ));
    };
    if completed || rest.is_empty() {
        return Ok(last);
    }
    let weights: Vec<f64> = (0..rest.len()).map(|index| 1.0 / (index as f64 + 1.0)).collect();
    let index = sampler::weighted_index(rng, &weights)?;
    Ok(rest[index])
}

/// Due-date mix: 10% none, 5% already overdue, 25% within a week, 40%
/// within a month, 20% one to three months out.
fn due_date(
    rng: &mut ChaCha8Rng,
    created_at: NaiveDateTime,
    now: NaiveDateTime,
) -> Option<NaiveDate> {
    let roll = rng.random::<f64>();
    if roll < 0.10 {
        return None;
    }
    if roll < 0.15 {
        let due = now.date() - Duration::days(rng.random_range(1..=14));
        if due <= created_at.date() {
            return Some(created_at.date() + Duration::days(1));
        }
        return Some(due);
    }
    let days = if roll < 0.40 {
        rng.random_range(1..=7)
    } else if roll < 0.80 {
        rng.random_range(8..=30)
    } else {
        rng.random_range(31..=90)
    };
    Some(created_at.date() + Duration::days(days))
}
