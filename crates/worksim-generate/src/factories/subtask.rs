use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use worksim_core::Task;

use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler::{self, ZeroInflatedPoisson};
use crate::temporal::{Window, min_completion_gap};

use super::task::cycle_time_dist;
use super::{FactoryContext, deterministic_uuid};

const MAX_SUBTASKS: u64 = 10;
/// Poisson rate of the non-zero subtask-count branch.
const SUBTASK_LAMBDA: f64 = 3.5;

/// Build subtasks for a slice of parent tasks. A subtask inherits project,
/// section, assignee, creator and due date; it is created after its parent
/// and, when the parent is completed, finishes strictly inside the
/// 30-90% band of the parent's cycle-time span, in position order.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    parents: &[Task],
) -> Result<Vec<Task>, GenerationError> {
    let counts = ZeroInflatedPoisson::new(1.0 - ctx.config.subtask_rate, SUBTASK_LAMBDA)?;
    let cycle = cycle_time_dist()?;

    let mut subtasks = Vec::new();
    let mut ordinal = 0_u64;

    for (parent_index, parent) in parents.iter().enumerate() {
        let mut rng = ctx.stream.derive("subtask.parent", parent_index as u64);
        let drawn = counts.sample(&mut rng);
        if drawn == 0 {
            continue;
        }
        let count = drawn.clamp(2, MAX_SUBTASKS) as usize;

        let creation_upper = match parent.completed_at {
            Some(done) => (parent.created_at + Duration::days(2)).min(done - min_completion_gap()),
            None => (parent.created_at + Duration::days(2)).min(ctx.plan.sim_end),
        };
        let creation_window = Window::new(parent.created_at, creation_upper.max(parent.created_at));

        let mut names: Vec<String> = Vec::with_capacity(count);
        let mut created: Vec<NaiveDateTime> = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(pick_name(&mut rng, &names));
            created.push(ctx.temporal.creation_within(
                &mut rng,
                "subtask",
                ordinal as usize,
                creation_window,
            )?);
        }
        created.sort();

        let completions: Vec<Option<NaiveDateTime>> = match parent.completed_at {
            Some(parent_done) => {
                completion_times_within_parent(&mut rng, parent.created_at, parent_done, &created)
                    .into_iter()
                    .map(Some)
                    .collect()
            }
            None => {
                let mut slots = Vec::with_capacity(count);
                for (i, created_at) in created.iter().enumerate() {
                    let p = (0.3 + 0.1 * i as f64).min(0.8);
                    if sampler::bernoulli(&mut rng, p) {
                        slots.push(Some(ctx.temporal.completion_within(
                            &mut rng,
                            "subtask",
                            ordinal as usize + i,
                            *created_at,
                            ctx.plan.sim_end,
                            &cycle,
                        )?));
                    } else {
                        slots.push(None);
                    }
                }
                slots
            }
        };

        for (position, ((name, created_at), completed_at)) in
            names.into_iter().zip(created).zip(completions).enumerate()
        {
            subtasks.push(Task {
                id: deterministic_uuid(&mut rng),
                name,
                description: None,
                project_id: parent.project_id,
                section_id: parent.section_id,
                assignee_id: parent.assignee_id,
                created_by_id: parent.created_by_id,
                parent_task_id: Some(parent.id),
                due_date: parent.due_date,
                created_at,
                completed: completed_at.is_some(),
                completed_at,
                position: position as u32,
            });
            ordinal += 1;
        }
    }

    Ok(subtasks)
}

/// Completion times for the subtasks of a completed parent: each lands
/// strictly between 30% and 90% of the parent's cycle-time span, ordered
/// by position, and never before its own creation plus the minimum gap.
pub fn completion_times_within_parent(
    rng: &mut ChaCha8Rng,
    parent_created: NaiveDateTime,
    parent_completed: NaiveDateTime,
    subtask_created: &[NaiveDateTime],
) -> Vec<NaiveDateTime> {
    let span_seconds = (parent_completed - parent_created).num_seconds().max(1);

    let mut fractions: Vec<f64> = (0..subtask_created.len())
        .map(|_| rng.random_range(0.301..0.899))
        .collect();
    fractions.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut previous: Option<NaiveDateTime> = None;
    fractions
        .iter()
        .zip(subtask_created)
        .map(|(fraction, created)| {
            let offset = Duration::seconds((span_seconds as f64 * fraction) as i64);
            let mut done = (parent_created + offset)
                .max(*created + min_completion_gap())
                .min(parent_completed);
            if let Some(previous) = previous
                && done < previous
            {
                done = previous;
            }
            previous = Some(done);
            done
        })
        .collect()
}

fn pick_name(rng: &mut ChaCha8Rng, taken: &[String]) -> String {
    for _ in 0..10 {
        let candidate = corpus::pick(rng, &corpus::SUBTASK_PATTERNS);
        if !taken.iter().any(|name| name == candidate) {
            return candidate.to_string();
        }
    }
    corpus::pick(rng, &corpus::SUBTASK_PATTERNS).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .expect("valid date")
            .and_hms_opt(hour, 0, 0)
            .expect("valid time")
    }

    #[test]
    fn completed_parent_places_subtasks_inside_the_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let parent_created = at(1, 9);
        let parent_completed = at(21, 9); // 20-day span
        let created = vec![at(1, 10), at(1, 14), at(2, 9)];

        let times =
            completion_times_within_parent(&mut rng, parent_created, parent_completed, &created);

        assert_eq!(times.len(), 3);
        let span = (parent_completed - parent_created).num_seconds() as f64;
        for (done, created_at) in times.iter().zip(&created) {
            let fraction = (*done - parent_created).num_seconds() as f64 / span;
            assert!(
                fraction > 0.30 && fraction < 0.90,
                "fraction {fraction} outside (0.30, 0.90)"
            );
            assert!(*done > *created_at);
            assert!(*done <= parent_completed);
        }
        for pair in times.windows(2) {
            assert!(pair[0] <= pair[1], "completions out of position order");
        }
    }

    #[test]
    fn late_subtask_creation_never_outruns_the_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let parent_created = at(1, 9);
        let parent_completed = at(1, 12); // 3-hour span forces clamping
        let created = vec![at(1, 9), at(1, 10)];

        let times =
            completion_times_within_parent(&mut rng, parent_created, parent_completed, &created);
        for done in times {
            assert!(done <= parent_completed);
            assert!(done > parent_created);
        }
    }
}
