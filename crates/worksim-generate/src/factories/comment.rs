use std::collections::BTreeMap;

use uuid::Uuid;

use worksim_core::{Comment, Task};

use crate::binder::Binder;
use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler::{self, NegativeBinomial};
use crate::temporal::Window;

use super::project::ProjectProfile;
use super::{FactoryContext, deterministic_uuid};

/// Share of tasks with no discussion at all.
const ZERO_COMMENT_RATE: f64 = 0.30;
/// Negative-binomial parameters for the non-zero comment-count branch.
const COMMENT_NB_R: f64 = 2.0;
const COMMENT_NB_P: f64 = 0.5;
const MAX_COMMENTS: u64 = 25;

/// Build comments for every task (subtasks included). Counts follow a
/// zero-inflated negative binomial, authors come from the owning team via
/// the binder's seniority-weighted rule, and timestamps are non-decreasing
/// inside the task's activity window.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    tasks: &[Task],
    profiles: &[ProjectProfile],
    binder: &Binder,
) -> Result<Vec<Comment>, GenerationError> {
    let counts = NegativeBinomial::new(COMMENT_NB_R, COMMENT_NB_P)?;
    let team_by_project: BTreeMap<Uuid, Uuid> = profiles
        .iter()
        .map(|profile| (profile.project_id, profile.team_id))
        .collect();

    let register_weights: Vec<f64> = corpus::COMMENT_REGISTERS
        .iter()
        .map(|(_, weight)| *weight)
        .collect();

    let mut comments = Vec::new();
    for (task_index, task) in tasks.iter().enumerate() {
        let mut rng = ctx.stream.derive("comment", task_index as u64);
        if sampler::bernoulli(&mut rng, ZERO_COMMENT_RATE) {
            continue;
        }
        let count = (1 + counts.sample(&mut rng)).min(MAX_COMMENTS) as usize;

        let team_id = team_by_project.get(&task.project_id).copied().ok_or_else(|| {
            GenerationError::ReferentialGap(format!(
                "no profile for project {} at comment bind time",
                task.project_id
            ))
        })?;

        let upper = task.completed_at.unwrap_or(ctx.plan.sim_end);
        let times = ctx.temporal.comment_times(
            &mut rng,
            "comment",
            task_index,
            Window::new(task.created_at, upper),
            count,
        )?;

        for created_at in times {
            let register = sampler::weighted_index(&mut rng, &register_weights)?;
            let text = corpus::pick(&mut rng, corpus::COMMENT_REGISTERS[register].0).to_string();
            let author_id = binder.pick_comment_author(&mut rng, team_id, task.assignee_id)?;
            comments.push(Comment {
                id: deterministic_uuid(&mut rng),
                task_id: task.id,
                author_id,
                text,
                created_at,
            });
        }
    }

    Ok(comments)
}
