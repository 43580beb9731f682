use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use uuid::Uuid;

use worksim_core::{Department, Project, ProjectStatus, Team};

use crate::binder::Binder;
use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler::{self, TruncatedNormal};
use crate::temporal::Window;

use super::{FactoryContext, apportion, deterministic_uuid};

/// Generation-side view of a project that downstream factories need but
/// the persisted record does not carry.
#[derive(Debug, Clone)]
pub struct ProjectProfile {
    pub project_id: Uuid,
    pub team_id: Uuid,
    pub department: Department,
    /// Component vocabulary this project's tasks draw their names from.
    pub focus: Vec<&'static str>,
    pub completion_rate: f64,
}

/// Build all projects plus their generation profiles. Projects are
/// apportioned to teams by roster weight, owners are senior/lead members
/// of the owning team, and 60% carry due dates clustered on quarter ends.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    teams: &[Team],
    team_sizes: &[usize],
    binder: &Binder,
) -> Result<(Vec<Project>, Vec<ProjectProfile>), GenerationError> {
    let weights: Vec<f64> = team_sizes.iter().map(|size| *size as f64).collect();
    let mut counts = apportion(ctx.plan.projects, &weights);
    // Every team runs at least one project; take the surplus from the
    // largest allocations.
    for index in 0..counts.len() {
        while counts[index] == 0 {
            let Some(donor) = counts
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 1)
                .max_by_key(|(i, count)| (**count, usize::MAX - *i))
                .map(|(i, _)| i)
            else {
                break;
            };
            counts[donor] -= 1;
            counts[index] += 1;
        }
    }

    let mut projects = Vec::with_capacity(ctx.plan.projects as usize);
    let mut profiles = Vec::with_capacity(ctx.plan.projects as usize);
    let mut used_names: HashSet<String> = HashSet::new();
    let mut ordinal = 0_u64;

    for (team, count) in teams.iter().zip(counts) {
        for _ in 0..count {
            let mut rng = ctx.stream.derive("project", ordinal);

            let window = Window::new(
                team.created_at.max(ctx.plan.sim_start),
                ctx.plan.sim_end - Duration::days(7),
            );
            let created_at =
                ctx.temporal
                    .creation_within(&mut rng, "project", ordinal as usize, window)?;

            let name = unique_name(&mut rng, team.department, created_at.date(), &mut used_names);
            let owner_id = binder.pick_project_owner(&mut rng, team.id)?;
            let due_date = due_date(&mut rng, created_at.date());

            let age_days = (ctx.plan.sim_end - created_at).num_days();
            let (archived, status) = if age_days > 180 {
                let archived = sampler::bernoulli(&mut rng, ctx.config.archived_rate);
                (archived, pick_status(&mut rng, &[0.20, 0.10, 0.70])?)
            } else {
                (false, pick_status(&mut rng, &[0.70, 0.10, 0.20])?)
            };

            let completion_rate =
                completion_rate(&mut rng, team.department, &name, status, archived)?;
            let focus = pick_focus(&mut rng, team.department);

            let blurb = corpus::pick(&mut rng, &corpus::PROJECT_BLURBS);
            let description = format!("Project focused on {}. {}", name.to_lowercase(), blurb);

            let id = deterministic_uuid(&mut rng);
            profiles.push(ProjectProfile {
                project_id: id,
                team_id: team.id,
                department: team.department,
                focus,
                completion_rate,
            });
            projects.push(Project {
                id,
                name,
                description,
                team_id: team.id,
                owner_id,
                status,
                created_at,
                due_date,
                archived,
            });
            ordinal += 1;
        }
    }

    Ok((projects, profiles))
}

fn unique_name(
    rng: &mut rand_chacha::ChaCha8Rng,
    department: Department,
    created: NaiveDate,
    used: &mut HashSet<String>,
) -> String {
    let templates = corpus::project_templates(department);
    let template = corpus::pick(rng, templates);
    let quarter = (created.month0() / 3) + 1;
    let seeded = template
        .replace("{quarter}", &quarter.to_string())
        .replace("{year}", &created.year().to_string());
    let base = corpus::fill_template(rng, &seeded, corpus::focus_pool(department));

    let mut name = base.clone();
    let mut counter = 1;
    while used.contains(&name) {
        counter += 1;
        name = format!("{base} ({counter})");
    }
    used.insert(name.clone());
    name
}

/// 60% of projects carry a due date, preferring upcoming quarter ends.
fn due_date(rng: &mut rand_chacha::ChaCha8Rng, created: NaiveDate) -> Option<NaiveDate> {
    if !sampler::bernoulli(rng, 0.60) {
        return None;
    }
    let mut quarter_ends = Vec::new();
    for year in [created.year(), created.year() + 1] {
        for (month, day) in [(3, 31), (6, 30), (9, 30), (12, 31)] {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
                && date > created
            {
                quarter_ends.push(date);
            }
        }
    }
    quarter_ends.truncate(2);
    if quarter_ends.is_empty() {
        return Some(created + Duration::days(rng.random_range(30..=90)));
    }
    Some(quarter_ends[rng.random_range(0..quarter_ends.len())])
}

fn pick_status(
    rng: &mut rand_chacha::ChaCha8Rng,
    weights: &[f64],
) -> Result<ProjectStatus, GenerationError> {
    const STATUSES: [ProjectStatus; 3] = [
        ProjectStatus::Active,
        ProjectStatus::Paused,
        ProjectStatus::Completed,
    ];
    Ok(STATUSES[sampler::weighted_index(rng, weights)?])
}

/// Task completion rate this project will aim for, drawn from a normal
/// truncated to the band for its kind. Archived and completed projects
/// land in the 80-95% band, which keeps the archived-project completion
/// share a statistical target rather than a hard rule.
fn completion_rate(
    rng: &mut rand_chacha::ChaCha8Rng,
    department: Department,
    name: &str,
    status: ProjectStatus,
    archived: bool,
) -> Result<f64, GenerationError> {
    let (lo, hi) = if archived || status == ProjectStatus::Completed {
        (0.80, 0.95)
    } else if name.contains("Sprint") {
        (0.70, 0.85)
    } else if department == Department::Marketing {
        (0.60, 0.75)
    } else {
        (0.45, 0.65)
    };
    let dist = TruncatedNormal::new((lo + hi) / 2.0, (hi - lo) / 4.0, lo, hi)?;
    Ok(dist.sample(rng))
}

fn pick_focus(rng: &mut rand_chacha::ChaCha8Rng, department: Department) -> Vec<&'static str> {
    let pool = corpus::focus_pool(department);
    let take = rng.random_range(3..=5).min(pool.len());
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.random_range(0..=i);
        indices.swap(i, j);
    }
    indices.truncate(take);
    indices.sort();
    indices.into_iter().map(|i| pool[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::NameTable;
    use crate::factories::{membership, organization, team, user};
    use crate::scheduler;
    use crate::stream::RunStream;
    use crate::temporal::TemporalEngine;
    use worksim_core::RunConfig;

    #[test]
    fn projects_bind_senior_owners_and_stay_unique() {
        let config = RunConfig::default();
        let plan = scheduler::plan(&config).expect("feasible config");
        let stream = RunStream::new(config.seed);
        let temporal = TemporalEngine::new(plan.sim_end);
        let names = NameTable::builtin().expect("builtin table");
        let ctx = FactoryContext {
            config: &config,
            plan: &plan,
            stream: &stream,
            temporal: &temporal,
            names: &names,
        };
        let org = organization::build(&ctx);
        let teams = team::build_all(&ctx, &org).expect("teams build");
        let users = user::build_all(&ctx).expect("users build");
        let memberships = membership::build_all(&ctx, &teams, &users).expect("memberships build");
        let binder = Binder::new(&users, &memberships);
        let team_sizes: Vec<usize> = teams
            .iter()
            .map(|team| {
                memberships
                    .iter()
                    .filter(|membership| membership.team_id == team.id)
                    .count()
            })
            .collect();

        let (projects, profiles) =
            build_all(&ctx, &teams, &team_sizes, &binder).expect("projects build");

        assert_eq!(projects.len(), 100);
        assert_eq!(profiles.len(), 100);
        let names: HashSet<&str> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), projects.len());

        let senior: HashSet<_> = users
            .iter()
            .filter(|user| user.role.is_senior())
            .map(|user| user.id)
            .collect();
        for project in &projects {
            assert!(senior.contains(&project.owner_id));
            if let Some(due) = project.due_date {
                assert!(due >= project.created_at.date());
            }
        }
        for profile in &profiles {
            assert!((3..=5).contains(&profile.focus.len()));
        }
    }
}
