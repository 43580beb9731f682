use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use worksim_core::{Dataset, Department, RunConfig, validate_dataset};

use crate::binder::Binder;
use crate::corpus::NameTable;
use crate::errors::GenerationError;
use crate::factories::{
    FactoryContext, comment, custom_field, membership, organization, project, section, subtask,
    tag, task, team, user,
};
use crate::inject;
use crate::model::{GenerateOptions, GenerationReport};
use crate::scheduler;
use crate::stream::RunStream;
use crate::temporal::TemporalEngine;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub dataset: Dataset,
    pub report: GenerationReport,
}

/// Entry point: drives the entity-type DAG stage by stage, each stage
/// consuming the previous stages' output as read-only context, and yields
/// the finished collections in dependency order.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, config: &RunConfig) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let plan = scheduler::plan(config)?;
        info!(
            seed = config.seed,
            users = plan.users,
            teams = plan.teams,
            projects = plan.projects,
            tasks = plan.tasks,
            "generation started"
        );

        let stream = RunStream::new(config.seed);
        let temporal = TemporalEngine::new(plan.sim_end);
        let names = match &self.options.names {
            Some(names) => names.clone(),
            None => NameTable::builtin()?,
        };
        let ctx = FactoryContext {
            config,
            plan: &plan,
            stream: &stream,
            temporal: &temporal,
            names: &names,
        };

        let org = organization::build(&ctx);
        let teams = team::build_all(&ctx, &org)?;
        info!(count = teams.len(), "teams generated");

        let users = user::build_all(&ctx)?;
        info!(count = users.len(), "users generated");

        let memberships = membership::build_all(&ctx, &teams, &users)?;
        info!(count = memberships.len(), "memberships generated");

        let binder = Binder::new(&users, &memberships);
        let team_sizes: Vec<usize> = {
            let mut sizes: BTreeMap<Uuid, usize> = BTreeMap::new();
            for m in &memberships {
                *sizes.entry(m.team_id).or_insert(0) += 1;
            }
            teams
                .iter()
                .map(|team| sizes.get(&team.id).copied().unwrap_or(0))
                .collect()
        };

        let (projects, profiles) = project::build_all(&ctx, &teams, &team_sizes, &binder)?;
        info!(count = projects.len(), "projects generated");

        let sections = section::build_all(&ctx, &projects, &profiles)?;
        info!(count = sections.len(), "sections generated");

        let mut tasks = task::build_all(
            &ctx,
            &projects,
            &profiles,
            &sections,
            &binder,
            self.options.policy.empty_project_rate,
        )?;
        info!(count = tasks.len(), "tasks generated");

        let subtasks = subtask::build_all(&ctx, &tasks)?;
        info!(count = subtasks.len(), "subtasks generated");
        tasks.extend(subtasks);

        let comments = comment::build_all(&ctx, &tasks, &profiles, &binder)?;
        info!(count = comments.len(), "comments generated");

        let field_definitions = custom_field::build_definitions(&ctx, &org);
        let field_values = custom_field::build_values(&ctx, &field_definitions, &tasks)?;
        info!(count = field_values.len(), "custom field values generated");

        let tags = tag::build_all(&ctx, &org);
        let task_tags = tag::build_links(&ctx, &tasks, &tags)?;
        info!(count = task_tags.len(), "tag links generated");

        let mut dataset = Dataset {
            organizations: vec![org],
            teams,
            users,
            memberships,
            projects,
            sections,
            tasks,
            comments,
            field_definitions,
            field_values,
            tags,
            task_tags,
        };

        let department_by_project: BTreeMap<Uuid, Department> = profiles
            .iter()
            .map(|profile| (profile.project_id, profile.department))
            .collect();
        let injected = inject::run(
            &stream,
            &self.options.policy,
            &mut dataset,
            &department_by_project,
            temporal.now(),
        )?;
        info!(categories = injected.len(), "edge cases injected");

        if self.options.validate {
            let issues = validate_dataset(&dataset, temporal.now());
            if !issues.is_empty() {
                for issue in &issues {
                    warn!(
                        entity = issue.entity,
                        ordinal = issue.ordinal,
                        rule = %issue.rule,
                        "integrity issue"
                    );
                }
                let first = &issues[0];
                return Err(GenerationError::ConstraintViolation {
                    entity: first.entity,
                    ordinal: first.ordinal,
                    rule: format!("{} ({} issues total)", first.rule, issues.len()),
                });
            }
        }

        let report = GenerationReport {
            seed: config.seed,
            counts: dataset
                .counts()
                .into_iter()
                .map(|(name, count)| (name.to_string(), count as u64))
                .collect(),
            injected: injected
                .into_iter()
                .map(|(name, count)| (name.to_string(), count))
                .collect(),
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            rows = dataset.total_rows(),
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult { dataset, report })
    }
}
