use chrono::Duration;
use rand::Rng;

use worksim_core::{Department, Organization, Team};

use crate::corpus;
use crate::errors::GenerationError;
use crate::scheduler::ORG_LEAD_DAYS;
use crate::temporal::Window;

use super::{FactoryContext, apportion, deterministic_uuid};

/// Build all teams: departments apportioned to the documented shares,
/// names drawn from the department vocabulary, creation inside the
/// organization's first months.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    organization: &Organization,
) -> Result<Vec<Team>, GenerationError> {
    let weights: Vec<f64> = corpus::DEPARTMENT_WEIGHTS
        .iter()
        .map(|(_, weight)| *weight)
        .collect();
    let counts = apportion(ctx.plan.teams, &weights);

    let window = Window::new(
        organization.created_at + Duration::days(1),
        organization.created_at + Duration::days(ORG_LEAD_DAYS),
    );

    let mut teams = Vec::with_capacity(ctx.plan.teams as usize);
    let mut ordinal = 0_u64;
    for ((department, _), count) in corpus::DEPARTMENT_WEIGHTS.iter().zip(counts) {
        let mut available: Vec<&str> = corpus::team_names(*department).to_vec();
        for dept_index in 0..count {
            let mut rng = ctx.stream.derive("team", ordinal);
            let name = if available.is_empty() {
                format!("{} Team {}", department.as_str(), dept_index + 1)
            } else {
                available.remove(rng.random_range(0..available.len())).to_string()
            };
            let created_at =
                ctx.temporal
                    .creation_within(&mut rng, "team", ordinal as usize, window)?;
            teams.push(Team {
                id: deterministic_uuid(&mut rng),
                description: describe(*department, &name),
                name,
                organization_id: organization.id,
                department: *department,
                created_at,
            });
            ordinal += 1;
        }
    }

    Ok(teams)
}

fn describe(department: Department, name: &str) -> String {
    let focus = name
        .replace(department.as_str(), "")
        .trim()
        .to_lowercase();
    let focus = if focus.is_empty() { "core".to_string() } else { focus };
    corpus::team_description(department).replace("{focus}", &focus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::NameTable;
    use crate::factories::organization;
    use crate::scheduler;
    use crate::stream::RunStream;
    use crate::temporal::TemporalEngine;
    use worksim_core::RunConfig;

    #[test]
    fn departments_follow_the_documented_shares() {
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
        let teams = build_all(&ctx, &org).expect("teams build");

        assert_eq!(teams.len(), 35);
        let engineering = teams
            .iter()
            .filter(|team| team.department == Department::Engineering)
            .count();
        assert_eq!(engineering, 14);
        assert!(teams.iter().all(|team| team.created_at >= org.created_at));
        let names: std::collections::HashSet<&str> =
            teams.iter().map(|team| team.name.as_str()).collect();
        assert_eq!(names.len(), teams.len(), "team names are unique");
    }
}
