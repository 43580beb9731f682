use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDateTime};
use rand::Rng;

use worksim_core::{Department, User, UserRole};

use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler;

use super::{FactoryContext, apportion, deterministic_uuid};

const ROLE_WEIGHTS: [(UserRole, f64); 4] = [
    (UserRole::Junior, 0.40),
    (UserRole::Mid, 0.35),
    (UserRole::Senior, 0.20),
    (UserRole::Lead, 0.05),
];

/// Build all users: census-weighted names, unique emails, growth-curve
/// hire dates, role quotas from the documented distribution, tenure-skewed
/// turnover.
pub fn build_all(ctx: &FactoryContext<'_>) -> Result<Vec<User>, GenerationError> {
    let count = ctx.plan.users as usize;
    let roles = role_assignments(ctx, count);
    let hire_dates = hire_dates(ctx, count);

    let department_weights: Vec<f64> = corpus::DEPARTMENT_WEIGHTS
        .iter()
        .map(|(_, weight)| *weight)
        .collect();

    let mut seen_names: HashSet<String> = HashSet::new();
    let mut seen_emails: BTreeMap<String, u32> = BTreeMap::new();
    let mut users = Vec::with_capacity(count);

    for (ordinal, (role, hired_at)) in roles.into_iter().zip(hire_dates).enumerate() {
        let mut rng = ctx.stream.derive("user", ordinal as u64);

        let mut name = ctx.names.full_name(&mut rng);
        let mut attempts = 0;
        while seen_names.contains(&name) && attempts < 10 {
            name = ctx.names.full_name(&mut rng);
            attempts += 1;
        }
        if seen_names.contains(&name) {
            name = format!("{} {}", name, rng.random_range(2..100));
        }
        seen_names.insert(name.clone());

        let local = corpus::email_local(&name);
        let email = match seen_emails.get_mut(&local) {
            None => {
                seen_emails.insert(local.clone(), 1);
                format!("{local}@{}", ctx.config.email_domain)
            }
            Some(counter) => {
                *counter += 1;
                format!("{local}{counter}@{}", ctx.config.email_domain)
            }
        };

        let dept_index = sampler::weighted_index(&mut rng, &department_weights)?;
        let department = corpus::DEPARTMENT_WEIGHTS[dept_index].0;

        let is_active = !sampler::bernoulli(&mut rng, turnover_rate(ctx, hired_at));

        users.push(User {
            id: deterministic_uuid(&mut rng),
            email,
            name,
            role,
            department,
            is_active,
            created_at: hired_at,
        });
    }

    Ok(users)
}

/// Role list shuffled against hire order, with enough senior/lead users
/// guaranteed that every team can be anchored by one.
fn role_assignments(ctx: &FactoryContext<'_>, count: usize) -> Vec<UserRole> {
    let weights: Vec<f64> = ROLE_WEIGHTS.iter().map(|(_, weight)| *weight).collect();
    let counts = apportion(count as u64, &weights);

    let mut roles = Vec::with_capacity(count);
    for ((role, _), quota) in ROLE_WEIGHTS.iter().zip(&counts) {
        roles.extend(std::iter::repeat_n(*role, *quota as usize));
    }

    let senior = roles.iter().filter(|role| role.is_senior()).count();
    let needed = (ctx.plan.teams as usize).min(count);
    if senior < needed {
        let mut promote = needed - senior;
        for role in roles.iter_mut() {
            if promote == 0 {
                break;
            }
            if !role.is_senior() {
                *role = UserRole::Senior;
                promote -= 1;
            }
        }
    }

    let mut rng = ctx.stream.derive("user.roles", 0);
    for i in (1..roles.len()).rev() {
        let j = rng.random_range(0..=i);
        roles.swap(i, j);
    }
    roles
}

/// Hire dates biased toward the recent end of the window, sorted so user
/// ordinals follow hiring order.
fn hire_dates(ctx: &FactoryContext<'_>, count: usize) -> Vec<NaiveDateTime> {
    let mut rng = ctx.stream.derive("user.hiring", 0);
    let start = ctx.plan.org_created + Duration::days(1);
    let end = ctx.plan.sim_end - Duration::days(30);
    let span = (end - start).num_seconds().max(1);

    let mut dates: Vec<NaiveDateTime> = (0..count)
        .map(|_| {
            let progress = rng.random::<f64>().sqrt();
            start + Duration::seconds((span as f64 * progress) as i64)
        })
        .collect();
    dates.sort();
    dates
}

fn turnover_rate(ctx: &FactoryContext<'_>, hired_at: NaiveDateTime) -> f64 {
    let tenure_days = (ctx.plan.sim_end - hired_at).num_days();
    if tenure_days > 365 {
        ctx.config.inactive_rate * 1.5
    } else {
        ctx.config.inactive_rate * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::NameTable;
    use crate::scheduler;
    use crate::stream::RunStream;
    use crate::temporal::TemporalEngine;
    use worksim_core::RunConfig;

    fn build(config: &RunConfig) -> Vec<User> {
        let plan = scheduler::plan(config).expect("feasible config");
        let stream = RunStream::new(config.seed);
        let temporal = TemporalEngine::new(plan.sim_end);
        let names = NameTable::builtin().expect("builtin table");
        let ctx = FactoryContext {
            config,
            plan: &plan,
            stream: &stream,
            temporal: &temporal,
            names: &names,
        };
        build_all(&ctx).expect("users build")
    }

    #[test]
    fn emails_are_unique_and_on_domain() {
        let users = build(&RunConfig::default());
        let emails: HashSet<&str> = users.iter().map(|user| user.email.as_str()).collect();
        assert_eq!(emails.len(), users.len());
        assert!(users.iter().all(|user| user.email.ends_with("@cloudvance.com")));
    }

    #[test]
    fn role_distribution_roughly_matches() {
        let users = build(&RunConfig::default());
        let juniors = users
            .iter()
            .filter(|user| user.role == UserRole::Junior)
            .count();
        let share = juniors as f64 / users.len() as f64;
        assert!((share - 0.40).abs() < 0.02, "junior share {share}");
    }

    #[test]
    fn enough_seniors_to_anchor_every_team() {
        let config = RunConfig {
            users: 50,
            teams: 5,
            projects: None,
            tasks: 500,
            ..RunConfig::default()
        };
        let users = build(&config);
        let senior = users.iter().filter(|user| user.role.is_senior()).count();
        assert!(senior >= 5);
    }

    #[test]
    fn hire_dates_sorted_and_inside_window() {
        let users = build(&RunConfig::default());
        for pair in users.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }
}
