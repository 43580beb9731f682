use std::collections::BTreeMap;

use chrono::Duration;
use rand::Rng;

use worksim_core::{Department, MembershipRole, Team, TeamMembership, User};

use crate::errors::GenerationError;
use crate::sampler;
use crate::scheduler::{MAX_TEAM_SIZE, MIN_TEAM_SIZE};
use crate::temporal::Window;

use super::{FactoryContext, deterministic_uuid};

/// Maximum teams a single user belongs to.
const MAX_TEAMS_PER_USER: usize = 3;
/// Share of active users who also join one cross-functional team.
const CROSS_FUNCTIONAL_RATE: f64 = 0.15;
/// Probability that a second senior member also holds the lead role.
const SECOND_LEAD_RATE: f64 = 0.30;

#[derive(Debug, Clone, Copy)]
struct Slot {
    user: usize,
    cross: bool,
}

/// Build all memberships: primary team by department, overflow users
/// rebalanced across the organization, every team anchored by a senior or
/// lead user, sizes kept within the documented band, and a slice of users
/// joining one cross-functional team.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    teams: &[Team],
    users: &[User],
) -> Result<Vec<TeamMembership>, GenerationError> {
    let mut members: Vec<Vec<Slot>> = vec![Vec::new(); teams.len()];
    let mut user_teams: Vec<Vec<usize>> = vec![Vec::new(); users.len()];

    assign_primary(ctx, teams, users, &mut members, &mut user_teams)?;
    anchor_seniors(teams, users, &mut members, &mut user_teams);
    top_up_small_teams(users, &mut members, &mut user_teams);
    join_cross_functional(ctx, teams, users, &mut members, &mut user_teams);

    materialize(ctx, teams, users, &members)
}

fn teams_by_department(teams: &[Team]) -> BTreeMap<Department, Vec<usize>> {
    let mut index: BTreeMap<Department, Vec<usize>> = BTreeMap::new();
    for (i, team) in teams.iter().enumerate() {
        index.entry(team.department).or_default().push(i);
    }
    index
}

fn assign_primary(
    ctx: &FactoryContext<'_>,
    teams: &[Team],
    users: &[User],
    members: &mut [Vec<Slot>],
    user_teams: &mut [Vec<usize>],
) -> Result<(), GenerationError> {
    let dept_teams = teams_by_department(teams);
    let mut rng = ctx.stream.derive("membership.primary", 0);
    let mut overflow: Vec<usize> = Vec::new();

    for department in Department::ALL {
        let dept_users: Vec<usize> = users
            .iter()
            .enumerate()
            .filter(|(_, user)| user.department == department)
            .map(|(i, _)| i)
            .collect();
        if dept_users.is_empty() {
            continue;
        }
        let Some(team_pool) = dept_teams.get(&department) else {
            overflow.extend(dept_users);
            continue;
        };

        let shares = sampler::distribute_among(
            &mut rng,
            dept_users.len() as u64,
            team_pool.len(),
            0,
        );
        let mut cursor = dept_users.into_iter();
        for (team_index, share) in team_pool.iter().zip(shares) {
            let capped = share.min(MAX_TEAM_SIZE);
            for _ in 0..capped {
                let Some(user) = cursor.next() else { break };
                members[*team_index].push(Slot { user, cross: false });
                user_teams[user].push(*team_index);
            }
        }
        // Users beyond a department's capacity spill across the org.
        overflow.extend(cursor);
    }

    for user in overflow {
        let target = members
            .iter()
            .enumerate()
            .filter(|(_, slots)| slots.len() < MAX_TEAM_SIZE as usize)
            .min_by_key(|(i, slots)| (slots.len(), *i))
            .map(|(i, _)| i);
        let Some(team_index) = target else {
            return Err(GenerationError::Configuration(
                "no team capacity left for primary assignment".to_string(),
            ));
        };
        members[team_index].push(Slot { user, cross: false });
        user_teams[user].push(team_index);
    }

    Ok(())
}

/// Every team needs at least one senior/lead user among its members so
/// project ownership can always be bound.
fn anchor_seniors(
    teams: &[Team],
    users: &[User],
    members: &mut [Vec<Slot>],
    user_teams: &mut [Vec<usize>],
) {
    for team_index in 0..teams.len() {
        let has_senior = members[team_index]
            .iter()
            .any(|slot| users[slot.user].role.is_senior());
        if has_senior {
            continue;
        }

        let candidate = users
            .iter()
            .enumerate()
            .filter(|(i, user)| {
                user.role.is_senior()
                    && user_teams[*i].len() < MAX_TEAMS_PER_USER
                    && !user_teams[*i].contains(&team_index)
            })
            .min_by_key(|(i, _)| (user_teams[*i].len(), *i))
            .map(|(i, _)| i);
        let Some(senior) = candidate else { continue };

        if members[team_index].len() >= MAX_TEAM_SIZE as usize {
            // Displace the most recent non-senior member into the team
            // with the most free capacity.
            let displaced = members[team_index]
                .iter()
                .rposition(|slot| !users[slot.user].role.is_senior());
            if let Some(position) = displaced {
                let slot = members[team_index].remove(position);
                user_teams[slot.user].retain(|t| *t != team_index);
                let target = members
                    .iter()
                    .enumerate()
                    .filter(|(i, slots)| {
                        *i != team_index
                            && slots.len() < MAX_TEAM_SIZE as usize
                            && !user_teams[slot.user].contains(i)
                    })
                    .min_by_key(|(i, slots)| (slots.len(), *i))
                    .map(|(i, _)| i);
                if let Some(new_team) = target {
                    members[new_team].push(slot);
                    user_teams[slot.user].push(new_team);
                }
            }
        }

        members[team_index].push(Slot {
            user: senior,
            cross: false,
        });
        user_teams[senior].push(team_index);
    }
}

fn top_up_small_teams(
    users: &[User],
    members: &mut [Vec<Slot>],
    user_teams: &mut [Vec<usize>],
) {
    for team_index in 0..members.len() {
        while members[team_index].len() < MIN_TEAM_SIZE as usize {
            let candidate = users
                .iter()
                .enumerate()
                .filter(|(i, _)| {
                    user_teams[*i].len() < MAX_TEAMS_PER_USER
                        && !user_teams[*i].contains(&team_index)
                })
                .min_by_key(|(i, _)| (user_teams[*i].len(), *i))
                .map(|(i, _)| i);
            let Some(user) = candidate else { break };
            members[team_index].push(Slot { user, cross: false });
            user_teams[user].push(team_index);
        }
    }
}

fn join_cross_functional(
    ctx: &FactoryContext<'_>,
    teams: &[Team],
    users: &[User],
    members: &mut [Vec<Slot>],
    user_teams: &mut [Vec<usize>],
) {
    let mut rng = ctx.stream.derive("membership.cross", 0);
    for (user_index, user) in users.iter().enumerate() {
        if !user.is_active
            || user_teams[user_index].len() >= MAX_TEAMS_PER_USER
            || !sampler::bernoulli(&mut rng, CROSS_FUNCTIONAL_RATE)
        {
            continue;
        }
        let candidates: Vec<usize> = (0..teams.len())
            .filter(|team_index| {
                !user_teams[user_index].contains(team_index)
                    && members[*team_index].len() < MAX_TEAM_SIZE as usize
            })
            .collect();
        if candidates.is_empty() {
            continue;
        }
        let team_index = candidates[rng.random_range(0..candidates.len())];
        members[team_index].push(Slot {
            user: user_index,
            cross: true,
        });
        user_teams[user_index].push(team_index);
    }
}

fn materialize(
    ctx: &FactoryContext<'_>,
    teams: &[Team],
    users: &[User],
    members: &[Vec<Slot>],
) -> Result<Vec<TeamMembership>, GenerationError> {
    let mut memberships = Vec::new();
    let mut ordinal = 0_u64;

    for (team_index, slots) in members.iter().enumerate() {
        let team = &teams[team_index];
        let mut leads_assigned = 0_u32;
        let mut lead_rng = ctx.stream.derive("membership.leads", team_index as u64);

        for slot in slots {
            let user = &users[slot.user];
            let mut rng = ctx.stream.derive("membership", ordinal);

            let join_start = team.created_at.max(user.created_at);
            let horizon = if slot.cross { 90 } else { 30 };
            let join_end = (join_start + Duration::days(horizon)).min(ctx.plan.sim_end);
            let joined_at = ctx.temporal.uniform_within(
                &mut rng,
                "membership",
                ordinal as usize,
                "joined after team and user",
                Window::new(join_start, join_end),
            )?;

            let role = if user.role.is_senior() && leads_assigned < 2 {
                let take = leads_assigned == 0 || sampler::bernoulli(&mut lead_rng, SECOND_LEAD_RATE);
                if take {
                    leads_assigned += 1;
                    MembershipRole::Lead
                } else {
                    MembershipRole::Member
                }
            } else {
                MembershipRole::Member
            };

            memberships.push(TeamMembership {
                id: deterministic_uuid(&mut rng),
                team_id: team.id,
                user_id: user.id,
                role,
                joined_at,
            });
            ordinal += 1;
        }
    }

    Ok(memberships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Binder;
    use crate::corpus::NameTable;
    use crate::factories::{organization, team, user};
    use crate::scheduler;
    use crate::stream::RunStream;
    use crate::temporal::TemporalEngine;
    use std::collections::HashSet;
    use worksim_core::RunConfig;

    fn build(config: &RunConfig) -> (Vec<Team>, Vec<User>, Vec<TeamMembership>) {
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
        let org = organization::build(&ctx);
        let teams = team::build_all(&ctx, &org).expect("teams build");
        let users = user::build_all(&ctx).expect("users build");
        let memberships = build_all(&ctx, &teams, &users).expect("memberships build");
        (teams, users, memberships)
    }

    #[test]
    fn team_sizes_stay_in_band() {
        let (teams, _, memberships) = build(&RunConfig::default());
        for team in &teams {
            let size = memberships
                .iter()
                .filter(|membership| membership.team_id == team.id)
                .count();
            assert!(
                (MIN_TEAM_SIZE as usize..=MAX_TEAM_SIZE as usize).contains(&size),
                "team '{}' sized {size}",
                team.name
            );
        }
    }

    #[test]
    fn memberships_are_unique_pairs() {
        let (_, _, memberships) = build(&RunConfig::default());
        let mut pairs = HashSet::new();
        for membership in &memberships {
            assert!(pairs.insert((membership.team_id, membership.user_id)));
        }
    }

    #[test]
    fn every_team_can_bind_a_project_owner() {
        let (teams, users, memberships) = build(&RunConfig::default());
        let binder = Binder::new(&users, &memberships);
        let mut rng = {
            use rand::SeedableRng;
            rand_chacha::ChaCha8Rng::seed_from_u64(1)
        };
        for team in &teams {
            binder
                .pick_project_owner(&mut rng, team.id)
                .expect("senior member available");
        }
    }

    #[test]
    fn small_org_still_fills_every_team() {
        let config = RunConfig {
            users: 50,
            teams: 5,
            projects: None,
            tasks: 500,
            ..RunConfig::default()
        };
        let (teams, _, memberships) = build(&config);
        assert_eq!(teams.len(), 5);
        for team in &teams {
            let size = memberships
                .iter()
                .filter(|membership| membership.team_id == team.id)
                .count();
            assert!((8..=20).contains(&size), "team sized {size}");
        }
    }
}
