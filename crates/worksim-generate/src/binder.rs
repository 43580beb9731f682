//! Foreign-key resolution under domain selection rules.
//!
//! The binder owns the team rosters built from the membership stage and
//! answers every cross-entity pick: task assignee and creator, comment
//! author, project owner. An empty required pool is a
//! [`GenerationError::ReferentialGap`] — it can only happen when the DAG
//! order is broken, so it is never recovered from.

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use worksim_core::{MembershipRole, TeamMembership, User, UserRole};

use crate::errors::GenerationError;
use crate::sampler;

/// Creator matches the assignee with this probability.
const CREATOR_IS_ASSIGNEE: f64 = 0.70;
/// Seniority weight used by the comment-author rule.
const SENIORITY_WEIGHT: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct RosterMember {
    pub user_id: Uuid,
    pub role: UserRole,
    pub membership_role: MembershipRole,
    pub is_active: bool,
}

/// Resolved membership view of one team.
#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    pub members: Vec<RosterMember>,
}

impl TeamRoster {
    /// Members eligible for new work: active ones, or the full roster when
    /// deactivations emptied the active pool.
    fn assignable(&self) -> Vec<&RosterMember> {
        let active: Vec<&RosterMember> = self
            .members
            .iter()
            .filter(|member| member.is_active)
            .collect();
        if active.is_empty() {
            self.members.iter().collect()
        } else {
            active
        }
    }

    fn senior(&self) -> Vec<&RosterMember> {
        self.members
            .iter()
            .filter(|member| member.role.is_senior())
            .collect()
    }
}

/// Resolves foreign-key slots against the materialized rosters.
#[derive(Debug, Clone)]
pub struct Binder {
    rosters: BTreeMap<Uuid, TeamRoster>,
}

impl Binder {
    pub fn new(users: &[User], memberships: &[TeamMembership]) -> Self {
        let user_index: BTreeMap<Uuid, &User> = users.iter().map(|user| (user.id, user)).collect();
        let mut rosters: BTreeMap<Uuid, TeamRoster> = BTreeMap::new();
        for membership in memberships {
            if let Some(user) = user_index.get(&membership.user_id) {
                rosters
                    .entry(membership.team_id)
                    .or_default()
                    .members
                    .push(RosterMember {
                        user_id: user.id,
                        role: user.role,
                        membership_role: membership.role,
                        is_active: user.is_active,
                    });
            }
        }
        Self { rosters }
    }

    pub fn roster(&self, team_id: Uuid) -> Result<&TeamRoster, GenerationError> {
        match self.rosters.get(&team_id) {
            Some(roster) if !roster.members.is_empty() => Ok(roster),
            _ => Err(GenerationError::ReferentialGap(format!(
                "no roster for team {team_id} at bind time"
            ))),
        }
    }

    /// Task assignee: a team-member pick, or unassigned at the configured
    /// rate (15% by default).
    pub fn pick_assignee(
        &self,
        rng: &mut ChaCha8Rng,
        team_id: Uuid,
        unassigned_rate: f64,
    ) -> Result<Option<Uuid>, GenerationError> {
        if sampler::bernoulli(rng, unassigned_rate) {
            return Ok(None);
        }
        let roster = self.roster(team_id)?;
        let pool = roster.assignable();
        Ok(Some(pool[rng.random_range(0..pool.len())].user_id))
    }

    /// Task creator: the assignee with 70% probability, else a different
    /// team member.
    pub fn pick_creator(
        &self,
        rng: &mut ChaCha8Rng,
        team_id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Uuid, GenerationError> {
        let roster = self.roster(team_id)?;
        if let Some(assignee) = assignee
            && rng.random_bool(CREATOR_IS_ASSIGNEE)
        {
            return Ok(assignee);
        }
        let pool = roster.assignable();
        let others: Vec<&&RosterMember> = pool
            .iter()
            .filter(|member| Some(member.user_id) != assignee)
            .collect();
        if others.is_empty() {
            // Single-member fallback; the roster is never empty here.
            return Ok(pool[0].user_id);
        }
        Ok(others[rng.random_range(0..others.len())].user_id)
    }

    /// Comment author. Draw u ~ Uniform(0,1): below 0.50 with an assignee
    /// present the assignee comments; below 0.75 a seniority-weighted
    /// member; otherwise a uniform member.
    pub fn pick_comment_author(
        &self,
        rng: &mut ChaCha8Rng,
        team_id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Uuid, GenerationError> {
        let roster = self.roster(team_id)?;
        let u = rng.random::<f64>();
        if u < 0.50
            && let Some(assignee) = assignee
        {
            return Ok(assignee);
        }
        if u < 0.75 {
            let weights: Vec<f64> = roster
                .members
                .iter()
                .map(|member| {
                    if member.role.is_senior() {
                        SENIORITY_WEIGHT
                    } else {
                        1.0
                    }
                })
                .collect();
            let index = sampler::weighted_index(rng, &weights)?;
            return Ok(roster.members[index].user_id);
        }
        Ok(roster.members[rng.random_range(0..roster.members.len())].user_id)
    }

    /// Project owner: restricted to senior/lead members of the owning team.
    pub fn pick_project_owner(
        &self,
        rng: &mut ChaCha8Rng,
        team_id: Uuid,
    ) -> Result<Uuid, GenerationError> {
        let roster = self.roster(team_id)?;
        let senior = roster.senior();
        if senior.is_empty() {
            return Err(GenerationError::ReferentialGap(format!(
                "team {team_id} has no senior or lead member to own a project"
            )));
        }
        Ok(senior[rng.random_range(0..senior.len())].user_id)
    }
}
