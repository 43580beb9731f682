use worksim_core::Organization;

use super::{FactoryContext, deterministic_uuid};

/// Build the single organization record rooting the temporal chain.
pub fn build(ctx: &FactoryContext<'_>) -> Organization {
    let mut rng = ctx.stream.derive("organization", 0);
    Organization {
        id: deterministic_uuid(&mut rng),
        name: ctx.config.organization.clone(),
        created_at: ctx.plan.org_created,
    }
}
