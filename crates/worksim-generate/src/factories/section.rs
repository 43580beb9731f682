use worksim_core::{Project, Section};

use crate::corpus;
use crate::errors::GenerationError;

use super::project::ProjectProfile;
use super::{FactoryContext, deterministic_uuid};

/// Build the kanban sections for every project from its department's
/// template, positions dense from zero.
pub fn build_all(
    ctx: &FactoryContext<'_>,
    projects: &[Project],
    profiles: &[ProjectProfile],
) -> Result<Vec<Section>, GenerationError> {
    let mut sections = Vec::new();
    let mut ordinal = 0_u64;
    for (project, profile) in projects.iter().zip(profiles) {
        for (position, name) in corpus::section_names(profile.department).iter().enumerate() {
            let mut rng = ctx.stream.derive("section", ordinal);
            sections.push(Section {
                id: deterministic_uuid(&mut rng),
                name: (*name).to_string(),
                project_id: project.id,
                position: position as u32,
            });
            ordinal += 1;
        }
    }
    Ok(sections)
}
