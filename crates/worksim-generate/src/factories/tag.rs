use std::collections::BTreeMap;

use rand::Rng;
use uuid::Uuid;

use worksim_core::{Organization, Tag, Task, TaskTag};

use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler;

use super::{FactoryContext, deterministic_uuid};

/// Build the organization's standard tag set.
pub fn build_all(ctx: &FactoryContext<'_>, organization: &Organization) -> Vec<Tag> {
    corpus::TAG_DEFS
        .iter()
        .enumerate()
        .map(|(index, (name, color))| {
            let mut rng = ctx.stream.derive("tag", index as u64);
            Tag {
                id: deterministic_uuid(&mut rng),
                name: (*name).to_string(),
                color: (*color).to_string(),
                organization_id: organization.id,
            }
        })
        .collect()
}

/// Keyword hints mapping task-name fragments to tag names.
const KEYWORD_TAGS: [(&str, &str); 9] = [
    ("fix", "bug"),
    ("bug", "bug"),
    ("implement", "feature"),
    ("refactor", "tech-debt"),
    ("document", "documentation"),
    ("test", "testing"),
    ("security", "security"),
    ("optimize", "performance"),
    ("performance", "performance"),
];

/// Build task-tag links over parent tasks: keyword-driven picks from the
/// task name plus an occasional random extra, unique per (task, tag).
pub fn build_links(
    ctx: &FactoryContext<'_>,
    tasks: &[Task],
    tags: &[Tag],
) -> Result<Vec<TaskTag>, GenerationError> {
    let tag_by_name: BTreeMap<&str, Uuid> =
        tags.iter().map(|tag| (tag.name.as_str(), tag.id)).collect();

    let mut links = Vec::new();
    for (task_index, task) in tasks.iter().enumerate() {
        if task.is_subtask() {
            continue;
        }
        let mut rng = ctx.stream.derive("tag_link", task_index as u64);
        if !sampler::bernoulli(&mut rng, ctx.config.tag_rate) {
            continue;
        }

        let name = task.name.to_lowercase();
        let mut assigned: Vec<Uuid> = Vec::new();
        for (keyword, tag_name) in KEYWORD_TAGS {
            if name.contains(keyword)
                && let Some(tag_id) = tag_by_name.get(tag_name)
                && !assigned.contains(tag_id)
            {
                assigned.push(*tag_id);
            }
        }

        if sampler::bernoulli(&mut rng, 0.30) {
            let extras = rng.random_range(1..=2);
            for _ in 0..extras {
                let tag = &tags[rng.random_range(0..tags.len())];
                if !assigned.contains(&tag.id) {
                    assigned.push(tag.id);
                }
            }
        }

        for tag_id in assigned {
            links.push(TaskTag {
                task_id: task.id,
                tag_id,
            });
        }
    }

    Ok(links)
}
