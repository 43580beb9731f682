use rand::Rng;

use worksim_core::{CustomFieldDefinition, CustomFieldValue, FieldType, Organization, Task};

use crate::corpus;
use crate::errors::GenerationError;
use crate::sampler;

use super::{FactoryContext, deterministic_uuid};

/// Build the standard custom field catalogue for the organization.
pub fn build_definitions(
    ctx: &FactoryContext<'_>,
    organization: &Organization,
) -> Vec<CustomFieldDefinition> {
    corpus::FIELD_SPECS
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let mut rng = ctx.stream.derive("field_definition", index as u64);
            CustomFieldDefinition {
                id: deterministic_uuid(&mut rng),
                name: spec.name.to_string(),
                field_type: spec.field_type,
                options: spec
                    .options
                    .map(|options| options.iter().map(|option| option.to_string()).collect()),
                organization_id: organization.id,
            }
        })
        .collect()
}

/// Build field values over parent tasks at the configured coverage, with
/// enum and number values drawn from the documented distributions.
pub fn build_values(
    ctx: &FactoryContext<'_>,
    definitions: &[CustomFieldDefinition],
    tasks: &[Task],
) -> Result<Vec<CustomFieldValue>, GenerationError> {
    let mut values = Vec::new();

    for (index, (definition, spec)) in definitions.iter().zip(&corpus::FIELD_SPECS).enumerate() {
        let mut rng = ctx.stream.derive("field_value", index as u64);
        for task in tasks.iter().filter(|task| !task.is_subtask()) {
            if !sampler::bernoulli(&mut rng, ctx.config.field_coverage) {
                continue;
            }
            let value = match (definition.field_type, spec.distribution) {
                (FieldType::Enum | FieldType::Number, Some(distribution)) => {
                    let weights: Vec<f64> =
                        distribution.iter().map(|(_, weight)| *weight).collect();
                    let pick = sampler::weighted_index(&mut rng, &weights)?;
                    Some(distribution[pick].0.to_string())
                }
                (FieldType::Text, _) if definition.name == "Sprint" => {
                    Some(format!("Sprint {}", rng.random_range(1..=26)))
                }
                _ => None,
            };
            if let Some(value) = value {
                values.push(CustomFieldValue {
                    id: deterministic_uuid(&mut rng),
                    field_id: definition.id,
                    task_id: task.id,
                    value,
                });
            }
        }
    }

    Ok(values)
}
