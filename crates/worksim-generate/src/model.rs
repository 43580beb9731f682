use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::corpus::NameTable;
use crate::inject::InjectionPolicy;

/// Options for the generation engine.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Run the integrity validator over the finished dataset.
    pub validate: bool,
    /// Edge-case injection rates.
    pub policy: InjectionPolicy,
    /// Name lookup table; the built-in census-weighted table when absent.
    pub names: Option<NameTable>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            validate: true,
            policy: InjectionPolicy::default(),
            names: None,
        }
    }
}

/// Summary of a finished generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub seed: u64,
    /// Row counts per collection, in table-style names.
    pub counts: BTreeMap<String, u64>,
    /// Mutation counts per injected anomaly category.
    pub injected: BTreeMap<String, u64>,
    pub duration_ms: u64,
}
