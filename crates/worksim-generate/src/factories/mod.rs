//! Entity factories, one module per entity type.
//!
//! Each factory consumes the already-materialized upstream context as
//! read-only input and produces fully-formed records; cross-entity picks
//! go through the [`crate::binder::Binder`], timestamps through the
//! [`crate::temporal::TemporalEngine`].

pub mod comment;
pub mod custom_field;
pub mod membership;
pub mod organization;
pub mod project;
pub mod section;
pub mod subtask;
pub mod tag;
pub mod task;
pub mod team;
pub mod user;

use rand::RngCore;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use worksim_core::RunConfig;

use crate::corpus::NameTable;
use crate::scheduler::Plan;
use crate::stream::RunStream;
use crate::temporal::TemporalEngine;

/// Shared read-only inputs handed to every factory.
pub struct FactoryContext<'a> {
    pub config: &'a RunConfig,
    pub plan: &'a Plan,
    pub stream: &'a RunStream,
    pub temporal: &'a TemporalEngine,
    pub names: &'a NameTable,
}

/// Identifier built from the entity's own random stream; v4-shaped so it
/// round-trips anywhere a UUID is expected while staying reproducible.
pub(crate) fn deterministic_uuid(rng: &mut ChaCha8Rng) -> Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}

/// Largest-remainder apportionment of `total` across weighted buckets.
pub(crate) fn apportion(total: u64, weights: &[f64]) -> Vec<u64> {
    let sum: f64 = weights.iter().sum();
    if weights.is_empty() || sum <= 0.0 {
        return vec![0; weights.len()];
    }
    let quotas: Vec<f64> = weights
        .iter()
        .map(|weight| total as f64 * weight / sum)
        .collect();
    let mut counts: Vec<u64> = quotas.iter().map(|quota| quota.floor() as u64).collect();
    let assigned: u64 = counts.iter().sum();
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|a, b| {
        let fa = quotas[*a] - quotas[*a].floor();
        let fb = quotas[*b] - quotas[*b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(b))
    });
    for index in order.iter().take((total - assigned) as usize) {
        counts[*index] += 1;
    }
    counts
}
