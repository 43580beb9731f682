use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded source of per-entity random streams for a run.
///
/// Every sampling decision draws from a sub-stream derived from the run
/// seed, a scope label, and an ordinal, so the same (seed, call site)
/// always replays the same values regardless of how stages are scheduled.
#[derive(Debug, Clone, Copy)]
pub struct RunStream {
    seed: u64,
}

impl RunStream {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive the RNG for one entity (or one post-pass category).
    pub fn derive(&self, scope: &str, ordinal: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.seed, scope, ordinal))
    }
}

fn hash_seed(seed: u64, scope: &str, ordinal: u64) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in scope.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash ^= ordinal.wrapping_mul(0x9e3779b97f4a7c15);
    hash.wrapping_mul(0x100000001b3)
}
