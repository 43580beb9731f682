//! Statistical sampling primitives.
//!
//! Every weighted or parameterized draw in the pipeline goes through this
//! module, so selection logic lives (and is tested) in one place. All
//! samplers are pure functions of the RNG handed in; none keep hidden
//! state between calls.

use chrono::{Datelike, Duration, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma, LogNormal, Normal, Poisson};

use crate::errors::GenerationError;

/// Bounded retry count for resample-until-in-range draws before clamping.
pub const MAX_DRAWS: u32 = 8;

/// Pick an index from an explicit weight list. Weights are normalized
/// before use; they must be non-negative and sum to a positive value.
pub fn weighted_index(rng: &mut ChaCha8Rng, weights: &[f64]) -> Result<usize, GenerationError> {
    if weights.is_empty() {
        return Err(GenerationError::Configuration(
            "weighted choice over an empty weight list".to_string(),
        ));
    }
    let mut total = 0.0;
    for weight in weights {
        if *weight < 0.0 || !weight.is_finite() {
            return Err(GenerationError::Configuration(format!(
                "invalid categorical weight {weight}"
            )));
        }
        total += weight;
    }
    if total <= 0.0 {
        return Err(GenerationError::Configuration(
            "categorical weights must sum to a positive value".to_string(),
        ));
    }

    let roll = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if roll < cumulative {
            return Ok(index);
        }
    }
    Ok(weights.len() - 1)
}

/// Weighted categorical table over owned values.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f64)>,
}

impl<T> WeightedTable<T> {
    pub fn new(entries: Vec<(T, f64)>) -> Result<Self, GenerationError> {
        let weights: Vec<f64> = entries.iter().map(|(_, weight)| *weight).collect();
        if weights.is_empty() {
            return Err(GenerationError::Configuration(
                "weighted table requires at least one entry".to_string(),
            ));
        }
        // Validate once so picks can stay infallible.
        let mut probe = ChaCha8Rng::seed_from_u64(0);
        weighted_index(&mut probe, &weights)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pick(&self, rng: &mut ChaCha8Rng) -> &T {
        let roll = rng.random::<f64>() * self.total();
        let mut cumulative = 0.0;
        for (value, weight) in &self.entries {
            cumulative += weight;
            if roll < cumulative {
                return value;
            }
        }
        &self.entries[self.entries.len() - 1].0
    }

    fn total(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }
}

/// Normal distribution truncated to `[lo, hi]`: resample up to
/// [`MAX_DRAWS`] times, then clamp to the violated bound.
#[derive(Debug, Clone, Copy)]
pub struct TruncatedNormal {
    normal: Normal<f64>,
    lo: f64,
    hi: f64,
}

impl TruncatedNormal {
    pub fn new(mean: f64, std_dev: f64, lo: f64, hi: f64) -> Result<Self, GenerationError> {
        if lo > hi {
            return Err(GenerationError::Configuration(format!(
                "truncated normal range [{lo}, {hi}] is empty"
            )));
        }
        let normal = Normal::new(mean, std_dev).map_err(|err| {
            GenerationError::Configuration(format!("invalid normal parameters: {err}"))
        })?;
        Ok(Self { normal, lo, hi })
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> f64 {
        for _ in 0..MAX_DRAWS {
            let value = self.normal.sample(rng);
            if value >= self.lo && value <= self.hi {
                return value;
            }
        }
        self.normal.sample(rng).clamp(self.lo, self.hi)
    }
}

/// Log-normal distribution over day offsets.
///
/// Constructed either directly in log-space or from a (mean, std) pair in
/// day-space, which is how the overdue shift is documented.
#[derive(Debug, Clone, Copy)]
pub struct LogNormalDays {
    inner: LogNormal<f64>,
}

impl LogNormalDays {
    pub fn from_log_space(mu: f64, sigma: f64) -> Result<Self, GenerationError> {
        let inner = LogNormal::new(mu, sigma).map_err(|err| {
            GenerationError::Configuration(format!("invalid log-normal parameters: {err}"))
        })?;
        Ok(Self { inner })
    }

    /// Convert day-space mean/std to log-space parameters.
    pub fn from_mean_std(mean: f64, std_dev: f64) -> Result<Self, GenerationError> {
        if mean <= 0.0 {
            return Err(GenerationError::Configuration(format!(
                "log-normal day-space mean must be positive, got {mean}"
            )));
        }
        let variance_ratio = (std_dev / mean).powi(2);
        let sigma_sq = (1.0 + variance_ratio).ln();
        let mu = mean.ln() - sigma_sq / 2.0;
        Self::from_log_space(mu, sigma_sq.sqrt())
    }

    pub fn sample_days(&self, rng: &mut ChaCha8Rng) -> f64 {
        self.inner.sample(rng)
    }
}

/// Zero with probability `p_zero`, otherwise Poisson-distributed.
#[derive(Debug, Clone, Copy)]
pub struct ZeroInflatedPoisson {
    p_zero: f64,
    poisson: Poisson<f64>,
}

impl ZeroInflatedPoisson {
    pub fn new(p_zero: f64, lambda: f64) -> Result<Self, GenerationError> {
        if !(0.0..=1.0).contains(&p_zero) {
            return Err(GenerationError::Configuration(format!(
                "zero-inflation probability {p_zero} outside [0, 1]"
            )));
        }
        let poisson = Poisson::new(lambda).map_err(|err| {
            GenerationError::Configuration(format!("invalid poisson rate: {err}"))
        })?;
        Ok(Self { p_zero, poisson })
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> u64 {
        if rng.random::<f64>() < self.p_zero {
            return 0;
        }
        self.poisson.sample(rng) as u64
    }
}

/// Negative binomial realized as a gamma-mixed Poisson: draw a rate from
/// Gamma(r, (1 - p) / p), then a count from Poisson(rate).
#[derive(Debug, Clone, Copy)]
pub struct NegativeBinomial {
    gamma: Gamma<f64>,
}

impl NegativeBinomial {
    pub fn new(r: f64, p: f64) -> Result<Self, GenerationError> {
        if !(0.0 < p && p < 1.0) {
            return Err(GenerationError::Configuration(format!(
                "negative binomial p must be in (0, 1), got {p}"
            )));
        }
        let gamma = Gamma::new(r, (1.0 - p) / p).map_err(|err| {
            GenerationError::Configuration(format!("invalid negative binomial shape: {err}"))
        })?;
        Ok(Self { gamma })
    }

    pub fn sample(&self, rng: &mut ChaCha8Rng) -> u64 {
        let rate = self.gamma.sample(rng);
        if rate <= f64::EPSILON {
            return 0;
        }
        match Poisson::new(rate) {
            Ok(poisson) => poisson.sample(rng) as u64,
            Err(_) => 0,
        }
    }
}

/// Bernoulli draw with the probability clamped into [0, 1] (additive
/// probability models can sum past 1).
pub fn bernoulli(rng: &mut ChaCha8Rng, p: f64) -> bool {
    rng.random::<f64>() < p.clamp(0.0, 1.0)
}

/// Uniform datetime in `[lo, hi]`.
pub fn datetime_between(
    rng: &mut ChaCha8Rng,
    lo: NaiveDateTime,
    hi: NaiveDateTime,
) -> NaiveDateTime {
    let span = (hi - lo).num_seconds();
    if span <= 0 {
        return lo;
    }
    lo + Duration::seconds(rng.random_range(0..=span))
}

/// Datetime in `[lo, hi]` weighted toward business time: ~85% weekdays,
/// ~80% inside 09:00-18:00. Falls back to the plain uniform draw when the
/// window is too narrow to adjust.
pub fn business_datetime_between(
    rng: &mut ChaCha8Rng,
    lo: NaiveDateTime,
    hi: NaiveDateTime,
) -> NaiveDateTime {
    let mut result = datetime_between(rng, lo, hi);

    for _ in 0..10 {
        let is_weekday = result.weekday().num_days_from_monday() < 5;
        if is_weekday || !rng.random_bool(0.85) {
            break;
        }
        result = datetime_between(rng, lo, hi);
    }

    if rng.random_bool(0.80) {
        let hour = rng.random_range(9..=17);
        let minute = rng.random_range(0..60);
        if let Some(candidate) = result.date().and_hms_opt(hour, minute, 0)
            && candidate >= lo
            && candidate <= hi
        {
            result = candidate;
        }
    }

    result
}

/// Distribute `total` across `buckets`, honoring a per-bucket minimum and
/// favoring emptier buckets for the remainder. When the minimums cannot be
/// met the total is spread as evenly as possible instead.
pub fn distribute_among(
    rng: &mut ChaCha8Rng,
    total: u64,
    buckets: usize,
    min_per_bucket: u64,
) -> Vec<u64> {
    if buckets == 0 {
        return Vec::new();
    }

    let floor = min_per_bucket.saturating_mul(buckets as u64);
    if total < floor {
        let base = total / buckets as u64;
        let mut counts = vec![base; buckets];
        for slot in counts.iter_mut().take((total % buckets as u64) as usize) {
            *slot += 1;
        }
        return counts;
    }

    let mut counts = vec![min_per_bucket; buckets];
    let mut remaining = total - floor;
    while remaining > 0 {
        let weights: Vec<f64> = counts.iter().map(|count| 1.0 / (*count as f64 + 1.0)).collect();
        let index = match weighted_index(rng, &weights) {
            Ok(index) => index,
            Err(_) => 0,
        };
        counts[index] += 1;
        remaining -= 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn weighted_index_respects_zero_weights() {
        let mut rng = rng(7);
        for _ in 0..200 {
            let index = weighted_index(&mut rng, &[0.0, 1.0, 0.0]).expect("valid weights");
            assert_eq!(index, 1);
        }
    }

    #[test]
    fn weighted_index_rejects_degenerate_weights() {
        let mut rng = rng(7);
        assert!(weighted_index(&mut rng, &[]).is_err());
        assert!(weighted_index(&mut rng, &[0.0, 0.0]).is_err());
        assert!(weighted_index(&mut rng, &[1.0, -2.0]).is_err());
    }

    #[test]
    fn truncated_normal_stays_in_range() {
        let dist = TruncatedNormal::new(10.0, 50.0, 0.0, 5.0).expect("valid params");
        let mut rng = rng(11);
        for _ in 0..500 {
            let value = dist.sample(&mut rng);
            assert!((0.0..=5.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn log_normal_from_mean_std_matches_day_space_mean() {
        let dist = LogNormalDays::from_mean_std(3.0, 5.0).expect("valid params");
        let mut rng = rng(13);
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| dist.sample_days(&mut rng)).sum();
        let mean = sum / n as f64;
        assert!((mean - 3.0).abs() < 0.5, "day-space mean drifted: {mean}");
    }

    #[test]
    fn zero_inflated_poisson_hits_zero_rate() {
        let dist = ZeroInflatedPoisson::new(0.30, 3.0).expect("valid params");
        let mut rng = rng(17);
        let n = 20_000;
        let zeros = (0..n).filter(|_| dist.sample(&mut rng) == 0).count();
        let rate = zeros as f64 / n as f64;
        // 30% inflation plus the Poisson branch's own zeros.
        assert!(rate > 0.30 && rate < 0.42, "zero rate {rate}");
    }

    #[test]
    fn negative_binomial_mean_tracks_parameters() {
        // mean = r (1 - p) / p = 2.0
        let dist = NegativeBinomial::new(2.0, 0.5).expect("valid params");
        let mut rng = rng(19);
        let n = 20_000;
        let sum: u64 = (0..n).map(|_| dist.sample(&mut rng)).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - 2.0).abs() < 0.2, "mean drifted: {mean}");
    }

    #[test]
    fn samplers_replay_from_equal_streams() {
        let dist = LogNormalDays::from_mean_std(3.0, 5.0).expect("valid params");
        let mut a = rng(23);
        let mut b = rng(23);
        for _ in 0..32 {
            assert_eq!(dist.sample_days(&mut a), dist.sample_days(&mut b));
        }
    }

    #[test]
    fn business_datetime_stays_in_window() {
        let lo = NaiveDate::from_ymd_opt(2024, 3, 1)
            .expect("valid date")
            .and_hms_opt(8, 30, 0)
            .expect("valid time");
        let hi = lo + Duration::hours(3);
        let mut rng = rng(29);
        for _ in 0..200 {
            let value = business_datetime_between(&mut rng, lo, hi);
            assert!(value >= lo && value <= hi);
        }
    }

    #[test]
    fn distribute_among_honors_minimums_and_total() {
        let mut rng = rng(31);
        let counts = distribute_among(&mut rng, 500, 10, 5);
        assert_eq!(counts.iter().sum::<u64>(), 500);
        assert!(counts.iter().all(|count| *count >= 5));
    }

    #[test]
    fn distribute_among_degrades_when_minimums_exceed_total() {
        let mut rng = rng(37);
        let counts = distribute_among(&mut rng, 7, 4, 5);
        assert_eq!(counts.iter().sum::<u64>(), 7);
    }
}
