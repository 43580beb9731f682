//! Temporal ordering enforcement.
//!
//! Raw timestamps are validated against their window, resampled a bounded
//! number of times (the later attempts draw from the tightened window
//! itself), then clamped to the nearest legal boundary. Clamped values are
//! re-validated; an empty legal interval is a fatal constraint violation.

use chrono::{Duration, NaiveDateTime};
use rand_chacha::ChaCha8Rng;

use crate::errors::GenerationError;
use crate::sampler::{self, LogNormalDays, MAX_DRAWS};

/// Minimum distance between a task's creation and completion.
pub fn min_completion_gap() -> Duration {
    Duration::hours(1)
}

/// Inclusive datetime interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub lo: NaiveDateTime,
    pub hi: NaiveDateTime,
}

impl Window {
    pub fn new(lo: NaiveDateTime, hi: NaiveDateTime) -> Self {
        Self { lo, hi }
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    pub fn contains(&self, value: NaiveDateTime) -> bool {
        value >= self.lo && value <= self.hi
    }

    pub fn clamp(&self, value: NaiveDateTime) -> NaiveDateTime {
        if value < self.lo {
            self.lo
        } else if value > self.hi {
            self.hi
        } else {
            value
        }
    }
}

/// Validates and repairs sampled timestamps for one run.
#[derive(Debug, Clone, Copy)]
pub struct TemporalEngine {
    now: NaiveDateTime,
}

impl TemporalEngine {
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Creation timestamp weighted toward business time.
    pub fn creation_within(
        &self,
        rng: &mut ChaCha8Rng,
        entity: &'static str,
        ordinal: usize,
        window: Window,
    ) -> Result<NaiveDateTime, GenerationError> {
        self.fit(rng, entity, ordinal, "creation window", window, |rng, w| {
            sampler::business_datetime_between(rng, w.lo, w.hi)
        })
    }

    /// Uniform timestamp within a window.
    pub fn uniform_within(
        &self,
        rng: &mut ChaCha8Rng,
        entity: &'static str,
        ordinal: usize,
        rule: &'static str,
        window: Window,
    ) -> Result<NaiveDateTime, GenerationError> {
        self.fit(rng, entity, ordinal, rule, window, |rng, w| {
            sampler::datetime_between(rng, w.lo, w.hi)
        })
    }

    /// Completion timestamp: creation plus a log-normal cycle time, at
    /// least the minimum gap after creation and never past `upper`.
    pub fn completion_within(
        &self,
        rng: &mut ChaCha8Rng,
        entity: &'static str,
        ordinal: usize,
        created_at: NaiveDateTime,
        upper: NaiveDateTime,
        cycle: &LogNormalDays,
    ) -> Result<NaiveDateTime, GenerationError> {
        let window = Window::new(created_at + min_completion_gap(), upper.min(self.now));
        self.fit(
            rng,
            entity,
            ordinal,
            "completion after creation",
            window,
            |rng, _| {
                let days = cycle.sample_days(rng).min(10_000.0);
                created_at + Duration::seconds((days * 86_400.0).round() as i64)
            },
        )
    }

    /// Chronologically non-decreasing comment timestamps inside the task's
    /// activity window.
    pub fn comment_times(
        &self,
        rng: &mut ChaCha8Rng,
        entity: &'static str,
        ordinal: usize,
        window: Window,
        count: usize,
    ) -> Result<Vec<NaiveDateTime>, GenerationError> {
        if window.is_empty() {
            return Err(GenerationError::ConstraintViolation {
                entity,
                ordinal,
                rule: "comment window is empty".to_string(),
            });
        }
        let mut times: Vec<NaiveDateTime> = (0..count)
            .map(|_| sampler::datetime_between(rng, window.lo, window.hi))
            .collect();
        times.sort();
        Ok(times)
    }

    fn fit(
        &self,
        rng: &mut ChaCha8Rng,
        entity: &'static str,
        ordinal: usize,
        rule: &'static str,
        window: Window,
        mut draw: impl FnMut(&mut ChaCha8Rng, &Window) -> NaiveDateTime,
    ) -> Result<NaiveDateTime, GenerationError> {
        if window.is_empty() {
            return Err(GenerationError::ConstraintViolation {
                entity,
                ordinal,
                rule: format!(
                    "{rule}: no legal value in [{}, {}]",
                    window.lo, window.hi
                ),
            });
        }

        let mut last = window.lo;
        for attempt in 0..MAX_DRAWS {
            // Later attempts draw from the tightened window directly.
            last = if attempt < MAX_DRAWS / 2 {
                draw(rng, &window)
            } else {
                sampler::datetime_between(rng, window.lo, window.hi)
            };
            if window.contains(last) {
                return Ok(last);
            }
        }

        let clamped = window.clamp(last);
        if window.contains(clamped) {
            return Ok(clamped);
        }
        Err(GenerationError::ConstraintViolation {
            entity,
            ordinal,
            rule: format!("{rule}: clamped value still illegal"),
        })
    }
}
