//! Daily token budget tracking
//!
//! Records estimated token cost per outbound LLM call, aggregates per
//! calendar day (UTC) and per category, and classifies usage against
//! warning/critical thresholds. All inputs are trusted internal calls, so
//! tracking never fails; logging is advisory and never blocks the caller.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Daily token allowance shared by all request categories
pub const DAILY_TOKEN_LIMIT: u64 = 1_500_000;

/// Assumed request cost before any usage has been tracked
const DEFAULT_AVG_TOKENS_PER_REQUEST: u64 = 256;

/// Usage percentage at which status becomes [`UsageStatus::Warning`]
const WARNING_THRESHOLD_PCT: f64 = 70.0;

/// Usage percentage at which status becomes [`UsageStatus::Critical`]
const CRITICAL_THRESHOLD_PCT: f64 = 95.0;

/// Classification of today's usage against the daily limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageStatus {
    /// Below the warning threshold
    Good,
    /// 70% - 94.99% of the daily limit
    Warning,
    /// At or above 95% of the daily limit
    Critical,
}

impl UsageStatus {
    fn classify(percentage: f64) -> Self {
        if percentage >= CRITICAL_THRESHOLD_PCT {
            Self::Critical
        } else if percentage >= WARNING_THRESHOLD_PCT {
            Self::Warning
        } else {
            Self::Good
        }
    }
}

/// Aggregate usage for the current UTC day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyUsage {
    pub requests: u64,
    pub estimated_tokens: u64,
    /// `estimated_tokens / daily_limit * 100`
    pub percentage: f64,
    pub status: UsageStatus,
}

/// What is left of today's allowance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemainingBudget {
    /// Remaining tokens, floor-clamped at zero
    pub tokens: u64,
    pub percentage: f64,
    /// `remaining / average-per-request-so-far`
    pub estimated_requests: u64,
}

/// Per-category aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryUsage {
    pub count: u64,
    pub total_tokens: u64,
    pub avg_tokens: u64,
}

/// One tracked call
#[derive(Debug, Clone, Copy)]
struct UsageRecord {
    estimated_tokens: u64,
    at: DateTime<Utc>,
}

#[derive(Debug)]
struct TrackerState {
    records: Vec<UsageRecord>,
    by_category: HashMap<String, CategoryUsage>,
    last_reset_date: NaiveDate,
    last_status: UsageStatus,
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Tracks estimated token usage against the daily limit.
///
/// Day rollover happens inside the same critical section as the mutation it
/// precedes, so no usage is lost or double-counted across the boundary.
pub struct TokenBudgetTracker {
    state: Mutex<TrackerState>,
    clock: Clock,
    daily_limit: u64,
}

impl std::fmt::Debug for TokenBudgetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TokenBudgetTracker")
            .field("daily_limit", &self.daily_limit)
            .field("records", &state.records.len())
            .field("last_reset_date", &state.last_reset_date)
            .finish_non_exhaustive()
    }
}

impl Default for TokenBudgetTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBudgetTracker {
    /// Create a tracker with the standard daily limit and the system clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DAILY_TOKEN_LIMIT, Box::new(Utc::now))
    }

    /// Create a tracker with a custom daily limit
    #[must_use]
    pub fn with_limit(daily_limit: u64) -> Self {
        Self::with_clock(daily_limit, Box::new(Utc::now))
    }

    /// Create a tracker with an injected clock (used by tests to cross the
    /// day boundary deterministically)
    #[must_use]
    pub fn with_clock(daily_limit: u64, clock: Clock) -> Self {
        let today = clock().date_naive();
        Self {
            state: Mutex::new(TrackerState {
                records: Vec::new(),
                by_category: HashMap::new(),
                last_reset_date: today,
                last_status: UsageStatus::Good,
            }),
            clock,
            daily_limit,
        }
    }

    /// Record one outbound call's estimated cost under `category`
    pub fn track_usage(&self, estimated_tokens: u64, category: &str) {
        let now = (self.clock)();
        let mut state = self.state.lock();
        Self::rollover_if_needed(&mut state, now);

        state.records.push(UsageRecord {
            estimated_tokens,
            at: now,
        });

        let aggregate = state.by_category.entry(category.to_string()).or_default();
        aggregate.count += 1;
        aggregate.total_tokens += estimated_tokens;
        aggregate.avg_tokens = aggregate.total_tokens / aggregate.count;

        let usage = Self::usage_of(&state, self.daily_limit);
        debug!(
            tokens = estimated_tokens,
            category = %category,
            daily_total = usage.estimated_tokens,
            percentage = usage.percentage,
            "Tracked token usage"
        );

        if usage.status != state.last_status {
            match usage.status {
                UsageStatus::Warning => warn!(
                    percentage = usage.percentage,
                    "Daily token usage crossed the warning threshold"
                ),
                UsageStatus::Critical => warn!(
                    percentage = usage.percentage,
                    "Daily token usage is critical"
                ),
                UsageStatus::Good => {}
            }
            state.last_status = usage.status;
        }
    }

    /// Aggregate usage for the current day
    #[must_use]
    pub fn daily_usage(&self) -> DailyUsage {
        let now = (self.clock)();
        let mut state = self.state.lock();
        Self::rollover_if_needed(&mut state, now);
        Self::usage_of(&state, self.daily_limit)
    }

    /// Remaining allowance for the current day
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // statistics display only
    pub fn remaining(&self) -> RemainingBudget {
        let now = (self.clock)();
        let mut state = self.state.lock();
        Self::rollover_if_needed(&mut state, now);

        let usage = Self::usage_of(&state, self.daily_limit);
        let tokens = self.daily_limit.saturating_sub(usage.estimated_tokens);
        let avg = if usage.requests == 0 {
            DEFAULT_AVG_TOKENS_PER_REQUEST
        } else {
            (usage.estimated_tokens / usage.requests).max(1)
        };

        RemainingBudget {
            tokens,
            percentage: tokens as f64 / self.daily_limit as f64 * 100.0,
            estimated_requests: tokens / avg,
        }
    }

    /// Per-category aggregates for the current day
    #[must_use]
    pub fn category_usage(&self) -> HashMap<String, CategoryUsage> {
        let now = (self.clock)();
        let mut state = self.state.lock();
        Self::rollover_if_needed(&mut state, now);
        state.by_category.clone()
    }

    /// Clear all accumulated records (manual reset; rollover uses the same
    /// path internally)
    pub fn reset(&self) {
        let mut state = self.state.lock();
        Self::clear(&mut state);
        debug!("Token budget tracker reset");
    }

    fn rollover_if_needed(state: &mut TrackerState, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != state.last_reset_date {
            debug!(
                previous = %state.last_reset_date,
                current = %today,
                "Day rollover, clearing token usage"
            );
            Self::clear(state);
            state.last_reset_date = today;
        }
    }

    fn clear(state: &mut TrackerState) {
        state.records.clear();
        state.by_category.clear();
        state.last_status = UsageStatus::Good;
    }

    #[allow(clippy::cast_precision_loss)] // statistics display only
    fn usage_of(state: &TrackerState, daily_limit: u64) -> DailyUsage {
        // Invariant: every record in the sequence belongs to the day of the
        // last reset; rollover clears before any append.
        debug_assert!(
            state
                .records
                .iter()
                .all(|r| r.at.date_naive() == state.last_reset_date)
        );

        let estimated_tokens: u64 = state.records.iter().map(|r| r.estimated_tokens).sum();
        let requests = state.records.len() as u64;
        let percentage = estimated_tokens as f64 / daily_limit as f64 * 100.0;

        DailyUsage {
            requests,
            estimated_tokens,
            percentage,
            status: UsageStatus::classify(percentage),
        }
    }
}
