//! # Workflow configuration.
//!
//! Provides [`Config`] centralized settings for the alert workflow.
//!
//! ## Sentinel values
//! - `location_timeout = 0s` → no lookup timeout
//! - `delivery_timeout = 0s` → no per-contact timeout
//! - `history_capacity = 0` → terminal sessions are not archived
//! - `grace = None` → grace period equals one (clamped) tick

use std::time::Duration;

/// Global configuration for the alert workflow.
///
/// ## Field semantics
/// - `countdown`: Ticks before dispatch (min 1; clamped)
/// - `tick`: Length of one countdown tick (min 1ms; clamped)
/// - `grace`: Wait for a pending location at dispatch time (`None` = one tick)
/// - `location_timeout`: Per-lookup timeout (`0s` = none)
/// - `delivery_timeout`: Per-contact send timeout (`0s` = none)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped)
/// - `command_capacity`: Controller command queue size (min 1; clamped)
/// - `history_capacity`: Archived terminal sessions (`0` = no archive)
/// - `ledger_capacity`: Finished sessions remembered by the dispatch ledger (min 1; clamped)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of ticks between `trigger()` and dispatch.
    pub countdown: u32,

    /// Duration of one tick.
    pub tick: Duration,

    /// Bounded wait for an outstanding location lookup once the countdown hits zero.
    ///
    /// `Some(Duration::ZERO)` dispatches immediately with whatever is known.
    pub grace: Option<Duration>,

    /// Timeout applied to the single location lookup attempt.
    pub location_timeout: Duration,

    /// Timeout applied to each per-contact send.
    pub delivery_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Capacity of the controller's command queue (`trigger`/`cancel` calls).
    pub command_capacity: usize,

    /// Number of terminal sessions kept for `history()`.
    pub history_capacity: usize,

    /// Number of finished session ids the dispatch ledger remembers.
    ///
    /// In-flight dispatches are never evicted.
    pub ledger_capacity: usize,
}

impl Config {
    /// Countdown length clamped to a minimum of 1 tick.
    #[inline]
    pub fn countdown_ticks(&self) -> u32 {
        self.countdown.max(1)
    }

    /// Tick length clamped to a minimum of 1ms.
    #[inline]
    pub fn tick_period(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }

    /// Effective grace period.
    #[inline]
    pub fn grace_period(&self) -> Duration {
        self.grace.unwrap_or_else(|| self.tick_period())
    }

    /// Location lookup timeout as an `Option`.
    #[inline]
    pub fn location_timeout(&self) -> Option<Duration> {
        non_zero(self.location_timeout)
    }

    /// Per-contact delivery timeout as an `Option`.
    #[inline]
    pub fn delivery_timeout(&self) -> Option<Duration> {
        non_zero(self.delivery_timeout)
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Command queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn command_capacity_clamped(&self) -> usize {
        self.command_capacity.max(1)
    }

    /// Dispatch ledger capacity clamped to a minimum of 1.
    #[inline]
    pub fn ledger_capacity_clamped(&self) -> usize {
        self.ledger_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `countdown = 5`, `tick = 1s` (five-second countdown)
    /// - `grace = None` (one tick)
    /// - `location_timeout = 0s` (none; the grace period bounds the wait)
    /// - `delivery_timeout = 30s`
    /// - `bus_capacity = 1024`, `command_capacity = 64`
    /// - `history_capacity = 20`, `ledger_capacity = 256`
    fn default() -> Self {
        Self {
            countdown: 5,
            tick: Duration::from_secs(1),
            grace: None,
            location_timeout: Duration::ZERO,
            delivery_timeout: Duration::from_secs(30),
            bus_capacity: 1024,
            command_capacity: 64,
            history_capacity: 20,
            ledger_capacity: 256,
        }
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    if d == Duration::ZERO { None } else { Some(d) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.countdown_ticks(), 5);
        assert_eq!(cfg.grace_period(), Duration::from_secs(1));
        assert_eq!(cfg.location_timeout(), None);
        assert_eq!(cfg.delivery_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_sentinels_are_clamped() {
        let cfg = Config {
            countdown: 0,
            bus_capacity: 0,
            command_capacity: 0,
            ledger_capacity: 0,
            grace: Some(Duration::ZERO),
            ..Config::default()
        };
        assert_eq!(cfg.countdown_ticks(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.command_capacity_clamped(), 1);
        assert_eq!(cfg.ledger_capacity_clamped(), 1);
        assert_eq!(cfg.grace_period(), Duration::ZERO);

        let still = Config {
            tick: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(still.tick_period(), Duration::from_millis(1));
        assert_eq!(still.grace_period(), still.tick_period());
    }
}
