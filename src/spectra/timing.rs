//! Timing constants and the busy-wait policy.
//!
//! The panel is bi-stable and tolerates neither rushed commands nor frequent
//! refreshes. Every delay the driver issues is listed here.

/// Hardware reset pulse as `(level_high, duration_ms)` steps.
///
/// Low 1 ms, high 5 ms, low 10 ms, high 5 ms.
pub const RESET_PULSE: [(bool, u32); 4] = [(false, 1), (true, 5), (false, 10), (true, 5)];

/// Interval between two samples of the busy line.
pub const BUSY_POLL_INTERVAL_MS: u32 = 10;

/// Fixed wait used in place of busy polling when the panel has no busy line.
pub const BUSY_FALLBACK_MS: u32 = 500;

/// Settling time after the DC/DC converter has been switched off.
pub const POWER_DOWN_SETTLE_MS: u32 = 150;

/// Minimum time between two refreshes, in seconds.
///
/// Refreshing more often than this can damage the panel. The driver has no
/// clock of its own and does not enforce it; the caller owns this constraint.
pub const MIN_REFRESH_INTERVAL_S: u32 = 180;

/// How long the driver is willing to wait for the busy line to clear.
///
/// A stuck busy line blocks forever under [`BusyWait::Indefinite`]. That is the
/// behaviour of this panel family; a bound would hide real panel faults, so it
/// is only applied when asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BusyWait {
    /// Poll until the panel reports ready, however long that takes.
    #[default]
    Indefinite,
    /// Give up with [`crate::Error::BusyTimeout`] once the accumulated poll
    /// delay reaches `timeout_ms`.
    Bounded {
        /// Upper bound on the accumulated poll delay.
        timeout_ms: u32,
    },
}

impl BusyWait {
    /// Whether `waited_ms` of polling exhausts this policy.
    pub fn is_exhausted(&self, waited_ms: u32) -> bool {
        match self {
            BusyWait::Indefinite => false,
            BusyWait::Bounded { timeout_ms } => waited_ms >= *timeout_ms,
        }
    }
}
