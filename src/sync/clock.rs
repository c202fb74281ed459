//! Time source for timestamps and project ids.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in milliseconds since the epoch.
pub trait Clock: Send + Sync {
  fn now_millis(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_millis(&self) -> i64 {
    Utc::now().timestamp_millis()
  }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
  now: AtomicI64,
}

impl ManualClock {
  pub fn at(millis: i64) -> Self {
    Self {
      now: AtomicI64::new(millis),
    }
  }

  pub fn advance(&self, millis: i64) {
    self.now.fetch_add(millis, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now_millis(&self) -> i64 {
    self.now.load(Ordering::SeqCst)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_manual_clock() {
    let clock = ManualClock::at(1_000);
    assert_eq!(clock.now_millis(), 1_000);
    clock.advance(25);
    assert_eq!(clock.now_millis(), 1_025);
  }

  #[test]
  fn test_system_clock_is_recent() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_millis() > 1_577_836_800_000);
  }
}
