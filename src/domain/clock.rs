//! Injectable time source for deterministic expiry logic

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Time source used by every manager that evaluates expiry.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use chrono::Duration;
    use std::sync::RwLock;

    /// Clock pinned to a fixed instant, adjustable from tests.
    #[derive(Debug)]
    pub struct FixedClock {
        now: RwLock<DateTime<Utc>>,
    }

    impl FixedClock {
        pub fn at(now: DateTime<Utc>) -> Self {
            Self {
                now: RwLock::new(now),
            }
        }

        pub fn set(&self, now: DateTime<Utc>) {
            *self.now.write().unwrap() = now;
        }

        pub fn advance_days(&self, days: i64) {
            let mut now = self.now.write().unwrap();
            *now += Duration::days(days);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.read().unwrap()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_fixed_clock_advances() {
            let start = Utc::now();
            let clock = FixedClock::at(start);

            assert_eq!(clock.now(), start);

            clock.advance_days(3);
            assert_eq!(clock.now(), start + Duration::days(3));
        }
    }
}
