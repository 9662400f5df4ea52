//! 벽시계 추상화.
//!
//! 다이제스트 사이클은 주입된 시계로 현지 시각을 계산하므로,
//! 테스트에서는 [`ManualClock`]으로 시각을 고정할 수 있습니다.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// 현재 UTC 시각 제공자.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 수동으로 조작하는 시계.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock() {
        let start = Utc.with_ymd_and_hms(2024, 5, 2, 0, 59, 30).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(45));
        assert_eq!(clock.now(), Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 15).unwrap());
    }
}
