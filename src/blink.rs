use std::time::{Duration, Instant};

/// Periodic on/off toggle driven by elapsed-time comparisons.
///
/// The timer only tracks the level it would drive; the pin is remembered so
/// the output can be attached later.
#[derive(Debug, Clone)]
pub struct BlinkTimer {
    pin: i32,
    interval: Duration,
    blinking: bool,
    level: bool,
    last_toggle: Instant,
}

impl BlinkTimer {
    pub fn new(pin: i32, interval: Duration, now: Instant) -> Self {
        Self {
            pin,
            interval,
            blinking: false,
            level: false,
            last_toggle: now,
        }
    }

    pub fn set_blinking(&mut self, blinking: bool) {
        self.blinking = blinking;
    }

    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    pub fn level(&self) -> bool {
        self.level
    }

    /// Returns the new level when the timer toggled on this call.
    pub fn update(&mut self, now: Instant) -> Option<bool> {
        if !self.blinking {
            return None;
        }

        if now.saturating_duration_since(self.last_toggle) >= self.interval {
            self.last_toggle = now;
            self.level = !self.level;
            Some(self.level)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(500);

    #[test]
    fn idle_timer_never_toggles() {
        let start = Instant::now();
        let mut timer = BlinkTimer::new(1, INTERVAL, start);

        for ms in [0, 499, 500, 1_000, 10_000] {
            assert_eq!(timer.update(start + Duration::from_millis(ms)), None);
        }
        assert!(!timer.level());
    }

    #[test]
    fn toggles_once_interval_has_elapsed() {
        let start = Instant::now();
        let mut timer = BlinkTimer::new(2, INTERVAL, start);
        timer.set_blinking(true);

        assert_eq!(timer.update(start + Duration::from_millis(499)), None);
        assert_eq!(timer.update(start + Duration::from_millis(500)), Some(true));
        // reference point moved to the toggle time
        assert_eq!(timer.update(start + Duration::from_millis(999)), None);
        assert_eq!(timer.update(start + Duration::from_millis(1_000)), Some(false));
        assert_eq!(timer.pin(), 2);
    }

    #[test]
    fn late_poll_toggles_only_once() {
        let start = Instant::now();
        let mut timer = BlinkTimer::new(1, INTERVAL, start);
        timer.set_blinking(true);

        assert_eq!(timer.update(start + Duration::from_secs(3)), Some(true));
        assert_eq!(timer.update(start + Duration::from_secs(3)), None);
    }

    #[test]
    fn stopping_keeps_last_level() {
        let start = Instant::now();
        let mut timer = BlinkTimer::new(1, INTERVAL, start);
        timer.set_blinking(true);
        timer.update(start + INTERVAL);

        timer.set_blinking(false);
        assert_eq!(timer.update(start + INTERVAL * 4), None);
        assert!(timer.level());
    }
}
