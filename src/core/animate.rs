//! Smoothed display counter for changing numeric values.

use std::time::{Duration, Instant};

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Animates a displayed value toward a target over a fixed duration.
///
/// Callers own the clock: `animate_to` and `tick` take the current
/// `Instant`, so a frame loop passes `Instant::now()` while tests step
/// through arbitrary points in time. A new target supersedes the running
/// animation and restarts from whatever value is currently displayed, so
/// the counter never jumps. The final tick lands on the target exactly.
#[derive(Debug, Clone)]
pub struct CounterAnimator {
    displayed: f64,
    from: f64,
    target: f64,
    duration: Duration,
    started_at: Option<Instant>,
}

impl CounterAnimator {
    pub fn new(initial: f64, duration: Duration) -> Self {
        Self {
            displayed: initial,
            from: initial,
            target: initial,
            duration,
            started_at: None,
        }
    }

    /// Starts animating from the current displayed value toward `target`.
    /// A running animation is cancelled, never queued behind.
    pub fn animate_to(&mut self, target: f64, now: Instant) {
        self.from = self.displayed;
        self.target = target;
        if self.duration.is_zero() || self.from == target {
            self.displayed = target;
            self.started_at = None;
        } else {
            self.started_at = Some(now);
        }
    }

    /// Advances the animation to `now` and returns the displayed value.
    pub fn tick(&mut self, now: Instant) -> f64 {
        if let Some(started_at) = self.started_at {
            let elapsed = now.saturating_duration_since(started_at);
            if elapsed >= self.duration {
                self.displayed = self.target;
                self.started_at = None;
            } else {
                let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
                self.displayed = self.from + (self.target - self.from) * ease_out_cubic(t);
            }
        }
        self.displayed
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.started_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DURATION: Duration = Duration::from_millis(800);

    #[test]
    fn test_final_tick_lands_exactly_on_target() {
        let mut animator = CounterAnimator::new(90.0, DURATION);
        let t0 = Instant::now();
        animator.animate_to(92.0, t0);
        assert!(animator.is_animating());

        let mid = animator.tick(t0 + DURATION / 2);
        assert!(mid > 90.0 && mid < 92.0);
        assert!(animator.is_animating());

        let last = animator.tick(t0 + DURATION);
        assert_eq!(last, 92.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_ease_out_front_loads_the_motion() {
        let mut animator = CounterAnimator::new(0.0, DURATION);
        let t0 = Instant::now();
        animator.animate_to(100.0, t0);

        // Half the time covers well over half the distance under ease-out
        let mid = animator.tick(t0 + DURATION / 2);
        assert!(mid > 80.0, "expected front-loaded motion, got {mid}");
    }

    #[test]
    fn test_retarget_restarts_from_displayed_value() {
        let mut animator = CounterAnimator::new(0.0, DURATION);
        let t0 = Instant::now();
        animator.animate_to(100.0, t0);

        let halfway = animator.tick(t0 + DURATION / 2);
        animator.animate_to(50.0, t0 + DURATION / 2);
        assert_eq!(animator.displayed(), halfway);
        assert_eq!(animator.target(), 50.0);

        // The superseded animation no longer drives the value
        let last = animator.tick(t0 + DURATION / 2 + DURATION);
        assert_eq!(last, 50.0);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_monotonic_approach_to_target() {
        let mut animator = CounterAnimator::new(10.0, DURATION);
        let t0 = Instant::now();
        animator.animate_to(20.0, t0);

        let mut previous = 10.0;
        for step in 1..=8u32 {
            let value = animator.tick(t0 + DURATION * step / 8);
            assert!(value >= previous);
            assert!(value <= 20.0);
            previous = value;
        }
        assert_eq!(previous, 20.0);
    }

    #[test]
    fn test_same_target_completes_immediately() {
        let mut animator = CounterAnimator::new(42.0, DURATION);
        animator.animate_to(42.0, Instant::now());
        assert!(!animator.is_animating());
        assert_eq!(animator.displayed(), 42.0);
    }

    #[test]
    fn test_zero_duration_snaps_to_target() {
        let mut animator = CounterAnimator::new(1.0, Duration::ZERO);
        animator.animate_to(5.0, Instant::now());
        assert!(!animator.is_animating());
        assert_eq!(animator.displayed(), 5.0);
    }

    #[test]
    fn test_tick_before_start_is_stable() {
        let mut animator = CounterAnimator::new(7.0, DURATION);
        assert_eq!(animator.tick(Instant::now()), 7.0);
        assert!(!animator.is_animating());
    }
}
