/// Fixed-threshold accumulator: real time goes in, discrete steps come out.
///
/// At most one step fires per [`Ticker::advance`] call; surplus time carries
/// over to later frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    interval: f32,
    accumulated: f32,
}

impl Ticker {
    /// A ticker firing once `interval` seconds have passed.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    /// Seconds between steps.
    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Add `dt` seconds; `true` when a step is due.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        if self.accumulated > self.interval {
            self.accumulated -= self.interval;
            true
        } else {
            false
        }
    }

    /// Drop accumulated time.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_threshold_is_exceeded() {
        let mut t = Ticker::new(0.1);
        assert!(!t.advance(0.05));
        assert!(!t.advance(0.05));
        assert!(t.advance(0.01));
    }

    #[test]
    fn fires_at_most_once_per_call_and_keeps_the_rest() {
        let mut t = Ticker::new(0.1);
        assert!(t.advance(0.35));
        assert!(t.advance(0.0));
        assert!(t.advance(0.0));
        assert!(!t.advance(0.0));
    }
}
