use std::time::Duration;

/// Fixed-timestep accumulator. Wall-clock time goes in, a whole number of
/// simulation ticks comes out; the remainder carries over so slow frames
/// catch up instead of dilating time.
#[derive(Debug, Clone)]
pub struct FixedStep {
    tick: Duration,
    accumulator: Duration,
}

impl FixedStep {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            accumulator: Duration::ZERO,
        }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Feeds elapsed wall time and returns how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        ticks
    }
}
