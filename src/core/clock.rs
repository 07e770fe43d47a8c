use std::time::{Duration, Instant};

/// Fixed-rate tick source for driving a session in real time.
/// Accumulates wall time and hands out whole ticks, capped per call so a
/// stall does not turn into a burst of catch-up ticks.
#[derive(Debug)]
pub struct TickClock {
    last: Instant,
    timestep: f32,
    accumulator: f32,
    max_steps: u32,
}

impl TickClock {
    pub fn new(hz: f32, max_steps: u32) -> Self {
        Self {
            last: Instant::now(),
            timestep: 1.0 / hz.max(1.0),
            accumulator: 0.0,
            max_steps: max_steps.max(1),
        }
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Number of ticks due since the previous call
    pub fn due_ticks(&mut self) -> u32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.advance(delta)
    }

    /// Feeds `delta` seconds and returns the ticks it completes
    pub fn advance(&mut self, delta: f32) -> u32 {
        self.accumulator += delta;

        let steps = ((self.accumulator / self.timestep) as u32).min(self.max_steps);
        self.accumulator -= steps as f32 * self.timestep;
        // Drop backlog beyond the cap
        self.accumulator = self.accumulator.min(self.timestep);

        steps
    }

    /// Time left until the next tick is due
    pub fn until_next(&self) -> Duration {
        let remaining = (self.timestep - self.accumulator).max(0.0);
        Duration::from_secs_f32(remaining).saturating_sub(self.last.elapsed())
    }
}
