/// Fixed-rate accumulator: turns variable frame times into whole simulation ticks.
pub struct FixedStep {
    pub step: f32,
    accum: f32,
    /// Upper bound on ticks per frame so a long stall cannot spiral.
    max_ticks: usize,
}

impl FixedStep {
    pub fn new(step: f32, max_ticks: usize) -> Self {
        Self {
            step,
            accum: 0.0,
            max_ticks,
        }
    }

    /// Add `frame_dt` seconds and return how many ticks of `step` to run.
    /// Time beyond `max_ticks` is dropped.
    pub fn advance(&mut self, frame_dt: f32) -> usize {
        self.accum += frame_dt.max(0.0);
        let mut ticks = 0;
        while self.accum >= self.step && ticks < self.max_ticks {
            self.accum -= self.step;
            ticks += 1;
        }
        if ticks == self.max_ticks {
            self.accum = self.accum.min(self.step);
        }
        ticks
    }
}
