use std::time::Duration;

/// Measured durations for one tick's phases.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickTimings {
    pub update: Duration,
    pub render: Duration,
    pub total: Duration,
}

/// Optional hook interface for capturing per-tick timings.
///
/// This is intentionally generic: it avoids depending on game-specific
/// state so it can be shared by headful, headless and test drivers.
pub trait Profiler {
    fn on_tick(&mut self, _frame: u64, _timings: TickTimings) {}
}

/// Profiler that does nothing; the default for production runs.
#[derive(Debug, Default)]
pub struct NullProfiler;

impl Profiler for NullProfiler {}
