pub mod app;
pub mod collab;
pub mod pool;
pub mod profiling;
pub mod timing;

use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::time::Instant;

use crate::profiling::TickTimings;
use crate::timing::FrameTiming;

/// Source of monotonic timestamps, in milliseconds since some fixed origin.
///
/// The frame loop never reads wall-clock time directly so that timing logic
/// can be driven deterministically in tests via [`ManualClock`].
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Production clock backed by [`Instant`], origin at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock for tests and scripted headless runs.
///
/// Clones share the same underlying time, so a copy can keep advancing the
/// clock after the original has been moved into a [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

/// One application driven by the frame loop.
///
/// Phases run in a fixed order each tick: `update`, `render`, `post_render`.
/// `post_render` is where rate-limited maintenance (performance governor,
/// adaptive difficulty bookkeeping) belongs, since it sees the finished
/// tick's timings.
pub trait TickApp {
    fn update(&mut self, dt_ms: f64, now_ms: f64);

    fn render(&mut self);

    fn post_render(&mut self, _timing: &FrameTiming, _timings: TickTimings, _now_ms: f64) {}

    /// Cooperative shutdown signal, checked by loop drivers after each tick.
    fn should_exit(&self) -> bool {
        false
    }
}

/// Drives [`TickApp`] phases and owns all frame timing state.
///
/// The loop is fail-soft: a panic in any phase is logged and swallowed, and
/// the next tick proceeds as if the failed phase had returned normally. A
/// crashing update must never take the loop down with it.
#[derive(Debug)]
pub struct FrameLoop<C: Clock> {
    clock: C,
    timing: FrameTiming,
    stopped: bool,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            timing: FrameTiming::new(),
            stopped: false,
        }
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    /// Request cooperative shutdown. Subsequent `tick` calls become no-ops.
    pub fn request_stop(&mut self) {
        self.stopped = true;
    }

    pub fn stop_requested(&self) -> bool {
        self.stopped
    }

    /// Run one tick: timing bookkeeping, then the app's update, render and
    /// post-render phases, each inside its own panic boundary.
    pub fn tick(&mut self, app: &mut dyn TickApp) -> TickTimings {
        if self.stopped {
            return TickTimings::default();
        }

        let now_ms = self.clock.now_ms();
        let dt_ms = self.timing.begin_tick(now_ms);

        let total_start = Instant::now();

        let update_start = Instant::now();
        run_phase("update", || app.update(dt_ms, now_ms));
        let update = update_start.elapsed();

        let render_start = Instant::now();
        run_phase("render", || app.render());
        let render = render_start.elapsed();

        let timings = TickTimings {
            update,
            render,
            total: total_start.elapsed(),
        };

        let timing = &self.timing;
        run_phase("post_render", || app.post_render(timing, timings, now_ms));

        if app.should_exit() {
            self.stopped = true;
        }

        timings
    }

    /// Like `tick`, additionally reporting the tick's timings to a profiler.
    pub fn tick_profiled(
        &mut self,
        app: &mut dyn TickApp,
        profiler: &mut dyn profiling::Profiler,
    ) -> TickTimings {
        let timings = self.tick(app);
        profiler.on_tick(self.timing.frame_count(), timings);
        timings
    }
}

fn run_phase(phase: &str, body: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(body)) {
        log::error!(
            "tick {phase} phase panicked: {}; continuing",
            panic_message(payload.as_ref())
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
