use std::collections::VecDeque;

use engine::collab::{GraphicsQuality, SettingsSource};
use engine::profiling::TickTimings;
use serde::{Deserialize, Serialize};

/// Wall-clock cadence between governor evaluations.
pub const GOVERNOR_CHECK_INTERVAL_MS: f64 = 2000.0;

pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

/// Factor applied to the particle budget at mitigation level 1.
pub const PARTICLE_BUDGET_SCALE: f32 = 0.7;

// Tuning constants, chosen empirically. The escalate threshold sits below
// the recover threshold so the governor does not flap around one boundary.
const FPS_WINDOW: usize = 10;
const LOW_FPS_THRESHOLD: f64 = 50.0;
const RECOVER_FPS_THRESHOLD: f64 = 55.0;
const LOW_FPS_STREAK: u32 = 3;

/// Rendering-cost knobs the governor is allowed to turn.
///
/// Render code reads this every frame; nothing else writes it while a
/// run is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderTuning {
    /// Maximum particles spawned per burst, scaled down under load.
    pub particle_budget: f32,
    pub background_particles: bool,
    pub quality: GraphicsQuality,
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            particle_budget: 150.0,
            background_particles: true,
            quality: GraphicsQuality::default(),
        }
    }
}

/// Phase durations and governor bookkeeping, read-only outside this module.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceMetrics {
    pub frame_ms: f64,
    pub update_ms: f64,
    pub render_ms: f64,
    pub low_fps_counter: u32,
    pub optimization_level: u8,
    pub last_check_ms: f64,
}

/// Feedback loop shedding rendering cost when the FPS average sags.
///
/// Mitigations are applied one level at a time and each has an exact
/// inverse, so escalation and recovery always walk the same ladder.
#[derive(Debug, Clone, Default)]
pub struct PerformanceGovernor {
    metrics: PerformanceMetrics,
}

impl PerformanceGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Record the finished tick's phase durations.
    pub fn record_tick(&mut self, timings: &TickTimings) {
        self.metrics.frame_ms = timings.total.as_secs_f64() * 1000.0;
        self.metrics.update_ms = timings.update.as_secs_f64() * 1000.0;
        self.metrics.render_ms = timings.render.as_secs_f64() * 1000.0;
    }

    /// Run one governor evaluation if the cadence interval has elapsed.
    /// Returns whether an evaluation actually happened.
    pub fn maybe_check(
        &mut self,
        now_ms: f64,
        fps_history: &VecDeque<f64>,
        tuning: &mut RenderTuning,
        settings: &dyn SettingsSource,
    ) -> bool {
        if now_ms - self.metrics.last_check_ms < GOVERNOR_CHECK_INTERVAL_MS {
            return false;
        }
        self.metrics.last_check_ms = now_ms;

        let window = fps_history
            .iter()
            .rev()
            .take(FPS_WINDOW)
            .copied()
            .collect::<Vec<_>>();
        if window.is_empty() {
            return false;
        }
        let avg_fps = window.iter().sum::<f64>() / window.len() as f64;

        if avg_fps < LOW_FPS_THRESHOLD {
            self.metrics.low_fps_counter += 1;
            if self.metrics.low_fps_counter >= LOW_FPS_STREAK {
                if self.metrics.optimization_level < MAX_OPTIMIZATION_LEVEL {
                    self.metrics.optimization_level += 1;
                    apply_mitigation(self.metrics.optimization_level, tuning);
                    log::info!(
                        "performance governor escalated to level {} (avg fps {avg_fps:.1})",
                        self.metrics.optimization_level
                    );
                }
                self.metrics.low_fps_counter = 0;
            }
        } else {
            self.metrics.low_fps_counter = 0;
            if avg_fps > RECOVER_FPS_THRESHOLD && self.metrics.optimization_level > 0 {
                revert_mitigation(self.metrics.optimization_level, tuning, settings);
                self.metrics.optimization_level -= 1;
                log::info!(
                    "performance governor recovered to level {} (avg fps {avg_fps:.1})",
                    self.metrics.optimization_level
                );
            }
        }

        true
    }
}

fn apply_mitigation(level: u8, tuning: &mut RenderTuning) {
    match level {
        1 => tuning.particle_budget *= PARTICLE_BUDGET_SCALE,
        2 => tuning.background_particles = false,
        3 => tuning.quality = GraphicsQuality::Low,
        _ => {}
    }
}

fn revert_mitigation(level: u8, tuning: &mut RenderTuning, settings: &dyn SettingsSource) {
    match level {
        1 => tuning.particle_budget /= PARTICLE_BUDGET_SCALE,
        2 => tuning.background_particles = true,
        3 => {
            // The quality tier is owned by the settings layer; restore it
            // from there rather than guessing a default. With no settings
            // attached the forced tier simply stays in effect.
            if let Some(quality) = settings.graphics_quality() {
                tuning.quality = quality;
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::collab::NoSettings;

    struct FixedSettings(GraphicsQuality);

    impl SettingsSource for FixedSettings {
        fn graphics_quality(&self) -> Option<GraphicsQuality> {
            Some(self.0)
        }
    }

    fn history(fps: f64, len: usize) -> VecDeque<f64> {
        std::iter::repeat(fps).take(len).collect()
    }

    /// Run `n` evaluations at 2-second intervals against a fixed history.
    fn run_checks(
        gov: &mut PerformanceGovernor,
        start_ms: f64,
        n: usize,
        fps: f64,
        tuning: &mut RenderTuning,
        settings: &dyn SettingsSource,
    ) -> f64 {
        let hist = history(fps, 20);
        let mut now = start_ms;
        for _ in 0..n {
            now += GOVERNOR_CHECK_INTERVAL_MS;
            assert!(gov.maybe_check(now, &hist, tuning, settings));
        }
        now
    }

    #[test]
    fn three_low_checks_escalate_exactly_one_level() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();
        let original_budget = tuning.particle_budget;

        run_checks(&mut gov, 0.0, 3, 40.0, &mut tuning, &NoSettings);

        assert_eq!(gov.metrics().optimization_level, 1);
        assert_eq!(gov.metrics().low_fps_counter, 0);
        let expected = original_budget * PARTICLE_BUDGET_SCALE;
        assert!((tuning.particle_budget - expected).abs() < 1e-3);
        assert!(tuning.background_particles);
    }

    #[test]
    fn level_changes_by_at_most_one_per_check() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();
        let hist = history(20.0, 20);

        let mut now = 0.0;
        let mut prev_level = 0;
        for _ in 0..20 {
            now += GOVERNOR_CHECK_INTERVAL_MS;
            gov.maybe_check(now, &hist, &mut tuning, &NoSettings);
            let level = gov.metrics().optimization_level;
            assert!(level <= MAX_OPTIMIZATION_LEVEL);
            assert!(level.abs_diff(prev_level) <= 1);
            prev_level = level;
        }
        assert_eq!(prev_level, MAX_OPTIMIZATION_LEVEL);
    }

    #[test]
    fn full_escalation_applies_all_three_mitigations() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();

        run_checks(&mut gov, 0.0, 9, 30.0, &mut tuning, &NoSettings);

        assert_eq!(gov.metrics().optimization_level, 3);
        assert!(!tuning.background_particles);
        assert_eq!(tuning.quality, GraphicsQuality::Low);
        assert!(tuning.particle_budget < 150.0);
    }

    #[test]
    fn recovery_is_the_exact_inverse_of_escalation() {
        let mut gov = PerformanceGovernor::new();
        let settings = FixedSettings(GraphicsQuality::High);
        let mut tuning = RenderTuning::default();
        let before = tuning.clone();

        let now = run_checks(&mut gov, 0.0, 9, 30.0, &mut tuning, &settings);
        assert_eq!(gov.metrics().optimization_level, 3);

        run_checks(&mut gov, now, 3, 60.0, &mut tuning, &settings);
        assert_eq!(gov.metrics().optimization_level, 0);
        assert!((tuning.particle_budget - before.particle_budget).abs() < 1e-3);
        assert_eq!(tuning.background_particles, before.background_particles);
        assert_eq!(tuning.quality, before.quality);
    }

    #[test]
    fn quality_stays_forced_without_a_settings_backend() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();

        let now = run_checks(&mut gov, 0.0, 9, 30.0, &mut tuning, &NoSettings);
        run_checks(&mut gov, now, 3, 60.0, &mut tuning, &NoSettings);

        assert_eq!(gov.metrics().optimization_level, 0);
        assert_eq!(tuning.quality, GraphicsQuality::Low);
    }

    #[test]
    fn adequate_fps_between_dips_resets_the_streak() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();

        let now = run_checks(&mut gov, 0.0, 2, 40.0, &mut tuning, &NoSettings);
        // A healthy sample clears the streak before it reaches three.
        let now = run_checks(&mut gov, now, 1, 52.0, &mut tuning, &NoSettings);
        run_checks(&mut gov, now, 2, 40.0, &mut tuning, &NoSettings);

        assert_eq!(gov.metrics().optimization_level, 0);
    }

    #[test]
    fn borderline_fps_does_not_deescalate() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();

        let now = run_checks(&mut gov, 0.0, 3, 40.0, &mut tuning, &NoSettings);
        assert_eq!(gov.metrics().optimization_level, 1);

        // 52 fps is above the low mark but below the recovery mark:
        // hold the current mitigation level.
        run_checks(&mut gov, now, 5, 52.0, &mut tuning, &NoSettings);
        assert_eq!(gov.metrics().optimization_level, 1);
    }

    #[test]
    fn empty_history_skips_the_evaluation() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();
        let empty = VecDeque::new();

        assert!(!gov.maybe_check(5000.0, &empty, &mut tuning, &NoSettings));
        assert_eq!(gov.metrics().optimization_level, 0);
        assert_eq!(tuning, RenderTuning::default());
    }

    #[test]
    fn checks_are_rate_limited_to_the_cadence() {
        let mut gov = PerformanceGovernor::new();
        let mut tuning = RenderTuning::default();
        let hist = history(40.0, 20);

        assert!(!gov.maybe_check(1999.0, &hist, &mut tuning, &NoSettings));
        assert!(gov.maybe_check(2000.0, &hist, &mut tuning, &NoSettings));
        assert!(!gov.maybe_check(2001.0, &hist, &mut tuning, &NoSettings));
    }
}
