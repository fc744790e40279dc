use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Wall-clock cadence between adaptive evaluations.
pub const ADAPTIVE_CHECK_INTERVAL_MS: f64 = 5000.0;

/// Damage taken within this window counts against the player's rating.
pub const RECENT_DAMAGE_WINDOW_MS: f64 = 10_000.0;

pub const MULTIPLIER_MIN: f64 = 0.7;
pub const MULTIPLIER_MAX: f64 = 1.5;
pub const MULTIPLIER_STEP: f64 = 0.1;

/// Number of retained performance-ratio samples.
pub const PERFORMANCE_HISTORY_CAP: usize = 10;

// Hysteresis tuning. These values were chosen empirically during playtests;
// do not "improve" them without re-tuning against real sessions.
const RAISE_THRESHOLD: f64 = 1.2;
const DROP_THRESHOLD: f64 = 0.8;
const RAISE_STREAK: u32 = 3;
const DROP_STREAK: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Normal,
    Hard,
    Insane,
}

impl Default for DifficultyTier {
    fn default() -> Self {
        Self::Normal
    }
}

/// Baseline score rate (points per second) a typical player sustains on
/// each tier. The adaptive loop rates performance against these.
pub fn expected_score_rate(tier: DifficultyTier) -> f64 {
    match tier {
        DifficultyTier::Easy => 150.0,
        DifficultyTier::Normal => 250.0,
        DifficultyTier::Hard => 400.0,
        DifficultyTier::Insane => 600.0,
    }
}

/// Live bookkeeping for one run, fed to the adaptive evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSession {
    pub score: f64,
    pub run_start_ms: f64,
    pub last_damage_ms: Option<f64>,
}

impl RunSession {
    pub fn new(now_ms: f64) -> Self {
        Self {
            score: 0.0,
            run_start_ms: now_ms,
            last_damage_ms: None,
        }
    }

    pub fn add_score(&mut self, points: f64) {
        self.score += points;
    }

    pub fn record_damage(&mut self, now_ms: f64) {
        self.last_damage_ms = Some(now_ms);
    }

    pub fn survival_secs(&self, now_ms: f64) -> f64 {
        ((now_ms - self.run_start_ms) / 1000.0).max(0.0)
    }

    pub fn recent_damage(&self, now_ms: f64) -> bool {
        self.last_damage_ms
            .is_some_and(|t| now_ms - t <= RECENT_DAMAGE_WINDOW_MS)
    }
}

/// Feedback loop nudging a difficulty multiplier toward the player's
/// actual skill.
///
/// Invoked every gameplay tick but internally rate-limited to a five-second
/// cadence. Hysteresis (multiple consecutive confirming samples before any
/// change) keeps the multiplier from oscillating on noisy score rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyController {
    selected: DifficultyTier,
    adaptive_enabled: bool,
    multiplier: f64,
    performance_history: VecDeque<f64>,
    consecutive_successes: u32,
    consecutive_failures: u32,
    last_check_ms: f64,
}

impl DifficultyController {
    pub fn new(selected: DifficultyTier, adaptive_enabled: bool) -> Self {
        Self {
            selected,
            adaptive_enabled,
            multiplier: 1.0,
            performance_history: VecDeque::with_capacity(PERFORMANCE_HISTORY_CAP),
            consecutive_successes: 0,
            consecutive_failures: 0,
            last_check_ms: 0.0,
        }
    }

    pub fn selected(&self) -> DifficultyTier {
        self.selected
    }

    pub fn set_selected(&mut self, tier: DifficultyTier) {
        self.selected = tier;
    }

    pub fn adaptive_enabled(&self) -> bool {
        self.adaptive_enabled
    }

    pub fn set_adaptive_enabled(&mut self, enabled: bool) {
        self.adaptive_enabled = enabled;
    }

    /// Current difficulty multiplier, always within [0.7, 1.5].
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn performance_history(&self) -> &VecDeque<f64> {
        &self.performance_history
    }

    #[cfg(test)]
    pub(crate) fn streaks(&self) -> (u32, u32) {
        (self.consecutive_successes, self.consecutive_failures)
    }

    /// Reset for a fresh run. The multiplier and histories start clean;
    /// the selected tier and the adaptive flag persist.
    pub fn reset_run(&mut self, now_ms: f64) {
        self.multiplier = 1.0;
        self.performance_history.clear();
        self.consecutive_successes = 0;
        self.consecutive_failures = 0;
        self.last_check_ms = now_ms;
    }

    /// Run one adaptive evaluation if the preconditions hold: adaptive
    /// mode on, an active run, and a full cadence interval elapsed.
    /// Returns whether an evaluation actually happened.
    pub fn maybe_check(&mut self, now_ms: f64, run: Option<&RunSession>) -> bool {
        if !self.adaptive_enabled {
            return false;
        }
        let Some(run) = run else {
            return false;
        };
        if now_ms - self.last_check_ms < ADAPTIVE_CHECK_INTERVAL_MS {
            return false;
        }
        self.last_check_ms = now_ms;

        let survival_secs = run.survival_secs(now_ms);
        let score_rate = if survival_secs > 0.0 {
            run.score / survival_secs
        } else {
            0.0
        };
        let ratio = score_rate / expected_score_rate(self.selected);

        if self.performance_history.len() >= PERFORMANCE_HISTORY_CAP {
            self.performance_history.pop_front();
        }
        self.performance_history.push_back(ratio);
        let avg = self.performance_history.iter().sum::<f64>()
            / self.performance_history.len() as f64;

        if avg > RAISE_THRESHOLD {
            self.consecutive_successes += 1;
            self.consecutive_failures = 0;
            if self.consecutive_successes >= RAISE_STREAK {
                self.multiplier = (self.multiplier + MULTIPLIER_STEP).min(MULTIPLIER_MAX);
                self.consecutive_successes = 0;
                log::debug!(
                    "adaptive difficulty raised: avg ratio {avg:.2}, multiplier {:.1}",
                    self.multiplier
                );
            }
        } else if avg < DROP_THRESHOLD || run.recent_damage(now_ms) {
            self.consecutive_failures += 1;
            self.consecutive_successes = 0;
            if self.consecutive_failures >= DROP_STREAK {
                self.multiplier = (self.multiplier - MULTIPLIER_STEP).max(MULTIPLIER_MIN);
                self.consecutive_failures = 0;
                log::debug!(
                    "adaptive difficulty lowered: avg ratio {avg:.2}, multiplier {:.1}",
                    self.multiplier
                );
            }
        }
        // The band between the thresholds is inert: neither streak moves.

        true
    }
}

impl Default for DifficultyController {
    fn default() -> Self {
        Self::new(DifficultyTier::default(), true)
    }
}
