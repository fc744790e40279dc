use engine::pool::Pool;

/// Retained instances per effect kind. Creation is never blocked by this
/// cap; it only bounds recycled memory.
pub const EFFECT_POOL_CAPACITY: usize = 10;

const MILESTONE_LIFE_MS: f32 = 1500.0;
const PENALTY_LIFE_MS: f32 = 1000.0;
/// Vertical drift in pixels per millisecond; negative floats upward.
const MILESTONE_SPEED: f32 = -0.04;
const PENALTY_SPEED: f32 = -0.06;
const MILESTONE_COLOR: [u8; 4] = [255, 214, 64, 255];
const PENALTY_COLOR: [u8; 4] = [255, 82, 82, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Milestone,
    Penalty,
}

/// One floating-text record. Instances are recycled through a bounded
/// pool; every field is overwritten on spawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectInstance {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub life: f32,
    pub max_life: f32,
    pub speed: f32,
    pub alpha: f32,
    pub color: [u8; 4],
}

#[derive(Debug)]
struct EffectLane {
    pool: Pool<EffectInstance>,
    active: Vec<EffectInstance>,
}

impl EffectLane {
    fn new() -> Self {
        Self {
            pool: Pool::with_capacity(EFFECT_POOL_CAPACITY),
            active: Vec::new(),
        }
    }
}

/// Floating combat/score text, one recycling lane per kind.
#[derive(Debug)]
pub struct EffectSystem {
    milestone: EffectLane,
    penalty: EffectLane,
}

impl EffectSystem {
    pub fn new() -> Self {
        Self {
            milestone: EffectLane::new(),
            penalty: EffectLane::new(),
        }
    }

    fn lane(&self, kind: EffectKind) -> &EffectLane {
        match kind {
            EffectKind::Milestone => &self.milestone,
            EffectKind::Penalty => &self.penalty,
        }
    }

    fn lane_mut(&mut self, kind: EffectKind) -> &mut EffectLane {
        match kind {
            EffectKind::Milestone => &mut self.milestone,
            EffectKind::Penalty => &mut self.penalty,
        }
    }

    /// Spawn a floating text at `(x, y)`. Never fails: a fresh instance is
    /// allocated whenever the pool has nothing to recycle.
    pub fn spawn(&mut self, kind: EffectKind, x: f32, y: f32, text: &str) {
        let (max_life, speed, color) = match kind {
            EffectKind::Milestone => (MILESTONE_LIFE_MS, MILESTONE_SPEED, MILESTONE_COLOR),
            EffectKind::Penalty => (PENALTY_LIFE_MS, PENALTY_SPEED, PENALTY_COLOR),
        };

        let lane = self.lane_mut(kind);
        let mut effect = lane.pool.acquire();
        effect.x = x;
        effect.y = y;
        effect.text.clear();
        effect.text.push_str(text);
        effect.life = max_life;
        effect.max_life = max_life;
        effect.speed = speed;
        effect.alpha = 1.0;
        effect.color = color;
        lane.active.push(effect);
    }

    /// Age all active effects by `dt_ms`: expired ones return to their
    /// pool, live ones drift and fade.
    pub fn update(&mut self, dt_ms: f32) {
        for lane in [&mut self.milestone, &mut self.penalty] {
            let mut i = 0;
            while i < lane.active.len() {
                let effect = &mut lane.active[i];
                effect.life -= dt_ms;
                if effect.life <= 0.0 {
                    let expired = lane.active.swap_remove(i);
                    lane.pool.release(expired);
                } else {
                    effect.y += effect.speed * dt_ms;
                    effect.alpha = effect.life / effect.max_life;
                    i += 1;
                }
            }
        }
    }

    pub fn active(&self, kind: EffectKind) -> &[EffectInstance] {
        &self.lane(kind).active
    }

    pub fn active_count(&self) -> usize {
        self.milestone.active.len() + self.penalty.active.len()
    }

    pub fn pooled_count(&self, kind: EffectKind) -> usize {
        self.lane(kind).pool.len()
    }

    pub fn clear(&mut self) {
        for lane in [&mut self.milestone, &mut self.penalty] {
            for effect in lane.active.drain(..) {
                lane.pool.release(effect);
            }
        }
    }
}

impl Default for EffectSystem {
    fn default() -> Self {
        Self::new()
    }
}
