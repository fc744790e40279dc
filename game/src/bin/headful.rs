use engine::app::{HeadfulConfig, run_headful};
use engine::collab::{
    AudioNotifier, GraphicsQuality, InputFrame, InputSource, NullRenderer, PlayerSim, SilentAudio,
    WorldSim,
};

use game::audio::RodioAudio;
use game::context::{CoreApp, GameContext};
use game::effects::EffectKind;
use game::settings::SettingsStore;
use game::view::Screen;

struct PulseInput {
    frame: u64,
}

impl InputSource for PulseInput {
    fn poll(&mut self) -> InputFrame {
        self.frame += 1;
        InputFrame {
            jump: self.frame % 75 == 0,
            ..InputFrame::default()
        }
    }
}

#[derive(Default)]
struct ScrollingWorld {
    scroll_px: f64,
}

impl WorldSim for ScrollingWorld {
    fn update(&mut self, dt_ms: f64) {
        self.scroll_px += dt_ms * 0.2;
    }
}

#[derive(Default)]
struct RunnerPlayer {
    airborne_ms: f64,
}

impl PlayerSim for RunnerPlayer {
    fn update(&mut self, dt_ms: f64, input: InputFrame) {
        if input.jump {
            self.airborne_ms = 400.0;
        }
        self.airborne_ms = (self.airborne_ms - dt_ms).max(0.0);
    }
}

struct Demo {
    core: CoreApp,
    world_scroll: f64,
    score_carry: f64,
}

impl engine::TickApp for Demo {
    fn update(&mut self, dt_ms: f64, now_ms: f64) {
        if self.core.ctx.screen() == Screen::Home {
            self.core.ctx.begin_run(now_ms);
        }
        if self.core.ctx.screen() == Screen::Playing {
            let rate = self
                .core
                .ctx
                .expected_score_rate(self.core.ctx.difficulty().selected());
            self.core.ctx.add_score(rate * dt_ms / 1000.0);
            self.score_carry += rate * dt_ms / 1000.0;
            if self.score_carry >= 500.0 {
                self.score_carry = 0.0;
                self.core
                    .ctx
                    .spawn_effect(EffectKind::Milestone, 480.0, 140.0, "+500");
                self.core.ctx.trigger_screen_shake(4.0, 250.0);
            }
            self.world_scroll += dt_ms * 0.2;
        }
        self.core.update(dt_ms, now_ms);
    }

    fn render(&mut self) {
        self.core.render();
    }

    fn post_render(
        &mut self,
        timing: &engine::timing::FrameTiming,
        timings: engine::profiling::TickTimings,
        now_ms: f64,
    ) {
        self.core.post_render(timing, timings, now_ms);
    }

    fn should_exit(&self) -> bool {
        self.core.should_exit()
    }
}

fn base_color(quality: GraphicsQuality) -> [u8; 3] {
    match quality {
        GraphicsQuality::Low => [18, 18, 24],
        GraphicsQuality::Medium => [22, 26, 40],
        GraphicsQuality::High => [24, 32, 56],
    }
}

fn main() {
    env_logger::init();

    let store = SettingsStore::from_env();
    let settings = store.load();
    let gain = settings.audio.effective_sfx_gain();
    let audio: Box<dyn AudioNotifier> = match RodioAudio::new(gain) {
        Some(audio) => Box::new(audio),
        None => Box::new(SilentAudio),
    };

    let ctx = GameContext::new(Box::new(settings), audio);
    let demo = Demo {
        core: CoreApp::new(
            ctx,
            Box::new(PulseInput { frame: 0 }),
            Box::new(RunnerPlayer::default()),
            Box::new(ScrollingWorld::default()),
            Box::new(NullRenderer),
        ),
        world_scroll: 0.0,
        score_carry: 0.0,
    };

    let config = HeadfulConfig {
        title: "runner".to_string(),
        vsync: Some(true),
        ..HeadfulConfig::default()
    };

    let result = run_headful(config, demo, |demo, frame, width, height| {
        let ctx = &demo.core.ctx;
        let (shake_x, shake_y) = ctx.shake().offset();
        let base = base_color(ctx.tuning().quality);
        let scroll = demo.world_scroll as i64;
        let budget = ctx.tuning().particle_budget.max(0.0) as i64;

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let sx = x + shake_x as i64;
                let sy = y + shake_y as i64;
                // Scrolling vertical bands stand in for the world.
                let band = ((sx + scroll) / 48) % 2 == 0;
                let lift: u8 = if band { 18 } else { 0 };
                // Sparse dither in the upper half, thinned with the
                // governor's particle budget.
                let dust = ctx.tuning().background_particles
                    && sy < height as i64 / 2
                    && (sx * 31 + sy * 17 + scroll) % 997 < budget / 4;

                let dust_lift: u8 = if dust { 80 } else { 0 };
                let i = ((y * width as i64 + x) * 4) as usize;
                frame[i] = base[0].saturating_add(lift).saturating_add(dust_lift);
                frame[i + 1] = base[1].saturating_add(lift).saturating_add(dust_lift);
                frame[i + 2] = base[2].saturating_add(lift).saturating_add(dust_lift);
                frame[i + 3] = 0xff;
            }
        }

        // Floating score effects as fading horizontal strips.
        for kind in [EffectKind::Milestone, EffectKind::Penalty] {
            for effect in ctx.effects().active(kind) {
                let y = effect.y as i64;
                if !(0..height as i64).contains(&y) {
                    continue;
                }
                let alpha = (effect.alpha.clamp(0.0, 1.0) * 255.0) as u8;
                let x0 = (effect.x as i64 - 40).max(0);
                let x1 = (effect.x as i64 + 40).min(width as i64);
                for x in x0..x1 {
                    let i = ((y * width as i64 + x) * 4) as usize;
                    frame[i] = effect.color[0].min(alpha);
                    frame[i + 1] = effect.color[1].min(alpha);
                    frame[i + 2] = effect.color[2].min(alpha);
                }
            }
        }
    });

    if let Err(err) = result {
        log::error!("headful loop failed: {err}");
        std::process::exit(1);
    }
}
