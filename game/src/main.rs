use engine::collab::{InputFrame, InputSource, NullRenderer, PlayerSim, SilentAudio, WorldSim};
use engine::{Clock, FrameLoop, ManualClock};

use game::context::{CoreApp, GameContext};
use game::effects::EffectKind;
use game::settings::SettingsStore;
use game::view::Screen;

struct ScriptedInput {
    frame: u64,
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputFrame {
        self.frame += 1;
        InputFrame {
            jump: self.frame % 45 == 0,
            slide: self.frame % 90 == 0,
            ..InputFrame::default()
        }
    }
}

#[derive(Default)]
struct DemoPlayer {
    distance: f64,
    jumps: u32,
}

impl PlayerSim for DemoPlayer {
    fn update(&mut self, dt_ms: f64, input: InputFrame) {
        self.distance += dt_ms * 0.3;
        if input.jump {
            self.jumps += 1;
        }
    }
}

#[derive(Default)]
struct DemoWorld {
    scroll: f64,
}

impl WorldSim for DemoWorld {
    fn update(&mut self, dt_ms: f64) {
        self.scroll += dt_ms * 0.25;
    }
}

fn main() {
    env_logger::init();

    let settings = SettingsStore::from_env().load();
    let ctx = GameContext::new(Box::new(settings), Box::new(SilentAudio));
    let mut app = CoreApp::new(
        ctx,
        Box::new(ScriptedInput { frame: 0 }),
        Box::new(DemoPlayer::default()),
        Box::new(DemoWorld::default()),
        Box::new(NullRenderer),
    );

    let clock = ManualClock::new();
    let mut frame_loop = FrameLoop::new(clock.clone());

    // Let the boot chain settle on the home screen.
    while app.ctx.screen() != Screen::Home {
        clock.advance(16.0);
        frame_loop.tick(&mut app);
    }

    app.ctx.begin_run(clock.now_ms());
    let rate = app.ctx.expected_score_rate(app.ctx.difficulty().selected());

    // Ten seconds of play at 60 fps, scoring a little above expectation.
    for i in 0..600u32 {
        clock.advance(16.0);
        app.ctx.add_score(rate * 1.25 * 0.016);
        if i == 300 {
            app.ctx
                .spawn_effect(EffectKind::Milestone, 480.0, 120.0, "1000m");
        }
        frame_loop.tick(&mut app);
    }
    app.ctx.end_run();

    let report = app.ctx.performance_report(frame_loop.timing());
    let score = app.ctx.session().map_or(0.0, |s| s.score);
    println!(
        "screen {:?} score {score:.0} multiplier {:.1} fps {:.1} samples {}",
        app.ctx.screen(),
        app.ctx.difficulty().multiplier(),
        report.fps,
        report.fps_history.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_run_raises_the_multiplier() {
        let ctx = GameContext::default();
        let mut app = CoreApp::new(
            ctx,
            Box::new(ScriptedInput { frame: 0 }),
            Box::new(DemoPlayer::default()),
            Box::new(DemoWorld::default()),
            Box::new(NullRenderer),
        );
        let clock = ManualClock::new();
        let mut frame_loop = FrameLoop::new(clock.clone());

        while app.ctx.screen() != Screen::Home {
            clock.advance(16.0);
            frame_loop.tick(&mut app);
        }
        app.ctx.begin_run(clock.now_ms());
        let rate = app.ctx.expected_score_rate(app.ctx.difficulty().selected());

        // Twenty seconds at 1.3x the expected rate, no damage. Three
        // five-second checks pass, the fourth applies the raise.
        for _ in 0..1250u32 {
            clock.advance(16.0);
            app.ctx.add_score(rate * 1.3 * 0.016);
            frame_loop.tick(&mut app);
        }

        assert!(app.ctx.difficulty().multiplier() > 1.0);
    }
}
