use engine::TickApp;
use engine::collab::{
    AudioNotifier, InputSource, PlayerSim, RenderDelegate, SettingsSource, SilentAudio, WorldSim,
};
use engine::profiling::TickTimings;
use engine::timing::FrameTiming;

use crate::difficulty::{self, DifficultyController, DifficultyTier, RunSession};
use crate::effects::{EffectKind, EffectSystem};
use crate::governor::{PerformanceGovernor, RenderTuning};
use crate::nav::Navigator;
use crate::shake::ScreenShake;
use crate::view::{EscapeAction, Screen, escape_action};

/// Snapshot of loop health handed to HUD/debug overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub fps: f64,
    pub frame_ms: f64,
    pub update_ms: f64,
    pub render_ms: f64,
    pub fps_history: Vec<f64>,
}

/// The one coordinating context owning all control-core state.
///
/// Each subsystem mutates only its own slice: the navigator owns screen
/// state, the difficulty controller its multiplier, the governor the
/// render tuning. External collaborators come in through capability
/// traits, so an absent subsystem is a null object rather than a scattered
/// `if let` at every call site.
pub struct GameContext {
    nav: Navigator,
    difficulty: DifficultyController,
    governor: PerformanceGovernor,
    effects: EffectSystem,
    shake: ScreenShake,
    tuning: RenderTuning,
    session: Option<RunSession>,
    audio: Box<dyn AudioNotifier>,
    settings: Box<dyn SettingsSource>,
    exit_requested: bool,
}

impl GameContext {
    pub fn new(settings: Box<dyn SettingsSource>, audio: Box<dyn AudioNotifier>) -> Self {
        let adaptive = settings.adaptive_difficulty();
        Self {
            nav: Navigator::new(Screen::Loading),
            difficulty: DifficultyController::new(DifficultyTier::default(), adaptive),
            governor: PerformanceGovernor::new(),
            effects: EffectSystem::new(),
            shake: ScreenShake::new(),
            tuning: RenderTuning::default(),
            session: None,
            audio,
            settings,
            exit_requested: false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────

    pub fn screen(&self) -> Screen {
        self.nav.current()
    }

    pub fn nav(&self) -> &Navigator {
        &self.nav
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn difficulty_mut(&mut self) -> &mut DifficultyController {
        &mut self.difficulty
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn tuning(&self) -> &RenderTuning {
        &self.tuning
    }

    pub fn effects(&self) -> &EffectSystem {
        &self.effects
    }

    pub fn shake(&self) -> &ScreenShake {
        &self.shake
    }

    pub fn session(&self) -> Option<&RunSession> {
        self.session.as_ref()
    }

    pub fn expected_score_rate(&self, tier: DifficultyTier) -> f64 {
        difficulty::expected_score_rate(tier)
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn navigate_to_state(&mut self, screen: Screen) {
        if screen == self.nav.current() {
            return;
        }
        self.nav.navigate_to(screen);
        self.audio.on_menu_click();
    }

    pub fn navigate_back(&mut self) -> bool {
        let popped = self.nav.navigate_back();
        if popped {
            self.audio.on_menu_click();
        }
        popped
    }

    /// `navigate_back` with the standard HOME fallback on an empty stack.
    pub fn navigate_back_or_home(&mut self) {
        if !self.navigate_back() {
            self.nav.set_state(Screen::Home);
            self.audio.on_menu_click();
        }
    }

    pub fn clear_history(&mut self) {
        self.nav.clear_history();
    }

    pub fn toggle_pause(&mut self) {
        match self.nav.current() {
            Screen::Playing => self.nav.set_state(Screen::Paused),
            Screen::Paused => self.nav.set_state(Screen::Playing),
            _ => {}
        }
    }

    /// Route the escape/back key through the transition table.
    pub fn handle_escape(&mut self) {
        match escape_action(self.nav.current()) {
            EscapeAction::None => {}
            EscapeAction::TogglePause | EscapeAction::Resume => self.toggle_pause(),
            EscapeAction::Back => self.navigate_back_or_home(),
            EscapeAction::GoHome => {
                if self.nav.current() != Screen::Home {
                    self.nav.clear_history();
                    self.nav.set_state(Screen::Home);
                    self.audio.on_menu_click();
                }
            }
        }
    }

    // ── Run lifecycle ─────────────────────────────────────────────────

    pub fn begin_run(&mut self, now_ms: f64) {
        self.nav.clear_history();
        self.nav.set_state(Screen::Playing);
        self.session = Some(RunSession::new(now_ms));
        self.difficulty.reset_run(now_ms);
        self.effects.clear();
        self.shake = ScreenShake::new();
    }

    /// End the current run. The session is kept around for the game-over
    /// summary; `begin_run` replaces it.
    pub fn end_run(&mut self) {
        self.nav.set_state(Screen::GameOver);
    }

    pub fn add_score(&mut self, points: f64) {
        if let Some(session) = self.session.as_mut() {
            session.add_score(points);
        }
    }

    pub fn record_damage(&mut self, now_ms: f64) {
        if let Some(session) = self.session.as_mut() {
            session.record_damage(now_ms);
        }
    }

    // ── Effects and feedback ──────────────────────────────────────────

    pub fn trigger_screen_shake(&mut self, intensity: f32, duration_ms: f32) {
        let scale = f32::from(self.settings.screen_shake_percent().min(100)) / 100.0;
        if scale <= 0.0 || intensity <= 0.0 {
            return;
        }
        self.shake.trigger(intensity * scale, duration_ms);
    }

    pub fn spawn_effect(&mut self, kind: EffectKind, x: f32, y: f32, text: &str) {
        self.effects.spawn(kind, x, y, text);
    }

    pub fn performance_report(&self, timing: &FrameTiming) -> PerformanceReport {
        let metrics = self.governor.metrics();
        PerformanceReport {
            fps: timing.fps(),
            frame_ms: metrics.frame_ms,
            update_ms: metrics.update_ms,
            render_ms: metrics.render_ms,
            fps_history: timing.fps_history().iter().copied().collect(),
        }
    }

    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    // ── Tick phases ───────────────────────────────────────────────────

    /// Update-phase dispatch, keyed off the current screen.
    pub fn update(
        &mut self,
        dt_ms: f64,
        now_ms: f64,
        input: Option<&mut dyn InputSource>,
        player: Option<&mut dyn PlayerSim>,
        world: Option<&mut dyn WorldSim>,
    ) {
        if let Some(next) = self.nav.take_pending() {
            self.nav.set_state(next);
        }

        match self.nav.current() {
            // Boot chain: each phase hands off on the following tick so
            // subsystems attaching from outside see settled state.
            Screen::Loading => self.nav.set_pending(Screen::Initializing),
            Screen::Initializing => self.nav.set_pending(Screen::OpeningAnimation),
            Screen::OpeningAnimation => self.nav.set_pending(Screen::Home),
            Screen::Playing => {
                let frame = input.map(|i| i.poll()).unwrap_or_default();
                if let Some(player) = player {
                    player.update(dt_ms, frame);
                }
                if let Some(world) = world {
                    world.update(dt_ms);
                }
                self.effects.update(dt_ms as f32);
                self.shake.tick(dt_ms as f32);
                self.difficulty.maybe_check(now_ms, self.session.as_ref());
            }
            // Menus, pause and dialogs freeze the simulation entirely.
            _ => {}
        }
    }

    /// Post-render phase: record the tick's cost and let the governor
    /// react to the rolling FPS average.
    pub fn governor_check(&mut self, timing: &FrameTiming, timings: TickTimings, now_ms: f64) {
        self.governor.record_tick(&timings);
        self.governor.maybe_check(
            now_ms,
            timing.fps_history(),
            &mut self.tuning,
            self.settings.as_ref(),
        );
    }
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new(
            Box::new(engine::collab::NoSettings),
            Box::new(SilentAudio),
        )
    }
}

/// Glue binding the context and its collaborators into one frame-loop app.
pub struct CoreApp {
    pub ctx: GameContext,
    input: Box<dyn InputSource>,
    player: Box<dyn PlayerSim>,
    world: Box<dyn WorldSim>,
    renderer: Box<dyn RenderDelegate>,
}

impl CoreApp {
    pub fn new(
        ctx: GameContext,
        input: Box<dyn InputSource>,
        player: Box<dyn PlayerSim>,
        world: Box<dyn WorldSim>,
        renderer: Box<dyn RenderDelegate>,
    ) -> Self {
        Self {
            ctx,
            input,
            player,
            world,
            renderer,
        }
    }
}

impl TickApp for CoreApp {
    fn update(&mut self, dt_ms: f64, now_ms: f64) {
        self.ctx.update(
            dt_ms,
            now_ms,
            Some(self.input.as_mut()),
            Some(self.player.as_mut()),
            Some(self.world.as_mut()),
        );
    }

    fn render(&mut self) {
        self.renderer.render();
    }

    fn post_render(&mut self, timing: &FrameTiming, timings: TickTimings, now_ms: f64) {
        self.ctx.governor_check(timing, timings, now_ms);
    }

    fn should_exit(&self) -> bool {
        self.ctx.exit_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::collab::InputFrame;
    use std::cell::Cell;
    use std::rc::Rc;

    struct ScriptedInput(InputFrame);

    impl InputSource for ScriptedInput {
        fn poll(&mut self) -> InputFrame {
            self.0
        }
    }

    #[derive(Default)]
    struct CountingPlayer {
        updates: Rc<Cell<u32>>,
        last_input: Rc<Cell<InputFrame>>,
    }

    impl PlayerSim for CountingPlayer {
        fn update(&mut self, _dt_ms: f64, input: InputFrame) {
            self.updates.set(self.updates.get() + 1);
            self.last_input.set(input);
        }
    }

    #[derive(Default)]
    struct CountingWorld(Rc<Cell<u32>>);

    impl WorldSim for CountingWorld {
        fn update(&mut self, _dt_ms: f64) {
            self.0.set(self.0.get() + 1);
        }
    }

    struct ClickCounter(Rc<Cell<u32>>);

    impl AudioNotifier for ClickCounter {
        fn on_menu_click(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn ctx_at_home() -> GameContext {
        let mut ctx = GameContext::default();
        ctx.navigate_to_state(Screen::Home);
        ctx.clear_history();
        ctx
    }

    #[test]
    fn boot_chain_reaches_home_without_input() {
        let mut ctx = GameContext::default();
        assert_eq!(ctx.screen(), Screen::Loading);
        for _ in 0..6 {
            ctx.update(16.0, 0.0, None, None, None);
        }
        assert_eq!(ctx.screen(), Screen::Home);
        assert!(ctx.nav().history().is_empty());
    }

    #[test]
    fn toggle_pause_flips_only_between_playing_and_paused() {
        let mut ctx = ctx_at_home();
        ctx.toggle_pause();
        assert_eq!(ctx.screen(), Screen::Home);

        ctx.begin_run(0.0);
        ctx.toggle_pause();
        assert_eq!(ctx.screen(), Screen::Paused);
        ctx.toggle_pause();
        assert_eq!(ctx.screen(), Screen::Playing);
    }

    #[test]
    fn simulation_is_frozen_while_paused() {
        let updates = Rc::new(Cell::new(0));
        let world_updates = Rc::new(Cell::new(0));
        let mut ctx = ctx_at_home();
        ctx.begin_run(0.0);

        let mut input = ScriptedInput(InputFrame::default());
        let mut player = CountingPlayer {
            updates: updates.clone(),
            ..CountingPlayer::default()
        };
        let mut world = CountingWorld(world_updates.clone());

        ctx.update(16.0, 16.0, Some(&mut input), Some(&mut player), Some(&mut world));
        assert_eq!(updates.get(), 1);
        assert_eq!(world_updates.get(), 1);

        ctx.toggle_pause();
        ctx.update(16.0, 32.0, Some(&mut input), Some(&mut player), Some(&mut world));
        assert_eq!(updates.get(), 1);
        assert_eq!(world_updates.get(), 1);
    }

    #[test]
    fn gameplay_polls_input_once_per_update() {
        let last_input = Rc::new(Cell::new(InputFrame::default()));
        let mut ctx = ctx_at_home();
        ctx.begin_run(0.0);

        let mut input = ScriptedInput(InputFrame {
            jump: true,
            ..InputFrame::default()
        });
        let mut player = CountingPlayer {
            last_input: last_input.clone(),
            ..CountingPlayer::default()
        };

        ctx.update(16.0, 16.0, Some(&mut input), Some(&mut player), None);
        assert!(last_input.get().jump);
    }

    #[test]
    fn escape_routing_covers_pause_back_and_home() {
        let mut ctx = ctx_at_home();
        ctx.navigate_to_state(Screen::Shop);
        ctx.navigate_to_state(Screen::Settings);

        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Shop);
        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Home);
        // Home: escape is a no-op.
        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Home);

        ctx.begin_run(0.0);
        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Paused);
        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Playing);

        ctx.end_run();
        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Home);
    }

    #[test]
    fn escape_back_falls_back_to_home_on_empty_history() {
        let mut ctx = ctx_at_home();
        // Force a menu screen without recording history.
        ctx.clear_history();
        ctx.navigate_to_state(Screen::Settings);
        ctx.clear_history();

        ctx.handle_escape();
        assert_eq!(ctx.screen(), Screen::Home);
    }

    #[test]
    fn begin_run_resets_difficulty_and_clears_history() {
        let mut ctx = ctx_at_home();
        ctx.navigate_to_state(Screen::DifficultySelect);
        ctx.begin_run(1000.0);

        assert_eq!(ctx.screen(), Screen::Playing);
        assert!(ctx.nav().history().is_empty());
        assert_eq!(ctx.difficulty().multiplier(), 1.0);
        assert_eq!(ctx.session().map(|s| s.score), Some(0.0));
    }

    #[test]
    fn score_and_damage_feed_the_session() {
        let mut ctx = ctx_at_home();
        // Without a run these are silently dropped.
        ctx.add_score(100.0);
        assert!(ctx.session().is_none());

        ctx.begin_run(0.0);
        ctx.add_score(100.0);
        ctx.record_damage(500.0);
        let session = ctx.session().unwrap();
        assert_eq!(session.score, 100.0);
        assert_eq!(session.last_damage_ms, Some(500.0));
    }

    #[test]
    fn menu_clicks_fire_on_navigation_only() {
        let clicks = Rc::new(Cell::new(0));
        let mut ctx = GameContext::new(
            Box::new(engine::collab::NoSettings),
            Box::new(ClickCounter(clicks.clone())),
        );
        ctx.navigate_to_state(Screen::Home);
        ctx.navigate_to_state(Screen::Shop);
        assert_eq!(clicks.get(), 2);

        // Failed back-navigation stays silent.
        ctx.clear_history();
        ctx.navigate_back();
        assert_eq!(clicks.get(), 2);

        // Re-navigating to the current screen stays silent too.
        ctx.navigate_to_state(Screen::Shop);
        assert_eq!(clicks.get(), 2);
    }

    #[test]
    fn screen_shake_respects_the_settings_scale() {
        struct QuarterShake;
        impl SettingsSource for QuarterShake {
            fn graphics_quality(&self) -> Option<engine::collab::GraphicsQuality> {
                None
            }
            fn screen_shake_percent(&self) -> u8 {
                25
            }
        }

        let mut ctx = GameContext::new(Box::new(QuarterShake), Box::new(SilentAudio));
        ctx.trigger_screen_shake(8.0, 300.0);
        assert!(ctx.shake().is_active());

        struct ShakeOff;
        impl SettingsSource for ShakeOff {
            fn graphics_quality(&self) -> Option<engine::collab::GraphicsQuality> {
                None
            }
            fn screen_shake_percent(&self) -> u8 {
                0
            }
        }

        let mut ctx = GameContext::new(Box::new(ShakeOff), Box::new(SilentAudio));
        ctx.trigger_screen_shake(8.0, 300.0);
        assert!(!ctx.shake().is_active());
    }

    #[test]
    fn performance_report_mirrors_timing_state() {
        let ctx = GameContext::default();
        let mut timing = FrameTiming::new();
        let mut now = 0.0;
        for _ in 0..120 {
            now += 10.0;
            timing.begin_tick(now);
        }

        let report = ctx.performance_report(&timing);
        assert_eq!(report.fps, timing.fps());
        assert_eq!(report.fps_history.len(), timing.fps_history().len());
    }
}
