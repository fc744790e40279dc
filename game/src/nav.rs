use serde::{Deserialize, Serialize};

use crate::view::Screen;

/// Screen state machine with back-navigation history.
///
/// All screen changes in the game flow through this type; UI code never
/// mutates the current screen directly. The history stack records forward
/// navigation only, so "back" always retraces the player's own steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Navigator {
    current: Screen,
    previous: Option<Screen>,
    /// Deferred transition applied at the top of the next update, used for
    /// boot hand-offs (loading -> initializing) that must not happen
    /// mid-tick.
    pending: Option<Screen>,
    history: Vec<Screen>,
}

impl Navigator {
    pub fn new(initial: Screen) -> Self {
        Self {
            current: initial,
            previous: None,
            pending: None,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn previous(&self) -> Option<Screen> {
        self.previous
    }

    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    /// Unconditional transition. Used for terminal/fallback moves (forcing
    /// HOME, pause toggling) that must not touch the history stack.
    pub fn set_state(&mut self, next: Screen) {
        self.previous = Some(self.current);
        self.current = next;
    }

    /// Standard forward transition: remember where we came from, then move.
    ///
    /// Ephemeral screens are not recorded, and the current screen is never
    /// pushed twice in a row, so back-navigation cannot loop in place.
    pub fn navigate_to(&mut self, next: Screen) {
        if next == self.current {
            return;
        }
        if !self.current.is_ephemeral() && self.history.last() != Some(&self.current) {
            self.history.push(self.current);
        }
        self.set_state(next);
    }

    /// Pop the most recent history entry and transition to it.
    ///
    /// Returns false and leaves the current screen unchanged when the stack
    /// is empty; the HOME fallback is deliberately the caller's decision.
    pub fn navigate_back(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.set_state(prev);
                true
            }
            None => false,
        }
    }

    /// Drop all history. Called on entering gameplay: backing out of a run
    /// into pre-game menus is undefined.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn set_pending(&mut self, next: Screen) {
        self.pending = Some(next);
    }

    pub fn take_pending(&mut self) -> Option<Screen> {
        self.pending.take()
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Screen::default())
    }
}
