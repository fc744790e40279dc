use serde::{Deserialize, Serialize};

/// Closed set of screens the game can be on.
///
/// Navigation only ever moves between members of this enum, so an
/// out-of-range transition is unrepresentable rather than a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Loading,
    Initializing,
    OpeningAnimation,
    Home,
    Profile,
    Options,
    Credits,
    DifficultySelect,
    Shop,
    Achievements,
    Leaderboard,
    Settings,
    Customization,
    Changelog,
    Tutorial,
    Playing,
    Paused,
    GameOver,
    ResetConfirm,
    PostAnimationPopup,
    LoginPrompt,
}

impl Default for Screen {
    fn default() -> Self {
        Self::Loading
    }
}

impl Screen {
    /// Ephemeral screens never enter the navigation history: backing into a
    /// popup, a pause overlay or a boot screen would be a dead end.
    pub fn is_ephemeral(self) -> bool {
        matches!(
            self,
            Self::Loading
                | Self::Initializing
                | Self::OpeningAnimation
                | Self::Paused
                | Self::ResetConfirm
                | Self::PostAnimationPopup
                | Self::LoginPrompt
        )
    }
}

/// What the escape/back key should do on a given screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeAction {
    None,
    TogglePause,
    Resume,
    /// Pop the history stack; callers fall back to HOME on an empty stack.
    Back,
    GoHome,
}

/// The one exhaustive escape-routing table.
///
/// Keeping this a pure function over the closed enum means every legal
/// escape transition is enumerable and testable in one place.
pub fn escape_action(current: Screen) -> EscapeAction {
    match current {
        Screen::Playing => EscapeAction::TogglePause,
        Screen::Paused => EscapeAction::Resume,
        Screen::Settings
        | Screen::Options
        | Screen::Credits
        | Screen::Achievements
        | Screen::Leaderboard
        | Screen::Shop
        | Screen::DifficultySelect
        | Screen::Customization
        | Screen::Changelog
        | Screen::Tutorial => EscapeAction::Back,
        Screen::GameOver => EscapeAction::GoHome,
        Screen::Home => EscapeAction::None,
        Screen::Loading
        | Screen::Initializing
        | Screen::OpeningAnimation
        | Screen::Profile
        | Screen::ResetConfirm
        | Screen::PostAnimationPopup
        | Screen::LoginPrompt => EscapeAction::GoHome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SCREENS: [Screen; 21] = [
        Screen::Loading,
        Screen::Initializing,
        Screen::OpeningAnimation,
        Screen::Home,
        Screen::Profile,
        Screen::Options,
        Screen::Credits,
        Screen::DifficultySelect,
        Screen::Shop,
        Screen::Achievements,
        Screen::Leaderboard,
        Screen::Settings,
        Screen::Customization,
        Screen::Changelog,
        Screen::Tutorial,
        Screen::Playing,
        Screen::Paused,
        Screen::GameOver,
        Screen::ResetConfirm,
        Screen::PostAnimationPopup,
        Screen::LoginPrompt,
    ];

    #[test]
    fn default_screen_is_loading() {
        assert_eq!(Screen::default(), Screen::Loading);
    }

    #[test]
    fn escape_on_gameplay_toggles_pause_and_resume() {
        assert_eq!(escape_action(Screen::Playing), EscapeAction::TogglePause);
        assert_eq!(escape_action(Screen::Paused), EscapeAction::Resume);
    }

    #[test]
    fn escape_on_menu_screens_goes_back() {
        for screen in [
            Screen::Settings,
            Screen::Options,
            Screen::Credits,
            Screen::Achievements,
            Screen::Leaderboard,
            Screen::Shop,
            Screen::DifficultySelect,
            Screen::Customization,
            Screen::Changelog,
            Screen::Tutorial,
        ] {
            assert_eq!(escape_action(screen), EscapeAction::Back, "{screen:?}");
        }
    }

    #[test]
    fn escape_on_home_is_a_noop() {
        assert_eq!(escape_action(Screen::Home), EscapeAction::None);
    }

    #[test]
    fn escape_on_game_over_goes_home() {
        assert_eq!(escape_action(Screen::GameOver), EscapeAction::GoHome);
    }

    #[test]
    fn every_screen_has_an_escape_action() {
        // Mostly a reminder that new screens must pick a row in the table.
        for screen in ALL_SCREENS {
            let action = escape_action(screen);
            if screen == Screen::Home {
                assert_eq!(action, EscapeAction::None);
            } else {
                assert_ne!(action, EscapeAction::None, "{screen:?}");
            }
        }
    }

    #[test]
    fn popups_and_boot_screens_are_ephemeral() {
        for screen in [
            Screen::Loading,
            Screen::Initializing,
            Screen::OpeningAnimation,
            Screen::Paused,
            Screen::ResetConfirm,
            Screen::PostAnimationPopup,
            Screen::LoginPrompt,
        ] {
            assert!(screen.is_ephemeral(), "{screen:?}");
        }
        assert!(!Screen::Home.is_ephemeral());
        assert!(!Screen::Shop.is_ephemeral());
        assert!(!Screen::GameOver.is_ephemeral());
    }
}
