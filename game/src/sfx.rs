/// Shared SFX constants.
///
/// Used by the rodio-backed notifier and validated by tests.
pub const MENU_CLICK_SFX_VOLUME: f32 = 0.3;
pub const MENU_CLICK_FREQ_HZ: f32 = 880.0;
pub const MENU_CLICK_DURATION_MS: u64 = 45;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_volume_is_within_unit_range() {
        assert!((0.0..=1.0).contains(&MENU_CLICK_SFX_VOLUME));
    }
}
