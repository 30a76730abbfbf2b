use proptest::prelude::*;
use riverbed_server::block;
use riverbed_server::fluid::FluidState;

proptest! {
    #[test]
    fn stored_value_decodes_to_level_and_falling(raw in 0u8..16) {
        let state = FluidState::from_raw(raw);
        prop_assert!(state.level() <= FluidState::MAX_LEVEL);
        prop_assert_eq!(state.level(), raw % 8);
        prop_assert_eq!(state.is_falling(), raw >= 8);
    }

    #[test]
    fn falling_keeps_the_level(level in 0u8..=7) {
        let falling = FluidState::falling(level).unwrap();
        prop_assert!(falling.is_falling());
        prop_assert_eq!(falling.level(), level);
        prop_assert_eq!(falling.raw(), level + 8);
    }

    #[test]
    fn levels_past_seven_are_refused(level in 8u8..=u8::MAX) {
        prop_assert!(FluidState::flowing(level).is_none());
        prop_assert!(FluidState::falling(level).is_none());
    }

    #[test]
    fn weakening_adds_exactly_one(raw in 0u8..16) {
        let state = FluidState::from_raw(raw);
        match state.weakened() {
            Some(next) => {
                prop_assert_eq!(next.level(), state.level() + 1);
                prop_assert!(!next.is_falling());
            }
            None => prop_assert_eq!(state.level(), FluidState::MAX_LEVEL),
        }
    }

    #[test]
    fn state_survives_block_packing(raw in 0u8..16) {
        let state = FluidState::from_raw(raw);
        let id = state.block(block::WATER);
        prop_assert_eq!(block::material(id), block::WATER);
        prop_assert_eq!(FluidState::of(id), state);
    }
}

#[test]
fn only_level_zero_non_falling_is_a_source() {
    assert!(FluidState::SOURCE.is_source());
    assert!(!FluidState::from_raw(8).is_source());
    assert!(!FluidState::from_raw(1).is_source());
    assert_eq!(FluidState::from_raw(8).level(), 0);
}

#[test]
fn high_bits_are_ignored() {
    assert_eq!(FluidState::from_raw(0x13), FluidState::from_raw(0x03));
}
