//! Debug assertion macros for queue invariants.
//!
//! Only active in debug builds (`debug_assert!`), so there is zero overhead in
//! release builds. Each macro names the invariant it checks in its panic
//! message so a failing stress test points straight at the broken rule.

// =============================================================================
// Bounded occupancy
// =============================================================================

/// Assert that occupancy does not exceed capacity.
///
/// **Invariant**: `0 ≤ (write_index - read_index) ≤ capacity`
///
/// Used in: push reservation, `take()`
macro_rules! debug_assert_bounded_occupancy {
    ($occupancy:expr, $capacity:expr) => {
        debug_assert!(
            $occupancy <= $capacity,
            "bounded occupancy violated: occupancy {} exceeds capacity {}",
            $occupancy,
            $capacity
        )
    };
}

// =============================================================================
// Slot ownership
// =============================================================================

/// Assert that a slot carries the stamp the protocol expects for a position.
///
/// **Invariant**: a producer only writes a slot stamped `free(pos)`; a consumer
/// only reads a slot stamped `ready(pos)`. Nobody else can change the stamp
/// while the owner holds the slot.
///
/// Used in: push before publishing, pop before releasing
macro_rules! debug_assert_slot_owned {
    ($what:literal, $pos:expr, $actual:expr, $expected:expr) => {
        debug_assert!(
            $actual == $expected,
            "slot ownership violated: {} at position {} found stamp {:#x}, expected {:#x}",
            $what,
            $pos,
            $actual,
            $expected
        )
    };
}

pub(crate) use debug_assert_bounded_occupancy;
pub(crate) use debug_assert_slot_owned;
