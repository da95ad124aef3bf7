//! Behavioural tests for [`SlotCapacity`].

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tripsync_core::{Slot, SlotCapacity};

#[fixture]
fn occupied() -> RefCell<Vec<Slot>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn admitted() -> RefCell<Option<bool>> {
    RefCell::new(None)
}

fn parse(value: &str) -> Slot {
    Slot::from_visit_time(value)
        .expect("valid visit time")
        .expect("scheduled")
}

#[given("a slot holding {count} places at {at}")]
fn slot_holding(#[from(occupied)] occupied: &RefCell<Vec<Slot>>, count: usize, at: String) {
    let slot = parse(at.trim_matches('"'));
    *occupied.borrow_mut() = vec![slot; count];
}

#[when("I ask whether {at} admits another place")]
fn ask(
    #[from(occupied)] occupied: &RefCell<Vec<Slot>>,
    #[from(admitted)] admitted: &RefCell<Option<bool>>,
    at: String,
) {
    let slot = parse(at.trim_matches('"'));
    *admitted.borrow_mut() = Some(SlotCapacity::default().admits(occupied.borrow().iter(), &slot));
}

#[then("the place is admitted")]
fn then_admitted(#[from(admitted)] admitted: &RefCell<Option<bool>>) {
    assert_eq!(*admitted.borrow(), Some(true));
}

#[then("the place is rejected")]
fn then_rejected(#[from(admitted)] admitted: &RefCell<Option<bool>>) {
    assert_eq!(*admitted.borrow(), Some(false));
}

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/slot_capacity.feature", name = $title)]
        fn $fn_name(occupied: RefCell<Vec<Slot>>, admitted: RefCell<Option<bool>>) {
            let _ = (occupied, admitted);
        }
    };
}

register_scenario!(admitting_with_room, "admitting a place into a slot with room");
register_scenario!(rejecting_full_slot, "rejecting a place into a full slot");
register_scenario!(ignoring_neighbours, "ignoring neighbouring slots");
register_scenario!(normalising_visit_times, "normalising backend visit times");
