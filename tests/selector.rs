//! Push/pop round-tripping and the busy/no-op edge cases around the
//! selector stack itself.

use xx_fibre::error::ErrorKind;
use xx_fibre::fiber::Fibre;
use xx_fibre::pointer::MutPtr;
use xx_fibre::selector::{self, OriginSelector, SchedulerSelector, Selector};

#[test]
fn push_then_pop_round_trips() {
	selector::init().expect("init");
	selector::push(Selector::new(OriginSelector::new())).expect("push");
	selector::pop().expect("pop");
	selector::finish();
}

unsafe extern "C" fn try_pop_while_current(_arg: MutPtr<()>) {
	let result = selector::pop();

	assert!(matches!(result, Err(err) if err.kind() == ErrorKind::Busy));
}

#[test]
fn pop_refuses_while_a_fibre_is_current() {
	selector::init().expect("init");
	selector::push(Selector::new(OriginSelector::new())).expect("push origin");

	let mut f = Fibre::create(try_pop_while_current, MutPtr::<()>::from_addr(1)).expect("create");

	selector::schedule_to(MutPtr::from(&mut f));

	assert!(f.completed());

	/* origin has resumed; current is null again, so this now succeeds */
	selector::pop().expect("pop after completion");
	selector::finish();
}

unsafe extern "C" fn never_picks_anyone(_arg: MutPtr<()>) -> Option<MutPtr<Fibre>> {
	None
}

#[test]
fn scheduler_implicit_from_origin_with_no_pick_is_a_noop() {
	selector::init().expect("init");

	let scheduler = SchedulerSelector::new(never_picks_anyone, MutPtr::<()>::from_addr(1), true);

	selector::push(Selector::new(scheduler)).expect("push scheduler");

	/* nothing is running; the callback returns None and we're already at
	 * the origin, so this must not attempt a self-switch */
	selector::schedule();

	selector::pop().expect("pop scheduler");
	selector::finish();
}

#[test]
fn scheduler_explicit_gated_by_allow_explicit() {
	selector::init().expect("init");

	let scheduler = SchedulerSelector::new(never_picks_anyone, MutPtr::<()>::from_addr(1), false);

	selector::push(Selector::new(scheduler)).expect("push scheduler");

	assert!(!selector::can_switch_explicit());
	assert!(selector::can_switch_implicit());

	selector::pop().expect("pop scheduler");
	selector::finish();
}
