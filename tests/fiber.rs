//! Ping-pong and ring scenarios driven entirely through explicit
//! `schedule_to`, matching the reference test driver's shape: switch to the
//! first fibre, then mop up whichever one didn't get the final handoff.

use xx_fibre::fiber::Fibre;
use xx_fibre::pointer::MutPtr;
use xx_fibre::selector::{self, OriginSelector, Selector};

struct PingPong {
	counter: u32,
	target: u32,
	f1: Option<MutPtr<Fibre>>,
	f2: Option<MutPtr<Fibre>>
}

unsafe extern "C" fn run_f1(arg: MutPtr<()>) {
	/* Safety: `arg` is the `PingPong` the test below keeps alive for the
	 * duration of the switch chain */
	let shared = unsafe { arg.cast::<PingPong>().as_mut() };

	loop {
		shared.counter += 1;

		if shared.counter >= shared.target {
			break;
		}

		selector::schedule_to(shared.f2.expect("f2 not registered"));
	}
}

unsafe extern "C" fn run_f2(arg: MutPtr<()>) {
	/* Safety: see `run_f1` */
	let shared = unsafe { arg.cast::<PingPong>().as_mut() };

	loop {
		shared.counter += 1;

		if shared.counter >= shared.target {
			break;
		}

		selector::schedule_to(shared.f1.expect("f1 not registered"));
	}
}

#[test]
fn two_fibre_ping_pong() {
	selector::init().expect("init");

	let mut shared = PingPong { counter: 0, target: 10, f1: None, f2: None };
	let arg = MutPtr::from(&mut shared).cast::<()>();

	let mut f1 = Fibre::create(run_f1, arg).expect("create f1");
	let mut f2 = Fibre::create(run_f2, arg).expect("create f2");

	shared.f1 = Some(MutPtr::from(&mut f1));
	shared.f2 = Some(MutPtr::from(&mut f2));

	selector::push(Selector::new(OriginSelector::new())).expect("push origin");

	selector::schedule_to(MutPtr::from(&mut f1));

	if f1.started() && !f1.completed() {
		selector::schedule_to(MutPtr::from(&mut f1));
	}

	if f2.started() && !f2.completed() {
		selector::schedule_to(MutPtr::from(&mut f2));
	}

	assert!(f1.completed());
	assert!(f2.completed());
	assert_eq!(shared.counter, 10);

	selector::pop().expect("pop origin");
	selector::finish();
}

struct Ring {
	hops: u32,
	target: u32,
	members: Vec<MutPtr<Fibre>>
}

/// Every member runs the same blind-forwarding loop; whichever one's
/// increment reaches `target` is the "counter" for that run and completes
/// without forwarding, exactly like either side of the ping-pong above.
unsafe extern "C" fn forward(arg: MutPtr<()>) {
	/* Safety: the `Ring` outlives every fibre's run through it */
	let ring = unsafe { arg.cast::<Ring>().as_mut() };
	let me = selector::get_current().expect("forward fibre has no current pointer");
	let my_index = ring
		.members
		.iter()
		.position(|m| m.addr() == me.addr())
		.expect("current fibre missing from ring");

	let next = ring.members[(my_index + 1) % ring.members.len()];

	loop {
		ring.hops += 1;

		if ring.hops >= ring.target {
			break;
		}

		selector::schedule_to(next);
	}
}

#[test]
fn ring_of_one_hundred_completes_after_k_loops() {
	selector::init().expect("init");

	const SIZE: usize = 100;
	const LOOPS: u32 = 5;

	let mut ring = Ring { hops: 0, target: SIZE as u32 * LOOPS, members: Vec::new() };
	let arg = MutPtr::from(&mut ring).cast::<()>();

	let mut fibres: Vec<Fibre> = (0..SIZE)
		.map(|_| Fibre::create(forward, arg).expect("create ring member"))
		.collect();

	ring.members = fibres.iter_mut().map(|f| MutPtr::from(f)).collect();

	selector::push(Selector::new(OriginSelector::new())).expect("push origin");

	let first = ring.members[0];

	selector::schedule_to(first);

	for member in ring.members.clone() {
		/* Safety: none of these fibres are executing; the ring stalled with
		 * the final handoff never delivered to the ones after the stop */
		let f = unsafe { member.cast_const().as_ref() };

		if f.started() && !f.completed() {
			selector::schedule_to(member);
		}
	}

	for member in &ring.members {
		/* Safety: see above */
		assert!(unsafe { member.cast_const().as_ref() }.completed());
	}

	assert_eq!(ring.hops, ring.target);

	selector::pop().expect("pop origin");
	selector::finish();
}
