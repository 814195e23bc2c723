//! The async-suspension protocol's three concrete scenarios: a dispatcher
//! reading back an fd-readable suspension, aborting one, and the atomicity
//! guard blocking suspension outright.

use xx_fibre::enumflags2::BitFlags;
use xx_fibre::error::ErrorKind;
use xx_fibre::fiber::{AsyncMethod, Fibre};
use xx_fibre::pointer::MutPtr;
use xx_fibre::r#async;
use xx_fibre::selector::{self, OriginSelector, Selector};

unsafe extern "C" fn suspend_for_fd(arg: MutPtr<()>) {
	/* Safety: the caller keeps this alive for the fibre's whole run */
	let result = unsafe { r#async::suspend_fd_readable(7) };
	let outcome = unsafe { arg.cast::<Option<ErrorKind>>().as_mut() };

	*outcome = result.err().map(|err| err.kind());
}

#[test]
fn fd_readable_resumes_with_ok_when_not_aborted() {
	selector::init().expect("init");
	selector::push(Selector::new(OriginSelector::new())).expect("push origin");
	selector::async_set_mask(BitFlags::from(AsyncMethod::FdReadable));

	let mut outcome: Option<ErrorKind> = None;
	let mut f = Fibre::create(suspend_for_fd, MutPtr::from(&mut outcome).cast()).expect("create");
	let handle = MutPtr::from(&mut f);

	selector::schedule_to(handle);

	assert_eq!(r#async::async_type(handle), Some(AsyncMethod::FdReadable));
	assert_eq!(r#async::async_get_fd_readable(handle), 7);

	/* dispatcher "observed" readability; resume normally */
	selector::schedule_to(handle);

	assert!(f.completed());
	assert_eq!(outcome, None);

	selector::pop().expect("pop origin");
	selector::finish();
}

#[test]
fn abort_before_resume_yields_interrupted() {
	selector::init().expect("init");
	selector::push(Selector::new(OriginSelector::new())).expect("push origin");
	selector::async_set_mask(BitFlags::from(AsyncMethod::FdReadable));

	let mut outcome: Option<ErrorKind> = None;
	let mut f = Fibre::create(suspend_for_fd, MutPtr::from(&mut outcome).cast()).expect("create");
	let handle = MutPtr::from(&mut f);

	selector::schedule_to(handle);

	assert_eq!(r#async::async_type(handle), Some(AsyncMethod::FdReadable));

	r#async::abort(handle);
	selector::schedule_to(handle);

	assert!(f.completed());
	assert_eq!(outcome, Some(ErrorKind::Interrupted));

	selector::pop().expect("pop origin");
	selector::finish();
}

#[test]
fn atomicity_guard_blocks_suspension() {
	selector::init().expect("init");
	selector::push(Selector::new(OriginSelector::new())).expect("push origin");
	selector::async_set_mask(BitFlags::from(AsyncMethod::Poll));

	/* nothing is running yet; can_switch_implicit is false at the origin,
	 * so suspension is already refused before the guard even matters */
	assert!(!r#async::can_suspend(AsyncMethod::Poll));

	r#async::atomicity_up();
	assert!(!r#async::can_suspend(AsyncMethod::Poll));
	r#async::atomicity_down();

	selector::pop().expect("pop origin");
	selector::finish();
}
