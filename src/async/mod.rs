//! The async-suspension protocol.
//!
//! Lets a synchronous-looking callee hand control back to whatever
//! dispatcher owns the top selector, recording *how* it should eventually be
//! resumed: keep retrying (`POLL`), wait for a file descriptor (`FD_READABLE`),
//! or poll a predicate (`CHECK_CB`). The dispatcher reads the record back off
//! the suspended fibre, does the awaited work, and switches back explicitly
//! - optionally stamping an abort first, which turns the suspender's return
//! into `Interrupted`.

use std::os::fd::RawFd;

use crate::error::{Error, ErrorKind, Result};
use crate::fiber::{AsyncMethod, CheckCb, Fibre, Suspend};
use crate::pointer::MutPtr;
use crate::selector;

/// Raises the atomicity counter by one. While it's non-zero, no suspension
/// is permitted on this thread - analogous to disabling preemption around a
/// critical section. Nestable.
pub fn atomicity_up() {
	selector::atomicity_up();
}

/// Lowers the atomicity counter by one. Fatal if it's already zero.
pub fn atomicity_down() {
	selector::atomicity_down();
}

/// Whether a fibre could suspend via `method` right now: the atomicity
/// guard is clear, a selector is pushed, that selector's mask includes
/// `method`, and implicit switching is currently permitted.
#[must_use]
pub fn can_suspend(method: AsyncMethod) -> bool {
	if selector::atomicity_held() || !selector::has_top() {
		return false;
	}

	selector::top_async_mask().contains(method) && selector::can_switch_implicit()
}

fn tag(suspend: &Suspend) -> AsyncMethod {
	match suspend {
		Suspend::Poll => AsyncMethod::Poll,
		Suspend::FdReadable(_) => AsyncMethod::FdReadable,
		Suspend::CheckCb(..) => AsyncMethod::CheckCb
	}
}

fn suspend(method: AsyncMethod, payload: Suspend) -> Result<()> {
	crate::debug_check!(can_suspend(method), "suspend_* called when can_suspend is false");

	let current = selector::get_current()
		.unwrap_or_else(|| crate::bug!("suspend_* called from an origin context"));

	/* Safety: this fibre is the one currently executing; nothing else can
	 * reach it until it is resumed, and the switch inside `schedule` is a
	 * normal call from this borrow's point of view */
	let fibre = unsafe { current.as_mut() };

	crate::debug_check!(fibre.suspend.is_none(), "suspend_* called while already suspended");

	fibre.suspend = Some(payload);
	fibre.async_abort = false;

	selector::schedule();

	fibre.suspend = None;

	if fibre.async_abort {
		Err(Error::new(ErrorKind::Interrupted))
	} else {
		Ok(())
	}
}

/// Suspends with no completion signal; the dispatcher resumes whenever
/// convenient and the caller is expected to retry its operation.
pub fn suspend_poll() -> Result<()> {
	suspend(AsyncMethod::Poll, Suspend::Poll)
}

/// Suspends until `fd` is reported readable by the dispatcher.
pub fn suspend_fd_readable(fd: RawFd) -> Result<()> {
	suspend(AsyncMethod::FdReadable, Suspend::FdReadable(fd))
}

/// Suspends until the dispatcher observes `cb(arg)` return `true`.
pub fn suspend_use_cb(arg: MutPtr<()>, cb: CheckCb) -> Result<()> {
	suspend(AsyncMethod::CheckCb, Suspend::CheckCb(arg, cb))
}

/// The method `f` is currently suspended for, or `None` if it isn't
/// suspended at all.
#[must_use]
pub fn async_type(f: MutPtr<Fibre>) -> Option<AsyncMethod> {
	/* Safety: the dispatcher holds `f` while it is not executing */
	unsafe { f.as_mut() }.suspend.as_ref().map(tag)
}

/// The file descriptor a fibre suspended via `suspend_fd_readable` is
/// waiting on. Fatal if `f` isn't suspended that way.
#[must_use]
pub fn async_get_fd_readable(f: MutPtr<Fibre>) -> RawFd {
	/* Safety: see `async_type` */
	match unsafe { f.as_mut() }.suspend {
		Some(Suspend::FdReadable(fd)) => fd,
		_ => crate::bug!("async_get_fd_readable on a fibre not suspended for FD_READABLE")
	}
}

/// The callback and argument a fibre suspended via `suspend_use_cb` is
/// waiting on. Fatal if `f` isn't suspended that way.
#[must_use]
pub fn async_get_use_cb(f: MutPtr<Fibre>) -> (MutPtr<()>, CheckCb) {
	/* Safety: see `async_type` */
	match unsafe { f.as_mut() }.suspend {
		Some(Suspend::CheckCb(arg, cb)) => (arg, cb),
		_ => crate::bug!("async_get_use_cb on a fibre not suspended for CHECK_CB")
	}
}

/// Poisons `f`'s next resumption: the suspending callee will observe
/// `Interrupted` instead of a normal return. Does not itself resume
/// anything. Fatal if `f` is not currently suspended.
pub fn abort(f: MutPtr<Fibre>) {
	/* Safety: see `async_type` */
	let fibre = unsafe { f.as_mut() };

	crate::debug_check!(fibre.suspend.is_some(), "async::abort called on a fibre that isn't suspended");

	fibre.async_abort = true;
}
