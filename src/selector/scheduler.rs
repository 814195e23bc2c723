//! The scheduler selector: implicit scheduling defers to a user-supplied
//! callback; explicit scheduling is gated by a flag fixed at construction.

use super::Policy;
use crate::error::{Error, ErrorKind, Result};
use crate::fiber::{self, Context, Fibre};
use crate::pointer::MutPtr;

/// Picks the next fibre on implicit `schedule()` by calling back into user
/// code. `cb` returning `None` means "return to origin". Explicit switching
/// is only honoured when this selector was built with `allow_explicit`.
pub struct SchedulerSelector {
	origin: Context,
	current: Option<MutPtr<Fibre>>,
	cb: unsafe extern "C" fn(MutPtr<()>) -> Option<MutPtr<Fibre>>,
	cb_arg: MutPtr<()>,
	allow_explicit: bool
}

impl SchedulerSelector {
	#[must_use]
	pub fn new(
		cb: unsafe extern "C" fn(MutPtr<()>) -> Option<MutPtr<Fibre>>, cb_arg: MutPtr<()>,
		allow_explicit: bool
	) -> Self {
		Self {
			origin: Context::default(),
			current: None,
			cb,
			cb_arg,
			allow_explicit
		}
	}
}

impl Policy for SchedulerSelector {
	fn pre_pop(&mut self) -> Result<()> {
		if self.current.is_some() {
			return Err(Error::new(ErrorKind::Busy));
		}

		Ok(())
	}

	fn can_switch_explicit(&self) -> bool {
		self.allow_explicit
	}

	fn can_switch_implicit(&self) -> bool {
		true
	}

	fn schedule(&mut self, target: Option<MutPtr<Fibre>>) {
		crate::debug_check!(
			target.is_none() || self.allow_explicit,
			"schedule_to called on a scheduler selector built with allow_explicit = false"
		);

		/* Safety: `cb`/`cb_arg` are supplied by the constructor's caller and
		 * invoked only here, never concurrently */
		let target = target.or_else(|| unsafe { (self.cb)(self.cb_arg) });

		/* self-schedule back to the origin while already there is a no-op:
		 * nothing to save, nothing to restore */
		if target.is_none() && self.current.is_none() {
			return;
		}

		/* Safety: `current`, when set, points at a fibre this selector
		 * exclusively owns while it isn't executing */
		let src = match self.current {
			Some(mut current) => unsafe { current.as_mut() }.context_mut(),
			None => std::ptr::addr_of_mut!(self.origin)
		};

		let dst = match target {
			Some(mut target) => {
				self.current = Some(target);
				/* Safety: see above */
				unsafe { target.as_mut() }.context_mut()
			}

			None => {
				self.current = None;
				std::ptr::addr_of_mut!(self.origin)
			}
		};

		/* Safety: `src`/`dst` are the contexts this call is switching
		 * between, satisfying `fiber::switch`'s contract */
		unsafe { fiber::switch(src, dst) };
	}

	fn get_current(&self) -> Option<MutPtr<Fibre>> {
		self.current
	}
}
