//! The origin selector: implicit scheduling always returns to whichever
//! context pushed it; explicit scheduling is always permitted.

use super::Policy;
use crate::error::{Error, ErrorKind, Result};
use crate::fiber::{self, Context, Fibre};
use crate::pointer::MutPtr;

/// A selector whose implicit `schedule()` always resumes the context that
/// pushed it. Grounded directly on the reference selector of the same name:
/// `post_push` captures the caller's machine state, `pre_pop` refuses while
/// a fibre is current, and explicit switching is unconditionally allowed.
pub struct OriginSelector {
	origin: Context,
	current: Option<MutPtr<Fibre>>
}

impl OriginSelector {
	#[must_use]
	pub fn new() -> Self {
		Self {
			origin: Context::default(),
			current: None
		}
	}
}

impl Default for OriginSelector {
	fn default() -> Self {
		Self::new()
	}
}

impl Policy for OriginSelector {
	fn post_push(&mut self) -> Result<()> {
		/* `origin` starts as a blank context; the first switch away from it
		 * (in `schedule`) fills in the caller's saved state */
		self.current = None;
		Ok(())
	}

	fn pre_pop(&mut self) -> Result<()> {
		if self.current.is_some() {
			return Err(Error::new(ErrorKind::Busy));
		}

		Ok(())
	}

	fn can_switch_explicit(&self) -> bool {
		true
	}

	fn can_switch_implicit(&self) -> bool {
		self.current.is_some()
	}

	fn schedule(&mut self, target: Option<MutPtr<Fibre>>) {
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
