//! The thread-local selector stack.
//!
//! A [`Selector`] is a pushed policy plus the async mask it advertises.
//! Layers install one on top of whatever's already there to take over
//! scheduling decisions locally, then pop it cleanly when they're done; the
//! stack only ever grows and shrinks from the top, which is why a plain
//! `Vec` stands in for the parent-pointer list the data model describes.

mod origin;
mod scheduler;

use std::cell::RefCell;

pub use origin::OriginSelector;
pub use scheduler::SchedulerSelector;

use crate::error::{Error, ErrorKind, Result};
use crate::fiber::{AsyncMethod, Fibre};
use crate::pointer::MutPtr;
use enumflags2::BitFlags;

/// The capability set a concrete scheduling policy implements.
///
/// `destroy` is modelled as `Drop` on the implementing type rather than a
/// separate method; everything else mirrors the vtable a pushed selector is
/// bound to.
pub trait Policy {
	/// Called once, right after this selector becomes the top of the stack.
	fn post_push(&mut self) -> Result<()> {
		Ok(())
	}

	/// Called before this selector is unlinked from the stack. Refusing
	/// (e.g. because it's still hosting a running fibre) leaves the stack
	/// untouched.
	fn pre_pop(&mut self) -> Result<()> {
		Ok(())
	}

	fn can_switch_explicit(&self) -> bool;
	fn can_switch_implicit(&self) -> bool;

	/// `target == None` is an implicit switch; the policy picks the
	/// destination itself.
	fn schedule(&mut self, target: Option<MutPtr<Fibre>>);

	/// `None` means the caller is running in this selector's origin.
	fn get_current(&self) -> Option<MutPtr<Fibre>>;
}

/// A pushed policy plus the suspension methods it has opted to host.
pub struct Selector {
	policy: Box<dyn Policy>,
	async_mask: BitFlags<AsyncMethod>
}

impl Selector {
	pub fn new(policy: impl Policy + 'static) -> Self {
		Self {
			policy: Box::new(policy),
			async_mask: BitFlags::empty()
		}
	}

	fn async_mask(&self) -> BitFlags<AsyncMethod> {
		self.async_mask
	}
}

/// Declares which suspension methods the top-most selector hosts. Called
/// after pushing that selector; consulted by `can_suspend` in
/// [`crate::r#async`].
pub fn async_set_mask(mask: BitFlags<AsyncMethod>) {
	STACK.with_borrow_mut(|stack| {
		let top = stack
			.selectors
			.last_mut()
			.unwrap_or_else(|| crate::bug!("async_set_mask called with no selector pushed"));

		top.async_mask = mask;
	});
}

struct Stack {
	inited: bool,
	selectors: Vec<Selector>,
	async_atomic: u32
}

impl Stack {
	const fn new() -> Self {
		Self {
			inited: false,
			selectors: Vec::new(),
			async_atomic: 0
		}
	}
}

thread_local! {
	static STACK: RefCell<Stack> = RefCell::new(Stack::new());
}

/// Marks this thread as having initialised the library. Every other
/// operation in this module (and in [`crate::r#async`]) requires this to
/// have run first.
pub fn init() -> Result<()> {
	STACK.with_borrow_mut(|stack| {
		if stack.inited {
			return Err(Error::new(ErrorKind::AlreadyInitialized));
		}

		stack.inited = true;
		Ok(())
	})
}

/// Reverses `init`. Fatal if selectors are still pushed or the atomicity
/// guard is still held.
pub fn finish() {
	STACK.with_borrow_mut(|stack| {
		crate::debug_check!(stack.inited, "selector::finish called before init");
		crate::debug_check!(
			stack.selectors.is_empty(),
			"selector::finish called with selectors still on the stack"
		);
		crate::debug_check!(
			stack.async_atomic == 0,
			"selector::finish called with the atomicity guard still held"
		);

		stack.inited = false;
	});
}

/// Pushes `selector` onto the stack, running its `post_push`. Rolled back
/// (not linked) if `post_push` fails.
pub fn push(mut selector: Selector) -> Result<()> {
	STACK.with_borrow_mut(|stack| {
		crate::debug_check!(stack.inited, "selector::push called before init");

		selector.policy.post_push()?;
		stack.selectors.push(selector);
		crate::trace!("selector pushed, depth {}", stack.selectors.len());
		Ok(())
	})
}

/// Pops and returns the top-most selector, running its `pre_pop` first.
/// Errors (and leaves the stack unchanged) if `pre_pop` refuses.
pub fn pop() -> Result<Selector> {
	STACK.with_borrow_mut(|stack| {
		let top = stack
			.selectors
			.last_mut()
			.unwrap_or_else(|| crate::bug!("selector::pop called with an empty stack"));

		top.policy.pre_pop()?;

		let popped = stack
			.selectors
			.pop()
			.unwrap_or_else(|| crate::bug!("selector stack emptied during pop"));

		crate::trace!("selector popped, depth {}", stack.selectors.len());

		Ok(popped)
	})
}

pub(crate) fn has_top() -> bool {
	STACK.with_borrow(|stack| !stack.selectors.is_empty())
}

pub fn can_switch_explicit() -> bool {
	with_top(|policy| policy.can_switch_explicit())
}

pub fn can_switch_implicit() -> bool {
	with_top(|policy| policy.can_switch_implicit())
}

/// Explicit switch to `target`. Fatal if explicit switching isn't currently
/// permitted, or if `target` has already completed.
pub fn schedule_to(target: MutPtr<Fibre>) {
	crate::debug_check!(can_switch_explicit(), "explicit switch not permitted here");
	/* Safety: callers only ever hold a `MutPtr<Fibre>` to a fibre they
	 * exclusively control while it is not executing */
	crate::debug_check!(
		!unsafe { target.cast_const().as_ref() }.completed(),
		"schedule_to a completed fibre"
	);

	with_top_mut(|policy| policy.schedule(Some(target)));
}

/// Implicit switch; the top selector picks the destination. Fatal if
/// implicit switching isn't currently permitted.
pub fn schedule() {
	crate::debug_check!(can_switch_implicit(), "implicit switch not permitted here");

	with_top_mut(|policy| policy.schedule(None));
}

/// `None` means the caller is executing in the top-most selector's origin.
pub fn get_current() -> Option<MutPtr<Fibre>> {
	with_top(|policy| policy.get_current())
}

pub(crate) fn top_async_mask() -> BitFlags<AsyncMethod> {
	STACK.with_borrow(|stack| {
		stack
			.selectors
			.last()
			.map_or(BitFlags::empty(), Selector::async_mask)
	})
}

pub(crate) fn atomicity_up() {
	STACK.with_borrow_mut(|stack| {
		stack.async_atomic += 1;
	});
}

pub(crate) fn atomicity_down() {
	STACK.with_borrow_mut(|stack| {
		crate::debug_check!(
			stack.async_atomic > 0,
			"async::atomicity_down called with a zero counter"
		);

		stack.async_atomic -= 1;
	});
}

pub(crate) fn atomicity_held() -> bool {
	STACK.with_borrow(|stack| stack.async_atomic > 0)
}

fn with_top<T>(f: impl FnOnce(&dyn Policy) -> T) -> T {
	STACK.with_borrow(|stack| {
		let top = stack
			.selectors
			.last()
			.unwrap_or_else(|| crate::bug!("no selector pushed on this thread"));

		f(top.policy.as_ref())
	})
}

fn with_top_mut<T>(f: impl FnOnce(&mut dyn Policy) -> T) -> T {
	STACK.with_borrow_mut(|stack| {
		let top = stack
			.selectors
			.last_mut()
			.unwrap_or_else(|| crate::bug!("no selector pushed on this thread"));

		f(top.policy.as_mut())
	})
}
