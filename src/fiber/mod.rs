//! Fibre lifecycle and the raw context switch that moves execution between
//! fibres.
//!
//! A [`Fibre`] ties an arch execution context to an entry function, tracks
//! where it is in its `uninvoked -> started -> completed` lifecycle, and
//! carries the bits the async-suspension protocol needs to stamp on it. It
//! never decides *when* to run; that's the selector stack's job, reached
//! through [`crate::selector`].

mod arch;
mod stack;

use std::os::fd::RawFd;

use enumflags2::{bitflags, BitFlags};

pub(crate) use arch::Context;
use stack::Stack;

use crate::error::Result;
use crate::pointer::MutPtr;

const STACK_SIZE: usize = 256 * 1024;

/// The three suspension methods a [`crate::selector::Selector`] may support,
/// and a suspended fibre may be tagged with. Numeric values are part of the
/// wire-compatible ABI surface.
#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AsyncMethod {
	Poll = 0x01,
	FdReadable = 0x02,
	CheckCb = 0x04
}

pub type CheckCb = unsafe extern "C" fn(MutPtr<()>) -> bool;

#[derive(Clone, Copy)]
pub(crate) enum Suspend {
	Poll,
	FdReadable(RawFd),
	CheckCb(MutPtr<()>, CheckCb)
}

#[bitflags]
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flag {
	Started = 0x1,
	Completed = 0x2
}

pub type Entry = unsafe extern "C" fn(MutPtr<()>);

/// A cooperative, stackful unit of execution.
///
/// Never moved once created (its arch context embeds a pointer to its own
/// stack's contents via `rsp`/`sp`); always accessed through a
/// [`MutPtr<Fibre>`] for exactly that reason.
pub struct Fibre {
	ctx: Context,
	stack: Stack,
	flags: BitFlags<Flag>,
	entry: Entry,
	arg: MutPtr<()>,
	userdata: MutPtr<()>,
	#[cfg(debug_assertions)]
	userdata_set: bool,
	pub(crate) suspend: Option<Suspend>,
	pub(crate) async_abort: bool
}

/* poisons `userdata` until `set_userdata` is called, so a debug build traps a
 * read-before-write instead of handing out garbage silently */
const UNSET_USERDATA: usize = usize::MAX;

impl Fibre {
	/// Allocates a fibre with a fresh stack and arch context. The fibre is
	/// not started; `entry(arg)` runs on the first switch into it.
	pub fn create(entry: Entry, arg: MutPtr<()>) -> Result<Self> {
		let stack = Stack::new(STACK_SIZE)?;
		let ctx = Context::fresh(stack.top(), bootstrap);

		Ok(Self {
			ctx,
			stack,
			flags: BitFlags::empty(),
			entry,
			arg,
			userdata: MutPtr::from_addr(UNSET_USERDATA),
			#[cfg(debug_assertions)]
			userdata_set: false,
			suspend: None,
			async_abort: false
		})
	}

	/// Rebuilds a completed fibre in place with a new entry point. The
	/// backing stack allocation is reused.
	pub fn recreate(&mut self, entry: Entry, arg: MutPtr<()>) -> Result<()> {
		crate::debug_check!(
			self.completed(),
			"fibre::recreate called on a fibre that is not completed"
		);

		/* userdata is left exactly as it was, so callers can keep per-slot
		 * state live across recreate cycles */
		self.ctx = Context::fresh(self.stack.top(), bootstrap);
		self.entry = entry;
		self.arg = arg;
		self.flags = BitFlags::empty();
		self.suspend = None;
		self.async_abort = false;

		Ok(())
	}

	#[must_use]
	pub fn started(&self) -> bool {
		self.flags.contains(Flag::Started)
	}

	#[must_use]
	pub fn completed(&self) -> bool {
		self.flags.contains(Flag::Completed)
	}

	#[must_use]
	pub fn userdata(&self) -> MutPtr<()> {
		crate::debug_check!(
			self.userdata_set_flag(),
			"fibre::userdata read before set_userdata"
		);

		self.userdata
	}

	pub fn set_userdata(&mut self, userdata: MutPtr<()>) {
		self.userdata = userdata;
		#[cfg(debug_assertions)]
		{
			self.userdata_set = true;
		}
	}

	#[cfg(debug_assertions)]
	fn userdata_set_flag(&self) -> bool {
		self.userdata_set
	}

	#[cfg(not(debug_assertions))]
	fn userdata_set_flag(&self) -> bool {
		true
	}

	pub(crate) fn context_mut(&mut self) -> *mut Context {
		std::ptr::addr_of_mut!(self.ctx)
	}

	fn mark_started(&mut self) {
		crate::debug_check!(!self.started(), "fibre started twice");

		self.flags.insert(Flag::Started);
		crate::trace!("fibre started");
	}

	fn mark_completed(&mut self) {
		crate::debug_check!(!self.completed(), "fibre completed twice");

		self.flags.insert(Flag::Completed);
		crate::trace!("fibre completed");
	}
}

impl Drop for Fibre {
	fn drop(&mut self) {
		crate::debug_check!(
			!self.started() || self.completed(),
			"dropped a fibre that was started but never completed"
		);
	}
}

/// Entry point every fresh arch context begins executing at. Finds its own
/// fibre through the selector stack's current pointer, runs it to
/// completion, then implicitly schedules away. Must never return.
unsafe extern "C" fn bootstrap() -> ! {
	let current = crate::selector::get_current()
		.unwrap_or_else(|| crate::bug!("fibre bootstrap entered with no current fibre set"));

	/* Safety: `current` was just switched into by its own bootstrap; nothing
	 * else can be observing it */
	let fibre = unsafe { current.as_mut() };

	fibre.mark_started();

	/* Safety: `entry`/`arg` were supplied by the caller of `create` or
	 * `recreate` and are only ever invoked once, here */
	unsafe { (fibre.entry)(fibre.arg) };

	fibre.mark_completed();

	crate::selector::schedule();

	crate::bug!("control returned to a fibre after it completed");
}

/// # Safety
/// `from` must be the context embedded in the fibre or origin currently
/// executing on this stack; `to` must be a context produced by
/// `Fibre::create`/`recreate` or a prior switch that targeted `from`.
pub(crate) unsafe fn switch(from: *mut Context, to: *mut Context) {
	/* a selector scheduling a fibre to itself (or the origin to itself)
	 * would otherwise save and reload the identical context */
	if std::ptr::eq(from, to) {
		return;
	}

	/* Safety: guaranteed by caller */
	unsafe { arch::switch(from, to) };
}
