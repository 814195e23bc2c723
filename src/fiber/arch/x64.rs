//! x86-64 context switch, System V AMD64 ABI.
//!
//! A context is just the saved stack pointer. `switch` pushes the
//! callee-saved registers onto the outgoing stack, swaps `rsp`, then pops the
//! incoming stack's saved registers and returns into whatever return address
//! sits on top of it. A freshly created context fakes that layout so the
//! first `ret` lands in the entry trampoline instead of a real caller.

use std::arch::global_asm;

#[repr(C)]
#[derive(Default)]
pub(crate) struct Context {
	rsp: u64
}

static_assertions::assert_eq_size!(Context, u64);

global_asm!(
	".text",
	".p2align 4",
	".globl xx_fibre_x64_switch",
	".hidden xx_fibre_x64_switch",
	"xx_fibre_x64_switch:",
	"push rbp",
	"push rbx",
	"push r12",
	"push r13",
	"push r14",
	"push r15",
	"mov [rdi], rsp",
	"mov rsp, [rsi]",
	"pop r15",
	"pop r14",
	"pop r13",
	"pop r12",
	"pop rbx",
	"pop rbp",
	"ret"
);

extern "C" {
	fn xx_fibre_x64_switch(from: *mut Context, to: *mut Context);
}

/// # Safety
/// `from` must be the context of the fibre currently executing on this
/// stack, and `to` must be a context previously produced by `Context::fresh`
/// or by a prior `switch` into `from`.
pub(crate) unsafe fn switch(from: *mut Context, to: *mut Context) {
	/* Safety: guaranteed by caller */
	unsafe { xx_fibre_x64_switch(from, to) };
}

const SAVE_AREA: usize = 64;

impl Context {
	/// Builds a context that will start executing `entry` on `stack_top`
	/// (the highest address of the fibre's stack) the first time it's
	/// switched into. `entry` takes no arguments; it must locate its own
	/// fibre via the selector stack's current pointer.
	pub(crate) fn fresh(stack_top: usize, entry: unsafe extern "C" fn() -> !) -> Self {
		let base = (stack_top & !0xf) - SAVE_AREA;

		/* Safety: `base` lies within a stack this fibre exclusively owns and
		 * that nothing has executed on yet */
		unsafe {
			let slot = base as *mut u64;

			slot.write(0); /* r15 */
			slot.add(1).write(0); /* r14 */
			slot.add(2).write(0); /* r13 */
			slot.add(3).write(0); /* r12 */
			slot.add(4).write(0); /* rbx */
			slot.add(5).write(0); /* rbp */
			slot.add(6).write(entry as usize as u64); /* return address */
		}

		Self { rsp: base as u64 }
	}
}
