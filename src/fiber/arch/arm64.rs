//! AArch64 context switch, AAPCS64.
//!
//! Unlike x86-64, the return address lives in a register (`x30`/`lr`) rather
//! than on the stack, so a fresh context needs no stack layout at all: set
//! `sp` to the (16-byte aligned) stack top and `lr` to the entry point, zero
//! everything else, and the first `switch` into it behaves exactly like
//! returning from a call to `entry`.

use std::arch::global_asm;

#[repr(C)]
#[derive(Default)]
pub(crate) struct Context {
	sp: u64,
	x19: u64,
	x20: u64,
	x21: u64,
	x22: u64,
	x23: u64,
	x24: u64,
	x25: u64,
	x26: u64,
	x27: u64,
	x28: u64,
	x29: u64,
	x30: u64,
	d8: u64,
	d9: u64,
	d10: u64,
	d11: u64,
	d12: u64,
	d13: u64,
	d14: u64,
	d15: u64
}

static_assertions::assert_eq_size!(Context, [u64; 21]);

global_asm!(
	".text",
	".p2align 4",
	".globl xx_fibre_arm64_switch",
	".hidden xx_fibre_arm64_switch",
	"xx_fibre_arm64_switch:",
	"mov x9, sp",
	"str x9, [x0, #0]",
	"str x19, [x0, #8]",
	"str x20, [x0, #16]",
	"str x21, [x0, #24]",
	"str x22, [x0, #32]",
	"str x23, [x0, #40]",
	"str x24, [x0, #48]",
	"str x25, [x0, #56]",
	"str x26, [x0, #64]",
	"str x27, [x0, #72]",
	"str x28, [x0, #80]",
	"str x29, [x0, #88]",
	"str x30, [x0, #96]",
	"str d8, [x0, #104]",
	"str d9, [x0, #112]",
	"str d10, [x0, #120]",
	"str d11, [x0, #128]",
	"str d12, [x0, #136]",
	"str d13, [x0, #144]",
	"str d14, [x0, #152]",
	"str d15, [x0, #160]",
	"ldr x9, [x1, #0]",
	"mov sp, x9",
	"ldr x19, [x1, #8]",
	"ldr x20, [x1, #16]",
	"ldr x21, [x1, #24]",
	"ldr x22, [x1, #32]",
	"ldr x23, [x1, #40]",
	"ldr x24, [x1, #48]",
	"ldr x25, [x1, #56]",
	"ldr x26, [x1, #64]",
	"ldr x27, [x1, #72]",
	"ldr x28, [x1, #80]",
	"ldr x29, [x1, #88]",
	"ldr x30, [x1, #96]",
	"ldr d8, [x1, #104]",
	"ldr d9, [x1, #112]",
	"ldr d10, [x1, #120]",
	"ldr d11, [x1, #128]",
	"ldr d12, [x1, #136]",
	"ldr d13, [x1, #144]",
	"ldr d14, [x1, #152]",
	"ldr d15, [x1, #160]",
	"ret"
);

extern "C" {
	fn xx_fibre_arm64_switch(from: *mut Context, to: *mut Context);
}

/// # Safety
/// `from` must be the context of the fibre currently executing on this
/// stack, and `to` must be a context previously produced by `Context::fresh`
/// or by a prior `switch` into `from`.
pub(crate) unsafe fn switch(from: *mut Context, to: *mut Context) {
	/* Safety: guaranteed by caller */
	unsafe { xx_fibre_arm64_switch(from, to) };
}

impl Context {
	pub(crate) fn fresh(stack_top: usize, entry: unsafe extern "C" fn() -> !) -> Self {
		Self {
			sp: (stack_top & !0xf) as u64,
			x30: entry as usize as u64,
			..Self::default()
		}
	}
}
