use std::any::type_name;
use std::fmt::Arguments;
use std::io::{Cursor, Result, Write};
use std::str::from_utf8;

pub use log::{log, log_enabled};

use super::Level;
use crate::pointer::Ptr;

#[allow(clippy::unwrap_used, clippy::missing_panics_doc)]
fn get_struct_name<T: ?Sized>() -> &'static str {
	type_name::<T>().rsplit("::").next().unwrap()
}

/// Targets a log line at a specific instance, the way you'd target a
/// selector or a pool: `@ 00001a30      OriginSelector`.
pub fn format_struct<T: ?Sized>(write: &mut impl Write, addr: Ptr<T>, name: &str) -> Result<()> {
	write.write_fmt(format_args!("@ {:0>8x} {: >15}", addr.addr() & u32::MAX as usize, name))
}

pub fn log_struct<T: ?Sized>(level: Level, addr: Ptr<T>, name: &str, args: Arguments<'_>) {
	let mut fmt_buf = Cursor::new([0u8; 64]);
	let _ = format_struct(&mut fmt_buf, addr, name);

	#[allow(clippy::cast_possible_truncation)]
	let pos = fmt_buf.position() as usize;

	log!(
		target: from_utf8(&fmt_buf.get_ref()[0..pos]).unwrap_or("<error>"),
		level,
		"{}",
		args
	);
}

#[inline(never)]
#[cold]
pub fn log_target<T: ?Sized>(level: Level, target: Ptr<T>, args: Arguments<'_>) {
	log_struct(level, target, get_struct_name::<T>(), args);
}

pub(crate) fn print_fatal(thread_name: &str, fmt: Arguments<'_>) {
	log!(target: thread_name, Level::Error, "{}", fmt);
}

#[cold]
fn cold() {}

/// Branch hint for the `log!` macro's level-check: logging is almost always
/// disabled for a given target/level pair, so the common path should assume
/// that and let the check mispredict only when something is actually logged.
#[inline(always)]
pub(crate) fn unlikely(cond: bool) -> bool {
	if cond {
		cold();
	}

	cond
}
