//! Handling for programmer-bug invariant violations (§7: "Programmer bugs").
//!
//! These are never recoverable at the call site: popping an empty stack,
//! scheduling to a completed fibre, double-switching and the like are all
//! bugs in the caller, not conditions a `Result` should carry. In debug
//! builds they abort with a message; in release builds the check is skipped
//! and the contract becomes the caller's responsibility.

use std::fmt::Arguments;

#[cfg(feature = "log")]
use std::backtrace::{Backtrace, BacktraceStatus};
#[cfg(feature = "log")]
use std::panic::Location;

#[cfg(feature = "log")]
fn print_fatal(fmt: Arguments<'_>) {
	let thread = std::thread::current();
	let name = thread.name().unwrap_or("<unnamed>");

	crate::log::internal::print_fatal(name, fmt);
}

/// Logs a panic as a fatal diagnostic, with a backtrace when one was
/// captured. Called both from [`fatal`] and from the crate's panic hook.
#[cfg(feature = "log")]
#[track_caller]
pub(crate) fn print_panic(location: Option<&Location<'_>>, fmt: Arguments<'_>) {
	let thread = std::thread::current();
	let name = thread.name().unwrap_or("<unnamed>");
	let location = match location {
		Some(location) => location,
		None => Location::caller()
	};

	crate::log::internal::print_fatal(
		name,
		format_args!("Panic occurred at {}:\n>> {}", location, fmt)
	);

	let backtrace = Backtrace::capture();

	if backtrace.status() == BacktraceStatus::Captured {
		crate::log::internal::print_fatal(name, format_args!("\nBack trace:\n{}", backtrace));
	} else {
		crate::log::internal::print_fatal(
			name,
			format_args!(
				"note: run with `RUST_BACKTRACE=1` environment variable to display a backtrace"
			)
		);
	}
}

/// Aborts the process with a fatal diagnostic. Never unwinds: this is for
/// invariant violations, not recoverable errors.
#[cold]
pub fn fatal(fmt: Arguments<'_>) -> ! {
	#[cfg(feature = "log")]
	{
		print_panic(None, fmt);
		print_fatal(format_args!("Non unwinding panic, aborting"));
	}

	#[cfg(not(feature = "log"))]
	{
		let _ = fmt;
	}

	std::process::abort();
}

/// Checked in debug builds only; in release the condition is assumed true.
#[macro_export]
macro_rules! debug_check {
	($cond:expr, $($arg:tt)+) => {
		#[cfg(debug_assertions)]
		if !$cond {
			$crate::runtime::fatal(format_args!($($arg)+));
		}
	};
}

/// Unconditionally fatal: reached only through a caller-side contract
/// violation.
#[macro_export]
macro_rules! bug {
	($($arg:tt)+) => {
		$crate::runtime::fatal(format_args!($($arg)+))
	};
}
