#![allow(clippy::module_name_repetitions)]

use std::fmt::{self, Debug, Display, Formatter};
use std::{error, result};

pub type Result<T> = result::Result<T, Error>;

/// The kinds of failure the core can report.
///
/// Most operations in this crate are infallible after their precondition
/// checks pass; violated preconditions are programmer bugs and are handled
/// per [`crate::runtime::fatal`] instead of through this type.
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ErrorKind {
	/// A stack or control-block allocation failed.
	OutOfMemory,

	/// A selector refused to pop because it's still tracking a running
	/// fibre.
	Busy,

	/// `init` was called on a thread that already initialized the library.
	AlreadyInitialized,

	/// An async suspension was resumed after [`crate::r#async::abort`] was
	/// called on it.
	Interrupted
}

impl ErrorKind {
	#[must_use]
	const fn as_str(self) -> &'static str {
		match self {
			Self::OutOfMemory => "Out of memory",
			Self::Busy => "Selector is busy",
			Self::AlreadyInitialized => "Already initialized",
			Self::Interrupted => "Interrupted"
		}
	}
}

impl Display for ErrorKind {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
		fmt.write_str(self.as_str())
	}
}

/// The error type returned by fallible core operations.
#[derive(Clone, Copy, Debug)]
pub struct Error {
	kind: ErrorKind
}

impl Error {
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	#[must_use]
	pub const fn kind(&self) -> ErrorKind {
		self.kind
	}
}

impl From<ErrorKind> for Error {
	fn from(kind: ErrorKind) -> Self {
		Self::new(kind)
	}
}

impl Display for Error {
	fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.kind, fmt)
	}
}

impl error::Error for Error {}
