//! Cooperative, stackful fibres for a single OS thread.
//!
//! [`fiber`] is the fibre lifecycle and raw context switch. [`selector`] is
//! the thread-local policy stack that decides where `schedule`/`schedule_to`
//! transfer control. [`r#async`] is the suspension protocol layered on top,
//! letting a synchronous-looking callee hand control back to a dispatcher
//! while it waits on a poll, an fd, or a callback.

#[cfg(feature = "async")]
pub mod r#async;
#[cfg(feature = "fiber")]
pub mod fiber;
#[cfg(feature = "log")]
pub mod log;
pub mod error;
pub mod pointer;
pub mod runtime;
#[cfg(feature = "fiber")]
pub mod selector;

#[cfg(feature = "ctor")]
pub extern crate ctor;
#[cfg(feature = "enumflags2")]
pub extern crate enumflags2;
#[cfg(feature = "lazy_static")]
pub extern crate lazy_static;
