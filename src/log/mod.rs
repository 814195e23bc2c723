//! Structured logging on top of the `log` facade.
//!
//! The fatal/panic formatting this used to own now lives in
//! [`crate::runtime`], the module that actually decides when a diagnostic is
//! fatal; what's left here is logging proper: the `log!`/`error!`/...
//! macros, the per-instance target formatting in [`internal`], and (behind
//! `logger`) the stderr backend itself.

pub use log::{max_level as get_max_level, set_max_level, Level, LevelFilter};

pub mod internal;
#[cfg(feature = "logger")]
mod logger;
mod macros;
