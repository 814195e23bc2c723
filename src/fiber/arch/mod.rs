//! The four-operation arch contract: build a fresh context, tear one down,
//! and switch between two. Every other component treats `Context` as
//! opaque.

#[cfg(target_arch = "x86_64")]
mod x64;
#[cfg(target_arch = "x86_64")]
pub(crate) use x64::{switch, Context};

#[cfg(target_arch = "aarch64")]
mod arm64;
#[cfg(target_arch = "aarch64")]
pub(crate) use arm64::{switch, Context};

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("xx-fibre has no arch backend for this target");
