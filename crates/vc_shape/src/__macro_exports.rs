//! Items used by exported macros. Not public API.

pub use alloc::boxed::Box;

#[cfg(feature = "auto_register")]
pub use inventory;
