//! Logging facade.
//!
//! Re-exports the [`log`] macros so the rest of the workspace logs through a
//! single crate, and adds a couple of small macros for logging the duration
//! of a block.

#[macro_use]
mod macros;

pub use log::{debug, error, info, trace, warn};
