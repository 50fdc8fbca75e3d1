//! Library crate for the `crowd_mechanics` binary: XML boundary I/O and the
//! driver that ties it to [`crowd_physics`].

pub mod driver;
pub mod xml;

pub use driver::{CallArgs, run_crowd_mechanics};
