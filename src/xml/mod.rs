//! The XML boundary formats described in §6: run parameters, materials,
//! static geometry and agent layout, per-call agent dynamics, and the
//! persisted agent interaction (contact) record.
//!
//! Every reader here parses directly into the in-memory types from
//! [`crowd_physics`]; there is no intermediate DOM. Every writer builds its
//! document with a single [`quick_xml::Writer`] pass and hands the result to
//! [`crowd_io`] for atomic placement on disk.

pub mod agents;
pub mod common;
pub mod dynamics;
pub mod geometry;
pub mod interactions;
pub mod materials;
pub mod parameters;
