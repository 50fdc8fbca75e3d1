//! Mechanical simulation of a pedestrian crowd: rigid agents, polygonal
//! walls, contact detection and the damped-spring contact force model, tied
//! together by a two-time-scale explicit integrator.

pub mod agent;
pub mod broad_phase;
pub mod contact;
pub mod force_model;
pub mod integrator;
pub mod material;
pub mod shape;
pub mod wall;
pub mod world;

pub use agent::{Agent, AgentId, AgentManager};
pub use contact::{ContactBook, ContactKey, ContactRecord};
pub use integrator::{DrivingInput, StepConfig, run_coarse_step};
pub use material::{ContactParameters, Intrinsic, MaterialRegistry};
pub use shape::Shape;
pub use wall::{Wall, WallId};
pub use world::World;
