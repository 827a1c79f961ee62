//! Utility modules for spatial_planner

pub mod collision_model;

pub use collision_model::*;
