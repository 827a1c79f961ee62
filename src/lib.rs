//! spatial_planner - collision-free motion planning among spherical obstacles
//!
//! This crate plans paths for a point-mass agent through 3D space with
//! either a grid A* search or an RRT, smooths them with a Catmull-Rom
//! spline, and re-parameterizes them into timestamped trajectories.

// Core modules
pub mod common;
pub mod config;
pub mod utils;

// Algorithm modules
pub mod path_planning;
pub mod trajectory;
pub mod engine;

// Re-export common types for convenience
pub use common::{Point3D, Obstacle, Path3D, Bounds3D, PlanningScenario, PlanResult, PlanStatus};
pub use common::PathPlanner;
pub use common::{PlannerError, PlannerResult};
pub use config::{PlannerConfig, PlanRequest};
pub use engine::{Algorithm, MotionPlanner, PlanOutcome};
pub use trajectory::{Trajectory, TrajectorySample};
