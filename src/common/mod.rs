//! Common types, traits, and error definitions for spatial_planner
//!
//! This module provides the foundational building blocks used across
//! the collision model, the planners and the trajectory tools.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
