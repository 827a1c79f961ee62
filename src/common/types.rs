//! Common types used throughout spatial_planner

use std::ops::{Add, Mul, Sub};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::common::error::{PlannerError, PlannerResult};

/// 3D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance(&self, other: &Point3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    /// Linear interpolation, `t = 0` yields `self` and `t = 1` yields `other`
    pub fn lerp(&self, other: &Point3D, t: f64) -> Point3D {
        Point3D::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Equality within `eps` on every axis
    pub fn approx_eq(&self, other: &Point3D, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<(f64, f64, f64)> for Point3D {
    fn from(tuple: (f64, f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1, z: tuple.2 }
    }
}

impl From<Vector3<f64>> for Point3D {
    fn from(v: Vector3<f64>) -> Self {
        Self { x: v[0], y: v[1], z: v[2] }
    }
}

impl Add for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3D {
    type Output = Point3D;

    fn sub(self, rhs: Point3D) -> Point3D {
        Point3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Point3D {
    type Output = Point3D;

    fn mul(self, rhs: f64) -> Point3D {
        Point3D::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Spherical obstacle (center, radius)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub position: Point3D,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(position: Point3D, radius: f64) -> Self {
        Self { position, radius }
    }
}

/// Path represented as a sequence of 3D points
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path3D {
    pub points: Vec<Point3D>,
}

impl Path3D {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point3D> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point3D> {
        self.points.last()
    }

    pub fn total_length(&self) -> f64 {
        if self.points.len() < 2 {
            return 0.0;
        }
        self.points.windows(2)
            .map(|w| w[0].distance(&w[1]))
            .sum()
    }
}

/// Axis-aligned box used as the sampling region of the tree planner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3D {
    pub min: Point3D,
    pub max: Point3D,
}

impl Bounds3D {
    pub fn new(min: Point3D, max: Point3D) -> Self {
        Self { min, max }
    }

    /// Box enclosing start, goal and every obstacle sphere, grown by `padding`
    pub fn around(scenario: &PlanningScenario, padding: f64) -> Self {
        let mut min = Point3D::new(
            scenario.start.x.min(scenario.goal.x),
            scenario.start.y.min(scenario.goal.y),
            scenario.start.z.min(scenario.goal.z),
        );
        let mut max = Point3D::new(
            scenario.start.x.max(scenario.goal.x),
            scenario.start.y.max(scenario.goal.y),
            scenario.start.z.max(scenario.goal.z),
        );

        for obs in &scenario.obstacles {
            let p = obs.position;
            let r = obs.radius;
            min = Point3D::new(min.x.min(p.x - r), min.y.min(p.y - r), min.z.min(p.z - r));
            max = Point3D::new(max.x.max(p.x + r), max.y.max(p.y + r), max.z.max(p.z + r));
        }

        let pad = Point3D::new(padding, padding, padding);
        Self { min: min - pad, max: max + pad }
    }

    pub fn contains(&self, p: &Point3D) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }
}

/// Largest coordinate magnitude a scenario may use
pub const MAX_COORDINATE: f64 = 1e9;

fn in_range(p: &Point3D) -> bool {
    p.is_finite()
        && p.x.abs() <= MAX_COORDINATE
        && p.y.abs() <= MAX_COORDINATE
        && p.z.abs() <= MAX_COORDINATE
}

fn default_grid_step() -> f64 {
    2.0
}

fn default_max_iterations() -> usize {
    1000
}

/// One planning request: endpoints, obstacle set and search resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningScenario {
    pub start: Point3D,
    pub goal: Point3D,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    #[serde(default = "default_grid_step")]
    pub grid_step: f64,
    #[serde(default)]
    pub agent_radius: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl PlanningScenario {
    pub fn new(start: Point3D, goal: Point3D) -> Self {
        Self {
            start,
            goal,
            obstacles: Vec::new(),
            grid_step: default_grid_step(),
            agent_radius: 0.0,
            max_iterations: default_max_iterations(),
        }
    }

    pub fn with_obstacles(mut self, obstacles: Vec<Obstacle>) -> Self {
        self.obstacles = obstacles;
        self
    }

    pub fn with_grid_step(mut self, grid_step: f64) -> Self {
        self.grid_step = grid_step;
        self
    }

    pub fn with_agent_radius(mut self, agent_radius: f64) -> Self {
        self.agent_radius = agent_radius;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> PlannerResult<()> {
        if !(self.grid_step.is_finite() && self.grid_step > 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "grid_step must be > 0, got {}", self.grid_step
            )));
        }
        if !(self.agent_radius.is_finite() && self.agent_radius >= 0.0) {
            return Err(PlannerError::InvalidParameter(format!(
                "agent_radius must be >= 0, got {}", self.agent_radius
            )));
        }
        if self.max_iterations == 0 {
            return Err(PlannerError::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        if !in_range(&self.start) || !in_range(&self.goal) {
            return Err(PlannerError::InvalidParameter(format!(
                "start and goal coordinates must be finite and within +/-{}", MAX_COORDINATE
            )));
        }
        for obs in &self.obstacles {
            if !in_range(&obs.position) || !(obs.radius >= 0.0 && obs.radius <= MAX_COORDINATE) {
                return Err(PlannerError::InvalidParameter(format!(
                    "invalid obstacle {:?}", obs
                )));
            }
        }
        Ok(())
    }
}

/// How a planner arrived at the path it returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    /// Search connected start to goal through verified segments
    Reached,
    /// Start or goal is not clear, `[start, goal]` returned without searching
    BlockedEndpoint,
    /// Search failed but the direct segment is clear
    DirectFallback,
    /// Search failed, path detours over a raised midpoint
    DetourFallback,
    /// Search failed and no fallback segment could be verified
    Unverified,
    /// Iterations ran out, path ends at the node closest to the goal
    BestEffort,
}

impl PlanStatus {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, PlanStatus::Reached)
    }
}

/// Path produced by a planner together with how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    pub path: Path3D,
    pub status: PlanStatus,
    /// Expansions (grid) or sampling rounds (tree) consumed
    pub iterations: usize,
}

impl PlanResult {
    pub fn new(path: Path3D, status: PlanStatus, iterations: usize) -> Self {
        Self { path, status, iterations }
    }
}
