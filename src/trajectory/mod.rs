//! Time parameterization of geometric paths
//!
//! Turns a [`Path3D`](crate::common::Path3D) into timestamped samples that a
//! playback loop or controller can consume at its own cadence.

pub mod resampler;

pub use resampler::*;

use serde::{Deserialize, Serialize};

use crate::common::Point3D;

/// One timestamped point of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub position: Point3D,
    pub timestamp: f64,
    pub speed: f64,
}

impl TrajectorySample {
    pub fn new(position: Point3D, timestamp: f64, speed: f64) -> Self {
        Self { position, timestamp, speed }
    }
}

/// Samples ordered by non-decreasing timestamp
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self { samples: Vec::new() }
    }

    pub fn from_samples(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the last sample
    pub fn duration(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.timestamp)
    }

    /// Position at time `t`, interpolated between the bracketing samples
    /// and clamped to the first/last sample outside the covered range
    pub fn position_at(&self, t: f64) -> Option<Point3D> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if t <= first.timestamp {
            return Some(first.position);
        }
        if t >= last.timestamp {
            return Some(last.position);
        }

        let idx = self.samples.partition_point(|s| s.timestamp <= t);
        let a = &self.samples[idx - 1];
        let b = &self.samples[idx];
        let dt = b.timestamp - a.timestamp;
        if dt <= f64::EPSILON {
            return Some(a.position);
        }
        Some(a.position.lerp(&b.position, (t - a.timestamp) / dt))
    }
}
