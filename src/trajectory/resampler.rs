// Arc-length trajectory resampler
//
// Walks a geometric path at constant speed and emits evenly time-spaced
// samples. Sample count grows with travel time but never drops below
// MIN_SAMPLES so short paths keep a usable temporal resolution.

use itertools::Itertools;

use crate::common::{Path3D, PlannerError, PlannerResult};
use crate::trajectory::{Trajectory, TrajectorySample};

// Parameters
pub const MIN_SAMPLES: usize = 100;
pub const SAMPLES_PER_SECOND: f64 = 10.0;
pub const MAX_SAMPLES: usize = 10_000_000;

/// Number of samples emitted for a path taking `total_time` seconds.
///
/// Travel times that would need more than `MAX_SAMPLES` samples are rejected.
pub fn sample_count(total_time: f64) -> PlannerResult<usize> {
    let raw = (total_time * SAMPLES_PER_SECOND).floor();
    if !(raw.is_finite() && raw <= MAX_SAMPLES as f64) {
        return Err(PlannerError::InvalidParameter(format!(
            "travel time {}s needs more than {} samples",
            total_time, MAX_SAMPLES
        )));
    }
    Ok((raw.max(0.0) as usize).max(MIN_SAMPLES))
}

/// Re-parameterize `path` by time at a constant `speed`.
///
/// Sample `i` of `N` sits at arc length `i / N * length` and carries
/// timestamp `i / N * length / speed`. The first sample is the path's
/// first point; the final point of the path itself is not emitted.
pub fn resample(path: &Path3D, speed: f64) -> PlannerResult<Trajectory> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(PlannerError::InvalidParameter(format!("speed must be > 0, got {}", speed)));
    }

    let points = &path.points;
    let first = match points.first() {
        Some(p) => *p,
        None => return Ok(Trajectory::new()),
    };

    let segment_lengths: Vec<f64> = points
        .iter()
        .tuple_windows()
        .map(|(a, b)| a.distance(b))
        .collect();
    let total_length: f64 = segment_lengths.iter().sum();
    let total_time = total_length / speed;
    let n_samples = sample_count(total_time)?;

    let mut samples = Vec::with_capacity(n_samples);
    // Index of the segment holding the current distance and the arc length where it starts
    let mut segment = 0;
    let mut segment_start = 0.0;

    for i in 0..n_samples {
        let progress = i as f64 / n_samples as f64;
        let distance = progress * total_length;

        while segment + 1 < segment_lengths.len()
            && segment_start + segment_lengths[segment] <= distance
        {
            segment_start += segment_lengths[segment];
            segment += 1;
        }

        let position = match segment_lengths.get(segment) {
            Some(&len) if len > f64::EPSILON => {
                let t = ((distance - segment_start) / len).clamp(0.0, 1.0);
                points[segment].lerp(&points[segment + 1], t)
            }
            Some(_) => points[segment],
            None => first,
        };

        samples.push(TrajectorySample::new(position, progress * total_time, speed));
    }

    Ok(Trajectory::from_samples(samples))
}
