// Catmull-Rom path smoother
//
// Resamples a polyline with a uniform Catmull-Rom spline. The curve passes
// through every input point; boundary segments reuse the first/last point
// as their outer control point. Output is not collision checked.

use nalgebra::Vector3;

use crate::common::{Path3D, PlannerError, PlannerResult, Point3D};

/// Evaluate the uniform Catmull-Rom segment between `p1` and `p2` at `t` in [0, 1]
pub fn catmull_rom_point(
    p0: &Vector3<f64>,
    p1: &Vector3<f64>,
    p2: &Vector3<f64>,
    p3: &Vector3<f64>,
    t: f64,
) -> Vector3<f64> {
    let t2 = t * t;
    let t3 = t2 * t;

    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

/// Fewest samples per segment that still adds an interior point
pub const MIN_SAMPLES_PER_SEGMENT: usize = 2;

/// Smooth `path` with `samples_per_segment` points per input segment.
///
/// Paths shorter than two points come back unchanged. Otherwise the output
/// holds `(len - 1) * samples_per_segment + 1` points, strictly more than
/// the input, and starts and ends exactly on the input's endpoints.
pub fn smooth_path(path: &Path3D, samples_per_segment: usize) -> PlannerResult<Path3D> {
    if samples_per_segment < MIN_SAMPLES_PER_SEGMENT {
        return Err(PlannerError::InvalidParameter(format!(
            "samples_per_segment must be >= {}, got {}",
            MIN_SAMPLES_PER_SEGMENT, samples_per_segment
        )));
    }

    let points = &path.points;
    let n = points.len();
    if n < 2 {
        return Ok(path.clone());
    }

    let controls: Vec<Vector3<f64>> = points.iter().map(Point3D::to_vector).collect();
    let mut smoothed = Vec::with_capacity((n - 1) * samples_per_segment + 1);

    for i in 0..n - 1 {
        let p0 = &controls[i.saturating_sub(1)];
        let p1 = &controls[i];
        let p2 = &controls[i + 1];
        let p3 = &controls[(i + 2).min(n - 1)];

        smoothed.push(points[i]);
        for j in 1..samples_per_segment {
            let t = j as f64 / samples_per_segment as f64;
            smoothed.push(Point3D::from(catmull_rom_point(p0, p1, p2, p3, t)));
        }
    }
    smoothed.push(points[n - 1]);

    Ok(Path3D::from_points(smoothed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Path3D {
        Path3D::from_points(vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(4.0, 4.0, 0.0),
            Point3D::new(8.0, 0.0, 2.0),
            Point3D::new(12.0, 4.0, 2.0),
        ])
    }

    #[test]
    fn test_single_point_unchanged() {
        let path = Path3D::from_points(vec![Point3D::new(1.0, 2.0, 3.0)]);
        assert_eq!(smooth_path(&path, 10).unwrap(), path);
        assert_eq!(smooth_path(&Path3D::new(), 10).unwrap(), Path3D::new());
    }

    #[test]
    fn test_endpoints_preserved_exactly() {
        let path = zigzag();
        let smoothed = smooth_path(&path, 8).unwrap();

        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
        assert_eq!(smoothed.len(), 3 * 8 + 1);
        assert!(smoothed.len() > path.len());
    }

    #[test]
    fn test_passes_through_control_points() {
        let path = zigzag();
        let smoothed = smooth_path(&path, 5).unwrap();
        for (i, p) in path.points.iter().enumerate() {
            assert_eq!(&smoothed.points[i * 5], p);
        }
    }

    #[test]
    fn test_straight_line_stays_on_line() {
        let path = Path3D::from_points(vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(2.0, 2.0, 2.0),
            Point3D::new(4.0, 4.0, 4.0),
        ]);
        let smoothed = smooth_path(&path, 10).unwrap();
        for p in &smoothed.points {
            assert!((p.x - p.y).abs() < 1e-9 && (p.y - p.z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_curve_endpoints_match_controls() {
        let p0 = Vector3::new(0.0, 0.0, 0.0);
        let p1 = Vector3::new(1.0, 2.0, 0.0);
        let p2 = Vector3::new(3.0, 2.0, 1.0);
        let p3 = Vector3::new(4.0, 0.0, 1.0);
        assert!((catmull_rom_point(&p0, &p1, &p2, &p3, 0.0) - p1).norm() < 1e-12);
        assert!((catmull_rom_point(&p0, &p1, &p2, &p3, 1.0) - p2).norm() < 1e-12);
    }

    #[test]
    fn test_density_below_two_rejected() {
        assert!(matches!(smooth_path(&zigzag(), 0), Err(PlannerError::InvalidParameter(_))));
        // One sample per segment would only reproduce the input points
        assert!(matches!(smooth_path(&zigzag(), 1), Err(PlannerError::InvalidParameter(_))));
    }

    #[test]
    fn test_minimum_density_still_densifies() {
        let path = Path3D::from_points(vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(4.0, 0.0, 0.0),
            Point3D::new(4.0, 4.0, 0.0),
        ]);
        let smoothed = smooth_path(&path, MIN_SAMPLES_PER_SEGMENT).unwrap();
        assert_eq!(smoothed.len(), 5);
        assert!(smoothed.len() > path.len());
        assert_eq!(smoothed.first(), path.first());
        assert_eq!(smoothed.last(), path.last());
    }
}
