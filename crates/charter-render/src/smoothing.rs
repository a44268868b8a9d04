//! Curve smoothing for overlay lines.

use crate::surface::{Path, Point};

/// Build a smooth path through `points` using quadratic segments whose
/// control points are the samples and whose endpoints are the midpoints
/// between neighbours.
///
/// The curve starts at the first sample and ends at the last one. Fewer than
/// three points degrade to a straight polyline.
pub fn smooth_path(points: &[Point]) -> Path {
    let mut path = Path::new();
    let Some((&first, rest)) = points.split_first() else {
        return path;
    };
    path.move_to(first);

    if rest.len() < 2 {
        for &p in rest {
            path.line_to(p);
        }
        return path;
    }

    for pair in points[1..].windows(2) {
        let (ctrl, next) = (pair[0], pair[1]);
        path.quad_to(ctrl, ctrl.midpoint(next));
    }
    if let Some(&last) = points.last() {
        path.line_to(last);
    }
    path
}

/// Closed band between an upper and a lower edge sampled at the same x values.
pub fn band_path(upper: &[Point], lower: &[Point]) -> Path {
    let mut path = Path::new();
    if upper.len() < 2 || upper.len() != lower.len() {
        return path;
    }
    path.move_to(upper[0]);
    for &p in &upper[1..] {
        path.line_to(p);
    }
    for &p in lower.iter().rev() {
        path.line_to(p);
    }
    path.close();
    path
}
