use bevy::prelude::*;

/// Fan triangulation from vertex 0: `(0, i, i + 1)` for `i` in `1..=n-2`.
/// Correct for convex loops and loops star-shaped around vertex 0 only.
pub fn fan_indices(vertex_count: usize) -> Vec<u32> {
    if vertex_count < 3 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity((vertex_count - 2) * 3);
    for i in 1..(vertex_count - 1) {
        indices.extend_from_slice(&[0, i as u32, (i + 1) as u32]);
    }
    indices
}

/// Area of the boundary measured over the same fan as `fan_indices`.
/// Triangle areas are summed unsigned, so noisy non-planar loops still measure sensibly.
pub fn polygon_area(points: &[Vec3]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }

    let origin = points[0];
    points[1..]
        .windows(2)
        .map(|edge| (edge[0] - origin).cross(edge[1] - origin).length() * 0.5)
        .sum()
}

/// Mean fan normal of the loop, falling back to +Y for degenerate input.
pub fn polygon_normal(points: &[Vec3]) -> Vec3 {
    if points.len() < 3 {
        return Vec3::Y;
    }

    let origin = points[0];
    let summed: Vec3 = points[1..]
        .windows(2)
        .map(|edge| (edge[0] - origin).cross(edge[1] - origin))
        .sum();

    summed.normalize_or(Vec3::Y)
}
