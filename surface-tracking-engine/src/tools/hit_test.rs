use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::geometry::polygon::{fan_indices, polygon_normal};
use crate::engine::render::occlusion::{LayerCamera, RenderLayer};
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::engine::session::events::HitTestEvent;
use crate::engine::session::ingest::HitTestResult;
use crate::engine::session::tracking::TrackingSession;
use crate::engine::surfaces::lifecycle::SurfaceLifecycleManager;
use crate::engine::surfaces::record::SurfaceRecord;

// Möller–Trumbore ray–triangle intersection, returns Some(t) or None
pub fn ray_triangle_hit_t(origin: Vec3, dir: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < f32::EPSILON { return None; }

    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) { return None; }

    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 { return None; }

    let t = edge2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Nearest hit of a world-space ray against the fan triangles of every record.
/// The hit rotation maps +Y onto the surface normal.
pub fn raycast_surfaces<'a>(
    origin: Vec3,
    dir: Vec3,
    records: impl IntoIterator<Item = &'a SurfaceRecord>,
) -> Option<HitTestResult> {
    let mut nearest: Option<(f32, Vec3)> = None;

    for record in records {
        let world: Vec<Vec3> = record
            .boundary
            .iter()
            .map(|point| record.transform.transform_point(*point))
            .collect();

        for triangle in fan_indices(world.len()).chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| world[triangle[i] as usize]);
            let Some(t) = ray_triangle_hit_t(origin, dir, a, b, c) else { continue; };
            if nearest.is_none_or(|(best, _)| t < best) {
                nearest = Some((t, polygon_normal(&world)));
            }
        }
    }

    nearest.map(|(t, normal)| {
        let normal = if normal.dot(dir) > 0.0 { -normal } else { normal };
        HitTestResult {
            position: origin + dir * t,
            rotation: Quat::from_rotation_arc(Vec3::Y, normal),
        }
    })
}

/// Cursor-driven hit-test for desktop sessions without a device tracker.
pub fn emulate_hit_test(
    config: Res<SurfaceTrackingConfig>,
    session: Res<TrackingSession>,
    manager: Res<SurfaceLifecycleManager>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform, &LayerCamera)>,
    mut hit_events: EventWriter<HitTestEvent>,
) {
    if !config.emulate_hit_test || !session.hit_test_enabled() { return; }

    let Ok(window) = windows.single() else { return; };
    let Some(cursor_pos) = window.cursor_position() else { return; };
    let Some((camera, cam_xform, _)) = cameras
        .iter()
        .find(|(_, _, layer)| layer.0 == RenderLayer::Content)
    else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_xform, cursor_pos) else { return; };

    let results = raycast_surfaces(ray.origin, ray.direction.as_vec3(), manager.records())
        .into_iter()
        .collect();
    hit_events.write(HitTestEvent { results });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render::surface_renderer::{RenderableHandle, SurfaceHandles};
    use crate::engine::surfaces::record::{SurfaceId, SurfaceOrientation};

    fn floor(id: u64, height: f32) -> SurfaceRecord {
        let handle = RenderableHandle {
            entity: Entity::from_raw(id as u32),
            mesh: Handle::default(),
        };
        SurfaceRecord {
            id: SurfaceId(id),
            boundary: vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            orientation: SurfaceOrientation::Horizontal,
            area: 4.0,
            observation_count: 3,
            handles: SurfaceHandles {
                visible: handle.clone(),
                outline: handle.clone(),
                occluder: handle,
            },
            transform: Transform::from_xyz(0.0, height, 0.0),
        }
    }

    #[test]
    fn triangle_hit_and_miss() {
        let (a, b, c) = (Vec3::ZERO, Vec3::X, Vec3::Z);
        let t = ray_triangle_hit_t(Vec3::new(0.2, 1.0, 0.2), Vec3::NEG_Y, a, b, c);
        assert_eq!(t, Some(1.0));
        assert!(ray_triangle_hit_t(Vec3::new(2.0, 1.0, 2.0), Vec3::NEG_Y, a, b, c).is_none());
        assert!(ray_triangle_hit_t(Vec3::new(0.2, -1.0, 0.2), Vec3::NEG_Y, a, b, c).is_none());
    }

    #[test]
    fn nearest_surface_wins() {
        let records = [floor(1, 0.0), floor(2, 0.75)];
        let hit = raycast_surfaces(Vec3::new(0.5, 2.0, 0.5), Vec3::NEG_Y, &records).expect("hit");

        assert!(hit.position.abs_diff_eq(Vec3::new(0.5, 0.75, 0.5), 1e-5));
        assert!((hit.rotation * Vec3::Y).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn ray_missing_every_surface() {
        let records = [floor(1, 0.0)];
        assert!(raycast_surfaces(Vec3::new(5.0, 2.0, 5.0), Vec3::NEG_Y, &records).is_none());
    }
}
