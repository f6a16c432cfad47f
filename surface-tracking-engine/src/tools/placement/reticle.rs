use std::f32::consts::FRAC_PI_2;

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use constants::render_layers::OVERLAY_LAYER;
use constants::render_settings::{RETICLE_COLOUR, RETICLE_INNER_RADIUS, RETICLE_OUTER_RADIUS};

use crate::engine::session::events::HitTestEvent;
use crate::engine::session::ingest::HitTestResult;
use crate::engine::session::tracking::TrackingSession;

/// Ring marking where a tap would place content.
#[derive(Component, Debug, Default)]
pub struct PlacementReticle;

/// Lay the ring flat on the hit surface.
pub fn reticle_transform(hit: &HitTestResult) -> Transform {
    Transform::from_translation(hit.position)
        .with_rotation(hit.rotation * Quat::from_rotation_x(-FRAC_PI_2))
}

pub fn spawn_reticle(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) -> Entity {
    commands
        .spawn((
            Mesh3d(meshes.add(Annulus::new(RETICLE_INNER_RADIUS, RETICLE_OUTER_RADIUS))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: RETICLE_COLOUR,
                unlit: true,
                cull_mode: None,
                double_sided: true,
                ..default()
            })),
            Transform::default(),
            Visibility::Hidden,
            RenderLayers::layer(OVERLAY_LAYER),
            NotShadowCaster,
            PlacementReticle,
            Name::new("PlacementReticle"),
        ))
        .id()
}

/// Follow the latest hit-test delivery; hide on empty deliveries or without hit-test.
pub fn update_reticle(
    mut events: EventReader<HitTestEvent>,
    session: Res<TrackingSession>,
    mut reticles: Query<(&mut Transform, &mut Visibility), With<PlacementReticle>>,
) {
    let latest = events.read().last();

    for (mut transform, mut visibility) in &mut reticles {
        if !session.hit_test_enabled() {
            *visibility = Visibility::Hidden;
            continue;
        }
        let Some(event) = latest else {
            continue;
        };

        match event.results.first() {
            Some(hit) => {
                *transform = reticle_transform(hit);
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reticle_lies_flat_on_floor_hit() {
        let hit = HitTestResult {
            position: Vec3::new(1.0, 0.0, -2.0),
            rotation: Quat::IDENTITY,
        };
        let transform = reticle_transform(&hit);

        // The annulus faces +Z in mesh space; on a floor it must face up.
        let facing = transform.rotation * Vec3::Z;
        assert!(facing.abs_diff_eq(Vec3::Y, 1e-5));
        assert_eq!(transform.translation, hit.position);
    }
}
