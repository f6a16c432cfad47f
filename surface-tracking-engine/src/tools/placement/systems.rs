use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use constants::render_layers::CONTENT_LAYER;

use super::controller::{AnchorPlacement, InstanceId, PlacementController, PlacementMode};
use crate::engine::render::occlusion::{LayerCamera, RenderLayer};
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::engine::session::events::{HitTestEvent, SessionEvent};
use crate::engine::session::tracking::TrackingSession;
use crate::rpc::host_rpc::HostRpcInterface;

/// The single content root moved by single-object placements.
#[derive(Component, Debug, Default)]
pub struct TrackedContentRoot;

/// Root of one multi-instance placement.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlacedContent {
    pub instance: InstanceId,
}

/// Mesh and material spawned for every multi-instance placement.
#[derive(Resource, Debug, Clone)]
pub struct PlacementTemplate {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct TapDownEvent;

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PlaceAtCenterEvent {
    /// Host-supplied pose. Falls back to a point in front of the camera.
    pub reference: Option<Transform>,
}

#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RemoveInstanceEvent {
    /// Instance to remove. `None` removes the most recent one.
    pub instance: Option<InstanceId>,
}

fn content_ready(mode: PlacementMode, has_root: bool, template: Option<&PlacementTemplate>) -> bool {
    match mode {
        PlacementMode::SingleObject => has_root,
        PlacementMode::MultiInstance => template.is_some(),
    }
}

/// A pose `distance` ahead of the camera, rotated by the camera's yaw only.
pub fn center_reference(camera: &GlobalTransform, distance: f32) -> Transform {
    let forward = camera.forward().as_vec3();
    let flat = Vec3::new(forward.x, 0.0, forward.z).normalize_or(Vec3::NEG_Z);
    let yaw = (-flat.x).atan2(-flat.z);

    Transform::from_translation(camera.translation() + forward * distance)
        .with_rotation(Quat::from_rotation_y(yaw))
}

pub fn handle_tap_down(
    mut events: EventReader<TapDownEvent>,
    session: Res<TrackingSession>,
    mut controller: ResMut<PlacementController>,
    roots: Query<(), With<TrackedContentRoot>>,
    template: Option<Res<PlacementTemplate>>,
) {
    for _ in events.read() {
        if !session.hit_test_enabled() {
            debug!("[PLACEMENT] Tap ignored: hit-test unavailable");
            continue;
        }
        let ready = content_ready(controller.mode(), !roots.is_empty(), template.as_deref());
        if controller.on_tap_down(ready) {
            debug!("[PLACEMENT] Placement pending");
        }
    }
}

/// Consume hit-test deliveries while a placement is pending.
#[allow(clippy::too_many_arguments)]
pub fn apply_hit_test_placements(
    mut commands: Commands,
    mut events: EventReader<HitTestEvent>,
    session: Res<TrackingSession>,
    mut controller: ResMut<PlacementController>,
    mut roots: Query<(&mut Transform, &mut Visibility), With<TrackedContentRoot>>,
    template: Option<Res<PlacementTemplate>>,
    mut rpc_interface: ResMut<HostRpcInterface>,
) {
    if !session.hit_test_enabled() {
        events.clear();
        return;
    }

    for event in events.read() {
        if !controller.is_pending() {
            continue;
        }
        // Results are left unconsumed while there is nothing to place.
        if !content_ready(controller.mode(), !roots.is_empty(), template.as_deref()) {
            continue;
        }
        let Some(placement) = controller.on_hit_test_result(&event.results) else {
            continue;
        };

        apply_placement(
            &mut commands,
            &mut controller,
            &mut roots,
            template.as_deref(),
            &mut rpc_interface,
            placement,
        );
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_place_at_center(
    mut commands: Commands,
    mut events: EventReader<PlaceAtCenterEvent>,
    session: Res<TrackingSession>,
    config: Res<SurfaceTrackingConfig>,
    mut controller: ResMut<PlacementController>,
    cameras: Query<(&LayerCamera, &GlobalTransform)>,
    mut roots: Query<(&mut Transform, &mut Visibility), With<TrackedContentRoot>>,
    template: Option<Res<PlacementTemplate>>,
    mut rpc_interface: ResMut<HostRpcInterface>,
) {
    for event in events.read() {
        if !session.is_active() {
            debug!("[PLACEMENT] Place-at-center ignored: no session");
            continue;
        }

        let reference = event.reference.or_else(|| {
            cameras
                .iter()
                .find(|(layer, _)| layer.0 == RenderLayer::Content)
                .map(|(_, camera)| center_reference(camera, config.center_distance))
        });
        let Some(reference) = reference else {
            warn!("[PLACEMENT] Place-at-center ignored: no content camera");
            continue;
        };

        let Some(placement) = controller.place_at_center(&reference) else {
            continue;
        };
        if template.is_none() {
            debug!("[PLACEMENT] Place-at-center ignored: no content template");
            continue;
        }

        apply_placement(
            &mut commands,
            &mut controller,
            &mut roots,
            template.as_deref(),
            &mut rpc_interface,
            placement,
        );
    }
}

fn apply_placement(
    commands: &mut Commands,
    controller: &mut PlacementController,
    roots: &mut Query<(&mut Transform, &mut Visibility), With<TrackedContentRoot>>,
    template: Option<&PlacementTemplate>,
    rpc_interface: &mut HostRpcInterface,
    placement: AnchorPlacement,
) {
    match controller.mode() {
        PlacementMode::SingleObject => {
            let transform = PlacementController::single_object_transform(&placement);
            for (mut root_transform, mut visibility) in roots.iter_mut() {
                *root_transform = transform;
                *visibility = Visibility::Visible;
            }
            info!("[PLACEMENT] Content placed at {:?}", placement.position);
            rpc_interface.send_notification(
                "placement_applied",
                serde_json::json!({
                    "mode": "single_object",
                    "position": placement.position.to_array(),
                }),
            );
        }
        PlacementMode::MultiInstance => {
            let Some(template) = template else {
                return;
            };
            let root = commands
                .spawn((
                    Mesh3d(template.mesh.clone()),
                    MeshMaterial3d(template.material.clone()),
                    placement.transform(),
                    RenderLayers::layer(CONTENT_LAYER),
                    NotShadowCaster,
                ))
                .id();
            let instance = controller.track_instance(placement, root);
            commands
                .entity(root)
                .insert((PlacedContent { instance }, Name::new(format!("Instance{}", instance.0))));

            info!("[PLACEMENT] Instance {} placed at {:?}", instance.0, placement.position);
            rpc_interface.send_notification(
                "placement_applied",
                serde_json::json!({
                    "mode": "multi_instance",
                    "instance": instance,
                    "position": placement.position.to_array(),
                }),
            );
        }
    }
}

pub fn handle_remove_instance(
    mut commands: Commands,
    mut events: EventReader<RemoveInstanceEvent>,
    mut controller: ResMut<PlacementController>,
    mut rpc_interface: ResMut<HostRpcInterface>,
) {
    for event in events.read() {
        let Some(id) = event.instance.or_else(|| controller.last_instance()) else {
            continue;
        };
        let Some(instance) = controller.remove_instance(id) else {
            debug!("[PLACEMENT] Instance {} unknown", id.0);
            continue;
        };

        if let Ok(mut root) = commands.get_entity(instance.root) {
            root.despawn();
        }
        info!("[PLACEMENT] Instance {} removed from {:?}", id.0, instance.placement.position);
        rpc_interface.send_notification(
            "instance_removed",
            serde_json::json!({
                "instance": id,
                "position": instance.placement.position.to_array(),
            }),
        );
    }
}

/// Hide the single content root whenever a session starts or ends.
pub fn hide_content_between_sessions(
    mut events: EventReader<SessionEvent>,
    mut roots: Query<&mut Visibility, With<TrackedContentRoot>>,
) {
    if events.read().count() == 0 {
        return;
    }
    for mut visibility in &mut roots {
        *visibility = Visibility::Hidden;
    }
}

/// Desktop stand-ins for host intents: left click taps, `C` places at
/// center, `Backspace` removes the latest instance.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_native_placement_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut taps: EventWriter<TapDownEvent>,
    mut centers: EventWriter<PlaceAtCenterEvent>,
    mut removals: EventWriter<RemoveInstanceEvent>,
) {
    if mouse.just_pressed(MouseButton::Left) {
        taps.write(TapDownEvent);
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        centers.write(PlaceAtCenterEvent::default());
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        removals.write(RemoveInstanceEvent::default());
    }
}
