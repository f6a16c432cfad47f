use bevy::prelude::*;

use super::lifecycle::{SurfaceChange, SurfaceLifecycleManager};
use crate::engine::render::materials::SurfaceMaterials;
use crate::engine::render::surface_renderer::BevySurfaceRenderer;
use crate::engine::session::events::SurfaceEvent;
use crate::engine::session::tracking::TrackingSession;
use crate::rpc::host_rpc::HostRpcInterface;

/// Surface signals mirrored to the host.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceStatus {
    pub detected: bool,
    pub materialized: usize,
}

/// Feed surface events through the lifecycle manager in delivery order.
/// Events arriving while tracking is off belong to a stale session and are dropped.
pub fn process_surface_events(
    mut commands: Commands,
    mut events: EventReader<SurfaceEvent>,
    session: Res<TrackingSession>,
    materials: Option<Res<SurfaceMaterials>>,
    mut manager: ResMut<SurfaceLifecycleManager>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    if !session.surface_tracking_enabled() {
        let stale = events.read().count();
        if stale > 0 {
            debug!("[SURFACE] Dropped {} events outside an active tracking session", stale);
        }
        return;
    }

    let Some(materials) = materials else {
        return;
    };

    let mut renderer = BevySurfaceRenderer {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &materials,
    };

    for event in events.read() {
        let change = match event {
            SurfaceEvent::Added(observation) => manager.on_added(&mut renderer, observation),
            SurfaceEvent::Updated(observation) => manager.on_updated(&mut renderer, observation),
            SurfaceEvent::Removed(id) => manager.on_removed(&mut renderer, *id),
        };

        if change == SurfaceChange::Ignored {
            debug!("[SURFACE] {:?} had no effect", event);
        }
    }
}

/// Push edge-triggered status notifications when the surface picture changes.
pub fn publish_surface_status(
    manager: Res<SurfaceLifecycleManager>,
    mut status: ResMut<SurfaceStatus>,
    mut rpc_interface: ResMut<HostRpcInterface>,
) {
    let current = SurfaceStatus {
        detected: manager.surface_detected(),
        materialized: manager.materialized_count(),
    };
    if *status == current {
        return;
    }

    if current.detected && !status.detected {
        rpc_interface.send_notification("surface_detected", serde_json::json!({}));
    }
    if current.materialized != status.materialized {
        rpc_interface.send_notification(
            "surface_count_changed",
            serde_json::json!({ "count": current.materialized }),
        );
    }

    *status = current;
}
