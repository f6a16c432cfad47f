use bevy::prelude::*;

use crate::engine::render::materials::setup_surface_materials;
use crate::engine::render::occlusion::{OcclusionRenderConfigurator, apply_occlusion_layers};
use crate::engine::session::config::SurfaceTrackingConfig;
use crate::engine::session::events::{CameraPoseEvent, HitTestEvent, SessionEvent, SurfaceEvent};
use crate::engine::session::tracking::{TrackingSession, apply_camera_pose, handle_session_events};
use crate::engine::surfaces::diagnostics::log_surface_snapshot;
use crate::engine::surfaces::lifecycle::SurfaceLifecycleManager;
use crate::engine::surfaces::systems::{
    SurfaceStatus, process_surface_events, publish_surface_status,
};
use crate::rpc::host_rpc::HostRpcPlugin;
use crate::tools::placement::controller::PlacementController;
use crate::tools::placement::reticle::update_reticle;
use crate::tools::placement::systems::{
    PlaceAtCenterEvent, RemoveInstanceEvent, TapDownEvent, apply_hit_test_placements,
    handle_place_at_center, handle_remove_instance, handle_tap_down,
    hide_content_between_sessions,
};

/// Per-frame stages of the pipeline, run in this order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackingSet {
    /// Host queue, replay and desktop input produce raw messages and events.
    Ingest,
    /// Raw host messages become typed events.
    Dispatch,
    Session,
    Surfaces,
    Placement,
    /// Reticle and layer cameras.
    Present,
    Publish,
    /// Outgoing host messages are flushed.
    Send,
}

/// Surface tracking, occlusion and placement, driven by host events.
#[derive(Default)]
pub struct SurfaceTrackingPlugin {
    pub config: SurfaceTrackingConfig,
}

impl Plugin for SurfaceTrackingPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                TrackingSet::Ingest,
                TrackingSet::Dispatch,
                TrackingSet::Session,
                TrackingSet::Surfaces,
                TrackingSet::Placement,
                TrackingSet::Present,
                TrackingSet::Publish,
                TrackingSet::Send,
            )
                .chain(),
        );

        app.insert_resource(self.config.clone())
            .insert_resource(SurfaceLifecycleManager::from_config(&self.config))
            .insert_resource(PlacementController::new(self.config.placement_mode))
            .init_resource::<TrackingSession>()
            .init_resource::<OcclusionRenderConfigurator>()
            .init_resource::<SurfaceStatus>()
            .add_event::<SessionEvent>()
            .add_event::<SurfaceEvent>()
            .add_event::<HitTestEvent>()
            .add_event::<CameraPoseEvent>()
            .add_event::<TapDownEvent>()
            .add_event::<PlaceAtCenterEvent>()
            .add_event::<RemoveInstanceEvent>()
            .add_plugins(HostRpcPlugin)
            .add_systems(Startup, setup_surface_materials);

        app.add_systems(
            Update,
            (
                (
                    handle_session_events,
                    hide_content_between_sessions,
                    apply_camera_pose,
                )
                    .chain()
                    .in_set(TrackingSet::Session),
                process_surface_events.in_set(TrackingSet::Surfaces),
                (
                    handle_tap_down,
                    apply_hit_test_placements,
                    handle_place_at_center,
                    handle_remove_instance,
                )
                    .chain()
                    .in_set(TrackingSet::Placement),
                (update_reticle, apply_occlusion_layers).in_set(TrackingSet::Present),
                (publish_surface_status, log_surface_snapshot).in_set(TrackingSet::Publish),
            ),
        );
    }
}
