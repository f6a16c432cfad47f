use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::config::SurfaceTrackingConfig;
use super::events::{CameraPoseEvent, SessionEvent};
use crate::engine::error::SurfaceTrackingError;
use crate::engine::render::materials::SurfaceMaterials;
use crate::engine::render::occlusion::{
    LayerCamera, OcclusionMode, OcclusionRenderConfigurator, set_occlusion_mode,
};
use crate::engine::render::surface_renderer::BevySurfaceRenderer;
use crate::engine::surfaces::lifecycle::SurfaceLifecycleManager;
use crate::engine::surfaces::record::SurfaceOrientation;
use crate::rpc::host_rpc::HostRpcInterface;
use crate::tools::placement::controller::PlacementController;

/// How the host presents the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Passthrough camera with virtual content composited on top.
    Augmented,
    /// Fully virtual scene, no passthrough and no surface tracking.
    Virtual,
}

impl ViewMode {
    pub fn occlusion_mode(self) -> OcclusionMode {
        match self {
            ViewMode::Augmented => OcclusionMode::Augmented,
            ViewMode::Virtual => OcclusionMode::Virtual,
        }
    }
}

/// What the device reported it can do when the session started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingCapabilities {
    pub surface_tracking: bool,
    /// Orientations the device can detect. Empty means no restriction reported.
    pub orientations: Vec<SurfaceOrientation>,
    pub hit_test: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTrackingOptions {
    pub orientations: Vec<SurfaceOrientation>,
}

impl SurfaceTrackingOptions {
    pub fn from_config(config: &SurfaceTrackingConfig) -> Self {
        Self {
            orientations: config.requested_orientations.clone(),
        }
    }
}

/// Proof that surface tracking was negotiated, with the orientations granted.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceTrackingHandle {
    pub orientations: Vec<SurfaceOrientation>,
}

/// Negotiate surface tracking against device capabilities.
pub fn enable_surface_tracking(
    capabilities: &TrackingCapabilities,
    options: &SurfaceTrackingOptions,
) -> Result<SurfaceTrackingHandle, SurfaceTrackingError> {
    if !capabilities.surface_tracking {
        return Err(SurfaceTrackingError::Unsupported {
            reason: "device does not report surface tracking".to_string(),
        });
    }

    if capabilities.orientations.is_empty() {
        return Ok(SurfaceTrackingHandle {
            orientations: options.orientations.clone(),
        });
    }

    let mut granted = Vec::with_capacity(options.orientations.len());
    let mut first_missing = None;
    for orientation in &options.orientations {
        if capabilities.orientations.contains(orientation) {
            granted.push(*orientation);
        } else {
            warn!("[SESSION] {:?} surfaces are not detectable on this device", orientation);
            first_missing.get_or_insert(*orientation);
        }
    }

    match (granted.is_empty(), first_missing) {
        (true, Some(orientation)) => Err(SurfaceTrackingError::OrientationUnavailable(orientation)),
        _ => Ok(SurfaceTrackingHandle {
            orientations: granted,
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub mode: ViewMode,
    pub surface_tracking: Option<SurfaceTrackingHandle>,
    pub hit_test: bool,
}

/// The current tracking session, if any.
#[derive(Resource, Debug, Default)]
pub struct TrackingSession {
    active: Option<ActiveSession>,
}

impl TrackingSession {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn surface_tracking_enabled(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| session.surface_tracking.is_some())
    }

    /// Hit-test placement needs tracked surfaces to land on.
    pub fn hit_test_enabled(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|session| session.hit_test && session.surface_tracking.is_some())
    }
}

/// Start and end sessions. Teardown always runs before a new session begins,
/// including when a start arrives while a session is still active.
#[allow(clippy::too_many_arguments)]
pub fn handle_session_events(
    mut commands: Commands,
    mut events: EventReader<SessionEvent>,
    mut session: ResMut<TrackingSession>,
    mut manager: ResMut<SurfaceLifecycleManager>,
    mut configurator: ResMut<OcclusionRenderConfigurator>,
    mut placement: ResMut<PlacementController>,
    mut rpc_interface: ResMut<HostRpcInterface>,
    mut meshes: ResMut<Assets<Mesh>>,
    config: Res<SurfaceTrackingConfig>,
    materials: Option<Res<SurfaceMaterials>>,
) {
    for event in events.read() {
        if session.is_active() {
            if let Some(materials) = materials.as_deref() {
                let mut renderer = BevySurfaceRenderer {
                    commands: &mut commands,
                    meshes: &mut meshes,
                    materials,
                };
                manager.on_session_reset(&mut renderer);
            }
            set_occlusion_mode(&mut configurator, OcclusionMode::Reset);
            for instance in placement.reset() {
                if let Ok(mut root) = commands.get_entity(instance.root) {
                    root.despawn();
                }
            }
            session.active = None;
            info!("[SESSION] Session ended");
        }

        let SessionEvent::Started { mode, capabilities } = event else {
            continue;
        };

        let surface_tracking = match mode {
            ViewMode::Augmented => {
                match enable_surface_tracking(capabilities, &SurfaceTrackingOptions::from_config(&config)) {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        warn!("[SESSION] Surface tracking disabled: {}", err);
                        rpc_interface.send_notification(
                            "tracking_unsupported",
                            serde_json::json!({ "reason": err.to_string() }),
                        );
                        None
                    }
                }
            }
            ViewMode::Virtual => None,
        };

        manager.begin_session(&config);
        placement.set_mode(config.placement_mode);
        set_occlusion_mode(&mut configurator, mode.occlusion_mode());

        info!(
            "[SESSION] Session started: {:?}, surface tracking {}",
            mode,
            if surface_tracking.is_some() { "on" } else { "off" }
        );
        session.active = Some(ActiveSession {
            mode: *mode,
            surface_tracking,
            hit_test: capabilities.hit_test,
        });
    }
}

/// Move all layer cameras to the latest viewer pose.
pub fn apply_camera_pose(
    mut events: EventReader<CameraPoseEvent>,
    mut cameras: Query<&mut Transform, With<LayerCamera>>,
) {
    let Some(pose) = events.read().last() else {
        return;
    };
    for mut transform in &mut cameras {
        *transform = pose.transform;
    }
}
