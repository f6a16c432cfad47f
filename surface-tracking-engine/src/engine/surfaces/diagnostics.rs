use bevy::prelude::*;

use super::lifecycle::SurfaceLifecycleManager;
use crate::engine::session::config::SurfaceTrackingConfig;

/// Log every live record on a fixed frame cadence.
pub fn log_surface_snapshot(
    mut frame_counter: Local<u32>,
    config: Res<SurfaceTrackingConfig>,
    manager: Res<SurfaceLifecycleManager>,
) {
    *frame_counter += 1;
    if config.snapshot_interval_frames == 0 || *frame_counter < config.snapshot_interval_frames {
        return;
    }
    *frame_counter = 0;

    let records = manager.records();
    if records.is_empty() {
        return;
    }

    info!("[SNAPSHOT] {} surfaces displayed", records.len());
    for record in records {
        info!(
            "[SNAPSHOT]   {} {:?} area {:.2} m², seen {}x",
            record.id, record.orientation, record.area, record.observation_count
        );
    }
}
