use std::collections::{HashMap, HashSet};

use bevy::prelude::*;

use super::record::{SurfaceId, SurfaceObservation, SurfaceRecord};
use super::stabilizer::ObservationStabilizer;
use crate::engine::geometry::builder::{RebuildOutcome, SurfaceGeometryBuilder};
use crate::engine::render::surface_renderer::{SurfaceRenderer, dispose_surface_handles};
use crate::engine::session::config::SurfaceTrackingConfig;

/// Result of feeding one event to the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChange {
    /// Seen, but not often enough to be trusted yet.
    Observing { count: u32 },
    Materialized,
    Updated,
    /// Shrunk below the display threshold; renderables disposed.
    Demoted,
    Removed,
    DroppedAtCapacity,
    /// Stable, but the boundary does not qualify for geometry.
    Rejected,
    Ignored,
}

/// Owns every materialized surface and decides when surfaces appear,
/// change and disappear.
#[derive(Resource, Debug)]
pub struct SurfaceLifecycleManager {
    stabilizer: ObservationStabilizer,
    builder: SurfaceGeometryBuilder,
    max_displayed: usize,
    records: HashMap<SurfaceId, SurfaceRecord>,
    capacity_warned: HashSet<SurfaceId>,
    detected: bool,
}

impl Default for SurfaceLifecycleManager {
    fn default() -> Self {
        Self::from_config(&SurfaceTrackingConfig::default())
    }
}

impl SurfaceLifecycleManager {
    pub fn new(
        stabilizer: ObservationStabilizer,
        builder: SurfaceGeometryBuilder,
        max_displayed: usize,
    ) -> Self {
        Self {
            stabilizer,
            builder,
            max_displayed,
            records: HashMap::new(),
            capacity_warned: HashSet::new(),
            detected: false,
        }
    }

    pub fn from_config(config: &SurfaceTrackingConfig) -> Self {
        Self::new(
            ObservationStabilizer::new(config.stability_threshold),
            SurfaceGeometryBuilder::from_config(config),
            config.max_displayed,
        )
    }

    /// Swap in a fresh stabilizer and tunables for a new session. Any records
    /// left over must already have been disposed by `on_session_reset`.
    pub fn begin_session(&mut self, config: &SurfaceTrackingConfig) {
        debug_assert!(self.records.is_empty());
        self.stabilizer = ObservationStabilizer::new(config.stability_threshold);
        self.builder = SurfaceGeometryBuilder::from_config(config);
        self.max_displayed = config.max_displayed;
        self.capacity_warned.clear();
        self.detected = false;
    }

    pub fn on_added<R: SurfaceRenderer>(
        &mut self,
        renderer: &mut R,
        observation: &SurfaceObservation,
    ) -> SurfaceChange {
        self.observe(renderer, observation)
    }

    pub fn on_updated<R: SurfaceRenderer>(
        &mut self,
        renderer: &mut R,
        observation: &SurfaceObservation,
    ) -> SurfaceChange {
        self.observe(renderer, observation)
    }

    /// Added and updated share one path: both count as an observation, an
    /// existing record is refreshed, and a stable unknown surface is promoted.
    fn observe<R: SurfaceRenderer>(
        &mut self,
        renderer: &mut R,
        observation: &SurfaceObservation,
    ) -> SurfaceChange {
        let id = observation.id;
        let count = self.stabilizer.observe(id);

        if self.records.contains_key(&id) {
            return self.refresh(renderer, observation, count);
        }

        if !self.stabilizer.is_stable(count) {
            debug!("[SURFACE] {} observing ({}/{})", id, count, self.stabilizer.threshold());
            return SurfaceChange::Observing { count };
        }

        if self.records.len() >= self.max_displayed {
            if self.capacity_warned.insert(id) {
                warn!(
                    "[SURFACE] {} dropped: {} surfaces already displayed",
                    id, self.max_displayed
                );
            }
            return SurfaceChange::DroppedAtCapacity;
        }

        let Some(built) = self.builder.build(
            renderer,
            id,
            &observation.boundary,
            observation.orientation,
            observation.transform,
        ) else {
            debug!("[SURFACE] {} rejected: boundary too small or degenerate", id);
            return SurfaceChange::Rejected;
        };

        self.records.insert(
            id,
            SurfaceRecord {
                id,
                boundary: observation.boundary.clone(),
                orientation: observation.orientation,
                area: built.area,
                observation_count: count,
                handles: built.handles,
                transform: observation.transform,
            },
        );
        self.stabilizer.mark_materialized(id);
        self.capacity_warned.remove(&id);
        self.detected = true;

        info!(
            "[SURFACE] {} materialized: {:?}, area {:.2} m², {} displayed",
            id,
            observation.orientation,
            built.area,
            self.records.len()
        );
        SurfaceChange::Materialized
    }

    fn refresh<R: SurfaceRenderer>(
        &mut self,
        renderer: &mut R,
        observation: &SurfaceObservation,
        count: u32,
    ) -> SurfaceChange {
        let id = observation.id;
        let Some(record) = self.records.get_mut(&id) else {
            return SurfaceChange::Ignored;
        };

        let outcome = self.builder.rebuild(
            renderer,
            id,
            &mut record.handles,
            &observation.boundary,
            observation.orientation,
            observation.transform,
        );

        match outcome {
            RebuildOutcome::Rebuilt { area } => {
                record.boundary = observation.boundary.clone();
                record.orientation = observation.orientation;
                record.area = area;
                record.observation_count = count;
                record.transform = observation.transform;
                SurfaceChange::Updated
            }
            RebuildOutcome::BelowThreshold => {
                if let Some(record) = self.records.remove(&id) {
                    dispose_surface_handles(renderer, id, &record.handles);
                }
                self.stabilizer.clear_materialized(id);
                info!("[SURFACE] {} demoted: shrank below display threshold", id);
                SurfaceChange::Demoted
            }
        }
    }

    pub fn on_removed<R: SurfaceRenderer>(&mut self, renderer: &mut R, id: SurfaceId) -> SurfaceChange {
        self.stabilizer.forget(id);
        self.capacity_warned.remove(&id);

        let Some(record) = self.records.get(&id) else {
            return SurfaceChange::Ignored;
        };
        dispose_surface_handles(renderer, id, &record.handles);
        self.records.remove(&id);

        info!("[SURFACE] {} removed, {} displayed", id, self.records.len());
        SurfaceChange::Removed
    }

    /// Dispose every record and start counting from zero.
    pub fn on_session_reset<R: SurfaceRenderer>(&mut self, renderer: &mut R) {
        let mut ids: Vec<SurfaceId> = self.records.keys().copied().collect();
        ids.sort();

        for id in &ids {
            if let Some(record) = self.records.get(id) {
                dispose_surface_handles(renderer, *id, &record.handles);
            }
            self.records.remove(id);
        }

        self.stabilizer = ObservationStabilizer::new(self.stabilizer.threshold());
        self.capacity_warned.clear();
        self.detected = false;

        if !ids.is_empty() {
            info!("[SURFACE] Session reset disposed {} surfaces", ids.len());
        }
    }

    pub fn record(&self, id: SurfaceId) -> Option<&SurfaceRecord> {
        self.records.get(&id)
    }

    /// Records sorted by id.
    pub fn records(&self) -> Vec<&SurfaceRecord> {
        let mut records: Vec<&SurfaceRecord> = self.records.values().collect();
        records.sort_by_key(|record| record.id);
        records
    }

    pub fn materialized_count(&self) -> usize {
        self.records.len()
    }

    /// Latched once the first surface materializes; cleared on session reset.
    pub fn surface_detected(&self) -> bool {
        self.detected
    }

    pub fn observation_count(&self, id: SurfaceId) -> u32 {
        self.stabilizer.count(id)
    }

    pub fn is_materialized(&self, id: SurfaceId) -> bool {
        self.stabilizer.is_materialized(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::render::surface_renderer::test_support::{RecordingRenderer, Role};
    use crate::engine::surfaces::record::SurfaceOrientation;

    fn square(id: u64, side: f32) -> SurfaceObservation {
        SurfaceObservation {
            id: SurfaceId(id),
            boundary: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(side, 0.0, 0.0),
                Vec3::new(side, 0.0, side),
                Vec3::new(0.0, 0.0, side),
            ],
            orientation: SurfaceOrientation::Horizontal,
            transform: Transform::IDENTITY,
        }
    }

    fn materialize(
        manager: &mut SurfaceLifecycleManager,
        renderer: &mut RecordingRenderer,
        id: u64,
    ) -> SurfaceChange {
        let observation = square(id, 1.0);
        manager.on_added(renderer, &observation);
        manager.on_updated(renderer, &observation);
        manager.on_updated(renderer, &observation)
    }

    #[test]
    fn tiny_surface_never_materializes() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        let observation = square(1, 0.05);

        let mut last = SurfaceChange::Ignored;
        for _ in 0..5 {
            last = manager.on_added(&mut renderer, &observation);
        }

        assert_eq!(last, SurfaceChange::Rejected);
        assert_eq!(manager.materialized_count(), 0);
        assert!(renderer.live.is_empty());
    }

    #[test]
    fn third_observation_materializes() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        let observation = square(1, 1.0);

        assert_eq!(
            manager.on_added(&mut renderer, &observation),
            SurfaceChange::Observing { count: 1 }
        );
        assert_eq!(
            manager.on_added(&mut renderer, &observation),
            SurfaceChange::Observing { count: 2 }
        );
        assert_eq!(manager.materialized_count(), 0);
        assert_eq!(manager.on_added(&mut renderer, &observation), SurfaceChange::Materialized);

        assert_eq!(manager.materialized_count(), 1);
        let record = manager.record(SurfaceId(1)).expect("record");
        assert_eq!(record.observation_count, 3);
        assert_eq!(renderer.live.len(), 3);
        assert!(manager.surface_detected());
    }

    #[test]
    fn update_counts_toward_stability() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        assert_eq!(materialize(&mut manager, &mut renderer, 7), SurfaceChange::Materialized);
    }

    #[test]
    fn added_for_materialized_surface_updates() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        materialize(&mut manager, &mut renderer, 1);

        assert_eq!(manager.on_added(&mut renderer, &square(1, 2.0)), SurfaceChange::Updated);
        assert_eq!(manager.materialized_count(), 1);
        let record = manager.record(SurfaceId(1)).expect("record");
        assert!((record.area - 4.0).abs() < 1e-5);
        assert_eq!(record.observation_count, 4);
    }

    #[test]
    fn capacity_cap_drops_new_surfaces() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        for id in 0..25 {
            materialize(&mut manager, &mut renderer, id);
        }
        assert_eq!(manager.materialized_count(), 25);

        assert_eq!(
            materialize(&mut manager, &mut renderer, 25),
            SurfaceChange::DroppedAtCapacity
        );
        assert_eq!(manager.materialized_count(), 25);
        assert!(manager.record(SurfaceId(25)).is_none());

        manager.on_removed(&mut renderer, SurfaceId(0));
        assert_eq!(
            manager.on_updated(&mut renderer, &square(25, 1.0)),
            SurfaceChange::Materialized
        );
        assert_eq!(manager.materialized_count(), 25);
    }

    #[test]
    fn stable_surface_added_at_capacity_is_dropped() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        for id in 0..25 {
            materialize(&mut manager, &mut renderer, id);
        }

        let late = square(25, 1.0);
        for _ in 0..3 {
            manager.on_updated(&mut renderer, &late);
        }
        assert!(manager.observation_count(SurfaceId(25)) >= 3);

        assert_eq!(manager.on_added(&mut renderer, &late), SurfaceChange::DroppedAtCapacity);
        assert_eq!(manager.materialized_count(), 25);
        assert_eq!(renderer.live.len(), 75);
        assert!(!manager.is_materialized(SurfaceId(25)));
    }

    #[test]
    fn shrinking_surface_is_demoted() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        materialize(&mut manager, &mut renderer, 1);
        let handles = manager.record(SurfaceId(1)).expect("record").handles.clone();

        assert_eq!(manager.on_updated(&mut renderer, &square(1, 0.1)), SurfaceChange::Demoted);

        assert!(manager.record(SurfaceId(1)).is_none());
        assert!(!manager.is_materialized(SurfaceId(1)));
        assert_eq!(renderer.dispose_count(handles.visible.entity), 1);
        assert_eq!(renderer.dispose_count(handles.outline.entity), 1);
        assert_eq!(renderer.dispose_count(handles.occluder.entity), 1);
        assert!(renderer.live.is_empty());

        // The count survives demotion, so a valid update re-promotes at once.
        assert_eq!(
            manager.on_updated(&mut renderer, &square(1, 1.0)),
            SurfaceChange::Materialized
        );
    }

    #[test]
    fn removal_disposes_once_and_forgets() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        materialize(&mut manager, &mut renderer, 1);
        let handles = manager.record(SurfaceId(1)).expect("record").handles.clone();

        assert_eq!(manager.on_removed(&mut renderer, SurfaceId(1)), SurfaceChange::Removed);
        assert_eq!(manager.on_removed(&mut renderer, SurfaceId(1)), SurfaceChange::Ignored);

        for entity in [handles.visible.entity, handles.outline.entity, handles.occluder.entity] {
            assert_eq!(renderer.dispose_count(entity), 1);
        }
        assert_eq!(manager.observation_count(SurfaceId(1)), 0);
        assert!(manager.record(SurfaceId(1)).is_none());
    }

    #[test]
    fn removing_unmaterialized_surface_forgets_count() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        manager.on_added(&mut renderer, &square(3, 1.0));
        manager.on_added(&mut renderer, &square(3, 1.0));

        assert_eq!(manager.on_removed(&mut renderer, SurfaceId(3)), SurfaceChange::Ignored);
        assert_eq!(manager.observation_count(SurfaceId(3)), 0);
        assert_eq!(
            manager.on_added(&mut renderer, &square(3, 1.0)),
            SurfaceChange::Observing { count: 1 }
        );
    }

    #[test]
    fn session_reset_requires_fresh_observations() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        materialize(&mut manager, &mut renderer, 1);
        materialize(&mut manager, &mut renderer, 2);

        manager.on_session_reset(&mut renderer);

        assert_eq!(manager.materialized_count(), 0);
        assert!(renderer.live.is_empty());
        assert!(!manager.surface_detected());
        assert_eq!(
            manager.on_added(&mut renderer, &square(1, 1.0)),
            SurfaceChange::Observing { count: 1 }
        );
        assert_eq!(
            manager.on_added(&mut renderer, &square(1, 1.0)),
            SurfaceChange::Observing { count: 2 }
        );
        assert_eq!(manager.on_added(&mut renderer, &square(1, 1.0)), SurfaceChange::Materialized);
    }

    #[test]
    fn dispose_failure_still_removes_record() {
        let mut manager = SurfaceLifecycleManager::default();
        let mut renderer = RecordingRenderer::default();
        materialize(&mut manager, &mut renderer, 1);
        let handles = manager.record(SurfaceId(1)).expect("record").handles.clone();

        // Simulate the engine losing the outline behind our back.
        renderer.live.retain(|(entity, _)| *entity != handles.outline.entity);

        assert_eq!(manager.on_removed(&mut renderer, SurfaceId(1)), SurfaceChange::Removed);
        assert!(manager.record(SurfaceId(1)).is_none());
        assert_eq!(renderer.live_count(Role::Visible), 0);
        assert_eq!(renderer.live_count(Role::Occluder), 0);
    }
}
