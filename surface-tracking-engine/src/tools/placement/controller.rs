use bevy::prelude::*;
use constants::placement::SINGLE_OBJECT_YAW_CORRECTION;
use serde::{Deserialize, Serialize};

use crate::engine::session::ingest::HitTestResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// One tracked content root, moved on every placement.
    #[default]
    SingleObject,
    /// Every placement spawns a new instance from the content template.
    MultiInstance,
}

/// Pose resolved for a placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPlacement {
    pub position: Vec3,
    pub rotation: Quat,
}

impl AnchorPlacement {
    pub fn from_hit(hit: &HitTestResult) -> Self {
        Self::from_transform(&hit.transform())
    }

    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation,
            rotation: transform.rotation,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u32);

/// A spawned instance. The root entity is referenced, never owned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedInstance {
    pub id: InstanceId,
    pub placement: AnchorPlacement,
    pub root: Entity,
}

/// Tap-latched placement state. A tap arms the controller; the next non-empty
/// hit-test delivery is consumed as the placement pose.
#[derive(Resource, Debug, Default)]
pub struct PlacementController {
    mode: PlacementMode,
    pending: bool,
    next_instance: u32,
    instances: Vec<PlacedInstance>,
}

impl PlacementController {
    pub fn new(mode: PlacementMode) -> Self {
        Self {
            mode,
            ..default()
        }
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PlacementMode) {
        self.mode = mode;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Arm the controller. Ignored when there is no content to place.
    pub fn on_tap_down(&mut self, content_ready: bool) -> bool {
        if !content_ready {
            debug!("[PLACEMENT] Tap ignored: content not ready");
            return false;
        }
        self.pending = true;
        true
    }

    /// Consume the first result if a placement is pending. Empty deliveries
    /// leave the controller armed.
    pub fn on_hit_test_result(&mut self, results: &[HitTestResult]) -> Option<AnchorPlacement> {
        if !self.pending {
            return None;
        }
        let first = results.first()?;
        self.pending = false;
        Some(AnchorPlacement::from_hit(first))
    }

    /// Transform for the single tracked content root, turned to face the viewer.
    pub fn single_object_transform(placement: &AnchorPlacement) -> Transform {
        Transform::from_translation(placement.position)
            .with_rotation(placement.rotation * Quat::from_rotation_y(SINGLE_OBJECT_YAW_CORRECTION))
    }

    /// Placement at a reference pose. Multi-instance only.
    pub fn place_at_center(&self, reference: &Transform) -> Option<AnchorPlacement> {
        match self.mode {
            PlacementMode::MultiInstance => Some(AnchorPlacement::from_transform(reference)),
            PlacementMode::SingleObject => {
                debug!("[PLACEMENT] Place-at-center ignored in single-object mode");
                None
            }
        }
    }

    pub fn track_instance(&mut self, placement: AnchorPlacement, root: Entity) -> InstanceId {
        let id = InstanceId(self.next_instance);
        self.next_instance += 1;
        self.instances.push(PlacedInstance {
            id,
            placement,
            root,
        });
        id
    }

    /// Forget one instance and hand back its root for despawning.
    pub fn remove_instance(&mut self, id: InstanceId) -> Option<PlacedInstance> {
        let index = self.instances.iter().position(|instance| instance.id == id)?;
        Some(self.instances.remove(index))
    }

    pub fn last_instance(&self) -> Option<InstanceId> {
        self.instances.last().map(|instance| instance.id)
    }

    pub fn instances(&self) -> &[PlacedInstance] {
        &self.instances
    }

    /// Disarm and release every instance. Instance ids keep counting up.
    pub fn reset(&mut self) -> Vec<PlacedInstance> {
        self.pending = false;
        std::mem::take(&mut self.instances)
    }
}
