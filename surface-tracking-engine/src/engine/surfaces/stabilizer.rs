use std::collections::{HashMap, HashSet};

use super::record::SurfaceId;

/// Per-session observation counter. A fresh instance is built for every
/// tracking session; counts never carry over between sessions.
#[derive(Debug, Clone)]
pub struct ObservationStabilizer {
    threshold: u32,
    counts: HashMap<SurfaceId, u32>,
    materialized: HashSet<SurfaceId>,
}

impl ObservationStabilizer {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            counts: HashMap::new(),
            materialized: HashSet::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Count one more sighting of `id`. Added and updated events both count.
    pub fn observe(&mut self, id: SurfaceId) -> u32 {
        let count = self.counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count(&self, id: SurfaceId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn is_stable(&self, count: u32) -> bool {
        count >= self.threshold
    }

    pub fn is_materialized(&self, id: SurfaceId) -> bool {
        self.materialized.contains(&id)
    }

    pub fn mark_materialized(&mut self, id: SurfaceId) {
        self.materialized.insert(id);
    }

    /// Demotion keeps the count: a later valid update re-promotes immediately.
    pub fn clear_materialized(&mut self, id: SurfaceId) {
        self.materialized.remove(&id);
    }

    pub fn forget(&mut self, id: SurfaceId) {
        self.counts.remove(&id);
        self.materialized.remove(&id);
    }

    pub fn reset_all(&mut self) {
        self.counts.clear();
        self.materialized.clear();
    }

    pub fn tracked_ids(&self) -> usize {
        self.counts.len()
    }
}
