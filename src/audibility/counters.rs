//! Run statistics: checks performed and audible samples found
//!
//! Observational only — nothing in the computation reads these back.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::state::AudibilityState;
use crate::core::Result;

/// Shared tallies for one audibility run, split square-level vs
/// voxel-level, plus a total-checks counter per source group.
pub struct RunCounters {
    square_checked: AtomicU64,
    square_audible: AtomicU64,
    voxel_checked: AtomicU64,
    voxel_audible: AtomicU64,
    group_totals: Vec<AtomicU64>,
}

impl RunCounters {
    pub fn new(group_count: usize) -> Self {
        Self {
            square_checked: AtomicU64::new(0),
            square_audible: AtomicU64::new(0),
            voxel_checked: AtomicU64::new(0),
            voxel_audible: AtomicU64::new(0),
            group_totals: (0..group_count).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Record one street-square check and its outcome.
    pub fn record_square(&self, result: AudibilityState) {
        self.square_checked.fetch_add(1, Ordering::Relaxed);
        if result.is_audible() {
            self.square_audible.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record one building-floor voxel check and its outcome.
    pub fn record_voxel(&self, result: AudibilityState) {
        self.voxel_checked.fetch_add(1, Ordering::Relaxed);
        if result.is_audible() {
            self.voxel_audible.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Add to a group's total-checks counter. Unknown group ids are
    /// dropped; the tallies carry no correctness weight.
    pub fn add_group_total(&self, group: u32, checks: u64) {
        if let Some(slot) = self.group_totals.get(group as usize) {
            slot.fetch_add(checks, Ordering::Relaxed);
        }
    }

    /// Plain copy of the current tallies.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            square_checked: self.square_checked.load(Ordering::Relaxed),
            square_audible: self.square_audible.load(Ordering::Relaxed),
            voxel_checked: self.voxel_checked.load(Ordering::Relaxed),
            voxel_audible: self.voxel_audible.load(Ordering::Relaxed),
            group_totals: self
                .group_totals
                .iter()
                .map(|c| c.load(Ordering::Relaxed))
                .collect(),
        }
    }
}

/// Counters frozen for reporting.
#[derive(Clone, Debug, Serialize)]
pub struct CountersSnapshot {
    pub square_checked: u64,
    pub square_audible: u64,
    pub voxel_checked: u64,
    pub voxel_audible: u64,
    pub group_totals: Vec<u64>,
}

impl CountersSnapshot {
    /// Pretty-printed JSON report for the host.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AudibilityState::*;

    #[test]
    fn tallies_split_by_kind_and_outcome() {
        let counters = RunCounters::new(2);
        counters.record_square(AudibleNear);
        counters.record_square(NotAudible);
        counters.record_voxel(AudibleFar);
        counters.record_voxel(AudibleFar);
        counters.record_voxel(NotAudible);
        counters.add_group_total(0, 5);
        counters.add_group_total(1, 3);
        counters.add_group_total(1, 3);

        let snap = counters.snapshot();
        assert_eq!(snap.square_checked, 2);
        assert_eq!(snap.square_audible, 1);
        assert_eq!(snap.voxel_checked, 3);
        assert_eq!(snap.voxel_audible, 2);
        assert_eq!(snap.group_totals, vec![5, 6]);
    }

    #[test]
    fn out_of_range_group_is_dropped() {
        let counters = RunCounters::new(1);
        counters.add_group_total(9, 100);
        assert_eq!(counters.snapshot().group_totals, vec![0]);
    }

    #[test]
    fn snapshot_serializes() {
        let counters = RunCounters::new(1);
        counters.record_square(AudibleNear);
        let json = counters.snapshot().to_json().unwrap();
        assert!(json.contains("\"square_audible\": 1"));
    }
}
