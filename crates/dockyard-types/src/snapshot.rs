// ABOUTME: Layout snapshot built fresh from region providers and the persisted preference record
// ABOUTME: Only the layout kind is ever persisted; snapshots live in memory

use serde::{Deserialize, Serialize};

use crate::region::{LayoutKind, Region};
use crate::window::DockableWindow;

/// Ordered window lists for all five regions plus the active layout kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    pub layout_kind: LayoutKind,
    regions: [Vec<DockableWindow>; 5],
}

impl LayoutSnapshot {
    pub fn new(layout_kind: LayoutKind) -> Self {
        Self {
            layout_kind,
            regions: Default::default(),
        }
    }

    pub fn windows(&self, region: Region) -> &[DockableWindow] {
        &self.regions[region.index()]
    }

    pub fn set_windows(&mut self, region: Region, windows: Vec<DockableWindow>) {
        self.regions[region.index()] = windows;
    }

    /// Consume the snapshot, yielding each region with its windows in region order
    pub fn into_regions(self) -> impl Iterator<Item = (Region, Vec<DockableWindow>)> {
        Region::ALL.into_iter().zip(self.regions)
    }

    pub fn window_count(&self) -> usize {
        self.regions.iter().map(Vec::len).sum()
    }

    /// Find the region holding a window id
    pub fn region_of(&self, window_id: &str) -> Option<Region> {
        Region::ALL
            .into_iter()
            .find(|region| self.windows(*region).iter().any(|w| w.id == window_id))
    }
}

/// Persisted layout preference record: `{ "layoutKind": "<name>" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreference {
    pub layout_kind: String,
}

impl LayoutPreference {
    pub fn new(kind: LayoutKind) -> Self {
        Self {
            layout_kind: kind.name().to_string(),
        }
    }

    /// The stored kind, or `None` when the stored name is not a known kind
    pub fn kind(&self) -> Option<LayoutKind> {
        self.layout_kind.parse().ok()
    }
}
