// ABOUTME: Docking regions and the layout kinds that select which regions are visible
// ABOUTME: Region order is fixed and shared by snapshots, surfaces and persistence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five fixed areas of the main window that can host windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Left,
    Right,
    Center,
    Bottom,
    Top,
}

impl Region {
    /// All regions in snapshot order
    pub const ALL: [Region; 5] = [
        Region::Left,
        Region::Right,
        Region::Center,
        Region::Bottom,
        Region::Top,
    ];

    /// Position of this region inside `Region::ALL`
    pub fn index(self) -> usize {
        match self {
            Region::Left => 0,
            Region::Right => 1,
            Region::Center => 2,
            Region::Bottom => 3,
            Region::Top => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Left => "Left",
            Region::Right => "Right",
            Region::Center => "Center",
            Region::Bottom => "Bottom",
            Region::Top => "Top",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named layout configuration selecting which regions are active.
///
/// Switching the kind only changes the visibility mapping; window membership
/// of the regions is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LayoutKind {
    Single,
    TopBottom,
    #[default]
    ThreePane,
    FourPane,
    Full,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::Single,
        LayoutKind::TopBottom,
        LayoutKind::ThreePane,
        LayoutKind::FourPane,
        LayoutKind::Full,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LayoutKind::Single => "Single",
            LayoutKind::TopBottom => "TopBottom",
            LayoutKind::ThreePane => "ThreePane",
            LayoutKind::FourPane => "FourPane",
            LayoutKind::Full => "Full",
        }
    }

    /// Regions shown for this kind, in snapshot order
    pub fn active_regions(self) -> &'static [Region] {
        match self {
            LayoutKind::Single => &[Region::Center],
            LayoutKind::TopBottom => &[Region::Center, Region::Bottom, Region::Top],
            LayoutKind::ThreePane => &[Region::Left, Region::Right, Region::Center],
            LayoutKind::FourPane => &[Region::Left, Region::Right, Region::Center, Region::Bottom],
            LayoutKind::Full => &Region::ALL,
        }
    }

    pub fn is_region_active(self, region: Region) -> bool {
        self.active_regions().contains(&region)
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a layout name does not match any `LayoutKind`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown layout kind '{0}'")]
pub struct ParseLayoutKindError(pub String);

impl FromStr for LayoutKind {
    type Err = ParseLayoutKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseLayoutKindError(s.to_string()))
    }
}
