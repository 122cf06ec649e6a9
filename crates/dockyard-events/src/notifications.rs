// ABOUTME: Notification payloads emitted by registries, the theme service and docking surfaces
// ABOUTME: Delivered through EventEmitter so consumers can detach by id

use dockyard_types::{DockableWindow, LayoutKind, Region, ThemeKind};

/// A window factory was registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryRegistered {
    pub window_id: String,
    /// An existing factory with the same id was replaced
    pub replaced: bool,
}

/// The active layout kind was set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutChanged {
    pub new: LayoutKind,
    pub old: LayoutKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeChanged {
    pub old: ThemeKind,
    pub new: ThemeKind,
}

/// Why a drag ended without a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// Escape key pressed during the drag
    Escape,
    /// The platform reported the drag completed with no effect
    NoEffect,
    /// Pointer released outside every drop target
    ReleasedOutside,
    /// A drop listener failed while handling the drop
    DropFailed,
    /// No drag activity before the failsafe deadline
    Failsafe,
}

/// Events raised by a docking surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Pointer travel crossed the drag threshold
    DragStarted { window_id: String, source: Region },

    /// A dragged window was dropped on this surface
    WindowDropped {
        window: DockableWindow,
        source: Region,
        target: Region,
    },

    DragCancelled { reason: CancelReason },

    /// Drop-zone indicator shown or hidden
    DropZoneChanged { visible: bool },

    /// Window removed from its region to float on its own
    FloatRequested { window: DockableWindow },

    /// Window removed from its region and closed
    CloseRequested { window: DockableWindow },
}

impl SurfaceEvent {
    /// Short name used in log fields
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceEvent::DragStarted { .. } => "drag_started",
            SurfaceEvent::WindowDropped { .. } => "window_dropped",
            SurfaceEvent::DragCancelled { .. } => "drag_cancelled",
            SurfaceEvent::DropZoneChanged { .. } => "drop_zone_changed",
            SurfaceEvent::FloatRequested { .. } => "float_requested",
            SurfaceEvent::CloseRequested { .. } => "close_requested",
        }
    }
}
