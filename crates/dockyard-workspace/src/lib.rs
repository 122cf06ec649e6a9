// ABOUTME: Workspace layer holding per-region window collections and docking surfaces
// ABOUTME: Drag-and-drop state lives here; the shell wires surfaces to the layout

pub mod docking_surface;
pub mod timer;
pub mod window_collection;

pub use docking_surface::{DockingSurface, DragEffect, DragOutcome, DragSession, DragState, Point};
pub use timer::ScheduledTimer;
pub use window_collection::WindowCollection;
