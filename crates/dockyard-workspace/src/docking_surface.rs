// ABOUTME: Docking surface for one region: window tabs plus the drag-and-drop state machine
// ABOUTME: Debounce and failsafe timers are owned here and always stopped by reset_state

use dockyard_events::{CancelReason, EventEmitter, SurfaceEvent};
use dockyard_logging::{debug, info, warn};
use dockyard_types::{DockableWindow, DragConfig, Region};
use std::time::Instant;

use crate::timer::ScheduledTimer;
use crate::window_collection::WindowCollection;

/// Pointer position in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Effect a drop target reports for a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    None,
    Move,
}

/// An active drag carrying the dragged window
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub window: DockableWindow,
    pub source: Region,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Pressed on a tab, button still held, threshold not yet exceeded
    DragArmed { window_id: String, origin: Point },
    Dragging { session: DragSession },
}

/// How the last drag involving this surface ended
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// `target` is unknown when reported on the source side
    DropAccepted {
        window_id: String,
        target: Option<Region>,
    },
    DropRejected { window_id: String, reason: String },
    Cancelled(CancelReason),
}

pub struct DockingSurface {
    region: Region,
    windows: WindowCollection,
    visible: bool,
    threshold: f32,
    state: DragState,
    hovering: bool,
    drop_zone_visible: bool,
    debounce: ScheduledTimer,
    failsafe: ScheduledTimer,
    last_outcome: Option<DragOutcome>,
    events: EventEmitter<SurfaceEvent>,
}

impl DockingSurface {
    pub fn new(region: Region, config: &DragConfig) -> Self {
        let config = config.sanitized();
        Self {
            region,
            windows: WindowCollection::new(),
            visible: true,
            threshold: config.threshold,
            state: DragState::Idle,
            hovering: false,
            drop_zone_visible: false,
            debounce: ScheduledTimer::new("drop_zone_debounce", config.drop_zone_delay()),
            failsafe: ScheduledTimer::new("drag_failsafe", config.failsafe()),
            last_outcome: None,
            events: EventEmitter::new("docking_surface"),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn windows(&self) -> &WindowCollection {
        &self.windows
    }

    pub fn windows_mut(&mut self) -> &mut WindowCollection {
        &mut self.windows
    }

    /// Replace the hosted windows
    pub fn set_windows(&mut self, windows: Vec<DockableWindow>) {
        self.windows = WindowCollection::from_windows(windows);
    }

    pub fn add_window(&mut self, window: DockableWindow) {
        self.windows.add(window);
    }

    /// Remove a window without any notification, e.g. when it moves to another surface
    pub fn take_window(&mut self, window_id: &str) -> Option<DockableWindow> {
        if self.dragged_window_id() == Some(window_id) {
            self.reset_state();
        }
        self.windows.remove(window_id)
    }

    pub fn contains(&self, window_id: &str) -> bool {
        self.windows.contains(window_id)
    }

    pub fn activate(&mut self, window_id: &str) -> bool {
        self.windows.set_active(window_id)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the surface; hiding abandons any hover in progress
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        if !visible && self.hovering {
            self.drag_leave();
        }
        debug!(region = %self.region, visible, "Surface visibility changed");
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_window_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { session } => Some(session.window.id.as_str()),
            _ => None,
        }
    }

    pub fn is_drop_zone_visible(&self) -> bool {
        self.drop_zone_visible
    }

    pub fn has_pending_timers(&self) -> bool {
        self.debounce.is_running() || self.failsafe.is_running()
    }

    pub fn last_outcome(&self) -> Option<&DragOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn notifications(&self) -> &EventEmitter<SurfaceEvent> {
        &self.events
    }

    /// Press on a window's tab. Arms a drag when the window is hosted here.
    pub fn press(&mut self, window_id: &str, point: Point) -> bool {
        if self.state != DragState::Idle || !self.windows.contains(window_id) {
            return false;
        }
        self.windows.set_active(window_id);
        self.state = DragState::DragArmed {
            window_id: window_id.to_string(),
            origin: point,
        };
        true
    }

    /// Pointer movement while a drag is armed. Returns the session when the
    /// drag threshold is crossed with the button still held.
    pub fn pointer_moved(
        &mut self,
        point: Point,
        button_held: bool,
        now: Instant,
    ) -> Option<DragSession> {
        let DragState::DragArmed { window_id, origin } = &self.state else {
            return None;
        };

        if !button_held {
            self.state = DragState::Idle;
            return None;
        }
        if origin.distance(point) <= self.threshold {
            return None;
        }

        let Some(window) = self.windows.get(window_id).cloned() else {
            self.state = DragState::Idle;
            return None;
        };

        let session = DragSession {
            window,
            source: self.region,
        };
        self.state = DragState::Dragging {
            session: session.clone(),
        };
        self.failsafe.start(now);

        info!(window_id = %session.window.id, source = %self.region, "Drag started");
        self.events.emit(&SurfaceEvent::DragStarted {
            window_id: session.window.id.clone(),
            source: self.region,
        });
        Some(session)
    }

    /// A drag hovers over this surface. Any window may move to any region.
    pub fn drag_over(&mut self, session: &DragSession, now: Instant) -> DragEffect {
        self.hovering = true;
        if !self.drop_zone_visible && !self.debounce.is_running() {
            self.debounce.start(now);
            debug!(
                region = %self.region,
                window_id = %session.window.id,
                "Drop zone debounce started"
            );
        }
        self.failsafe.start(now);
        DragEffect::Move
    }

    /// The drag this surface started is still hovering somewhere; restart the failsafe
    pub fn keep_alive(&mut self, now: Instant) {
        if self.is_dragging() {
            self.failsafe.start(now);
        }
    }

    /// The drag left this surface's bounds
    pub fn drag_leave(&mut self) {
        self.hovering = false;
        self.debounce.stop();
        self.set_drop_zone_visible(false);
        if !self.is_dragging() {
            self.failsafe.stop();
        }
    }

    /// Drop a dragged window onto this surface.
    ///
    /// Accepted regardless of whether the drop-zone indicator is showing yet.
    pub fn drop(&mut self, session: DragSession) -> DragOutcome {
        let window_id = session.window.id.clone();
        let source = session.source;

        if !self.visible {
            let reason = format!("{} surface is hidden by the current layout", self.region);
            return self.reject_drop(window_id, reason);
        }

        let report = self.events.emit(&SurfaceEvent::WindowDropped {
            window: session.window,
            source,
            target: self.region,
        });
        self.reset_state();

        let outcome = if report.all_succeeded() {
            info!(window_id = %window_id, source = %source, target = %self.region, "Window dropped");
            DragOutcome::DropAccepted {
                window_id,
                target: Some(self.region),
            }
        } else {
            warn!(region = %self.region, "Drop handling failed, drag cancelled");
            let reason = CancelReason::DropFailed;
            self.events.emit(&SurfaceEvent::DragCancelled { reason });
            DragOutcome::Cancelled(reason)
        };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Refuse a drop onto this surface, clearing any hover state it left behind
    pub fn reject_drop(&mut self, window_id: String, reason: String) -> DragOutcome {
        self.reset_state();
        info!(window_id = %window_id, region = %self.region, reason = %reason, "Drop rejected");
        let outcome = DragOutcome::DropRejected { window_id, reason };
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// Escape pressed. Returns whether anything was cancelled.
    pub fn escape(&mut self) -> bool {
        self.cancel(CancelReason::Escape)
    }

    /// The drag this surface started has ended
    pub fn drag_completed(&mut self, effect: DragEffect) {
        let DragState::Dragging { session } = &self.state else {
            return;
        };
        match effect {
            DragEffect::None => {
                self.cancel(CancelReason::NoEffect);
            }
            DragEffect::Move => {
                let window_id = session.window.id.clone();
                self.reset_state();
                self.last_outcome = Some(DragOutcome::DropAccepted {
                    window_id,
                    target: None,
                });
            }
        }
    }

    /// Pointer button released on this surface's drag
    pub fn release(&mut self, over_target: bool) {
        match self.state {
            DragState::DragArmed { .. } => self.state = DragState::Idle,
            DragState::Dragging { .. } if !over_target => {
                self.cancel(CancelReason::ReleasedOutside);
            }
            _ => {}
        }
    }

    /// Fire due timers; called from the UI loop
    pub fn tick(&mut self, now: Instant) {
        if self.debounce.poll(now) && self.hovering {
            self.set_drop_zone_visible(true);
        }
        if self.failsafe.poll(now) {
            warn!(region = %self.region, "Drag failsafe elapsed, forcing reset");
            self.cancel(CancelReason::Failsafe);
        }
    }

    /// Stop timers, hide the indicator and forget any dragged window. Safe from any state.
    pub fn reset_state(&mut self) {
        self.debounce.stop();
        self.failsafe.stop();
        self.set_drop_zone_visible(false);
        self.hovering = false;
        self.state = DragState::Idle;
    }

    /// Close a window hosted here, if it allows closing
    pub fn request_close(&mut self, window_id: &str) -> Option<DockableWindow> {
        let window = self.windows.get(window_id)?;
        if !window.can_close {
            debug!(window_id = %window_id, "Close refused, window is not closable");
            return None;
        }

        let window = self.take_window(window_id)?;
        info!(window_id = %window_id, region = %self.region, "Window closed");
        self.events.emit(&SurfaceEvent::CloseRequested {
            window: window.clone(),
        });
        Some(window)
    }

    /// Detach a window to float, if it allows floating
    pub fn request_float(&mut self, window_id: &str) -> Option<DockableWindow> {
        let window = self.windows.get(window_id)?;
        if !window.can_float {
            debug!(window_id = %window_id, "Float refused, window is not floatable");
            return None;
        }

        let mut window = self.take_window(window_id)?;
        window.is_floating = true;
        info!(window_id = %window_id, region = %self.region, "Window floated");
        self.events.emit(&SurfaceEvent::FloatRequested {
            window: window.clone(),
        });
        Some(window)
    }

    fn is_active(&self) -> bool {
        self.state != DragState::Idle
            || self.hovering
            || self.drop_zone_visible
            || self.has_pending_timers()
    }

    fn cancel(&mut self, reason: CancelReason) -> bool {
        if !self.is_active() {
            return false;
        }
        self.reset_state();
        info!(region = %self.region, reason = ?reason, "Drag cancelled");
        self.last_outcome = Some(DragOutcome::Cancelled(reason));
        self.events.emit(&SurfaceEvent::DragCancelled { reason });
        true
    }

    fn set_drop_zone_visible(&mut self, visible: bool) {
        if self.drop_zone_visible == visible {
            return;
        }
        self.drop_zone_visible = visible;
        self.events.emit(&SurfaceEvent::DropZoneChanged { visible });
    }
}

impl std::fmt::Debug for DockingSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockingSurface")
            .field("region", &self.region)
            .field("windows", &self.windows.ids())
            .field("visible", &self.visible)
            .field("state", &self.state)
            .field("drop_zone_visible", &self.drop_zone_visible)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    fn surface(region: Region, ids: &[&str]) -> DockingSurface {
        let mut surface = DockingSurface::new(region, &DragConfig::default());
        surface.set_windows(ids.iter().map(|id| DockableWindow::new(*id, *id)).collect());
        surface
    }

    fn record(surface: &DockingSurface) -> Arc<Mutex<Vec<SurfaceEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        surface
            .notifications()
            .attach("test", move |event: &SurfaceEvent| sink.lock().push(event.clone()))
            .unwrap();
        events
    }

    fn start_drag(surface: &mut DockingSurface, window_id: &str, now: Instant) -> DragSession {
        assert!(surface.press(window_id, Point::new(0.0, 0.0)));
        surface
            .pointer_moved(Point::new(20.0, 0.0), true, now)
            .expect("drag should start past the threshold")
    }

    fn assert_clean(surface: &DockingSurface) {
        assert_eq!(*surface.state(), DragState::Idle);
        assert!(!surface.is_drop_zone_visible());
        assert!(surface.dragged_window_id().is_none());
        assert!(!surface.has_pending_timers());
    }

    #[test]
    fn test_press_drag_drop() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let mut center = surface(Region::Center, &["editor"]);
        let center_events = record(&center);

        let session = start_drag(&mut left, "explorer", now);
        assert_eq!(left.dragged_window_id(), Some("explorer"));

        assert_eq!(center.drag_over(&session, now), DragEffect::Move);
        center.tick(now + Duration::from_millis(150));
        assert!(center.is_drop_zone_visible());

        let outcome = center.drop(session);
        assert_eq!(
            outcome,
            DragOutcome::DropAccepted {
                window_id: "explorer".into(),
                target: Some(Region::Center)
            }
        );
        assert_clean(&center);

        left.drag_completed(DragEffect::Move);
        assert_clean(&left);

        let events = center_events.lock();
        assert!(events.iter().any(|e| matches!(
            e,
            SurfaceEvent::WindowDropped { window, source: Region::Left, target: Region::Center }
                if window.id == "explorer"
        )));
        assert_eq!(
            events.last(),
            Some(&SurfaceEvent::DropZoneChanged { visible: false })
        );
    }

    #[test]
    fn test_press_drag_escape() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let events = record(&left);

        let session = start_drag(&mut left, "explorer", now);
        left.drag_over(&session, now);
        left.tick(now + Duration::from_millis(200));
        assert!(left.is_drop_zone_visible());

        assert!(left.escape());
        assert_clean(&left);
        assert_eq!(
            left.last_outcome(),
            Some(&DragOutcome::Cancelled(CancelReason::Escape))
        );
        assert_eq!(
            events.lock().last(),
            Some(&SurfaceEvent::DragCancelled {
                reason: CancelReason::Escape
            })
        );
        assert!(!left.escape());
    }

    #[test]
    fn test_failsafe_resets_abandoned_drag() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        start_drag(&mut left, "explorer", now);

        left.tick(now + Duration::from_millis(4999));
        assert!(left.is_dragging());

        left.tick(now + Duration::from_secs(5));
        assert_clean(&left);
        assert_eq!(
            left.last_outcome(),
            Some(&DragOutcome::Cancelled(CancelReason::Failsafe))
        );
    }

    #[test]
    fn test_hover_restarts_failsafe() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let session = start_drag(&mut left, "explorer", now);

        left.drag_over(&session, now + Duration::from_secs(4));
        left.tick(now + Duration::from_secs(6));
        assert!(left.is_dragging());

        left.tick(now + Duration::from_secs(9));
        assert_clean(&left);
    }

    #[test]
    fn test_keep_alive_restarts_source_failsafe() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        start_drag(&mut left, "explorer", now);

        left.keep_alive(now + Duration::from_secs(4));
        left.tick(now + Duration::from_secs(8));
        assert!(left.is_dragging());

        left.tick(now + Duration::from_secs(9));
        assert_clean(&left);

        // Nothing to keep alive once idle
        left.keep_alive(now + Duration::from_secs(10));
        assert!(!left.has_pending_timers());
    }

    #[test]
    fn test_leave_during_debounce_keeps_indicator_hidden() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let mut right = surface(Region::Right, &[]);
        let session = start_drag(&mut left, "explorer", now);

        right.drag_over(&session, now);
        right.drag_over(&session, now + Duration::from_millis(50));
        right.drag_leave();
        right.tick(now + Duration::from_millis(500));

        assert!(!right.is_drop_zone_visible());
        assert_clean(&right);
    }

    #[test]
    fn test_drop_during_debounce_is_accepted() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let mut right = surface(Region::Right, &[]);
        let session = start_drag(&mut left, "explorer", now);

        right.drag_over(&session, now);
        assert!(!right.is_drop_zone_visible());

        let outcome = right.drop(session);
        assert!(matches!(outcome, DragOutcome::DropAccepted { .. }));
        assert_clean(&right);
    }

    #[test]
    fn test_threshold_and_release_while_armed() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);

        assert!(left.press("explorer", Point::new(10.0, 10.0)));
        assert!(left.pointer_moved(Point::new(12.0, 11.0), true, now).is_none());
        assert!(matches!(left.state(), DragState::DragArmed { .. }));

        left.release(false);
        assert_clean(&left);
        assert!(left.last_outcome().is_none());

        assert!(left.press("explorer", Point::new(0.0, 0.0)));
        assert!(left.pointer_moved(Point::new(50.0, 0.0), false, now).is_none());
        assert_clean(&left);
    }

    #[test]
    fn test_press_on_foreign_window_is_ignored() {
        let mut left = surface(Region::Left, &["explorer"]);
        assert!(!left.press("editor", Point::default()));
        assert_eq!(*left.state(), DragState::Idle);
    }

    #[test]
    fn test_other_cancellation_paths() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);

        start_drag(&mut left, "explorer", now);
        left.drag_completed(DragEffect::None);
        assert_clean(&left);
        assert_eq!(
            left.last_outcome(),
            Some(&DragOutcome::Cancelled(CancelReason::NoEffect))
        );

        start_drag(&mut left, "explorer", now);
        left.release(true);
        assert!(left.is_dragging());
        left.release(false);
        assert_clean(&left);
        assert_eq!(
            left.last_outcome(),
            Some(&DragOutcome::Cancelled(CancelReason::ReleasedOutside))
        );
    }

    #[test]
    fn test_failing_drop_listener_cancels() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let mut center = surface(Region::Center, &[]);
        center
            .notifications()
            .attach("broken", |event: &SurfaceEvent| {
                if matches!(event, SurfaceEvent::WindowDropped { .. }) {
                    panic!("drop handler failed");
                }
            })
            .unwrap();

        let session = start_drag(&mut left, "explorer", now);
        center.drag_over(&session, now);
        let outcome = center.drop(session);

        assert_eq!(outcome, DragOutcome::Cancelled(CancelReason::DropFailed));
        assert_clean(&center);
    }

    #[test]
    fn test_drop_on_hidden_surface_is_rejected() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        let mut top = surface(Region::Top, &[]);
        top.set_visible(false);

        let session = start_drag(&mut left, "explorer", now);
        let outcome = top.drop(session);
        assert!(matches!(outcome, DragOutcome::DropRejected { .. }));
        assert_clean(&top);
    }

    #[test]
    fn test_reset_state_is_idempotent() {
        let now = Instant::now();
        let mut left = surface(Region::Left, &["explorer"]);
        left.reset_state();
        assert_clean(&left);

        let session = start_drag(&mut left, "explorer", now);
        left.drag_over(&session, now);
        left.reset_state();
        left.reset_state();
        assert_clean(&left);
        assert!(left.contains("explorer"));
    }

    #[test]
    fn test_close_and_float_requests() {
        let mut bottom = surface(Region::Bottom, &["output", "errors"]);
        bottom.add_window(DockableWindow::new("pinned", "Pinned").closable(false).floatable(false));
        let events = record(&bottom);

        let closed = bottom.request_close("output").unwrap();
        assert_eq!(closed.id, "output");
        assert!(!bottom.contains("output"));

        let floated = bottom.request_float("errors").unwrap();
        assert!(floated.is_floating);
        assert!(!bottom.contains("errors"));

        assert!(bottom.request_close("pinned").is_none());
        assert!(bottom.request_float("pinned").is_none());
        assert!(bottom.request_close("missing").is_none());
        assert!(bottom.contains("pinned"));

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], SurfaceEvent::CloseRequested { window } if window.id == "output"));
        assert!(matches!(&events[1], SurfaceEvent::FloatRequested { window } if window.is_floating));
    }
}
