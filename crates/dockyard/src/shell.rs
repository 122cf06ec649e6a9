// ABOUTME: Shell controller composing the layout registry, docking surfaces, theme and message bus
// ABOUTME: Notifications are queued on a channel and applied by process_events on the UI loop

use dockyard_core::{LayoutRegistry, ThemeService, WindowFactoryRegistry};
use dockyard_events::{
    BusError, HandlerError, LayoutChanged, Message, MessageBus, MessageType, SurfaceEvent,
    ThemeChanged,
};
use dockyard_logging::{debug, info, trace, warn};
use dockyard_types::{
    DockableWindow, DragConfig, LayoutKind, LayoutSnapshot, ParseLayoutKindError, Region,
    ThemeKind,
};
use dockyard_workspace::{DockingSurface, DragEffect, DragOutcome, DragSession, Point};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::commands::{COMMAND_MESSAGE, ShellCommand};

static NEXT_SHELL_ID: AtomicU64 = AtomicU64::new(1);

/// Services the shell is composed from
pub struct ShellServices {
    pub bus: MessageBus,
    pub factories: Arc<WindowFactoryRegistry>,
    pub layout: LayoutRegistry,
    pub theme: ThemeService,
}

/// Hook run once during construction, after the initial layout is assigned
/// and before any notification is wired up
pub trait ShellExtension {
    fn extend(&self, shell: &mut ShellController);
}

impl<F> ShellExtension for F
where
    F: Fn(&mut ShellController),
{
    fn extend(&self, shell: &mut ShellController) {
        self(shell)
    }
}

/// Work queued for the next `process_events`
#[derive(Debug)]
enum ShellEvent {
    Message(Message),
    LayoutChanged(LayoutChanged),
    ThemeChanged(ThemeChanged),
    Surface(Region, SurfaceEvent),
    RebuildLayout { replace: bool },
}

pub struct ShellController {
    id: String,
    bus: MessageBus,
    factories: Arc<WindowFactoryRegistry>,
    layout: LayoutRegistry,
    theme: ThemeService,
    surfaces: [DockingSurface; 5],
    floating: Vec<DockableWindow>,
    closed: HashSet<String>,
    status_text: String,
    exit_requested: bool,
    disposed: bool,
    event_tx: mpsc::UnboundedSender<ShellEvent>,
    event_rx: mpsc::UnboundedReceiver<ShellEvent>,
}

impl ShellController {
    pub fn new(services: ShellServices, drag: &DragConfig) -> Self {
        Self::with_extension(services, drag, |_: &mut ShellController| {})
    }

    pub fn with_extension(
        services: ShellServices,
        drag: &DragConfig,
        extension: impl ShellExtension,
    ) -> Self {
        let ShellServices {
            bus,
            factories,
            layout,
            theme,
        } = services;
        let id = format!(
            "ShellController_{}",
            NEXT_SHELL_ID.fetch_add(1, Ordering::Relaxed)
        );
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut shell = Self {
            id,
            bus,
            factories,
            layout,
            theme,
            surfaces: Region::ALL.map(|region| DockingSurface::new(region, drag)),
            floating: Vec::new(),
            closed: HashSet::new(),
            status_text: String::from("Ready"),
            exit_requested: false,
            disposed: false,
            event_tx,
            event_rx,
        };

        let kind = shell.layout.restore_kind_preference();
        let snapshot = shell.layout.build_snapshot();
        for (region, windows) in snapshot.into_regions() {
            shell.surfaces[region.index()].set_windows(windows);
        }
        shell.apply_visibility(kind);

        extension.extend(&mut shell);
        shell.connect();

        info!(
            shell_id = %shell.id,
            layout_kind = %kind,
            theme = %shell.theme.active(),
            window_count = shell.open_window_count(),
            "Shell controller initialized"
        );
        shell
    }

    fn connect(&mut self) {
        let tx = self.event_tx.clone();
        if let Err(error) = self.layout.notifications().attach(self.id.clone(), move |event| {
            let _ = tx.send(ShellEvent::LayoutChanged(*event));
        }) {
            warn!(shell_id = %self.id, error = %error, "Failed to attach to layout notifications");
        }

        let tx = self.event_tx.clone();
        if let Err(error) = self.theme.notifications().attach(self.id.clone(), move |event| {
            let _ = tx.send(ShellEvent::ThemeChanged(*event));
        }) {
            warn!(shell_id = %self.id, error = %error, "Failed to attach to theme notifications");
        }

        for surface in &self.surfaces {
            let region = surface.region();
            let tx = self.event_tx.clone();
            if let Err(error) = surface.notifications().attach(self.id.clone(), move |event| {
                let _ = tx.send(ShellEvent::Surface(region, event.clone()));
            }) {
                warn!(
                    shell_id = %self.id,
                    region = %region,
                    error = %error,
                    "Failed to attach to surface notifications"
                );
            }
        }

        let tx = self.event_tx.clone();
        let subscribed = self.bus.subscribe(self.id.clone(), move |message: &Message| {
            tx.send(ShellEvent::Message(message.clone()))
                .map_err(|_| HandlerError::failed("shell event queue closed"))
        });
        if let Err(error) = subscribed {
            warn!(shell_id = %self.id, error = %error, "Failed to subscribe to message bus");
        }
    }

    /// Bus recipient id of this controller
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub fn factories(&self) -> &Arc<WindowFactoryRegistry> {
        &self.factories
    }

    pub fn layout(&self) -> &LayoutRegistry {
        &self.layout
    }

    /// Mutable access for installing region providers
    pub fn layout_mut(&mut self) -> &mut LayoutRegistry {
        &mut self.layout
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.layout.layout_kind()
    }

    pub fn theme(&self) -> &ThemeService {
        &self.theme
    }

    pub fn set_theme(&mut self, kind: ThemeKind) {
        self.theme.set_theme(kind);
    }

    pub fn surface(&self, region: Region) -> &DockingSurface {
        &self.surfaces[region.index()]
    }

    pub fn surface_mut(&mut self, region: Region) -> &mut DockingSurface {
        &mut self.surfaces[region.index()]
    }

    /// Regions shown by the active layout kind, in snapshot order
    pub fn visible_regions(&self) -> Vec<Region> {
        self.surfaces
            .iter()
            .filter(|surface| surface.is_visible())
            .map(DockingSurface::region)
            .collect()
    }

    /// Current region contents and layout kind
    pub fn snapshot(&self) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::new(self.layout.layout_kind());
        for surface in &self.surfaces {
            snapshot.set_windows(surface.region(), surface.windows().windows().to_vec());
        }
        snapshot
    }

    pub fn floating_windows(&self) -> &[DockableWindow] {
        &self.floating
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Region currently hosting `window_id`
    pub fn region_of(&self, window_id: &str) -> Option<Region> {
        self.surfaces
            .iter()
            .find(|surface| surface.contains(window_id))
            .map(DockingSurface::region)
    }

    /// Whether a window is docked in any region or floating
    pub fn is_open(&self, window_id: &str) -> bool {
        self.region_of(window_id).is_some() || self.floating.iter().any(|w| w.id == window_id)
    }

    fn open_window_count(&self) -> usize {
        self.surfaces
            .iter()
            .map(|surface| surface.windows().len())
            .sum::<usize>()
            + self.floating.len()
    }

    // Commands

    /// Set the active kind now; region contents are reconciled on the next `process_events`
    pub fn change_layout(&mut self, name: &str) -> Result<LayoutKind, ParseLayoutKindError> {
        let kind: LayoutKind = name.parse()?;
        self.layout.set_layout_kind(kind);
        self.queue(ShellEvent::RebuildLayout { replace: false });
        Ok(kind)
    }

    /// Restore default providers and kind, then rebuild every region from them
    pub fn reset_layout(&mut self) {
        self.layout.reset_to_default();
        self.queue(ShellEvent::RebuildLayout { replace: true });
    }

    /// Persist the active kind. Failures are reported in the status text.
    pub fn save_layout(&mut self) -> bool {
        match self.layout.persist_kind_preference() {
            Ok(()) => {
                self.set_status(format!("Layout saved ({})", self.layout.layout_kind()));
                true
            }
            Err(error) => {
                warn!(shell_id = %self.id, error = %error, "Failed to save layout preference");
                self.set_status(format!("Failed to save layout: {error}"));
                false
            }
        }
    }

    /// Re-read the stored kind; missing or malformed state selects the default
    pub fn load_layout(&mut self) -> LayoutKind {
        let kind = self.layout.restore_kind_preference();
        self.queue(ShellEvent::RebuildLayout { replace: false });
        kind
    }

    pub fn exit(&mut self) {
        info!(shell_id = %self.id, "Exit requested");
        self.exit_requested = true;
        self.set_status("Exiting");
    }

    /// Run a command. Failures are reported in the status text and return false.
    pub fn execute(&mut self, command: ShellCommand) -> bool {
        debug!(shell_id = %self.id, command = %command, "Executing shell command");
        match command {
            ShellCommand::ChangeLayout(name) => match self.change_layout(&name) {
                Ok(_) => true,
                Err(error) => {
                    self.set_status(error.to_string());
                    false
                }
            },
            ShellCommand::ResetLayout => {
                self.reset_layout();
                true
            }
            ShellCommand::SaveLayout => self.save_layout(),
            ShellCommand::LoadLayout => {
                self.load_layout();
                true
            }
            ShellCommand::OpenWindow(window_id) => self.open_window(&window_id).is_some(),
            ShellCommand::PopulateCategory(category) => {
                self.populate_from_category(&category) > 0
            }
            ShellCommand::ToggleTheme => {
                self.theme.toggle();
                true
            }
            ShellCommand::Exit => {
                self.exit();
                true
            }
        }
    }

    // Window lifecycle

    /// Create a window from its factory into the factory's default region.
    ///
    /// A single-instance window that is already docked is activated instead.
    /// Returns the id of the created or activated window.
    pub fn open_window(&mut self, window_id: &str) -> Option<String> {
        let Some(factory) = self.factories.get(window_id) else {
            self.set_status(format!("Unknown window '{window_id}'"));
            return None;
        };

        if !factory.allow_multiple_instances() {
            if let Some(region) = self.region_of(window_id) {
                self.surfaces[region.index()].activate(window_id);
                return Some(window_id.to_string());
            }
            if self.floating.iter().any(|w| w.id == window_id) {
                return Some(window_id.to_string());
            }
        }

        let Some(window) = self.factories.create(window_id) else {
            self.set_status(format!("Failed to open '{}'", factory.display_name()));
            return None;
        };

        let instance_id = window.id.clone();
        let region = factory.default_region();
        self.closed.remove(&instance_id);
        self.surfaces[region.index()].add_window(window);
        info!(window_id = %window_id, instance_id = %instance_id, region = %region, "Window opened");
        self.set_status(format!("Opened {} in {region}", factory.display_name()));
        Some(instance_id)
    }

    /// Open one window from every factory in `category`. Single-instance
    /// windows that are already open are skipped. Returns the number opened.
    pub fn populate_from_category(&mut self, category: &str) -> usize {
        let factories = self.factories.list_by_category(category);
        let mut opened = 0;
        for factory in factories {
            if !factory.allow_multiple_instances() && self.is_open(factory.window_id()) {
                continue;
            }
            let Some(window) = self.factories.create(factory.window_id()) else {
                continue;
            };
            self.closed.remove(&window.id);
            self.surfaces[factory.default_region().index()].add_window(window);
            opened += 1;
        }

        info!(category = %category, opened, "Populated windows from category");
        self.set_status(format!("Opened {opened} window(s) from {category}"));
        opened
    }

    /// Float a docked window. Returns false when no region holds it or it cannot float.
    pub fn on_window_float_requested(&mut self, window_id: &str) -> bool {
        let Some(region) = self.region_of(window_id) else {
            return false;
        };
        let floated = self.surfaces[region.index()]
            .request_float(window_id)
            .is_some();
        self.process_events();
        floated
    }

    /// Close a docked window. Returns false when no region holds it or it cannot close.
    pub fn on_window_close_requested(&mut self, window_id: &str) -> bool {
        let Some(region) = self.region_of(window_id) else {
            return false;
        };
        let closed = self.surfaces[region.index()]
            .request_close(window_id)
            .is_some();
        self.process_events();
        closed
    }

    /// Return a floating window to `region`
    pub fn dock_floating(&mut self, window_id: &str, region: Region) -> bool {
        let Some(position) = self.floating.iter().position(|w| w.id == window_id) else {
            return false;
        };
        let mut window = self.floating.remove(position);
        window.is_floating = false;
        self.surfaces[region.index()].add_window(window);
        self.set_status(format!("Docked {window_id} in {region}"));
        true
    }

    // Drag and drop

    pub fn press(&mut self, region: Region, window_id: &str, point: Point) -> bool {
        self.surfaces[region.index()].press(window_id, point)
    }

    pub fn pointer_moved(
        &mut self,
        region: Region,
        point: Point,
        button_held: bool,
        now: Instant,
    ) -> Option<DragSession> {
        self.surfaces[region.index()].pointer_moved(point, button_held, now)
    }

    /// Hover over `target`. The source's failsafe restarts too, so a drag held
    /// over another region is not reset under the user.
    pub fn on_drag_over(&mut self, target: Region, session: &DragSession, now: Instant) -> DragEffect {
        if session.source != target {
            self.surfaces[session.source.index()].keep_alive(now);
        }
        self.surfaces[target.index()].drag_over(session, now)
    }

    pub fn on_drag_leave(&mut self, target: Region) {
        self.surfaces[target.index()].drag_leave();
    }

    /// Drop onto `target`. An accepted drop moves the window before this returns.
    ///
    /// A session the source surface has already abandoned (reset, closed or
    /// floated mid-drag) is rejected.
    pub fn on_drop(&mut self, target: Region, session: DragSession) -> DragOutcome {
        let source = session.source;
        let window_id = session.window.id.as_str();
        let source_surface = &self.surfaces[source.index()];
        if source_surface.dragged_window_id() != Some(window_id)
            || !source_surface.contains(window_id)
        {
            let reason = format!("{source} is no longer dragging {window_id}");
            let outcome = self.surfaces[target.index()].reject_drop(window_id.to_string(), reason);
            self.process_events();
            return outcome;
        }

        let outcome = self.surfaces[target.index()].drop(session);
        if !matches!(outcome, DragOutcome::DropAccepted { .. }) && source != target {
            self.surfaces[source.index()].drag_completed(DragEffect::None);
        }
        self.process_events();
        outcome
    }

    pub fn release(&mut self, region: Region, over_target: bool) {
        self.surfaces[region.index()].release(over_target);
    }

    pub fn drag_completed(&mut self, region: Region, effect: DragEffect) {
        self.surfaces[region.index()].drag_completed(effect);
    }

    /// Cancel drags on every surface. Returns whether any was cancelled.
    pub fn escape(&mut self) -> bool {
        self.surfaces
            .iter_mut()
            .fold(false, |cancelled, surface| surface.escape() || cancelled)
    }

    /// Fire due drag timers on every surface
    pub fn tick(&mut self, now: Instant) {
        for surface in &mut self.surfaces {
            surface.tick(now);
        }
    }

    // Event processing

    /// Apply every queued notification and message. Returns the number processed.
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            if self.disposed {
                continue;
            }
            trace!(shell_id = %self.id, event = ?event, "Processing shell event");
            match event {
                ShellEvent::Message(message) => self.handle_message(message),
                ShellEvent::LayoutChanged(change) => self.handle_layout_changed(change),
                ShellEvent::ThemeChanged(change) => {
                    self.set_status(format!("Theme: {}", change.new));
                }
                ShellEvent::Surface(region, event) => self.handle_surface_event(region, event),
                ShellEvent::RebuildLayout { replace } => self.rebuild_layout(replace),
            }
            processed += 1;
        }
        processed
    }

    fn queue(&self, event: ShellEvent) {
        // The receiver lives as long as the shell
        let _ = self.event_tx.send(event);
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_text = text.into();
        debug!(shell_id = %self.id, status = %self.status_text, "Status text updated");
    }

    fn handle_message(&mut self, message: Message) {
        if message.sender_id() == self.id {
            return;
        }

        match message.kind() {
            MessageType::Custom(name) if name == COMMAND_MESSAGE => {
                let Some(text) = message.text() else {
                    self.set_status("Command message without text");
                    return;
                };
                match text.parse::<ShellCommand>() {
                    Ok(command) => {
                        self.execute(command);
                    }
                    Err(error) => {
                        warn!(sender_id = %message.sender_id(), error = %error, "Rejected shell command");
                        self.set_status(error.to_string());
                    }
                }
            }
            MessageType::Progress => {
                let content = message.content();
                let completed = content["completed"].as_u64().unwrap_or(0);
                let total = content["total"].as_u64().unwrap_or(0);
                self.set_status(format!("{}: {completed}/{total}", message.sender_id()));
            }
            MessageType::Error => {
                let detail = message
                    .content()
                    .get("error")
                    .and_then(|value| value.as_str())
                    .or_else(|| message.text())
                    .unwrap_or("unknown error");
                self.set_status(format!("{} failed: {detail}", message.sender_id()));
            }
            _ => {
                if let Some(text) = message.text() {
                    self.set_status(text.to_string());
                } else {
                    trace!(kind = %message.kind(), "Ignoring message without text");
                }
            }
        }
    }

    fn handle_layout_changed(&mut self, change: LayoutChanged) {
        self.apply_visibility(change.new);
        self.set_status(format!("Layout: {}", change.new));
        if let Err(error) = self.announce(format!("Layout changed to {}", change.new)) {
            debug!(error = %error, "Layout change not announced");
        }
    }

    fn handle_surface_event(&mut self, region: Region, event: SurfaceEvent) {
        match event {
            SurfaceEvent::WindowDropped {
                window,
                source,
                target,
            } => {
                if source == target && self.surfaces[target.index()].contains(&window.id) {
                    self.surfaces[target.index()].activate(&window.id);
                    return;
                }
                self.surfaces[source.index()].drag_completed(DragEffect::Move);
                let Some(moved) = self.surfaces[source.index()].take_window(&window.id) else {
                    warn!(
                        window_id = %window.id,
                        source = %source,
                        "Dropped window left its region mid-drag"
                    );
                    return;
                };
                let window_id = moved.id.clone();
                self.surfaces[target.index()].add_window(moved);
                info!(window_id = %window_id, source = %source, target = %target, "Window moved");
                self.set_status(format!("Moved {window_id} to {target}"));
            }
            SurfaceEvent::FloatRequested { window } => {
                self.set_status(format!("Floating {}", window.title));
                self.floating.push(window);
            }
            SurfaceEvent::CloseRequested { window } => {
                self.set_status(format!("Closed {}", window.title));
                self.closed.insert(window.id);
            }
            SurfaceEvent::DragCancelled { reason } => {
                debug!(region = %region, reason = ?reason, "Drag cancelled");
            }
            other => {
                trace!(region = %region, event = other.name(), "Surface event");
            }
        }
    }

    /// Reconcile region contents with freshly built provider output.
    ///
    /// Without `replace`, windows already docked, floating or closed are kept
    /// where they are and only missing ones are added.
    fn rebuild_layout(&mut self, replace: bool) {
        let snapshot = self.layout.build_snapshot();
        let kind = snapshot.layout_kind;

        if replace {
            self.closed.clear();
            for (region, windows) in snapshot.into_regions() {
                self.floating
                    .retain(|floating| !windows.iter().any(|w| w.id == floating.id));
                self.surfaces[region.index()].set_windows(windows);
            }
        } else {
            let mut added = 0;
            for (region, windows) in snapshot.into_regions() {
                let missing: Vec<DockableWindow> = windows
                    .into_iter()
                    .filter(|w| !self.is_open(&w.id) && !self.closed.contains(&w.id))
                    .collect();
                added += self.surfaces[region.index()]
                    .windows_mut()
                    .merge_missing(missing);
            }
            debug!(added, "Layout reconciled");
        }

        self.apply_visibility(kind);
        info!(
            shell_id = %self.id,
            layout_kind = %kind,
            replace,
            window_count = self.open_window_count(),
            "Layout rebuilt"
        );
    }

    fn apply_visibility(&mut self, kind: LayoutKind) {
        for surface in &mut self.surfaces {
            let active = kind.is_region_active(surface.region());
            surface.set_visible(active);
        }
    }

    fn announce(&self, text: String) -> Result<usize, BusError> {
        self.bus
            .publish_new(MessageType::StatusChange, &self.id, text, None)
    }

    /// Unsubscribe from the bus and detach every listener. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        self.bus.unsubscribe(&self.id);
        self.layout.notifications().detach(&self.id);
        self.theme.notifications().detach(&self.id);
        for surface in &mut self.surfaces {
            surface.notifications().detach(&self.id);
            surface.reset_state();
        }
        info!(shell_id = %self.id, "Shell controller disposed");
    }
}

impl Drop for ShellController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for ShellController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellController")
            .field("id", &self.id)
            .field("layout_kind", &self.layout.layout_kind())
            .field("theme", &self.theme.active())
            .field("surfaces", &self.surfaces)
            .field("floating", &self.floating.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
