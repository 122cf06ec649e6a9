// ABOUTME: Ordered window collection for one docking region
// ABOUTME: Tracks the active window and activation history without knowing about rendering

use dockyard_types::DockableWindow;

const HISTORY_LIMIT: usize = 20;

/// Windows hosted by a region, in tab order
#[derive(Debug, Clone, Default)]
pub struct WindowCollection {
    windows: Vec<DockableWindow>,
    active: Option<usize>,
    history: Vec<String>,
}

impl WindowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection in the given order with the first window active.
    /// Later duplicates of an id are dropped.
    pub fn from_windows(windows: Vec<DockableWindow>) -> Self {
        let mut collection = Self::new();
        collection.merge_missing(windows);
        if let Some(first) = collection.windows.first().map(|w| w.id.clone()) {
            collection.set_active(&first);
        }
        collection
    }

    /// Add a window and make it active. A window with the same id is replaced in place.
    pub fn add(&mut self, window: DockableWindow) {
        let id = window.id.clone();
        match self.windows.iter().position(|w| w.id == id) {
            Some(index) => self.windows[index] = window,
            None => self.windows.push(window),
        }
        self.set_active(&id);
    }

    /// Append windows whose ids are not present yet, keeping the current active window.
    /// Returns how many were added.
    pub fn merge_missing(&mut self, windows: Vec<DockableWindow>) -> usize {
        let mut added = 0;
        for window in windows {
            if !self.contains(&window.id) {
                self.windows.push(window);
                added += 1;
            }
        }
        if self.active.is_none() && !self.windows.is_empty() {
            self.active = Some(0);
        }
        added
    }

    pub fn remove(&mut self, id: &str) -> Option<DockableWindow> {
        let index = self.windows.iter().position(|w| w.id == id)?;
        let window = self.windows.remove(index);

        if let Some(active) = self.active {
            if active == index {
                self.active = if self.windows.is_empty() {
                    None
                } else {
                    Some(index.min(self.windows.len() - 1))
                };
            } else if active > index {
                self.active = Some(active - 1);
            }
        }

        self.history.retain(|h| h != id);
        Some(window)
    }

    pub fn windows(&self) -> &[DockableWindow] {
        &self.windows
    }

    pub fn ids(&self) -> Vec<String> {
        self.windows.iter().map(|w| w.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&DockableWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut DockableWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.windows.iter().any(|w| w.id == id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Make `id` the active window. Returns false if it is not in the collection.
    pub fn set_active(&mut self, id: &str) -> bool {
        let Some(index) = self.windows.iter().position(|w| w.id == id) else {
            return false;
        };
        self.active = Some(index);

        self.history.retain(|h| h != id);
        self.history.push(id.to_string());
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
        true
    }

    pub fn active(&self) -> Option<&DockableWindow> {
        self.active.and_then(|i| self.windows.get(i))
    }

    /// Previously active window, most recent first
    pub fn previous_active(&self) -> Option<&str> {
        self.history
            .iter()
            .rev()
            .nth(1)
            .map(String::as_str)
    }

    pub fn next_id(&self) -> Option<String> {
        let active = self.active?;
        let next = (active + 1) % self.windows.len();
        Some(self.windows[next].id.clone())
    }

    pub fn prev_id(&self) -> Option<String> {
        let active = self.active?;
        let prev = if active == 0 {
            self.windows.len() - 1
        } else {
            active - 1
        };
        Some(self.windows[prev].id.clone())
    }

    pub fn clear(&mut self) -> Vec<DockableWindow> {
        self.active = None;
        self.history.clear();
        std::mem::take(&mut self.windows)
    }
}
