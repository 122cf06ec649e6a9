// ABOUTME: Typed notification emitter with one listener per consumer id
// ABOUTME: Listener panics are contained and counted, never propagated to the emitter's owner

use dockyard_logging::{panic_message, report_isolated_failure};
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::EmitterError;

pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Outcome of a single `emit` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    pub delivered: usize,
    pub failed: usize,
}

impl EmitReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Notification source that consumers attach to by id.
///
/// Cloning yields another handle to the same listener list.
pub struct EventEmitter<E> {
    name: &'static str,
    listeners: Arc<RwLock<Vec<(String, Listener<E>)>>>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            listeners: self.listeners.clone(),
        }
    }
}

impl<E> EventEmitter<E> {
    /// `name` identifies the emitter in failure logs
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn attach<F>(&self, consumer_id: impl Into<String>, listener: F) -> Result<(), EmitterError>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let consumer_id = consumer_id.into();
        let mut listeners = self.listeners.write();
        if listeners.iter().any(|(id, _)| *id == consumer_id) {
            return Err(EmitterError::AlreadyAttached { consumer_id });
        }
        tracing::debug!(emitter = self.name, consumer_id = %consumer_id, "Listener attached");
        listeners.push((consumer_id, Arc::new(listener)));
        Ok(())
    }

    /// Remove a consumer's listener. Returns whether one was attached.
    pub fn detach(&self, consumer_id: &str) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| id != consumer_id);
        let removed = listeners.len() != before;
        if removed {
            tracing::debug!(emitter = self.name, consumer_id = %consumer_id, "Listener detached");
        }
        removed
    }

    pub fn is_attached(&self, consumer_id: &str) -> bool {
        self.listeners.read().iter().any(|(id, _)| id == consumer_id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Deliver an event to every listener in attach order
    pub fn emit(&self, event: &E) -> EmitReport {
        // Snapshot so listeners may attach or detach while being notified
        let listeners: Vec<(String, Listener<E>)> = self.listeners.read().clone();

        let mut report = EmitReport::default();
        for (consumer_id, listener) in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    report_isolated_failure(self.name, &consumer_id, &panic_message(&*payload));
                }
            }
        }
        report
    }
}
