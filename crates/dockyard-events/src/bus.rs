// ABOUTME: Thread-safe publish/subscribe message bus keyed by recipient id
// ABOUTME: Handler failures are contained per recipient; UI-affine handlers are marshalled via UiExecutor

use dockyard_logging::{panic_message, report_isolated_failure};
use dockyard_types::BusConfig;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use tokio::sync::broadcast;

use crate::error::{BusError, HandlerError};
use crate::executor::UiExecutor;
use crate::message::{Message, MessageType};

pub type MessageHandler = Arc<dyn Fn(&Message) -> Result<(), HandlerError> + Send + Sync>;

/// Execution context a handler was registered from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// Registered on the UI thread; always invoked there
    Ui,
    /// Registered elsewhere; invoked on the publishing thread
    Worker,
}

#[derive(Clone)]
struct Subscription {
    handler: MessageHandler,
    affinity: Affinity,
}

struct BusInner {
    subscribers: RwLock<HashMap<String, Subscription>>,
    any_sender: broadcast::Sender<Message>,
    executor: Option<Arc<dyn UiExecutor>>,
    disposed: AtomicBool,
    config: BusConfig,
}

/// Shared handle to a message bus. Clones refer to the same bus.
#[derive(Clone)]
pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Bus without a UI executor: every handler runs on the publishing thread
    pub fn with_config(config: BusConfig) -> Self {
        Self::build(config, None)
    }

    /// Bus that marshals UI-affine handlers through `executor`
    pub fn with_executor(config: BusConfig, executor: Arc<dyn UiExecutor>) -> Self {
        Self::build(config, Some(executor))
    }

    fn build(config: BusConfig, executor: Option<Arc<dyn UiExecutor>>) -> Self {
        let (any_sender, _) = broadcast::channel(config.any_message_capacity.max(1));
        Self {
            inner: Arc::new(BusInner {
                subscribers: RwLock::new(HashMap::new()),
                any_sender,
                executor,
                disposed: AtomicBool::new(false),
                config,
            }),
        }
    }

    /// Register `handler` for `recipient_id`, replacing any existing handler.
    ///
    /// The handler's affinity is taken from the calling thread.
    pub fn subscribe<F>(&self, recipient_id: impl Into<String>, handler: F) -> Result<(), BusError>
    where
        F: Fn(&Message) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let recipient_id = recipient_id.into();
        if recipient_id.trim().is_empty() {
            return Err(BusError::InvalidArgument(
                "recipient_id must not be empty".to_string(),
            ));
        }

        let affinity = self.current_affinity();
        let replaced = {
            let mut subscribers = self.inner.subscribers.write();
            if self.is_disposed() {
                return Err(BusError::Disposed);
            }
            subscribers
                .insert(
                    recipient_id.clone(),
                    Subscription {
                        handler: Arc::new(handler),
                        affinity,
                    },
                )
                .is_some()
        };

        tracing::debug!(
            recipient_id = %recipient_id,
            affinity = ?affinity,
            replaced,
            "Subscribed to message bus"
        );
        Ok(())
    }

    /// Remove the handler for `recipient_id`. Returns whether one existed.
    pub fn unsubscribe(&self, recipient_id: &str) -> bool {
        let removed = self.inner.subscribers.write().remove(recipient_id).is_some();
        if removed {
            tracing::debug!(recipient_id = %recipient_id, "Unsubscribed from message bus");
        }
        removed
    }

    /// Deliver `message` to its target, or to every subscriber when it has none.
    ///
    /// Returns the number of recipients the message was dispatched to. After
    /// `dispose` this is always `Ok(0)`.
    pub fn publish(&self, message: Message) -> Result<usize, BusError> {
        if message.sender_id().trim().is_empty() {
            return Err(BusError::InvalidArgument(
                "message sender_id must not be empty".to_string(),
            ));
        }
        if matches!(message.target_id(), Some(target) if target.trim().is_empty()) {
            return Err(BusError::InvalidArgument(
                "message target_id must not be blank".to_string(),
            ));
        }
        if self.is_disposed() {
            tracing::trace!(sender_id = %message.sender_id(), "Publish after dispose ignored");
            return Ok(0);
        }

        // No observers is not an error
        let _ = self.inner.any_sender.send(message.clone());

        let dispatched = match message.target_id() {
            Some(target) => {
                let subscription = self.inner.subscribers.read().get(target).cloned();
                match subscription {
                    Some(subscription) => {
                        self.dispatch(target, &subscription, &message);
                        1
                    }
                    None => {
                        tracing::trace!(target_id = %target, "No subscriber for targeted message");
                        0
                    }
                }
            }
            None => self.broadcast(&message),
        };

        tracing::trace!(
            kind = %message.kind(),
            sender_id = %message.sender_id(),
            dispatched,
            "Message published"
        );
        Ok(dispatched)
    }

    /// Construct and publish a message in one call
    pub fn publish_new(
        &self,
        kind: MessageType,
        sender_id: &str,
        content: impl Into<serde_json::Value>,
        target_id: Option<&str>,
    ) -> Result<usize, BusError> {
        let mut message = Message::new(kind, sender_id, content);
        if let Some(target) = target_id {
            message = message.to(target);
        }
        self.publish(message)
    }

    /// Recipient ids with a registered handler, sorted
    pub fn list_active_subscribers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.subscribers.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Observe every published message.
    ///
    /// Sending never blocks; a receiver that falls behind by more than the
    /// configured capacity sees `RecvError::Lagged`.
    pub fn subscribe_any(&self) -> broadcast::Receiver<Message> {
        self.inner.any_sender.subscribe()
    }

    /// Clear all subscriptions and refuse new ones. Idempotent.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let count = {
            let mut subscribers = self.inner.subscribers.write();
            let count = subscribers.len();
            subscribers.clear();
            count
        };
        tracing::debug!(cleared_subscriptions = count, "Message bus disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::SeqCst)
    }

    fn current_affinity(&self) -> Affinity {
        match &self.inner.executor {
            Some(executor) if executor.is_ui_thread() => Affinity::Ui,
            _ => Affinity::Worker,
        }
    }

    fn broadcast(&self, message: &Message) -> usize {
        let subscribers: Vec<(String, Subscription)> = self
            .inner
            .subscribers
            .read()
            .iter()
            .map(|(id, subscription)| (id.clone(), subscription.clone()))
            .collect();

        let (ui, worker): (Vec<_>, Vec<_>) = subscribers
            .into_iter()
            .partition(|(_, subscription)| subscription.affinity == Affinity::Ui);

        for (recipient_id, subscription) in &ui {
            self.dispatch(recipient_id, subscription, message);
        }

        if self.runs_in_parallel(worker.len()) {
            thread::scope(|scope| {
                for (recipient_id, subscription) in &worker {
                    scope.spawn(move || invoke_isolated(recipient_id, &subscription.handler, message));
                }
            });
        } else {
            for (recipient_id, subscription) in &worker {
                invoke_isolated(recipient_id, &subscription.handler, message);
            }
        }

        ui.len() + worker.len()
    }

    /// Thread-per-recipient fan-out only pays off for larger broadcasts
    fn runs_in_parallel(&self, worker_count: usize) -> bool {
        let config = &self.inner.config;
        config.parallel_broadcast && worker_count >= config.parallel_threshold.max(2)
    }

    fn dispatch(&self, recipient_id: &str, subscription: &Subscription, message: &Message) {
        if subscription.affinity == Affinity::Ui {
            if let Some(executor) = &self.inner.executor {
                if !executor.is_ui_thread() {
                    executor.schedule(self.scheduled_delivery(recipient_id, subscription, message));
                    return;
                }
            }
        }
        invoke_isolated(recipient_id, &subscription.handler, message);
    }

    /// Deferred delivery that is skipped if the recipient unsubscribed or
    /// re-subscribed before the UI thread got to it
    fn scheduled_delivery(
        &self,
        recipient_id: &str,
        subscription: &Subscription,
        message: &Message,
    ) -> Box<dyn FnOnce() + Send + 'static> {
        let bus: Weak<BusInner> = Arc::downgrade(&self.inner);
        let recipient_id = recipient_id.to_string();
        let handler = subscription.handler.clone();
        let message = message.clone();

        Box::new(move || {
            let Some(bus) = bus.upgrade() else {
                return;
            };
            let current = bus.subscribers.read().get(&recipient_id).cloned();
            match current {
                Some(current) if same_handler(&current.handler, &handler) => {
                    invoke_isolated(&recipient_id, &handler, &message);
                }
                _ => {
                    tracing::trace!(
                        recipient_id = %recipient_id,
                        "Dropping marshalled message for departed recipient"
                    );
                }
            }
        })
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageBus")
            .field("subscribers", &self.subscriber_count())
            .field("disposed", &self.is_disposed())
            .field("has_executor", &self.inner.executor.is_some())
            .finish()
    }
}

fn same_handler(a: &MessageHandler, b: &MessageHandler) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

fn invoke_isolated(recipient_id: &str, handler: &MessageHandler, message: &Message) {
    match panic::catch_unwind(AssertUnwindSafe(|| handler(message))) {
        Ok(Ok(())) => {}
        Ok(Err(error)) => {
            report_isolated_failure("message_bus", recipient_id, &error.to_string());
        }
        Err(payload) => {
            report_isolated_failure("message_bus", recipient_id, &panic_message(&*payload));
        }
    }
}
