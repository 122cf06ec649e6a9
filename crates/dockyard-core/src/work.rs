// ABOUTME: Background work runner reporting progress over the message bus
// ABOUTME: Units run on a tokio blocking worker and stop between units when cancelled

use dockyard_events::{MessageBus, MessageType};
use dockyard_logging::{debug, panic_message, warn};
use std::panic::{self, AssertUnwindSafe};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How a background job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkOutcome {
    Completed { units: usize },
    Cancelled { completed: usize },
    Failed { completed: usize, error: String },
}

/// Run `work` over `units` on a blocking worker thread.
///
/// Each finished unit publishes a `Progress` broadcast from `sender_id` with
/// `{ "completed": n, "total": t }`. Cancellation is checked before every unit.
/// A unit that errors or panics ends the job with `Failed` and an `Error`
/// broadcast. Must be called from within a tokio runtime.
pub fn spawn_work<T, F>(
    bus: MessageBus,
    sender_id: impl Into<String>,
    units: Vec<T>,
    cancel: CancellationToken,
    work: F,
) -> JoinHandle<WorkOutcome>
where
    T: Send + 'static,
    F: Fn(T) -> anyhow::Result<()> + Send + 'static,
{
    let sender_id = sender_id.into();
    tokio::task::spawn_blocking(move || {
        let total = units.len();
        debug!(sender_id = %sender_id, total, "Background work started");

        for (index, unit) in units.into_iter().enumerate() {
            if cancel.is_cancelled() {
                debug!(sender_id = %sender_id, completed = index, "Background work cancelled");
                publish(
                    &bus,
                    MessageType::StatusChange,
                    &sender_id,
                    serde_json::json!({ "cancelled": true, "completed": index, "total": total }),
                );
                return WorkOutcome::Cancelled { completed: index };
            }

            let error = match panic::catch_unwind(AssertUnwindSafe(|| work(unit))) {
                Ok(Ok(())) => None,
                Ok(Err(error)) => Some(format!("{error:#}")),
                Err(payload) => Some(panic_message(&*payload)),
            };
            if let Some(error) = error {
                warn!(sender_id = %sender_id, completed = index, error = %error, "Background work failed");
                publish(
                    &bus,
                    MessageType::Error,
                    &sender_id,
                    serde_json::json!({ "error": error, "completed": index, "total": total }),
                );
                return WorkOutcome::Failed {
                    completed: index,
                    error,
                };
            }

            publish(
                &bus,
                MessageType::Progress,
                &sender_id,
                serde_json::json!({ "completed": index + 1, "total": total }),
            );
        }

        debug!(sender_id = %sender_id, total, "Background work completed");
        WorkOutcome::Completed { units: total }
    })
}

fn publish(bus: &MessageBus, kind: MessageType, sender_id: &str, content: serde_json::Value) {
    if let Err(error) = bus.publish_new(kind, sender_id, content, None) {
        warn!(sender_id = %sender_id, error = %error, "Failed to publish work status");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dockyard_events::Message;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn progress_recorder(bus: &MessageBus) -> Arc<Mutex<Vec<Message>>> {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        bus.subscribe("observer", move |message| {
            sink.lock().push(message.clone());
            Ok(())
        })
        .unwrap();
        received
    }

    #[tokio::test]
    async fn test_completed_work_reports_progress() {
        let bus = MessageBus::new();
        let received = progress_recorder(&bus);

        let outcome = spawn_work(
            bus.clone(),
            "indexer",
            vec![1, 2, 3],
            CancellationToken::new(),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert_eq!(outcome, WorkOutcome::Completed { units: 3 });
        let received = received.lock();
        assert_eq!(received.len(), 3);
        assert!(received.iter().all(|m| *m.kind() == MessageType::Progress));
        assert_eq!(received[2].content()["completed"], 3);
        assert_eq!(received[2].content()["total"], 3);
    }

    #[tokio::test]
    async fn test_cancellation_between_units() {
        let bus = MessageBus::new();
        let received = progress_recorder(&bus);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        let outcome = spawn_work(bus.clone(), "indexer", vec![0, 1, 2, 3], cancel, move |unit| {
            if unit == 1 {
                trigger.cancel();
            }
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(outcome, WorkOutcome::Cancelled { completed: 2 });
        let kinds: Vec<MessageType> = received.lock().iter().map(|m| m.kind().clone()).collect();
        assert_eq!(
            kinds,
            vec![
                MessageType::Progress,
                MessageType::Progress,
                MessageType::StatusChange
            ]
        );
    }

    #[tokio::test]
    async fn test_failing_unit_stops_work() {
        let bus = MessageBus::new();
        let received = progress_recorder(&bus);

        let outcome = spawn_work(bus.clone(), "indexer", vec![0, 1, 2], CancellationToken::new(), |unit| {
            if unit == 1 {
                anyhow::bail!("unit {unit} unreadable");
            }
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(
            outcome,
            WorkOutcome::Failed {
                completed: 1,
                error: "unit 1 unreadable".to_string()
            }
        );
        assert_eq!(*received.lock().last().unwrap().kind(), MessageType::Error);
    }

    #[tokio::test]
    async fn test_panicking_unit_is_contained() {
        let bus = MessageBus::new();
        let outcome = spawn_work(bus, "indexer", vec![()], CancellationToken::new(), |_| {
            panic!("worker exploded")
        })
        .await
        .unwrap();

        assert!(matches!(outcome, WorkOutcome::Failed { completed: 0, ref error } if error == "worker exploded"));
    }
}
