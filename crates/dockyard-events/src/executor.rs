// ABOUTME: UI-thread executor capability used to marshal work onto the UI loop
// ABOUTME: UiQueue is a tokio channel drained by the owning thread on each loop iteration

use parking_lot::Mutex;
use std::thread::{self, ThreadId};
use tokio::sync::mpsc;

/// Work item scheduled onto the UI thread
pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Capability for running work on the UI thread
pub trait UiExecutor: Send + Sync {
    /// Whether the calling thread is the UI thread
    fn is_ui_thread(&self) -> bool;

    /// Queue a task for the UI thread. Tasks run in scheduling order.
    fn schedule(&self, task: UiTask);
}

/// FIFO task queue owned by the thread that created it
pub struct UiQueue {
    owner: ThreadId,
    sender: mpsc::UnboundedSender<UiTask>,
    receiver: Mutex<mpsc::UnboundedReceiver<UiTask>>,
}

impl UiQueue {
    /// Create a queue owned by the calling thread
    pub fn for_current_thread() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            owner: thread::current().id(),
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Run every task queued so far. Returns the number of tasks run.
    ///
    /// Tasks scheduled while draining are left for the next call. Calls from
    /// any thread other than the owner run nothing.
    pub fn run_pending(&self) -> usize {
        if !self.is_ui_thread() {
            tracing::warn!("UiQueue::run_pending called off the UI thread; ignoring");
            return 0;
        }

        let tasks: Vec<UiTask> = {
            let mut receiver = self.receiver.lock();
            let mut tasks = Vec::new();
            while let Ok(task) = receiver.try_recv() {
                tasks.push(task);
            }
            tasks
        };

        let count = tasks.len();
        for task in tasks {
            task();
        }
        if count > 0 {
            tracing::trace!(task_count = count, "Ran pending UI tasks");
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.receiver.lock().len()
    }
}

impl UiExecutor for UiQueue {
    fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    fn schedule(&self, task: UiTask) {
        // The receiver lives as long as the queue, so sending cannot fail
        let _ = self.sender.send(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tasks_run_in_order_on_owner() {
        let queue = UiQueue::for_current_thread();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = seen.clone();
            queue.schedule(Box::new(move || seen.lock().push(i)));
        }
        assert_eq!(queue.pending_count(), 3);
        assert!(seen.lock().is_empty());

        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn test_other_threads_are_not_ui() {
        let queue = Arc::new(UiQueue::for_current_thread());
        assert!(queue.is_ui_thread());

        let remote = queue.clone();
        let (is_ui, ran) = thread::spawn(move || {
            remote.schedule(Box::new(|| {}));
            (remote.is_ui_thread(), remote.run_pending())
        })
        .join()
        .unwrap();

        assert!(!is_ui);
        assert_eq!(ran, 0);
        assert_eq!(queue.run_pending(), 1);
    }

    #[test]
    fn test_task_scheduled_while_draining_waits() {
        let queue = Arc::new(UiQueue::for_current_thread());
        let inner = queue.clone();
        queue.schedule(Box::new(move || inner.schedule(Box::new(|| {}))));

        assert_eq!(queue.run_pending(), 1);
        assert_eq!(queue.run_pending(), 1);
    }
}
