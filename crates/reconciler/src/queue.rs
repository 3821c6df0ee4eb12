use std::collections::VecDeque;
use std::sync::Mutex;

use core_types::EntityId;
use tokio::sync::Notify;
use tracing::debug;

use crate::error::{ReconcileError, ReconcileResult};

/// Reconciliation priorities (§4.E): 1 = user-action/auto-deploy, 2 =
/// drift/health check (also used for backoff retries), 3 = periodic sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    UserAction = 1,
    DriftCheck = 2,
    PeriodicSweep = 3,
}

struct QueueState {
    p1: VecDeque<EntityId>,
    p2: VecDeque<EntityId>,
    p3: VecDeque<EntityId>,
    len: usize,
}

/// A bounded priority queue: enqueue is non-blocking and returns a
/// queue-full error when at capacity (§4.E "Enqueue is non-blocking; if the
/// queue is full, enqueue returns a queue-full error and the caller logs
/// it"). A fixed pool of workers drains it cooperatively via [`Self::dequeue`],
/// which waits on a [`Notify`] rather than busy-polling.
pub struct ReconcilerQueue {
    capacity: usize,
    state: Mutex<QueueState>,
    notify: Notify,
}

impl ReconcilerQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(QueueState {
                p1: VecDeque::new(),
                p2: VecDeque::new(),
                p3: VecDeque::new(),
                len: 0,
            }),
            notify: Notify::new(),
        }
    }

    pub fn enqueue(&self, deployment_id: EntityId, priority: Priority) -> ReconcileResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.len >= self.capacity {
            return Err(ReconcileError::QueueFull);
        }
        match priority {
            Priority::UserAction => state.p1.push_back(deployment_id),
            Priority::DriftCheck => state.p2.push_back(deployment_id),
            Priority::PeriodicSweep => state.p3.push_back(deployment_id),
        }
        state.len += 1;
        drop(state);
        self.notify.notify_one();
        debug!(?priority, %deployment_id, "enqueued reconciliation");
        Ok(())
    }

    /// Waits until an item is available, then returns the highest-priority
    /// one (lowest numeric priority value first).
    pub async fn dequeue(&self) -> EntityId {
        loop {
            {
                let mut state = self.state.lock().unwrap();
                let popped = state
                    .p1
                    .pop_front()
                    .or_else(|| state.p2.pop_front())
                    .or_else(|| state.p3.pop_front());
                if let Some(id) = popped {
                    state.len -= 1;
                    return id;
                }
            }
            self.notify.notified().await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priority_dequeues_first() {
        let queue = ReconcilerQueue::new(10);
        let low = EntityId::new();
        let high = EntityId::new();
        queue.enqueue(low, Priority::PeriodicSweep).unwrap();
        queue.enqueue(high, Priority::UserAction).unwrap();

        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let first = rt.block_on(queue.dequeue());
        assert_eq!(first, high);
        let second = rt.block_on(queue.dequeue());
        assert_eq!(second, low);
    }

    #[test]
    fn enqueue_past_capacity_is_rejected() {
        let queue = ReconcilerQueue::new(1);
        queue.enqueue(EntityId::new(), Priority::UserAction).unwrap();
        let err = queue.enqueue(EntityId::new(), Priority::UserAction).unwrap_err();
        assert!(matches!(err, ReconcileError::QueueFull));
    }
}
