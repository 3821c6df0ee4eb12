//! The 100-slot buffered channel between the pod-log producer and the
//! WebSocket writer (§4.G, §5 "Backpressure": if full, the oldest frame is
//! dropped — lossy streaming is the contract). Grounded on
//! `reconciler::queue::ReconcilerQueue`'s `Mutex<VecDeque>` + `Notify`
//! shape, with capacity enforced by eviction instead of a full-queue error.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::Notify;

use crate::frame::LogFrame;

pub struct LossyFrameBuffer {
    capacity: usize,
    queue: Mutex<VecDeque<LogFrame>>,
    notify: Notify,
    closed: Mutex<bool>,
}

impl LossyFrameBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            closed: Mutex::new(false),
        }
    }

    /// Drops the oldest buffered frame when at capacity rather than
    /// rejecting the push or blocking the producer.
    pub fn push(&self, frame: LogFrame) {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(frame);
        drop(queue);
        self.notify.notify_one();
    }

    pub fn close(&self) {
        *self.closed.lock().unwrap() = true;
        self.notify.notify_waiters();
    }

    /// Waits for the next frame, or returns `None` once the buffer has
    /// been closed and drained.
    pub async fn recv(&self) -> Option<LogFrame> {
        loop {
            {
                let mut queue = self.queue.lock().unwrap();
                if let Some(frame) = queue.pop_front() {
                    return Some(frame);
                }
                if *self.closed.lock().unwrap() {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn push_past_capacity_drops_oldest() {
        let buffer = LossyFrameBuffer::new(2);
        buffer.push(LogFrame::Log { line: "one".to_string() });
        buffer.push(LogFrame::Log { line: "two".to_string() });
        buffer.push(LogFrame::Log { line: "three".to_string() });

        assert_eq!(buffer.len(), 2);
        let first = buffer.recv().await.unwrap();
        assert_eq!(first, LogFrame::Log { line: "two".to_string() });
    }

    #[tokio::test]
    async fn recv_returns_none_after_close_and_drain() {
        let buffer = Arc::new(LossyFrameBuffer::new(4));
        buffer.push(LogFrame::Connected);
        buffer.close();

        assert_eq!(buffer.recv().await, Some(LogFrame::Connected));
        assert_eq!(buffer.recv().await, None);
    }

    #[tokio::test]
    async fn recv_waits_for_a_push() {
        let buffer = Arc::new(LossyFrameBuffer::new(4));
        let reader = Arc::clone(&buffer);
        let handle = tokio::spawn(async move { reader.recv().await });

        tokio::task::yield_now().await;
        buffer.push(LogFrame::Disconnected);

        assert_eq!(handle.await.unwrap(), Some(LogFrame::Disconnected));
    }
}
