//! Live log streaming
//!
//! Fans out operational log lines, in publish order, to any number of
//! independently-paced subscribers. The shared in-memory sequence is the
//! buffer: each subscriber tracks an absolute cursor into it, so a slow
//! consumer simply catches up later instead of dropping lines. The sequence
//! rotates past a configurable cap to bound memory.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::time::timeout;

#[derive(Debug, Default)]
struct LineBuffer {
    lines: VecDeque<String>,
    /// Absolute index of the oldest retained line
    start: usize,
}

impl LineBuffer {
    fn end(&self) -> usize {
        self.start + self.lines.len()
    }
}

#[derive(Debug)]
struct Shared {
    buffer: RwLock<LineBuffer>,
    wake: Notify,
    capacity: usize,
    poll_interval: Duration,
}

/// Fan-out publisher for operational log lines
///
/// Cheap to clone; all clones publish into the same sequence. Publishing
/// appends under a brief lock and wakes parked subscribers; it never blocks
/// on a subscriber.
#[derive(Debug, Clone)]
pub struct LogBroadcaster {
    shared: Arc<Shared>,
}

impl LogBroadcaster {
    /// Create a broadcaster retaining at most `capacity` lines, with the
    /// given subscriber wake fallback interval
    pub fn new(capacity: usize, poll_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                buffer: RwLock::new(LineBuffer::default()),
                wake: Notify::new(),
                capacity,
                poll_interval,
            }),
        }
    }

    /// Append a line to the shared sequence and wake waiting subscribers
    pub async fn publish(&self, line: impl Into<String>) {
        let mut buffer = self.shared.buffer.write().await;
        buffer.lines.push_back(line.into());
        while buffer.lines.len() > self.shared.capacity {
            buffer.lines.pop_front();
            buffer.start += 1;
        }
        drop(buffer);
        self.shared.wake.notify_waiters();
    }

    /// Total number of lines ever published
    pub async fn published(&self) -> usize {
        self.shared.buffer.read().await.end()
    }

    /// Start a subscription at the current end of the sequence
    ///
    /// New subscribers do not receive backlog; they see only lines published
    /// after this call.
    pub async fn subscribe(&self) -> LogSubscriber {
        let cursor = self.shared.buffer.read().await.end();
        LogSubscriber {
            shared: Arc::clone(&self.shared),
            cursor,
        }
    }
}

/// One consumer's view of the shared line sequence
///
/// Dropping a subscriber is how a disconnecting consumer cancels: the shared
/// sequence and every other subscriber are unaffected.
#[derive(Debug)]
pub struct LogSubscriber {
    shared: Arc<Shared>,
    cursor: usize,
}

impl LogSubscriber {
    /// Wait for and return the next lines past this subscriber's cursor,
    /// in publish order
    ///
    /// Parks on the publish notifier with a bounded poll-interval fallback,
    /// never a busy spin. Cancellation-safe: dropping the returned future
    /// leaves the cursor at the last delivered position.
    pub async fn next_batch(&mut self) -> Vec<String> {
        let shared = Arc::clone(&self.shared);
        loop {
            // Register for the wake before checking, so a publish between the
            // check and the await cannot be missed.
            let wake = shared.wake.notified();
            if let Some(batch) = self.drain().await {
                return batch;
            }
            let _ = timeout(shared.poll_interval, wake).await;
        }
    }

    async fn drain(&mut self) -> Option<Vec<String>> {
        let shared = Arc::clone(&self.shared);
        let buffer = shared.buffer.read().await;
        if self.cursor < buffer.start {
            // Fell behind a rotation; resume from the oldest retained line.
            self.cursor = buffer.start;
        }
        if self.cursor >= buffer.end() {
            return None;
        }
        let batch: Vec<String> = buffer
            .lines
            .iter()
            .skip(self.cursor - buffer.start)
            .cloned()
            .collect();
        self.cursor = buffer.end();
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broadcaster(capacity: usize) -> LogBroadcaster {
        LogBroadcaster::new(capacity, Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_subscriber_gets_lines_in_publish_order() {
        let logs = broadcaster(100);
        let mut subscriber = logs.subscribe().await;

        logs.publish("one").await;
        logs.publish("two").await;
        logs.publish("three").await;

        let batch = subscriber.next_batch().await;
        assert_eq!(batch, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_late_subscriber_receives_no_backlog() {
        let logs = broadcaster(100);
        logs.publish("before").await;

        let mut subscriber = logs.subscribe().await;
        logs.publish("after").await;

        let batch = subscriber.next_batch().await;
        assert_eq!(batch, vec!["after"]);
    }

    #[tokio::test]
    async fn test_subscribers_pace_independently() {
        let logs = broadcaster(100);
        let mut fast = logs.subscribe().await;
        let mut slow = logs.subscribe().await;

        logs.publish("a").await;
        assert_eq!(fast.next_batch().await, vec!["a"]);

        logs.publish("b").await;
        assert_eq!(fast.next_batch().await, vec!["b"]);
        // The slow subscriber still sees everything, in order
        assert_eq!(slow.next_batch().await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_cursor_snaps_forward_past_rotation() {
        let logs = broadcaster(3);
        let mut subscriber = logs.subscribe().await;

        for i in 0..8 {
            logs.publish(format!("line {i}")).await;
        }

        // Lines 0..5 rotated out; only the retained tail is delivered
        let batch = subscriber.next_batch().await;
        assert_eq!(batch, vec!["line 5", "line 6", "line 7"]);
        assert_eq!(logs.published().await, 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_publish_slow_consumer_no_gaps_or_duplicates() {
        let logs = broadcaster(1000);
        let mut subscriber = logs.subscribe().await;

        let publisher = {
            let logs = logs.clone();
            tokio::spawn(async move {
                for i in 0..100 {
                    logs.publish(format!("{i}")).await;
                    if i % 10 == 0 {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                    }
                }
            })
        };

        let mut received = Vec::new();
        while received.len() < 100 {
            // Slow consumption: batches accumulate while we sleep
            tokio::time::sleep(Duration::from_millis(3)).await;
            received.extend(subscriber.next_batch().await);
        }
        publisher.await.unwrap();

        let expected: Vec<String> = (0..100).map(|i| i.to_string()).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn test_dropping_one_subscriber_does_not_disturb_others() {
        let logs = broadcaster(100);
        let dropped = logs.subscribe().await;
        let mut kept = logs.subscribe().await;

        drop(dropped);
        logs.publish("still flowing").await;
        assert_eq!(kept.next_batch().await, vec!["still flowing"]);
    }
}
