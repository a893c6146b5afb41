//! Ordered queue of pending log records

use std::collections::VecDeque;

use edubrain_domain::LogRecord;

/// FIFO of records waiting to be shipped.
///
/// `capacity` is a flush threshold, not a hard bound: pushes past it still
/// succeed and report that a flush is due.
#[derive(Debug, Clone)]
pub struct LogQueue {
    records: VecDeque<LogRecord>,
    capacity: usize,
}

impl LogQueue {
    pub fn new(capacity: usize) -> Self {
        Self { records: VecDeque::with_capacity(capacity), capacity: capacity.max(1) }
    }

    /// Append `record`; returns `true` once the flush threshold is reached.
    pub fn push(&mut self, record: LogRecord) -> bool {
        self.records.push_back(record);
        self.records.len() >= self.capacity
    }

    /// Take every queued record as one batch, oldest first.
    pub fn drain(&mut self) -> Vec<LogRecord> {
        self.records.drain(..).collect()
    }

    /// Put an undelivered batch back ahead of anything queued since.
    pub fn restore_front(&mut self, batch: Vec<LogRecord>) {
        for record in batch.into_iter().rev() {
            self.records.push_front(record);
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use edubrain_domain::{LogContext, LogLevel};

    use super::*;

    fn record(message: &str) -> LogRecord {
        LogRecord::new(LogLevel::Info, message, LogContext::new(), Utc::now())
    }

    fn messages(queue: &LogQueue) -> Vec<String> {
        queue.iter().map(|r| r.message.clone()).collect()
    }

    #[test]
    fn push_reports_threshold() {
        let mut queue = LogQueue::new(3);
        assert!(!queue.push(record("a")));
        assert!(!queue.push(record("b")));
        assert!(queue.push(record("c")));
        assert!(queue.push(record("d")));
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn restored_batch_goes_ahead_of_newer_records() {
        let mut queue = LogQueue::new(10);
        queue.push(record("a"));
        queue.push(record("b"));

        let batch = queue.drain();
        assert!(queue.is_empty());

        queue.push(record("c"));
        queue.restore_front(batch);

        assert_eq!(messages(&queue), vec!["a", "b", "c"]);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut queue = LogQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(record("a")));
    }
}
