// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::consts::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_ROWSET_SIZE};
use crate::errors::RowSetError;
use crate::row::{Row, RowMeta};

use super::StopSignal;

/// Outcome of a single bounded read attempt.
#[derive(Debug, PartialEq)]
pub enum RowSetPoll {
    /// The next row in FIFO order.
    Row(Arc<RowMeta>, Row),
    /// Nothing arrived within the wait, the producer is still active.
    Empty,
    /// Drained and done: the end-of-stream sentinel.
    Done,
}

struct State {
    queue: VecDeque<(Arc<RowMeta>, Row)>,
    done: bool,
}

/// Bounded FIFO queue of rows plus a `done` flag.
///
/// The queue never holds more than `capacity` rows: [`put_row`](Self::put_row)
/// blocks while it is full. Consumers calling [`get_row`](Self::get_row)
/// compete for rows, each row is handed to exactly one of them.
pub struct RowSet {
    origin: String,
    destination: String,
    capacity: usize,
    poll_interval: Duration,
    stop: StopSignal,
    state: Mutex<State>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl RowSet {
    /// A standalone row set with its own stop signal and default poll interval.
    pub fn new(capacity: usize) -> Self {
        Self::with_stop_signal(
            "producer",
            "consumer",
            capacity,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            StopSignal::new(),
        )
    }

    /// A row set bound to a run's stop signal.
    ///
    /// `capacity` is clamped to at least 1.
    pub fn with_stop_signal(
        origin: impl Into<String>,
        destination: impl Into<String>,
        capacity: usize,
        poll_interval: Duration,
        stop: StopSignal,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            origin: origin.into(),
            destination: destination.into(),
            capacity,
            poll_interval,
            stop,
            state: Mutex::new(State {
                queue: VecDeque::with_capacity(capacity.min(DEFAULT_ROWSET_SIZE)),
                done: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Enqueues a row, waiting while the queue is at capacity.
    ///
    /// Fails with [`RowSetError::Closed`] once [`set_done`](Self::set_done) has
    /// been called and with [`RowSetError::Stopped`] when the run is cancelled
    /// while waiting for room.
    pub fn put_row(&self, meta: Arc<RowMeta>, row: Row) -> Result<(), RowSetError> {
        let mut state = self.state.lock();
        loop {
            if state.done {
                return Err(RowSetError::Closed(self.name()));
            }
            if state.queue.len() < self.capacity {
                state.queue.push_back((meta, row));
                drop(state);
                self.not_empty.notify_one();
                return Ok(());
            }
            if self.stop.is_requested() {
                return Err(RowSetError::Stopped(self.name()));
            }
            self.not_full.wait_for(&mut state, self.poll_interval);
        }
    }

    /// Like [`put_row`](Self::put_row) but gives up after `timeout`.
    ///
    /// Returns `Ok(None)` when the row was enqueued and `Ok(Some(row))`, handing
    /// the row back, when no room became available in time.
    pub fn put_row_wait(
        &self,
        meta: Arc<RowMeta>,
        row: Row,
        timeout: Duration,
    ) -> Result<Option<Row>, RowSetError> {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if state.done {
                return Err(RowSetError::Closed(self.name()));
            }
            if state.queue.len() < self.capacity {
                state.queue.push_back((meta, row));
                drop(state);
                self.not_empty.notify_one();
                return Ok(None);
            }
            if self.stop.is_requested() {
                return Err(RowSetError::Stopped(self.name()));
            }
            let now = std::time::Instant::now();
            if now >= deadline {
                return Ok(Some(row));
            }
            let wait = (deadline - now).min(self.poll_interval);
            self.not_full.wait_for(&mut state, wait);
        }
    }

    /// Dequeues the next row, waiting while the queue is empty and not done.
    ///
    /// Returns `None` once the queue is drained and done, on every call after
    /// that, and when the run is stopped while waiting.
    pub fn get_row(&self) -> Option<(Arc<RowMeta>, Row)> {
        let mut state = self.state.lock();
        loop {
            if let Some(entry) = state.queue.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(entry);
            }
            if state.done || self.stop.is_requested() {
                return None;
            }
            self.not_empty.wait_for(&mut state, self.poll_interval);
        }
    }

    /// Waits at most `timeout` for the next row.
    pub fn get_row_wait(&self, timeout: Duration) -> RowSetPoll {
        let mut state = self.state.lock();
        if state.queue.is_empty() && !state.done {
            self.not_empty.wait_for(&mut state, timeout);
        }
        match state.queue.pop_front() {
            Some((meta, row)) => {
                drop(state);
                self.not_full.notify_one();
                RowSetPoll::Row(meta, row)
            }
            None if state.done => RowSetPoll::Done,
            None => RowSetPoll::Empty,
        }
    }

    /// Non-blocking read.
    pub fn get_row_immediate(&self) -> RowSetPoll {
        self.get_row_wait(Duration::ZERO)
    }

    /// Marks the end of the stream. Idempotent.
    pub fn set_done(&self) {
        let mut state = self.state.lock();
        state.done = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_done(&self) -> bool {
        self.state.lock().done
    }

    /// Rows currently queued.
    pub fn size(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Producing slot, `transform.copy`
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Consuming transform
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn name(&self) -> String {
        format!("{} -> {}", self.origin, self.destination)
    }
}

impl fmt::Debug for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RowSet")
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("capacity", &self.capacity)
            .field("size", &state.queue.len())
            .field("done", &state.done)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{Value, ValueMeta, ValueType};
    use std::collections::HashSet;
    use std::thread;

    fn meta() -> Arc<RowMeta> {
        Arc::new(RowMeta::new(vec![ValueMeta::new("value", ValueType::Integer)]))
    }

    fn row(i: i64) -> Row {
        Row::new(vec![Value::Integer(i)])
    }

    fn fast_rowset(capacity: usize, stop: StopSignal) -> RowSet {
        RowSet::with_stop_signal("a.0", "b", capacity, Duration::from_millis(5), stop)
    }

    #[test]
    fn test_fifo_single_producer_single_consumer() {
        let rowset = RowSet::new(10);
        for i in 1..=3 {
            rowset.put_row(meta(), row(i)).unwrap();
        }
        rowset.set_done();

        let received: Vec<i64> = std::iter::from_fn(|| rowset.get_row())
            .map(|(_, r)| r.get(0).and_then(Value::as_integer).unwrap())
            .collect();
        assert_eq!(received, vec![1, 2, 3]);
    }

    #[test]
    fn test_eof_sentinel_is_repeatable() {
        let rowset = RowSet::new(2);
        rowset.put_row(meta(), row(1)).unwrap();
        rowset.set_done();
        rowset.set_done();

        assert!(rowset.get_row().is_some());
        assert!(rowset.get_row().is_none());
        assert!(rowset.get_row().is_none());
        assert_eq!(rowset.get_row_immediate(), RowSetPoll::Done);
    }

    #[test]
    fn test_put_after_done_is_closed() {
        let rowset = RowSet::new(2);
        rowset.set_done();

        let result = rowset.put_row(meta(), row(1));
        assert!(matches!(result, Err(RowSetError::Closed(_))));
        assert_eq!(rowset.size(), 0);
    }

    #[test]
    fn test_producer_blocks_at_capacity_until_drained() {
        let rowset = Arc::new(fast_rowset(2, StopSignal::new()));
        let producer = {
            let rowset = Arc::clone(&rowset);
            thread::spawn(move || {
                for i in 0..5 {
                    rowset.put_row(meta(), row(i)).unwrap();
                }
                rowset.set_done();
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(rowset.size(), 2);
        assert!(!producer.is_finished());

        let mut received = Vec::new();
        while let Some((_, r)) = rowset.get_row() {
            assert!(rowset.size() <= rowset.capacity());
            received.push(r.get(0).and_then(Value::as_integer).unwrap());
        }
        producer.join().unwrap();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stop_releases_blocked_producer() {
        let stop = StopSignal::new();
        let rowset = Arc::new(fast_rowset(1, stop.clone()));
        rowset.put_row(meta(), row(0)).unwrap();

        let producer = {
            let rowset = Arc::clone(&rowset);
            thread::spawn(move || rowset.put_row(meta(), row(1)))
        };
        thread::sleep(Duration::from_millis(20));
        stop.request();

        let result = producer.join().unwrap();
        assert!(matches!(result, Err(RowSetError::Stopped(_))));
        assert_eq!(rowset.size(), 1);
    }

    #[test]
    fn test_stop_releases_blocked_consumer() {
        let stop = StopSignal::new();
        let rowset = Arc::new(fast_rowset(4, stop.clone()));

        let consumer = {
            let rowset = Arc::clone(&rowset);
            thread::spawn(move || rowset.get_row())
        };
        thread::sleep(Duration::from_millis(20));
        stop.request();

        assert!(consumer.join().unwrap().is_none());
    }

    #[test]
    fn test_put_row_wait_hands_row_back_on_timeout() {
        let rowset = fast_rowset(1, StopSignal::new());
        assert_eq!(
            rowset.put_row_wait(meta(), row(1), Duration::from_millis(5)),
            Ok(None)
        );

        let rejected = rowset
            .put_row_wait(meta(), row(2), Duration::from_millis(10))
            .unwrap();
        assert_eq!(rejected, Some(row(2)));
        assert_eq!(rowset.size(), 1);
    }

    #[test]
    fn test_get_row_wait_reports_empty() {
        let rowset = fast_rowset(1, StopSignal::new());
        assert_eq!(rowset.get_row_wait(Duration::from_millis(5)), RowSetPoll::Empty);
    }

    #[test]
    fn test_competing_consumers_receive_each_row_once() {
        let rowset = Arc::new(fast_rowset(8, StopSignal::new()));
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let rowset = Arc::clone(&rowset);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some((_, r)) = rowset.get_row() {
                        seen.push(r.get(0).and_then(Value::as_integer).unwrap());
                    }
                    seen
                })
            })
            .collect();

        for i in 0..1000 {
            rowset.put_row(meta(), row(i)).unwrap();
        }
        rowset.set_done();

        let all: Vec<i64> = consumers
            .into_iter()
            .flat_map(|c| c.join().unwrap())
            .collect();
        let unique: HashSet<i64> = all.iter().copied().collect();
        assert_eq!(all.len(), 1000);
        assert_eq!(unique.len(), 1000);
    }
}
