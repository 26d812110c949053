// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded row queues connecting transform workers.
//!
//! A [`RowSet`] has exactly one producing worker slot and is drained by every
//! copy of the consuming transform. Backpressure is enforced by blocking the
//! producer while the queue is full; end-of-stream is signalled by
//! [`RowSet::set_done`] followed by a full drain. All blocking waits are
//! short condition waits that re-check the run's [`StopSignal`].

#[allow(clippy::module_inception)]
mod rowset;
mod stop_signal;

pub use rowset::{RowSet, RowSetPoll};
pub use stop_signal::StopSignal;
