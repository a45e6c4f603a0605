//! History of fired transitions.
//!
//! A context records into its history only when it was created with
//! [`Context::with_history`](crate::engine::Context::with_history).

use super::state::{MachineTag, StateRef, TransitionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single fired transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiredTransition {
    /// The transition that fired
    pub transition: TransitionId,
    /// The state the context left
    pub from: StateRef,
    /// The state the context entered
    pub to: StateRef,
    /// When the fire completed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, optionally bounded, log of fired transitions.
///
/// When a capacity is set the oldest record is dropped to make room.
///
/// # Example
///
/// ```rust
/// use stepwise::core::{StateRef, TransitionHistory};
///
/// let history = TransitionHistory::bounded(2);
/// assert!(history.is_empty());
/// assert_eq!(history.capacity(), Some(2));
/// assert!(history.get_path().is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: VecDeque<FiredTransition>,
    capacity: Option<usize>,
}

impl TransitionHistory {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `capacity` records.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, evicting the oldest one when the capacity is reached.
    pub fn record(&mut self, fired: FiredTransition) {
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return;
            }
            while self.records.len() >= capacity {
                self.records.pop_front();
            }
        }
        self.records.push_back(fired);
    }

    /// Records in firing order, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &FiredTransition> + '_ {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&FiredTransition> {
        self.records.back()
    }

    /// States traversed: the source of the oldest retained record followed by
    /// the target of every record.
    pub fn get_path(&self) -> Vec<StateRef> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|fired| fired.to));
        path
    }

    /// Time between the oldest and the newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Re-issue every recorded handle for the machine tagged `machine`.
    pub(crate) fn rebind(&mut self, machine: MachineTag) {
        for fired in &mut self.records {
            fired.transition = TransitionId::new(machine, fired.transition.index);
            fired.from = fired.from.rebind(machine);
            fired.to = fired.to.rebind(machine);
        }
    }
}
