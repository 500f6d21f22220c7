//! Change notification fan-out for model consumers.
//!
//! Every model mutation publishes a `ModelChange` to all registered observers
//! before the next event is applied; the single-writer dispatch loop is what
//! makes that ordering hold.

use crate::engine::{FileId, NzbId, ServerId};

/// What part of the model changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChange {
    JobOpened(NzbId),
    JobClosed(NzbId),
    /// Progress, phase, aggregate size or counters of a job moved.
    JobUpdated(NzbId),
    PartAdded(NzbId, FileId),
    PartRemoved(FileId),
    PartUpdated(FileId),
    SegmentChanged(FileId),
    ServerAdded(ServerId),
    ServerRemoved(ServerId),
    /// Slot states, counters or rate of a server moved.
    ServerUpdated(ServerId),
    /// The aggregate drive rate moved.
    StatusUpdated,
    ThrottlingChanged,
    LogAppended,
}

/// Observer callback. Boxed so the model stays object-safe to its consumers.
pub type Observer = Box<dyn FnMut(ModelChange) + Send>;

/// Registered observers; fan-out is synchronous and in registration order.
#[derive(Default)]
pub struct Observers {
    observers: Vec<Observer>,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn notify(&mut self, change: ModelChange) {
        for observer in &mut self.observers {
            observer(change);
        }
    }
}
