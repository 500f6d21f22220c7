//! Capped buffer of engine log lines for the status display.

use std::collections::VecDeque;
use std::time::SystemTime;

use crate::engine::EngineLogLevel;

/// Default number of retained entries.
const DEFAULT_CAPACITY: usize = 1000;

/// One engine log line with its arrival time.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: SystemTime,
    pub level: EngineLogLevel,
    pub message: String,
}

/// Ring of the most recent engine log lines; the oldest entry is dropped
/// once the cap is reached.
#[derive(Debug)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn push(&mut self, level: EngineLogLevel, message: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            time: SystemTime::now(),
            level,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_oldest_at_capacity() {
        let mut log = LogBuffer::with_capacity(3);
        for i in 0..5 {
            log.push(EngineLogLevel::Info, format!("line {i}"));
        }
        assert_eq!(log.len(), 3);
        let messages: Vec<&str> = log.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }
}
