//! Notifications delivered by the engine.
//!
//! The engine raises these from its own worker threads; the dispatch loop
//! serializes them before the model sees anything. The enum is serde-friendly
//! so a captured session can be written out as JSON lines and replayed
//! offline (`nzbmount replay`).

use serde::{Deserialize, Serialize};

use super::ids::{FileId, NzbId, ServerId};

/// Per-segment download state as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentState {
    /// Nothing known about the segment yet.
    Unset,
    /// A connection is fetching the segment.
    Loading,
    /// Segment data is in the cache.
    HasData,
    /// The segment is absent on every configured server.
    MissingSegment,
    /// All download attempts failed.
    DownloadFailed,
}

/// State of a single server connection slot, engine-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Idle,
    Working,
}

/// Log verbosity shared with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineLogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

/// One engine notification.
///
/// Identifier references may race entity creation and destruction; every
/// handler treats an unknown id as a benign miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// An NZB archive was opened for mounting.
    NzbOpened { nzb: NzbId, path: String },
    /// A mounted archive was closed; all of its parts go with it.
    NzbClosed { nzb: NzbId },
    /// A file part was discovered inside an archive.
    FileAdded {
        nzb: NzbId,
        file: FileId,
        segments: usize,
        size: u64,
    },
    /// A file part disappeared from its archive.
    FileRemoved { file: FileId },
    /// Name and exact size of a part became known.
    FileInfo { file: FileId, name: String, size: u64 },
    /// One segment of a part changed state.
    SegmentState {
        file: FileId,
        index: usize,
        state: SegmentState,
    },
    /// Mounting progress for an archive: `completed` of `total` parts done.
    MountProgress {
        nzb: NzbId,
        completed: usize,
        total: usize,
    },
    /// A connection slot of a server changed state.
    ConnectionState {
        server: ServerId,
        slot: usize,
        state: ConnectionState,
    },
    /// Periodic per-server counter snapshot. Counts are absolute values, not
    /// deltas; `rx_bytes` is the byte count for the reporting interval.
    Counters {
        time_ms: i64,
        server: ServerId,
        tx_bytes: u64,
        rx_bytes: u64,
        missing: u64,
        timeouts: u64,
        errors: u64,
    },
    /// A log line from the engine.
    Log { level: EngineLogLevel, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_roundtrip() {
        let ev = EngineEvent::FileAdded {
            nzb: NzbId(1),
            file: FileId(10),
            segments: 4,
            size: 4000,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"event\":\"file_added\""));
        let back: EngineEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ev);
    }

    #[test]
    fn segment_event_json_shape() {
        let json = r#"{"event":"segment_state","file":7,"index":2,"state":"HasData"}"#;
        let ev: EngineEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            ev,
            EngineEvent::SegmentState {
                file: FileId(7),
                index: 2,
                state: SegmentState::HasData,
            }
        );
    }
}
