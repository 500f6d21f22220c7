//! Command surface of the external download/mount engine.
//!
//! The engine itself (filesystem exposure, NNTP protocol, caching) lives
//! outside this crate. The model only issues the commands below and consumes
//! [`EngineEvent`] notifications. Components that need to talk to the engine
//! receive an `Arc<dyn Engine>` — the handle is injected, never a global.

mod event;
mod ids;
mod recording;

pub use event::{ConnectionState, EngineEvent, EngineLogLevel, SegmentState};
pub use ids::{FileId, NzbId, ServerId};
pub use recording::{EngineCommand, RecordingEngine};

use anyhow::Result;
use std::path::Path;

use crate::model::server::ServerSettings;

/// Engine-native throttling record.
///
/// Always pushed whole; the engine has no partial-update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetThrottle {
    pub mode: NetworkMode,
    /// Absolute cap in bytes/sec; 0 means unlimited.
    pub network_limit: u64,
    /// Pre-cache window in bytes for adaptive mode.
    pub fast_precache: u64,
    /// Adaptive IO ratio in percent.
    pub adaptive_io_ratio_pct: u32,
    /// Floor rate in bytes/sec kept for background fetching.
    pub background_network_rate: u64,
}

/// Engine-native throttling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Constant,
    Adaptive,
}

/// Commands accepted by the engine.
///
/// `add_server` is the one call with a meaningful return value: the runtime
/// id it hands back routes all later counter and connection-state events.
/// Everything else is fire-and-forget from the model's perspective; failures
/// surface through the engine's own log channel.
pub trait Engine: Send + Sync {
    /// Mount an NZB file. Progress arrives as notifications.
    fn mount(&self, path: &Path) -> Result<()>;

    /// Unmount a previously mounted NZB file.
    fn unmount(&self, path: &Path) -> Result<()>;

    /// Register a news server and start connecting. Returns the runtime id
    /// used to key later notifications for this server.
    fn add_server(&self, settings: &ServerSettings) -> Result<ServerId>;

    /// Disconnect and forget a server by its runtime id.
    fn remove_server(&self, id: ServerId) -> Result<()>;

    /// Replace the engine's throttling configuration.
    fn set_throttling(&self, throttle: &NetThrottle) -> Result<()>;

    /// Set the engine's log verbosity.
    fn set_log_level(&self, level: EngineLogLevel) -> Result<()>;
}
