//! Configured news servers, their connection slots and runtime counters.
//!
//! The roster owns the servers; the engine only knows them by the runtime id
//! it hands out from `add_server`. Insertion connects before the server is
//! considered live, removal disconnects before the server is dropped, and an
//! in-place edit is modeled as remove-then-add so the disconnect/connect pair
//! always brackets a configuration change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine::{ConnectionState, Engine, ServerId};

use super::rate::RateEstimator;
use super::registry::IdRegistry;

/// Transport encryption for a news server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    #[default]
    None,
    Ssl,
}

/// Connection parameters for one news server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: u16,
    pub connections: usize,
    pub encryption: Encryption,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: String::new(),
            port: 119,
            connections: 4,
            encryption: Encryption::None,
        }
    }
}

impl ServerSettings {
    /// Usable for connecting: a host name and a non-zero port.
    pub fn valid(&self) -> bool {
        !self.host.is_empty() && self.port != 0
    }
}

impl fmt::Display for ServerSettings {
    /// `nntp[s]://user@host:port`, the roster's display form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = match self.encryption {
            Encryption::None => "nntp",
            Encryption::Ssl => "nntps",
        };
        write!(f, "{}://{}@{}:{}", scheme, self.username, self.host, self.port)
    }
}

/// Display state of one connection slot.
///
/// The engine's `Connecting` deliberately collapses onto `Disconnected`;
/// the distinction carries no information the status view needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    #[default]
    Disconnected,
    Connecting,
    Idle,
    Working,
}

impl SlotState {
    fn from_engine(state: ConnectionState) -> Self {
        match state {
            ConnectionState::Disconnected | ConnectionState::Connecting => SlotState::Disconnected,
            ConnectionState::Idle => SlotState::Idle,
            ConnectionState::Working => SlotState::Working,
        }
    }
}

/// Runtime status of one server: slot states, counters, smoothed rate.
#[derive(Debug, Clone)]
pub struct ServerStatus {
    slots: Vec<SlotState>,
    missing_segments: u64,
    connection_timeouts: u64,
    errors: u64,
    rate: RateEstimator,
}

impl ServerStatus {
    fn new(connection_count: usize) -> Self {
        Self {
            slots: vec![SlotState::Disconnected; connection_count],
            missing_segments: 0,
            connection_timeouts: 0,
            errors: 0,
            rate: RateEstimator::new(),
        }
    }

    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    pub fn missing_segments(&self) -> u64 {
        self.missing_segments
    }

    pub fn connection_timeouts(&self) -> u64 {
        self.connection_timeouts
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn rate(&self) -> &RateEstimator {
        &self.rate
    }
}

/// One configured server: its settings plus live status.
#[derive(Debug, Clone)]
pub struct Server {
    settings: ServerSettings,
    status: ServerStatus,
}

impl Server {
    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn status(&self) -> &ServerStatus {
        &self.status
    }
}

/// Ordered roster of configured servers, keyed by engine runtime id.
///
/// The keying makes it impossible for two live servers to share a runtime id.
pub struct ServerRoster {
    engine: Arc<dyn Engine>,
    servers: IdRegistry<ServerId, Server>,
}

impl ServerRoster {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            servers: IdRegistry::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ServerId, &Server)> {
        self.servers.iter()
    }

    pub fn server(&self, id: ServerId) -> Option<&Server> {
        self.servers.get(id)
    }

    /// Register a server: connect first (the runtime id routes every later
    /// notification), then insert at the roster tail.
    pub fn add(&mut self, settings: ServerSettings) -> Option<ServerId> {
        let id = match self.engine.add_server(&settings) {
            Ok(id) => id,
            Err(err) => {
                warn!(host = settings.host.as_str(), "connect failed: {err:#}");
                return None;
            }
        };
        debug!(%id, host = settings.host.as_str(), "server connected");
        let status = ServerStatus::new(settings.connections);
        self.servers.insert(id, Server { settings, status });
        Some(id)
    }

    /// Drop a server: disconnect first, then remove it from the roster.
    /// Unknown ids are ignored.
    pub fn remove(&mut self, id: ServerId) {
        if !self.servers.contains(id) {
            return;
        }
        if let Err(err) = self.engine.remove_server(id) {
            warn!(%id, "disconnect failed: {err:#}");
        }
        self.servers.remove(id);
        debug!(%id, "server removed");
    }

    /// Edit a server's configuration. Always a remove-then-add so the engine
    /// sees a disconnect/connect pair, never a silent parameter change.
    pub fn replace(&mut self, id: ServerId, settings: ServerSettings) -> Option<ServerId> {
        if !self.servers.contains(id) {
            return None;
        }
        self.remove(id);
        self.add(settings)
    }

    /// A connection slot changed state. Slot indices beyond the configured
    /// connection count are ignored.
    pub fn connection_state(&mut self, id: ServerId, slot: usize, state: ConnectionState) {
        let Some(server) = self.servers.get_mut(id) else {
            return;
        };
        let Some(entry) = server.status.slots.get_mut(slot) else {
            return;
        };
        *entry = SlotState::from_engine(state);
    }

    /// Periodic counter snapshot: counters are absolute values and overwrite;
    /// the received bytes feed the per-server rate estimator.
    pub fn counters(
        &mut self,
        id: ServerId,
        time_ms: i64,
        rx_bytes: u64,
        missing: u64,
        timeouts: u64,
        errors: u64,
    ) {
        let Some(server) = self.servers.get_mut(id) else {
            return;
        };
        server.status.missing_segments = missing;
        server.status.connection_timeouts = timeouts;
        server.status.errors = errors;
        server.status.rate.sample(time_ms, rx_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCommand, RecordingEngine};

    fn roster() -> (Arc<RecordingEngine>, ServerRoster) {
        let engine = Arc::new(RecordingEngine::new());
        let roster = ServerRoster::new(engine.clone());
        (engine, roster)
    }

    fn settings(host: &str) -> ServerSettings {
        ServerSettings {
            host: host.into(),
            ..Default::default()
        }
    }

    #[test]
    fn add_connects_and_sizes_slots() {
        let (engine, mut roster) = roster();
        let id = roster.add(settings("news.example.org")).unwrap();
        assert_eq!(roster.len(), 1);
        let server = roster.server(id).unwrap();
        assert_eq!(server.status().slots().len(), 4);
        assert!(server.status().slots().iter().all(|s| *s == SlotState::Disconnected));
        assert!(matches!(
            engine.commands()[0],
            EngineCommand::AddServer { ref host, .. } if host == "news.example.org"
        ));
    }

    #[test]
    fn remove_disconnects_before_dropping() {
        let (engine, mut roster) = roster();
        let id = roster.add(settings("a")).unwrap();
        roster.remove(id);
        assert!(roster.is_empty());
        assert_eq!(
            engine.commands()[1],
            EngineCommand::RemoveServer(id),
            "disconnect must be issued while the server is still rostered"
        );
    }

    #[test]
    fn replace_is_disconnect_then_connect() {
        let (engine, mut roster) = roster();
        let id = roster.add(settings("old.example.org")).unwrap();
        let new_id = roster.replace(id, settings("new.example.org")).unwrap();
        assert_ne!(id, new_id);
        assert!(roster.server(id).is_none());
        assert_eq!(roster.server(new_id).unwrap().settings().host, "new.example.org");

        let cmds = engine.commands();
        assert_eq!(cmds[1], EngineCommand::RemoveServer(id));
        assert!(matches!(
            cmds[2],
            EngineCommand::AddServer { ref host, .. } if host == "new.example.org"
        ));
    }

    #[test]
    fn connecting_collapses_to_disconnected() {
        let (_, mut roster) = roster();
        let id = roster.add(settings("a")).unwrap();
        roster.connection_state(id, 0, ConnectionState::Working);
        roster.connection_state(id, 1, ConnectionState::Connecting);
        roster.connection_state(id, 2, ConnectionState::Idle);
        let slots = roster.server(id).unwrap().status().slots().to_vec();
        assert_eq!(
            slots,
            vec![
                SlotState::Working,
                SlotState::Disconnected,
                SlotState::Idle,
                SlotState::Disconnected,
            ]
        );
    }

    #[test]
    fn out_of_range_slot_is_ignored() {
        let (_, mut roster) = roster();
        let id = roster.add(settings("a")).unwrap();
        roster.connection_state(id, 99, ConnectionState::Working);
        assert_eq!(roster.server(id).unwrap().status().slots().len(), 4);
    }

    #[test]
    fn counters_overwrite_absolute_values() {
        let (_, mut roster) = roster();
        let id = roster.add(settings("a")).unwrap();
        roster.counters(id, 1000, 4096, 3, 1, 2);
        roster.counters(id, 2000, 4096, 5, 1, 2);
        let status = roster.server(id).unwrap().status();
        assert_eq!(status.missing_segments(), 5);
        assert_eq!(status.connection_timeouts(), 1);
        assert_eq!(status.errors(), 2);
        assert!(status.rate().bytes_per_sec() > 0.0);
    }

    #[test]
    fn events_for_unknown_server_are_inert() {
        let (_, mut roster) = roster();
        roster.connection_state(ServerId(9), 0, ConnectionState::Working);
        roster.counters(ServerId(9), 1000, 1, 1, 1, 1);
        roster.remove(ServerId(9));
        assert!(roster.is_empty());
    }

    #[test]
    fn display_form() {
        let mut s = settings("news.example.org");
        s.username = "alice".into();
        s.encryption = Encryption::Ssl;
        s.port = 563;
        assert_eq!(s.to_string(), "nntps://alice@news.example.org:563");
    }
}
