//! The aggregation model: one consistent object graph built from engine
//! notifications.
//!
//! `DriveModel` is single-writer by contract: every mutation goes through
//! [`DriveModel::handle_event`] or a command method, and both must run on the
//! context that owns the model (see [`crate::dispatch`]). No handler panics
//! or returns an error for misbehaving input — unknown identifiers and bounds
//! violations are benign misses, degenerate values skip only the affected
//! computation.

pub mod log;
pub mod mount;
pub mod observer;
pub mod rate;
pub mod registry;
pub mod segment;
pub mod server;
pub mod snapshot;
pub mod status;
pub mod throttle;
pub mod units;

use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use crate::config::NzbMountConfig;
use crate::engine::{Engine, EngineEvent, EngineLogLevel, SegmentState, ServerId};

use self::log::LogBuffer;
use self::mount::MountList;
use self::observer::{ModelChange, Observer, Observers};
use self::server::{ServerRoster, ServerSettings};
use self::snapshot::ModelSnapshot;
use self::status::DriveStatus;
use self::throttle::{ThrottlingMode, ThrottlingSettings};
use self::units::{DataRateUnit, DataSizeUnit};

/// Root of the aggregation layer: mounted jobs, server roster, aggregate
/// status, engine log, throttling configuration.
pub struct DriveModel {
    engine: Arc<dyn Engine>,
    mounts: MountList,
    roster: ServerRoster,
    status: DriveStatus,
    log: LogBuffer,
    throttling: ThrottlingSettings,
    observers: Observers,
}

impl DriveModel {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            roster: ServerRoster::new(engine.clone()),
            engine,
            mounts: MountList::new(),
            status: DriveStatus::new(),
            log: LogBuffer::new(),
            throttling: ThrottlingSettings::default(),
            observers: Observers::new(),
        }
    }

    /// Build a model seeded from configuration: servers are connected,
    /// throttling and log level pushed to the engine.
    pub fn from_config(engine: Arc<dyn Engine>, config: &NzbMountConfig) -> Self {
        let mut model = Self::new(engine);
        model.set_log_level(config.log_level);
        model.set_throttling(config.throttling);
        for settings in &config.servers {
            model.add_server(settings.clone());
        }
        model
    }

    pub fn mounts(&self) -> &MountList {
        &self.mounts
    }

    pub fn roster(&self) -> &ServerRoster {
        &self.roster
    }

    pub fn status(&self) -> &DriveStatus {
        &self.status
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn throttling(&self) -> &ThrottlingSettings {
        &self.throttling
    }

    /// Register an observer; it sees every change from now on, each fanned
    /// out before the next mutation is applied.
    pub fn observe(&mut self, observer: Observer) {
        self.observers.register(observer);
    }

    /// Capture a cloneable point-in-time view.
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot::capture(self)
    }

    /// Route one engine notification into the model.
    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::NzbOpened { nzb, path } => {
                self.mounts.open(nzb, path);
                self.observers.notify(ModelChange::JobOpened(nzb));
            }
            EngineEvent::NzbClosed { nzb } => {
                self.mounts.close(nzb);
                self.observers.notify(ModelChange::JobClosed(nzb));
            }
            EngineEvent::FileAdded { nzb, file, segments, size } => {
                self.mounts.add_part(nzb, file, segments, size);
                self.observers.notify(ModelChange::PartAdded(nzb, file));
            }
            EngineEvent::FileRemoved { file } => {
                self.mounts.remove_part(file);
                self.observers.notify(ModelChange::PartRemoved(file));
            }
            EngineEvent::FileInfo { file, name, size } => {
                self.mounts.file_info(file, name, size);
                self.observers.notify(ModelChange::PartUpdated(file));
            }
            EngineEvent::SegmentState { file, index, state } => {
                self.segment_state(file, index, state);
            }
            EngineEvent::MountProgress { nzb, completed, total } => {
                self.mounts.mount_progress(nzb, completed, total);
                self.observers.notify(ModelChange::JobUpdated(nzb));
            }
            EngineEvent::ConnectionState { server, slot, state } => {
                self.roster.connection_state(server, slot, state);
                self.observers.notify(ModelChange::ServerUpdated(server));
            }
            EngineEvent::Counters {
                time_ms,
                server,
                tx_bytes: _,
                rx_bytes,
                missing,
                timeouts,
                errors,
            } => {
                self.roster
                    .counters(server, time_ms, rx_bytes, missing, timeouts, errors);
                self.status.sample(time_ms, rx_bytes);
                self.observers.notify(ModelChange::ServerUpdated(server));
                self.observers.notify(ModelChange::StatusUpdated);
            }
            EngineEvent::Log { level, message } => {
                self.log.push(level, message);
                self.observers.notify(ModelChange::LogAppended);
            }
        }
    }

    fn segment_state(&mut self, file: crate::engine::FileId, index: usize, state: SegmentState) {
        self.mounts.segment_state(file, index, state);
        self.observers.notify(ModelChange::SegmentChanged(file));
        if let Some(part) = self.mounts.part(file) {
            let owner = part.owner();
            self.observers.notify(ModelChange::JobUpdated(owner));
        }
    }

    // ---- commands toward the engine -------------------------------------

    /// Ask the engine to mount an NZB file; the job shows up via
    /// notifications once the engine opens it.
    pub fn mount(&mut self, path: &Path) {
        if let Err(err) = self.engine.mount(path) {
            warn!(path = %path.display(), "mount command failed: {err:#}");
        }
    }

    /// Ask the engine to unmount; the job leaves the model when the engine
    /// reports the close.
    pub fn unmount(&mut self, path: &Path) {
        if let Err(err) = self.engine.unmount(path) {
            warn!(path = %path.display(), "unmount command failed: {err:#}");
        }
    }

    pub fn add_server(&mut self, settings: ServerSettings) -> Option<ServerId> {
        let id = self.roster.add(settings)?;
        self.observers.notify(ModelChange::ServerAdded(id));
        Some(id)
    }

    pub fn remove_server(&mut self, id: ServerId) {
        self.roster.remove(id);
        self.observers.notify(ModelChange::ServerRemoved(id));
    }

    pub fn replace_server(&mut self, id: ServerId, settings: ServerSettings) -> Option<ServerId> {
        let new_id = self.roster.replace(id, settings)?;
        self.observers.notify(ModelChange::ServerRemoved(id));
        self.observers.notify(ModelChange::ServerAdded(new_id));
        Some(new_id)
    }

    /// Replace the whole throttling configuration.
    pub fn set_throttling(&mut self, settings: ThrottlingSettings) {
        self.throttling = settings;
        self.push_throttling();
    }

    /// Change only the throttling mode.
    pub fn set_throttling_mode(&mut self, mode: ThrottlingMode) {
        self.throttling.mode = mode;
        self.push_throttling();
    }

    /// Change only the rate cap.
    pub fn set_speed_limit(&mut self, value: u64, unit: DataRateUnit) {
        self.throttling.speed_limit = value;
        self.throttling.speed_limit_unit = unit;
        self.push_throttling();
    }

    /// Change only the pre-cache window.
    pub fn set_precache(&mut self, value: u64, unit: DataSizeUnit) {
        self.throttling.precache_size = value;
        self.throttling.precache_size_unit = unit;
        self.push_throttling();
    }

    /// Every settable change re-issues the full engine record.
    fn push_throttling(&mut self) {
        if let Err(err) = self.engine.set_throttling(&self.throttling.to_engine()) {
            warn!("throttling command failed: {err:#}");
        }
        self.observers.notify(ModelChange::ThrottlingChanged);
    }

    pub fn set_log_level(&mut self, level: EngineLogLevel) {
        if let Err(err) = self.engine.set_log_level(level) {
            warn!("log-level command failed: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineCommand, FileId, NetworkMode, NzbId, RecordingEngine};

    fn model() -> (Arc<RecordingEngine>, DriveModel) {
        let engine = Arc::new(RecordingEngine::new());
        let model = DriveModel::new(engine.clone());
        (engine, model)
    }

    #[test]
    fn event_scenario_builds_expected_counters() {
        let (_, mut model) = model();
        model.handle_event(EngineEvent::NzbOpened {
            nzb: NzbId(1),
            path: "a.nzb".into(),
        });
        model.handle_event(EngineEvent::FileAdded {
            nzb: NzbId(1),
            file: FileId(10),
            segments: 4,
            size: 4000,
        });
        model.handle_event(EngineEvent::SegmentState {
            file: FileId(10),
            index: 0,
            state: SegmentState::HasData,
        });
        model.handle_event(EngineEvent::SegmentState {
            file: FileId(10),
            index: 1,
            state: SegmentState::MissingSegment,
        });

        let part = model.mounts().part(FileId(10)).unwrap();
        assert_eq!(part.segments().cached(), 1);
        assert_eq!(part.segments().missing(), 1);
        assert_eq!(part.segments().loading(), 0);
    }

    #[test]
    fn observers_run_for_every_event() {
        let (_, mut model) = model();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            model.observe(Box::new(move |change| {
                seen.lock().unwrap().push(change);
            }));
        }
        model.handle_event(EngineEvent::NzbOpened {
            nzb: NzbId(1),
            path: "a.nzb".into(),
        });
        model.handle_event(EngineEvent::NzbClosed { nzb: NzbId(1) });
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ModelChange::JobOpened(NzbId(1)),
                ModelChange::JobClosed(NzbId(1)),
            ]
        );
    }

    #[test]
    fn throttling_setters_push_full_record() {
        let (engine, mut model) = model();
        model.set_speed_limit(10, DataRateUnit::MibS);
        model.set_throttling_mode(ThrottlingMode::Adaptive);
        let cmds = engine.commands();
        assert_eq!(cmds.len(), 2);
        match &cmds[1] {
            EngineCommand::SetThrottling(rec) => {
                assert_eq!(rec.mode, NetworkMode::Adaptive);
                assert_eq!(rec.network_limit, 10 * 1024 * 1024);
            }
            other => panic!("expected throttling command, got {other:?}"),
        }
    }

    #[test]
    fn counters_feed_server_and_aggregate() {
        let (_, mut model) = model();
        let id = model.add_server(ServerSettings::default()).unwrap();
        for tick in 0..3 {
            model.handle_event(EngineEvent::Counters {
                time_ms: tick * 1000,
                server: id,
                tx_bytes: 0,
                rx_bytes: 100_000,
                missing: 0,
                timeouts: 0,
                errors: 0,
            });
        }
        assert!(model.roster().server(id).unwrap().status().rate().bytes_per_sec() > 0.0);
        assert!(model.status().rate().bytes_per_sec() > 0.0);
    }

    #[test]
    fn from_config_seeds_engine_state() {
        let engine = Arc::new(RecordingEngine::new());
        let mut config = NzbMountConfig::default();
        config.servers.push(ServerSettings {
            host: "news.example.org".into(),
            ..Default::default()
        });
        let model = DriveModel::from_config(engine.clone(), &config);
        assert_eq!(model.roster().len(), 1);

        let cmds = engine.commands();
        assert!(matches!(cmds[0], EngineCommand::SetLogLevel(_)));
        assert!(matches!(cmds[1], EngineCommand::SetThrottling(_)));
        assert!(matches!(cmds[2], EngineCommand::AddServer { .. }));
    }
}
