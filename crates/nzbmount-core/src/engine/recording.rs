//! Engine double that records every command it receives.
//!
//! Serves two purposes: tests assert on command ordering (e.g. disconnect
//! before a server is dropped from the roster), and `nzbmount replay` uses it
//! as a dry-run engine so a captured event trace can be fed through the model
//! without any real mount machinery.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Engine, EngineLogLevel, NetThrottle, ServerId};
use crate::model::server::ServerSettings;

/// One recorded engine command.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Mount(PathBuf),
    Unmount(PathBuf),
    /// Host of the added server and the runtime id handed back.
    AddServer { host: String, id: ServerId },
    RemoveServer(ServerId),
    SetThrottling(NetThrottle),
    SetLogLevel(EngineLogLevel),
}

/// [`Engine`] implementation that records commands and assigns sequential
/// server ids starting at 1.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    commands: Vec<EngineCommand>,
    next_server_id: i32,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands received so far, in order.
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.inner.lock().unwrap().commands.clone()
    }

    fn record(&self, cmd: EngineCommand) {
        self.inner.lock().unwrap().commands.push(cmd);
    }
}

impl Engine for RecordingEngine {
    fn mount(&self, path: &Path) -> Result<()> {
        self.record(EngineCommand::Mount(path.to_path_buf()));
        Ok(())
    }

    fn unmount(&self, path: &Path) -> Result<()> {
        self.record(EngineCommand::Unmount(path.to_path_buf()));
        Ok(())
    }

    fn add_server(&self, settings: &ServerSettings) -> Result<ServerId> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_server_id += 1;
        let id = ServerId(inner.next_server_id);
        inner.commands.push(EngineCommand::AddServer {
            host: settings.host.clone(),
            id,
        });
        Ok(id)
    }

    fn remove_server(&self, id: ServerId) -> Result<()> {
        self.record(EngineCommand::RemoveServer(id));
        Ok(())
    }

    fn set_throttling(&self, throttle: &NetThrottle) -> Result<()> {
        self.record(EngineCommand::SetThrottling(*throttle));
        Ok(())
    }

    fn set_log_level(&self, level: EngineLogLevel) -> Result<()> {
        self.record(EngineCommand::SetLogLevel(level));
        Ok(())
    }
}
