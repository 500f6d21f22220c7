//! Single-writer dispatch boundary.
//!
//! The engine raises notifications from its own threads; the model is owned
//! by exactly one task. Everything crosses an mpsc channel first, so every
//! mutation — engine event or presentation command — runs on the owning task
//! in arrival order. Reads cross the same boundary as snapshot requests.

use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::{EngineEvent, EngineLogLevel, ServerId};
use crate::model::server::ServerSettings;
use crate::model::snapshot::ModelSnapshot;
use crate::model::throttle::ThrottlingSettings;
use crate::model::DriveModel;

/// Control messages from the presentation side.
#[derive(Debug)]
pub enum ModelCommand {
    Mount(PathBuf),
    Unmount(PathBuf),
    AddServer(ServerSettings),
    RemoveServer(ServerId),
    ReplaceServer(ServerId, ServerSettings),
    SetThrottling(ThrottlingSettings),
    SetLogLevel(EngineLogLevel),
    /// Request a point-in-time view of the whole model.
    Snapshot(oneshot::Sender<ModelSnapshot>),
}

enum Message {
    Event(EngineEvent),
    Command(ModelCommand),
}

/// Cloneable handle into the dispatch loop. The engine-callback side uses
/// [`ModelHandle::event`]; presentation uses the command methods. The loop
/// stops once every handle is dropped.
#[derive(Clone)]
pub struct ModelHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl ModelHandle {
    /// Deliver an engine notification. Send-only and non-blocking, safe to
    /// call from any engine thread. Delivery after shutdown is a no-op.
    pub fn event(&self, event: EngineEvent) {
        let _ = self.tx.send(Message::Event(event));
    }

    /// Issue a control command.
    pub fn command(&self, command: ModelCommand) {
        let _ = self.tx.send(Message::Command(command));
    }

    /// Fetch a snapshot of the model. `None` when the loop has shut down.
    pub async fn snapshot(&self) -> Option<ModelSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.command(ModelCommand::Snapshot(tx));
        rx.await.ok()
    }
}

/// The running dispatch loop: a handle plus the owning task.
pub struct ModelLoop {
    pub handle: ModelHandle,
    pub task: JoinHandle<DriveModel>,
}

impl ModelLoop {
    /// Move the model into its owning task and return the handle. The task
    /// resolves with the final model state once all handles are dropped.
    pub fn spawn(mut model: DriveModel) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                match message {
                    Message::Event(event) => model.handle_event(event),
                    Message::Command(command) => apply_command(&mut model, command),
                }
            }
            debug!("dispatch loop drained, shutting down");
            model
        });
        Self {
            handle: ModelHandle { tx },
            task,
        }
    }
}

fn apply_command(model: &mut DriveModel, command: ModelCommand) {
    match command {
        ModelCommand::Mount(path) => model.mount(&path),
        ModelCommand::Unmount(path) => model.unmount(&path),
        ModelCommand::AddServer(settings) => {
            model.add_server(settings);
        }
        ModelCommand::RemoveServer(id) => model.remove_server(id),
        ModelCommand::ReplaceServer(id, settings) => {
            model.replace_server(id, settings);
        }
        ModelCommand::SetThrottling(settings) => model.set_throttling(settings),
        ModelCommand::SetLogLevel(level) => model.set_log_level(level),
        ModelCommand::Snapshot(reply) => {
            let _ = reply.send(model.snapshot());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FileId, NzbId, RecordingEngine, SegmentState};
    use std::sync::Arc;

    #[tokio::test]
    async fn events_from_many_threads_are_serialized() {
        let engine = Arc::new(RecordingEngine::new());
        let looped = ModelLoop::spawn(DriveModel::new(engine));
        let handle = looped.handle.clone();

        handle.event(EngineEvent::NzbOpened {
            nzb: NzbId(1),
            path: "a.nzb".into(),
        });
        handle.event(EngineEvent::FileAdded {
            nzb: NzbId(1),
            file: FileId(10),
            segments: 64,
            size: 64_000,
        });

        // Segment events raised off several threads at once.
        let mut joins = Vec::new();
        for index in 0..64usize {
            let handle = handle.clone();
            joins.push(tokio::spawn(async move {
                handle.event(EngineEvent::SegmentState {
                    file: FileId(10),
                    index,
                    state: SegmentState::HasData,
                });
            }));
        }
        for join in joins {
            join.await.unwrap();
        }

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.jobs.len(), 1);
        assert_eq!(snapshot.jobs[0].parts[0].cached, 64);

        drop(handle);
        drop(looped.handle);
        let model = looped.task.await.unwrap();
        assert_eq!(model.mounts().len(), 1);
    }

    #[tokio::test]
    async fn commands_cross_the_boundary() {
        let engine = Arc::new(RecordingEngine::new());
        let looped = ModelLoop::spawn(DriveModel::new(engine.clone()));

        looped.handle.command(ModelCommand::AddServer(ServerSettings {
            host: "news.example.org".into(),
            ..Default::default()
        }));
        let snapshot = looped.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.servers.len(), 1);

        drop(looped.handle);
        looped.task.await.unwrap();
    }
}
