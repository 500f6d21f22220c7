//! Cloneable read-model handed across the dispatch boundary.
//!
//! The live model is owned by one task; presentation code asks for a
//! snapshot instead of reaching into shared state.

use crate::engine::{FileId, NzbId, SegmentState, ServerId};

use super::mount::{JobHealth, MountPhase, NzbJob};
use super::server::{Server, SlotState};
use super::units::{DataRateUnit, DataSizeUnit};
use super::DriveModel;

/// Point-in-time view of one file part.
#[derive(Debug, Clone)]
pub struct PartView {
    pub file: FileId,
    pub name: String,
    pub size: u64,
    pub segment_states: Vec<SegmentState>,
    pub loading: usize,
    pub cached: usize,
    pub missing: usize,
}

/// Point-in-time view of one mounted job.
#[derive(Debug, Clone)]
pub struct JobView {
    pub nzb: NzbId,
    pub path: String,
    pub size: u64,
    pub display_size: (u64, DataSizeUnit),
    pub progress: u32,
    pub phase: MountPhase,
    pub health: JobHealth,
    pub parts: Vec<PartView>,
}

/// Point-in-time view of one server.
#[derive(Debug, Clone)]
pub struct ServerView {
    pub id: ServerId,
    pub display: String,
    pub slots: Vec<SlotState>,
    pub missing_segments: u64,
    pub connection_timeouts: u64,
    pub errors: u64,
    pub rate: (f64, DataRateUnit),
}

/// Full model snapshot: ordered jobs, ordered servers, aggregate rate.
#[derive(Debug, Clone)]
pub struct ModelSnapshot {
    pub jobs: Vec<JobView>,
    pub servers: Vec<ServerView>,
    pub aggregate_rate: (f64, DataRateUnit),
}

impl ModelSnapshot {
    pub(super) fn capture(model: &DriveModel) -> Self {
        Self {
            jobs: model
                .mounts()
                .jobs()
                .map(|(nzb, job)| job_view(nzb, job))
                .collect(),
            servers: model
                .roster()
                .iter()
                .map(|(id, server)| server_view(id, server))
                .collect(),
            aggregate_rate: model.status().display_rate(),
        }
    }
}

fn job_view(nzb: NzbId, job: &NzbJob) -> JobView {
    JobView {
        nzb,
        path: job.path().to_string(),
        size: job.size(),
        display_size: job.display_size(),
        progress: job.progress(),
        phase: job.phase(),
        health: job.health(),
        parts: job
            .parts()
            .map(|(file, part)| PartView {
                file,
                name: part.name().to_string(),
                size: part.size(),
                segment_states: part.segments().states().to_vec(),
                loading: part.segments().loading(),
                cached: part.segments().cached(),
                missing: part.segments().missing(),
            })
            .collect(),
    }
}

fn server_view(id: ServerId, server: &Server) -> ServerView {
    let status = server.status();
    ServerView {
        id,
        display: server.settings().to_string(),
        slots: status.slots().to_vec(),
        missing_segments: status.missing_segments(),
        connection_timeouts: status.connection_timeouts(),
        errors: status.errors(),
        rate: status.rate().display(),
    }
}
