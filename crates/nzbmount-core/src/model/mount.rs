//! Mounted archives and their file parts.
//!
//! The mount list turns open/close/add/info/segment/progress notifications
//! into an ordered tree: jobs own parts, parts own segment vectors, and the
//! aggregates (size, segment totals, progress) are maintained incrementally.
//! Unknown ids are ignored everywhere; notifications legitimately race
//! mount and unmount.

use tracing::debug;

use crate::engine::{FileId, NzbId, SegmentState};

use super::registry::IdRegistry;
use super::segment::SegmentVector;
use super::units::{select_size_unit, DataSizeUnit};

/// Placeholder part name until the engine reports the real one.
const UNRESOLVED_NAME: &str = "???";

/// Phase of a mounted archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    /// Headers are still being fetched and parts registered.
    Mounting,
    /// All parts are known; progress now tracks downloaded segments.
    Mounted,
}

/// Health of a job, derived from its missing-segment counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobHealth {
    Ok,
    Error,
}

/// A single file inside a mounted archive.
#[derive(Debug, Clone)]
pub struct NzbFilePart {
    owner: NzbId,
    name: String,
    size: u64,
    segments: SegmentVector,
}

impl NzbFilePart {
    fn new(owner: NzbId, segment_count: usize, size: u64) -> Self {
        Self {
            owner,
            name: UNRESOLVED_NAME.to_string(),
            size,
            segments: SegmentVector::new(segment_count),
        }
    }

    pub fn owner(&self) -> NzbId {
        self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once the engine has reported the real file name.
    pub fn resolved(&self) -> bool {
        self.name != UNRESOLVED_NAME
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn segments(&self) -> &SegmentVector {
        &self.segments
    }
}

/// A mounted NZB archive with its parts and rolled-up aggregates.
#[derive(Debug, Clone)]
pub struct NzbJob {
    path: String,
    parts: IdRegistry<FileId, NzbFilePart>,
    size: u64,
    /// Total segments across all parts.
    total_segments: usize,
    /// Segments that reached `HasData`.
    loaded_segments: usize,
    /// Segments that went missing or failed.
    missing_segments: usize,
    progress: u32,
    phase: MountPhase,
}

impl NzbJob {
    fn new(path: String) -> Self {
        Self {
            path,
            parts: IdRegistry::new(),
            size: 0,
            total_segments: 0,
            loaded_segments: 0,
            missing_segments: 0,
            progress: 0,
            phase: MountPhase::Mounting,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parts(&self) -> impl Iterator<Item = (FileId, &NzbFilePart)> {
        self.parts.iter()
    }

    pub fn part(&self, file: FileId) -> Option<&NzbFilePart> {
        self.parts.get(file)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Size scaled for display with its auto-selected unit.
    pub fn display_size(&self) -> (u64, DataSizeUnit) {
        select_size_unit(self.size)
    }

    pub fn total_segments(&self) -> usize {
        self.total_segments
    }

    pub fn loaded_segments(&self) -> usize {
        self.loaded_segments
    }

    /// Integer percentage in 0..=100, truncating.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn health(&self) -> JobHealth {
        if self.missing_segments == 0 {
            JobHealth::Ok
        } else {
            JobHealth::Error
        }
    }

    /// Progress from downloaded segments, used once the job is mounted.
    fn refresh_loaded_progress(&mut self) {
        if self.total_segments == 0 {
            self.progress = 0;
            return;
        }
        self.progress = (100 * self.loaded_segments / self.total_segments) as u32;
    }
}

/// Ordered collection of mounted jobs with id-keyed lookup for both jobs and
/// their parts.
#[derive(Debug, Default)]
pub struct MountList {
    jobs: IdRegistry<NzbId, NzbJob>,
    /// Routes part-keyed notifications to the owning job.
    part_owners: std::collections::HashMap<FileId, NzbId>,
}

impl MountList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> impl Iterator<Item = (NzbId, &NzbJob)> {
        self.jobs.iter()
    }

    pub fn job(&self, nzb: NzbId) -> Option<&NzbJob> {
        self.jobs.get(nzb)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Resolve a part and its owning job.
    pub fn part(&self, file: FileId) -> Option<&NzbFilePart> {
        let owner = *self.part_owners.get(&file)?;
        self.jobs.get(owner)?.part(file)
    }

    /// An archive was opened: a fresh job with zero aggregates at the tail.
    pub fn open(&mut self, nzb: NzbId, path: String) {
        debug!(%nzb, %path, "archive opened");
        self.jobs.insert(nzb, NzbJob::new(path));
    }

    /// An archive was closed: drop the job and unregister every owned part,
    /// so later part-keyed events are inert. No-op for unknown ids.
    pub fn close(&mut self, nzb: NzbId) {
        let Some(job) = self.jobs.remove(nzb) else {
            return;
        };
        for (file, _) in job.parts.iter() {
            self.part_owners.remove(&file);
        }
        debug!(%nzb, path = job.path(), "archive closed");
    }

    /// A part appeared inside a job. Requires the job to exist; an unknown
    /// job id means open/close raced this event and the part is dropped.
    pub fn add_part(&mut self, nzb: NzbId, file: FileId, segment_count: usize, size: u64) {
        let Some(job) = self.jobs.get_mut(nzb) else {
            return;
        };
        job.parts.insert(file, NzbFilePart::new(nzb, segment_count, size));
        job.size += size;
        job.total_segments += segment_count;
        self.part_owners.insert(file, nzb);
    }

    /// A part disappeared: remove it and subtract its contributions from the
    /// owning job's aggregates.
    pub fn remove_part(&mut self, file: FileId) {
        let Some(owner) = self.part_owners.remove(&file) else {
            return;
        };
        let Some(job) = self.jobs.get_mut(owner) else {
            return;
        };
        let Some(part) = job.parts.remove(file) else {
            return;
        };
        job.size = job.size.saturating_sub(part.size);
        job.total_segments = job.total_segments.saturating_sub(part.segments.len());
        job.loaded_segments = job.loaded_segments.saturating_sub(part.segments.cached());
        job.missing_segments = job.missing_segments.saturating_sub(part.segments.missing());
        if job.phase == MountPhase::Mounted {
            job.refresh_loaded_progress();
        }
    }

    /// Name and exact size became known; the job aggregate moves by the
    /// difference between the new and the previously declared size.
    pub fn file_info(&mut self, file: FileId, name: String, size: u64) {
        let Some(owner) = self.part_owners.get(&file).copied() else {
            return;
        };
        let Some(job) = self.jobs.get_mut(owner) else {
            return;
        };
        let Some(part) = job.parts.get_mut(file) else {
            return;
        };
        let old_size = part.size;
        part.name = name;
        part.size = size;
        job.size = (job.size + size).saturating_sub(old_size);
    }

    /// A segment transitioned: update the part's vector and the job's
    /// loaded/missing counters; refresh progress when already mounted.
    pub fn segment_state(&mut self, file: FileId, index: usize, state: SegmentState) {
        let Some(owner) = self.part_owners.get(&file).copied() else {
            return;
        };
        let Some(job) = self.jobs.get_mut(owner) else {
            return;
        };
        let Some(part) = job.parts.get_mut(file) else {
            return;
        };
        part.segments.set(index, state);
        match state {
            SegmentState::HasData => {
                job.loaded_segments += 1;
                if job.phase == MountPhase::Mounted {
                    job.refresh_loaded_progress();
                }
            }
            SegmentState::MissingSegment | SegmentState::DownloadFailed => {
                job.missing_segments += 1;
            }
            SegmentState::Unset | SegmentState::Loading => {}
        }
    }

    /// Mounting progress: `completed` of `total` parts. A zero total reports
    /// progress 0 and stays in `Mounting`; when the last part completes, the
    /// job flips to `Mounted` and progress tracks downloaded segments.
    pub fn mount_progress(&mut self, nzb: NzbId, completed: usize, total: usize) {
        let Some(job) = self.jobs.get_mut(nzb) else {
            return;
        };
        if total == 0 {
            job.progress = 0;
            return;
        }
        job.progress = (100 * completed / total) as u32;
        if completed == total {
            job.phase = MountPhase::Mounted;
            job.refresh_loaded_progress();
        }
    }
}
