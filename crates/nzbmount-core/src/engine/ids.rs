//! Opaque identifiers assigned by the engine.
//!
//! The engine keys every notification by small integers. These newtypes keep
//! the three id spaces (archives, file parts, servers) from being mixed up in
//! the model's lookup maps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a mounted NZB archive, unique while the mount is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NzbId(pub i32);

/// Identifier of a single file part within a mounted archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(pub i32);

/// Runtime identifier of a configured news server, handed out by
/// [`Engine::add_server`](super::Engine::add_server).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub i32);

impl fmt::Display for NzbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nzb#{}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server#{}", self.0)
    }
}
