//! nzbmount-core: aggregation layer between the download/mount engine and a
//! status display.
//!
//! The engine reports id-keyed notifications from its own threads; this crate
//! turns the stream into an incrementally maintained object graph (mounted
//! jobs, file parts with segment vectors, server roster with connection slots
//! and smoothed rates) owned by a single dispatch task.

pub mod config;
pub mod logging;

pub mod dispatch;
pub mod engine;
pub mod model;
