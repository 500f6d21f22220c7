//! `nzbmount replay` – run a captured event trace through the model.
//!
//! The trace is JSON lines, one engine event per line, as produced by a
//! tracing engine wrapper. A recording engine stands in for the real one, so
//! a replay is a dry run: no mounts, no connections.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use nzbmount_core::config::NzbMountConfig;
use nzbmount_core::dispatch::ModelLoop;
use nzbmount_core::engine::{EngineEvent, RecordingEngine};
use nzbmount_core::model::mount::{JobHealth, MountPhase};
use nzbmount_core::model::server::SlotState;
use nzbmount_core::model::snapshot::ModelSnapshot;
use nzbmount_core::model::DriveModel;

pub async fn run_replay(cfg: &NzbMountConfig, trace: &Path, show_commands: bool) -> Result<()> {
    let file = File::open(trace)
        .with_context(|| format!("cannot open trace {}", trace.display()))?;

    let engine = Arc::new(RecordingEngine::new());
    let looped = ModelLoop::spawn(DriveModel::from_config(engine.clone(), cfg));

    let mut events = 0usize;
    let mut skipped = 0usize;
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("read error at line {}", lineno + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EngineEvent>(&line) {
            Ok(event) => {
                looped.handle.event(event);
                events += 1;
            }
            Err(err) => {
                tracing::warn!("line {}: unparsable event skipped: {err}", lineno + 1);
                skipped += 1;
            }
        }
    }

    let snapshot = looped
        .handle
        .snapshot()
        .await
        .context("model loop stopped before the replay finished")?;
    drop(looped.handle);
    looped.task.await.context("model loop panicked")?;

    println!("{events} events replayed ({skipped} skipped)");
    print_snapshot(&snapshot);

    if show_commands {
        println!();
        println!("engine commands:");
        for cmd in engine.commands() {
            println!("  {cmd:?}");
        }
    }
    Ok(())
}

fn print_snapshot(snapshot: &ModelSnapshot) {
    println!();
    if snapshot.jobs.is_empty() {
        println!("No mounted archives.");
    } else {
        println!("{:<28} {:>9} {:>5} {:>8} {:>7} {}", "ARCHIVE", "SIZE", "PROG", "PHASE", "HEALTH", "PARTS");
        for job in &snapshot.jobs {
            let (size, unit) = job.display_size;
            println!(
                "{:<28} {:>6} {:<2} {:>4}% {:>8} {:>7} {}",
                job.path,
                size,
                unit,
                job.progress,
                match job.phase {
                    MountPhase::Mounting => "mounting",
                    MountPhase::Mounted => "mounted",
                },
                match job.health {
                    JobHealth::Ok => "ok",
                    JobHealth::Error => "error",
                },
                job.parts.len(),
            );
        }
    }

    println!();
    if snapshot.servers.is_empty() {
        println!("No servers.");
    } else {
        println!("{:<40} {:<12} {:>8} {:>5} {:>5}", "SERVER", "SLOTS", "RATE", "MISS", "ERR");
        for server in &snapshot.servers {
            let slots: String = server
                .slots
                .iter()
                .map(|s| match s {
                    SlotState::Disconnected | SlotState::Connecting => '-',
                    SlotState::Idle => 'i',
                    SlotState::Working => 'W',
                })
                .collect();
            println!(
                "{:<40} {:<12} {:>6.1} {} {:>5} {:>5}",
                server.display,
                slots,
                server.rate.0,
                server.rate.1,
                server.missing_segments,
                server.errors,
            );
        }
    }

    println!();
    println!(
        "aggregate rate: {:.1} {}",
        snapshot.aggregate_rate.0, snapshot.aggregate_rate.1
    );
}
