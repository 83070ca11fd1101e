//! Micro-worldtest harness for deterministic, tick-based snapshot tests.
//!
//! A micro-worldtest steps a handful of block entities for a fixed number of
//! ticks and snapshots selected state each tick, together with the events the
//! host routed during that tick. The resulting report is compared against a
//! golden JSON file on disk (or updated when `TRAINCRAFT_UPDATE_SNAPSHOTS=1`
//! is set).

use crate::harness::{HostEvent, HostHarness};
use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use traincraft_core::SimTick;
use traincraft_world::BlockEntity;

/// Configuration for a micro-worldtest.
#[derive(Debug, Clone)]
pub struct MicroWorldtestConfig {
    /// Human-readable name (written into the snapshot report).
    pub name: String,
    /// Number of ticks to step (report includes the initial snapshot at tick 0).
    pub ticks: u64,
    /// Path to the golden JSON file.
    pub snapshot_path: PathBuf,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct MicroWorldtestFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
    /// Events routed since the previous frame.
    pub events: Vec<HostEvent>,
}

#[derive(Debug, Clone, Serialize)]
struct MicroWorldtestReport<S> {
    name: String,
    frames: Vec<MicroWorldtestFrame<S>>,
}

/// Run a micro-worldtest and assert (or update) the snapshot at `config.snapshot_path`.
///
/// `script` runs before each tick and may edit block entities through the
/// harness. Captures the initial frame at tick 0 (after any events already
/// routed by setup), then steps `config.ticks` times, capturing a frame after
/// each step (so the report contains `ticks + 1` frames).
pub fn run_micro_worldtest<E, Snapshot, ScriptFn, SnapFn>(
    config: MicroWorldtestConfig,
    mut harness: HostHarness<E>,
    mut script: ScriptFn,
    mut snapshot: SnapFn,
) -> Result<()>
where
    E: BlockEntity,
    Snapshot: Serialize,
    ScriptFn: FnMut(SimTick, &mut HostHarness<E>),
    SnapFn: FnMut(&HostHarness<E>) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.ticks as usize + 1);
    frames.push(MicroWorldtestFrame {
        tick: harness.tick().0,
        snapshot: snapshot(&harness),
        events: harness.take_events(),
    });

    for _ in 0..config.ticks {
        script(harness.tick(), &mut harness);
        harness.step();
        frames.push(MicroWorldtestFrame {
            tick: harness.tick().0,
            snapshot: snapshot(&harness),
            events: harness.take_events(),
        });
    }

    let report = MicroWorldtestReport {
        name: config.name,
        frames,
    };
    assert_json_snapshot(config.snapshot_path, &report)
}
