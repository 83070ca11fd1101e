//! Host callback contract for block entities.
//!
//! The host (a world, a test harness, the headless binary) owns scheduling:
//! it calls [`BlockEntity::on_tick`] once per simulation tick, notifies slot
//! changes it performs, and saves/loads records. Block entities never call
//! back into the host; they queue [`BlockEntityEvent`]s instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use traincraft_core::{Compound, SimTick};

/// Which side of the simulation is running the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Authoritative simulation.
    Server,
    /// Presentation copy fed by sync records.
    Client,
}

/// Block faces, in the host's ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Negative Y.
    Down,
    /// Positive Y.
    Up,
    /// Negative Z.
    North,
    /// Positive Z.
    South,
    /// Negative X.
    West,
    /// Positive X.
    East,
}

impl Face {
    /// All faces in ordinal order.
    pub const ALL: [Face; 6] = [
        Face::Down,
        Face::Up,
        Face::North,
        Face::South,
        Face::West,
        Face::East,
    ];
}

/// Why a record is being written or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordPurpose {
    /// World save.
    Save,
    /// Client update payload.
    Sync,
    /// Block broken and kept on the dropped item.
    Drop,
}

/// Notifications queued for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEntityEvent {
    /// Push the current state to watching clients.
    SyncToClient,
    /// The block's visual "active" state changed.
    ActiveChanged(bool),
}

/// Per-call context handed to [`BlockEntity::on_tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Current simulation tick.
    pub tick: SimTick,
    /// Side running the tick.
    pub side: Side,
}

impl TickContext {
    /// Server-side context at `tick`.
    pub fn server(tick: SimTick) -> Self {
        Self {
            tick,
            side: Side::Server,
        }
    }
}

/// Errors raised while loading a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Record belongs to another kind of block entity.
    #[error("record is for `{found}`, expected `{expected}`")]
    KindMismatch {
        /// Kind this block entity loads.
        expected: &'static str,
        /// Kind stored in the record.
        found: String,
    },
    /// A field exists with an unexpected tag type.
    #[error("record field `{0}` has an unexpected type")]
    WrongType(&'static str),
    /// An inventory list entry is not a compound.
    #[error("inventory entry {0} is not a compound")]
    MalformedSlot(usize),
    /// Stored fluid is larger than the tank.
    #[error("stored fluid amount {amount} exceeds tank capacity {capacity}")]
    FluidExceedsCapacity {
        /// Stored amount.
        amount: u32,
        /// Tank capacity.
        capacity: u32,
    },
}

/// Record key holding the block-entity kind.
pub const RECORD_KIND_KEY: &str = "id";

/// Lifecycle hooks a host drives.
pub trait BlockEntity {
    /// Stable kind identifier written into records.
    fn kind(&self) -> &'static str;

    /// Advance one simulation tick.
    fn on_tick(&mut self, ctx: &TickContext);

    /// Write state for `purpose`.
    fn on_save(&self, purpose: RecordPurpose) -> Compound;

    /// Restore state written for `purpose`.
    fn on_load(&mut self, record: &Compound, purpose: RecordPurpose) -> Result<(), RecordError>;

    /// A slot's contents changed, whoever changed it.
    fn on_slot_changed(&mut self, slot: usize);

    /// Take queued notifications.
    fn drain_events(&mut self) -> Vec<BlockEntityEvent>;
}

/// Read the kind stored in a record, if any.
pub fn record_kind(record: &Compound) -> Option<&str> {
    record.get_str(RECORD_KIND_KEY)
}
