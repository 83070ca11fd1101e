//! In-process stand-in for the host engine.
//!
//! The harness owns block entities by position, ticks them in position order,
//! routes their queued events (sync payloads, the visual "active" block
//! state) and moves records through a [`BlockEntityStore`].

use crate::{EventRecord, JsonlSink};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use traincraft_core::{BlockPos, Compound, SimTick};
use traincraft_world::{
    BlockEntity, BlockEntityEvent, BlockEntityRecords, BlockEntityStore, RecordPurpose, Side,
    TickContext,
};

/// An event routed by the harness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostEvent {
    /// Tick the event was observed on.
    pub tick: SimTick,
    /// Emitting block.
    pub pos: BlockPos,
    /// What happened.
    pub event: BlockEntityEvent,
}

impl HostEvent {
    fn kind(&self) -> &'static str {
        match self.event {
            BlockEntityEvent::SyncToClient => "sync",
            BlockEntityEvent::ActiveChanged(_) => "active_changed",
        }
    }

    fn payload(&self) -> String {
        match self.event {
            BlockEntityEvent::SyncToClient => self.pos.to_string(),
            BlockEntityEvent::ActiveChanged(active) => format!("{} {}", self.pos, active),
        }
    }
}

#[derive(Default)]
struct Routing {
    log: Vec<HostEvent>,
    synced: BTreeMap<BlockPos, Compound>,
    active: BTreeMap<BlockPos, bool>,
}

impl Routing {
    fn collect<E: BlockEntity>(&mut self, tick: SimTick, pos: BlockPos, entity: &mut E) {
        for event in entity.drain_events() {
            match event {
                BlockEntityEvent::SyncToClient => {
                    self.synced.insert(pos, entity.on_save(RecordPurpose::Sync));
                }
                BlockEntityEvent::ActiveChanged(active) => {
                    self.active.insert(pos, active);
                }
            }
            self.log.push(HostEvent { tick, pos, event });
        }
    }
}

/// Host harness driving block entities of one type.
pub struct HostHarness<E> {
    tick: SimTick,
    entities: BTreeMap<BlockPos, E>,
    routing: Routing,
}

impl<E: BlockEntity> Default for HostHarness<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BlockEntity> HostHarness<E> {
    /// Empty harness at tick zero.
    pub fn new() -> Self {
        Self {
            tick: SimTick::ZERO,
            entities: BTreeMap::new(),
            routing: Routing::default(),
        }
    }

    /// Current tick (the next one to run).
    pub fn tick(&self) -> SimTick {
        self.tick
    }

    /// Place a block entity, returning whatever was there.
    pub fn place(&mut self, pos: BlockPos, entity: E) -> Option<E> {
        self.routing.active.remove(&pos);
        self.routing.synced.remove(&pos);
        self.entities.insert(pos, entity)
    }

    /// Block entity at `pos`.
    pub fn get(&self, pos: BlockPos) -> Option<&E> {
        self.entities.get(&pos)
    }

    /// Positions in tick order.
    pub fn positions(&self) -> impl Iterator<Item = BlockPos> + '_ {
        self.entities.keys().copied()
    }

    /// Mutate a block entity the way a player or GUI would, then route its
    /// events.
    pub fn edit<R>(&mut self, pos: BlockPos, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let entity = self.entities.get_mut(&pos)?;
        let result = f(entity);
        self.routing.collect(self.tick, pos, entity);
        Some(result)
    }

    /// Run one server tick over every block entity in position order.
    pub fn step(&mut self) {
        let ctx = TickContext {
            tick: self.tick,
            side: Side::Server,
        };
        for (pos, entity) in self.entities.iter_mut() {
            entity.on_tick(&ctx);
            self.routing.collect(self.tick, *pos, entity);
        }
        self.tick = self.tick.advance(1);
    }

    /// Run `ticks` server ticks.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Break the block: remove the entity and return its drop record.
    pub fn break_block(&mut self, pos: BlockPos) -> Option<Compound> {
        let entity = self.entities.remove(&pos)?;
        self.routing.active.remove(&pos);
        self.routing.synced.remove(&pos);
        Some(entity.on_save(RecordPurpose::Drop))
    }

    /// Every routed event so far.
    pub fn events(&self) -> &[HostEvent] {
        &self.routing.log
    }

    /// Take routed events, leaving the log empty.
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.routing.log)
    }

    /// Latest sync payload pushed for `pos`.
    pub fn last_sync(&self, pos: BlockPos) -> Option<&Compound> {
        self.routing.synced.get(&pos)
    }

    /// Visual "active" block state at `pos`.
    pub fn is_active(&self, pos: BlockPos) -> bool {
        self.routing.active.get(&pos).copied().unwrap_or(false)
    }

    /// Save records for every block entity.
    pub fn save_records(&self) -> BlockEntityRecords {
        self.entities
            .iter()
            .map(|(pos, entity)| (*pos, entity.on_save(RecordPurpose::Save)))
            .collect()
    }

    /// Write every block entity to `store`.
    pub fn save(&self, store: &BlockEntityStore) -> Result<()> {
        store.save(&self.save_records())
    }

    /// Rebuild a harness from `store`. `factory` creates an empty entity for
    /// a record, or `None` to skip it.
    pub fn load(
        store: &BlockEntityStore,
        mut factory: impl FnMut(BlockPos, &Compound) -> Option<E>,
    ) -> Result<Self> {
        let mut harness = Self::new();
        for (pos, record) in store.load()? {
            let Some(mut entity) = factory(pos, &record) else {
                tracing::warn!(%pos, "skipping block entity record with no factory");
                continue;
            };
            entity
                .on_load(&record, RecordPurpose::Save)
                .with_context(|| format!("Failed to load block entity at {pos}"))?;
            harness.entities.insert(pos, entity);
        }
        Ok(harness)
    }

    /// Append routed events to a JSONL sink.
    pub fn write_events(&self, sink: &mut JsonlSink) -> Result<()> {
        for event in &self.routing.log {
            let payload = event.payload();
            sink.write(&EventRecord {
                tick: event.tick,
                kind: event.kind(),
                payload: &payload,
            })?;
        }
        Ok(())
    }
}
