//! Distillery block entity.
//!
//! Burns fuel from the burn slot, runs one recipe at a time from the input
//! slot, deposits the recipe's item and fluid outputs, and fills fluid
//! containers from its tank.

use crate::block_entity::{
    record_kind, BlockEntity, BlockEntityEvent, Face, RecordError, RecordPurpose, Side,
    TickContext, RECORD_KIND_KEY,
};
use crate::inventory::{can_stacks_merge, Inventory, ItemHandler, SlotAccess};
use crate::item_registry::ItemRegistry;
use crate::recipe::RecipeCatalog;
use crate::tank::{FluidHandler, FluidTank};
use crate::Action;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use traincraft_core::{Compound, FluidStack, ItemStack, RegistryKey, Tag};

/// Kind identifier written into records.
pub const DISTILLERY_KIND: &str = "traincraft:distillery";

/// Slot holding recipe input.
pub const INPUT_SLOT: usize = 0;
/// Slot holding fuel.
pub const BURN_SLOT: usize = 1;
/// Slot receiving recipe output items.
pub const OUTPUT_SLOT: usize = 2;
/// Slot holding empty fluid containers.
pub const CONTAINER_INPUT_SLOT: usize = 3;
/// Slot receiving filled fluid containers.
pub const CONTAINER_OUTPUT_SLOT: usize = 4;
/// Number of inventory slots.
pub const SLOT_COUNT: usize = 5;

/// Default tank capacity in millibuckets.
pub const FLUID_TANK_CAPACITY: u32 = 16000;

/// Default number of burning ticks between periodic client syncs.
pub const SYNC_INTERVAL: u32 = 5;

const INSERT_EXTRACT: SlotAccess = SlotAccess::INSERT.union(SlotAccess::EXTRACT);

/// Automation access per slot.
pub const SLOT_ACCESS: [SlotAccess; SLOT_COUNT] = [
    INSERT_EXTRACT,
    INSERT_EXTRACT,
    SlotAccess::EXTRACT,
    INSERT_EXTRACT,
    SlotAccess::EXTRACT,
];

const ALL_SLOTS: [usize; SLOT_COUNT] = [
    INPUT_SLOT,
    BURN_SLOT,
    OUTPUT_SLOT,
    CONTAINER_INPUT_SLOT,
    CONTAINER_OUTPUT_SLOT,
];

/// Slots exposed to automation on a face; `None` exposes every slot.
pub fn slots_for_face(face: Option<Face>) -> &'static [usize] {
    match face {
        None => &ALL_SLOTS,
        Some(Face::Up) => &[INPUT_SLOT],
        Some(Face::Down) => &[OUTPUT_SLOT, CONTAINER_OUTPUT_SLOT],
        Some(_) => &[BURN_SLOT, CONTAINER_INPUT_SLOT],
    }
}

/// Tunables for a distillery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistilleryConfig {
    /// Tank capacity in millibuckets.
    pub tank_capacity: u32,
    /// Burning ticks between periodic syncs (0 disables them).
    pub sync_interval: u32,
}

impl Default for DistilleryConfig {
    fn default() -> Self {
        Self {
            tank_capacity: FLUID_TANK_CAPACITY,
            sync_interval: SYNC_INTERVAL,
        }
    }
}

/// Recipe progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    /// No active recipe.
    Idle,
    /// A recipe is running.
    Crafting,
}

/// Distillery block entity state.
#[derive(Debug, Clone)]
pub struct Distillery {
    catalog: Arc<RecipeCatalog>,
    items: Arc<ItemRegistry>,
    side: Side,
    sync_interval: u32,
    inventory: Inventory,
    tank: FluidTank,
    burn_time: u32,
    max_burn_time: u32,
    recipe_burn_time: u32,
    max_recipe_burn_time: u32,
    active_recipe: Option<RegistryKey>,
    active: bool,
    /// Set by internal slot mutations; drained by re-running the
    /// inventory-change reaction.
    inventory_dirty: bool,
    events: Vec<BlockEntityEvent>,
}

impl Distillery {
    /// Create an empty server-side distillery with default tunables.
    pub fn new(catalog: Arc<RecipeCatalog>, items: Arc<ItemRegistry>) -> Self {
        Self::with_config(catalog, items, DistilleryConfig::default())
    }

    /// Create an empty server-side distillery.
    pub fn with_config(
        catalog: Arc<RecipeCatalog>,
        items: Arc<ItemRegistry>,
        config: DistilleryConfig,
    ) -> Self {
        Self {
            catalog,
            items,
            side: Side::Server,
            sync_interval: config.sync_interval,
            inventory: Inventory::new(SLOT_COUNT),
            tank: FluidTank::new(config.tank_capacity),
            burn_time: 0,
            max_burn_time: 0,
            recipe_burn_time: 0,
            max_recipe_burn_time: 0,
            active_recipe: None,
            active: false,
            inventory_dirty: false,
            events: Vec::new(),
        }
    }

    /// Builder-style side. Client copies only mirror synced state.
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Remaining fuel ticks.
    pub fn burn_time(&self) -> u32 {
        self.burn_time
    }

    /// Fuel ticks provided by the item currently burning.
    pub fn max_burn_time(&self) -> u32 {
        self.max_burn_time
    }

    /// Remaining fueled ticks of the active recipe.
    pub fn recipe_burn_time(&self) -> u32 {
        self.recipe_burn_time
    }

    /// Total ticks of the active recipe.
    pub fn max_recipe_burn_time(&self) -> u32 {
        self.max_recipe_burn_time
    }

    /// Id of the running recipe.
    pub fn active_recipe(&self) -> Option<&RegistryKey> {
        self.active_recipe.as_ref()
    }

    /// Visual "active" flag.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether fuel is burning.
    pub fn is_fueled(&self) -> bool {
        self.burn_time > 0
    }

    /// Recipe progress state.
    pub fn process_state(&self) -> ProcessState {
        if self.active_recipe.is_some() {
            ProcessState::Crafting
        } else {
            ProcessState::Idle
        }
    }

    /// Inventory contents.
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Contents of one slot.
    pub fn stack_in_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.inventory.get(slot)
    }

    /// The fluid tank.
    pub fn tank(&self) -> &FluidTank {
        &self.tank
    }

    /// Recipe catalog this distillery selects from.
    pub fn catalog(&self) -> &RecipeCatalog {
        &self.catalog
    }

    /// Replace a slot's contents directly (player/GUI path, no validity
    /// check) and fire the slot-change hook. Returns the previous stack.
    pub fn set_stack(&mut self, slot: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        if slot >= SLOT_COUNT {
            return stack;
        }
        let previous = self.inventory.take(slot);
        self.inventory.set(slot, stack);
        self.on_slot_changed(slot);
        previous
    }

    /// Take a slot's whole stack and fire the slot-change hook.
    pub fn take_stack(&mut self, slot: usize) -> Option<ItemStack> {
        let taken = self.inventory.take(slot)?;
        self.on_slot_changed(slot);
        Some(taken)
    }

    /// Whether automation may place `stack` into `slot`.
    pub fn is_item_valid_for_slot(&self, slot: usize, stack: &ItemStack) -> bool {
        match slot {
            INPUT_SLOT => self.catalog.accepts_input(stack),
            BURN_SLOT => self.items.is_fuel(stack),
            CONTAINER_INPUT_SLOT => self.items.has_fluid_capability(stack),
            _ => false,
        }
    }

    /// Item handler for automation on `face`.
    pub fn item_handler(&mut self, face: Option<Face>) -> DistilleryItemHandler<'_> {
        DistilleryItemHandler {
            slots: slots_for_face(face),
            distillery: self,
        }
    }

    /// Fluid handler exposing the tank; the same tank backs every face.
    pub fn fluid_handler(&mut self) -> DistilleryFluidHandler<'_> {
        DistilleryFluidHandler { distillery: self }
    }

    /// Snapshot for GUIs and client sync.
    pub fn view(&self) -> DistilleryView {
        DistilleryView {
            burn_time: self.burn_time,
            max_burn_time: self.max_burn_time,
            recipe_burn_time: self.recipe_burn_time,
            max_recipe_burn_time: self.max_recipe_burn_time,
            active: self.active,
            fluid: self.tank.fluid().cloned(),
            tank_capacity: self.tank.capacity(),
            slots: self.inventory.iter().map(|s| s.cloned()).collect(),
        }
    }

    fn on_inventory_changed(&mut self) {
        if self.side != Side::Server {
            return;
        }
        self.inventory_dirty = true;
        self.flush_inventory_changes();
    }

    /// Re-run the inventory reaction until no internal mutation is pending.
    /// Each mutating pass consumes items, so this terminates.
    fn flush_inventory_changes(&mut self) {
        while std::mem::take(&mut self.inventory_dirty) {
            self.react_to_inventory();
        }
    }

    fn mark_inventory_changed(&mut self) {
        self.inventory_dirty = true;
    }

    fn react_to_inventory(&mut self) {
        if self.burn_time == 0 {
            self.consume_fuel();
        }
        if self.active_recipe.is_none() {
            self.try_start_recipe();
        }
        if self.inventory.get(CONTAINER_INPUT_SLOT).is_some() {
            self.try_fill_container();
        }
    }

    fn try_start_recipe(&mut self) -> bool {
        if self.active_recipe.is_some() || self.burn_time == 0 {
            return false;
        }
        let Some(input) = self.inventory.get(INPUT_SLOT) else {
            return false;
        };
        let catalog = Arc::clone(&self.catalog);
        let Some(recipe) = catalog.find_for_input(input) else {
            return false;
        };
        if !can_stacks_merge(
            self.inventory.get(OUTPUT_SLOT),
            Some(&recipe.output),
            &self.items,
        ) || !self.tank.can_accept(recipe.output_fluid.as_ref())
        {
            return false;
        }

        self.inventory.shrink(INPUT_SLOT, recipe.input_amount);
        self.mark_inventory_changed();
        self.active_recipe = Some(recipe.id.clone());
        self.recipe_burn_time = recipe.burn_time;
        self.max_recipe_burn_time = recipe.burn_time;
        debug!(recipe = %recipe.id, burn_time = recipe.burn_time, "distillery started recipe");
        self.set_active(true);
        self.sync();
        true
    }

    fn complete_recipe(&mut self, id: &RegistryKey) {
        let catalog = Arc::clone(&self.catalog);
        let Some(recipe) = catalog.get(id) else {
            self.clear_recipe();
            self.sync();
            return;
        };
        // Output room may have been taken since the recipe started; wait for it.
        if !can_stacks_merge(
            self.inventory.get(OUTPUT_SLOT),
            Some(&recipe.output),
            &self.items,
        ) || !self.tank.can_accept(recipe.output_fluid.as_ref())
        {
            return;
        }

        self.inventory.merge_into(OUTPUT_SLOT, recipe.output.clone());
        self.mark_inventory_changed();
        if let Some(fluid) = &recipe.output_fluid {
            self.tank.fill(fluid, Action::Execute);
        }
        debug!(recipe = %recipe.id, "distillery finished recipe");
        self.clear_recipe();
        self.sync();
        self.try_start_recipe();
    }

    fn clear_recipe(&mut self) {
        self.active_recipe = None;
        self.recipe_burn_time = 0;
        self.max_recipe_burn_time = 0;
        self.set_active(false);
    }

    fn consume_fuel(&mut self) -> bool {
        let Some(fuel) = self.inventory.get(BURN_SLOT) else {
            return false;
        };
        let value = self.items.burn_time(fuel);
        if value == 0 {
            return false;
        }
        debug!(fuel = %fuel.item, burn_time = value, "distillery consumed fuel");
        self.burn_time = value;
        self.max_burn_time = value;
        self.inventory.shrink(BURN_SLOT, 1);
        self.mark_inventory_changed();
        self.sync();
        true
    }

    fn try_fill_container(&mut self) -> bool {
        let Some(offered) = self.tank.drain(u32::MAX, Action::Simulate) else {
            return false;
        };
        let Some(input) = self.inventory.get(CONTAINER_INPUT_SLOT) else {
            return false;
        };
        let Some(mut handler) = self.items.fluid_handler(input) else {
            return false;
        };
        // The handler works on a detached copy of one container item.
        let filled = handler.fill(&offered, Action::Execute);
        if filled == 0 {
            return false;
        }
        let container = handler.container().clone();
        if !can_stacks_merge(
            self.inventory.get(CONTAINER_OUTPUT_SLOT),
            Some(&container),
            &self.items,
        ) {
            return false;
        }

        self.tank.drain(filled, Action::Execute);
        self.inventory.merge_into(CONTAINER_OUTPUT_SLOT, container);
        self.inventory.shrink(CONTAINER_INPUT_SLOT, 1);
        self.mark_inventory_changed();
        debug!(amount = filled, "distillery filled a container");
        self.sync();
        true
    }

    fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.events.push(BlockEntityEvent::ActiveChanged(active));
        }
    }

    fn sync(&mut self) {
        if self.events.last() != Some(&BlockEntityEvent::SyncToClient) {
            self.events.push(BlockEntityEvent::SyncToClient);
        }
    }
}

fn record_int(value: u32) -> i32 {
    value.min(i32::MAX as u32) as i32
}

impl BlockEntity for Distillery {
    fn kind(&self) -> &'static str {
        DISTILLERY_KIND
    }

    fn on_tick(&mut self, ctx: &TickContext) {
        if ctx.side != Side::Server || self.side != Side::Server {
            return;
        }

        if let Some(id) = self.active_recipe.clone() {
            if self.burn_time > 0 {
                self.recipe_burn_time = self.recipe_burn_time.saturating_sub(1);
            }
            if self.recipe_burn_time == 0 {
                self.complete_recipe(&id);
            }
        }

        if self.burn_time > 0 {
            self.burn_time -= 1;
            if self.burn_time == 0 {
                self.max_burn_time = 0;
                if self.consume_fuel() {
                    self.try_start_recipe();
                }
            } else if self.sync_interval > 0 && self.burn_time % self.sync_interval == 0 {
                self.sync();
            }
        }

        // Internal slot changes fire the inventory hook after the tick's own work.
        self.flush_inventory_changes();
    }

    fn on_save(&self, purpose: RecordPurpose) -> Compound {
        let mut record = Compound::new();
        record.insert(RECORD_KIND_KEY, DISTILLERY_KIND);
        record.insert("items", self.inventory.to_tag_list());
        if let Some(fluid) = self.tank.to_compound() {
            record.insert("fluid", fluid);
        }
        if purpose != RecordPurpose::Drop {
            record.insert("burn_time", record_int(self.burn_time));
            record.insert("max_burn_time", record_int(self.max_burn_time));
            record.insert("recipe_burn_time", record_int(self.recipe_burn_time));
            record.insert("max_recipe_burn_time", record_int(self.max_recipe_burn_time));
        }
        if purpose == RecordPurpose::Sync {
            record.insert("active", self.active);
        }
        record
    }

    fn on_load(&mut self, record: &Compound, purpose: RecordPurpose) -> Result<(), RecordError> {
        if let Some(kind) = record_kind(record) {
            if kind != DISTILLERY_KIND {
                return Err(RecordError::KindMismatch {
                    expected: DISTILLERY_KIND,
                    found: kind.to_string(),
                });
            }
        }

        let mut inventory = Inventory::new(SLOT_COUNT);
        match record.get("items") {
            Some(Tag::List(list)) => inventory
                .load_tag_list(list)
                .map_err(RecordError::MalformedSlot)?,
            Some(_) => return Err(RecordError::WrongType("items")),
            None => {}
        }

        let fluid = match record.get("fluid") {
            Some(Tag::Compound(comp)) => FluidStack::from_compound(comp),
            Some(_) => return Err(RecordError::WrongType("fluid")),
            None => None,
        };
        if let Some(fluid) = &fluid {
            if fluid.amount > self.tank.capacity() {
                return Err(RecordError::FluidExceedsCapacity {
                    amount: fluid.amount,
                    capacity: self.tank.capacity(),
                });
            }
        }

        self.inventory = inventory;
        self.tank.set_fluid(fluid);

        // Counters are only taken when stored as ints, like the host does.
        if purpose != RecordPurpose::Drop {
            let counters = [
                ("burn_time", &mut self.burn_time),
                ("max_burn_time", &mut self.max_burn_time),
                ("recipe_burn_time", &mut self.recipe_burn_time),
                ("max_recipe_burn_time", &mut self.max_recipe_burn_time),
            ];
            for (key, counter) in counters {
                if let Some(value) = record.get_int(key) {
                    *counter = value.max(0) as u32;
                }
            }
        }
        if purpose == RecordPurpose::Sync {
            if let Some(active) = record.get_bool("active") {
                self.active = active;
            }
        }
        Ok(())
    }

    fn on_slot_changed(&mut self, slot: usize) {
        if slot < SLOT_COUNT {
            self.on_inventory_changed();
        }
    }

    fn drain_events(&mut self) -> Vec<BlockEntityEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Item handler over a distillery's slots as seen from one face.
pub struct DistilleryItemHandler<'a> {
    distillery: &'a mut Distillery,
    slots: &'static [usize],
}

impl DistilleryItemHandler<'_> {
    fn target(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied()
    }
}

impl ItemHandler for DistilleryItemHandler<'_> {
    fn slots(&self) -> usize {
        self.slots.len()
    }

    fn stack_in_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.distillery.inventory.get(self.target(slot)?)
    }

    fn insert_item(&mut self, slot: usize, stack: ItemStack, action: Action) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let Some(target) = self.target(slot) else {
            return Some(stack);
        };
        let distillery = &mut *self.distillery;
        if !SLOT_ACCESS[target].contains(SlotAccess::INSERT)
            || !distillery.is_item_valid_for_slot(target, &stack)
        {
            return Some(stack);
        }

        let held = match distillery.inventory.get(target) {
            Some(existing) if !existing.can_merge(&stack) => return Some(stack),
            Some(existing) => existing.count,
            None => 0,
        };
        let limit = distillery.items.max_stack_size(&stack);
        let moved = limit.saturating_sub(held).min(stack.count);
        if moved == 0 {
            return Some(stack);
        }
        if action.execute() {
            distillery
                .inventory
                .merge_into(target, stack.copy_with_count(moved));
            distillery.on_slot_changed(target);
        }
        let remainder = stack.count - moved;
        (remainder > 0).then(|| stack.copy_with_count(remainder))
    }

    fn extract_item(&mut self, slot: usize, amount: u32, action: Action) -> Option<ItemStack> {
        if amount == 0 {
            return None;
        }
        let target = self.target(slot)?;
        if !SLOT_ACCESS[target].contains(SlotAccess::EXTRACT) {
            return None;
        }
        let distillery = &mut *self.distillery;
        let existing = distillery.inventory.get(target)?;
        let out = existing.copy_with_count(amount.min(existing.count));
        if action.execute() {
            distillery.inventory.shrink(target, out.count);
            distillery.on_slot_changed(target);
        }
        Some(out)
    }
}

/// Fluid handler over a distillery's tank; executed changes queue a sync.
pub struct DistilleryFluidHandler<'a> {
    distillery: &'a mut Distillery,
}

impl FluidHandler for DistilleryFluidHandler<'_> {
    fn fluid(&self) -> Option<&FluidStack> {
        self.distillery.tank.fluid()
    }

    fn capacity(&self) -> u32 {
        self.distillery.tank.capacity()
    }

    fn fill(&mut self, resource: &FluidStack, action: Action) -> u32 {
        let filled = self.distillery.tank.fill(resource, action);
        if filled > 0 && action.execute() {
            self.distillery.sync();
        }
        filled
    }

    fn drain(&mut self, max_amount: u32, action: Action) -> Option<FluidStack> {
        let drained = self.distillery.tank.drain(max_amount, action);
        if drained.is_some() && action.execute() {
            self.distillery.sync();
        }
        drained
    }
}

/// Client-facing snapshot of a distillery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistilleryView {
    /// Remaining fuel ticks.
    pub burn_time: u32,
    /// Fuel ticks of the burning item.
    pub max_burn_time: u32,
    /// Remaining recipe ticks.
    pub recipe_burn_time: u32,
    /// Total recipe ticks.
    pub max_recipe_burn_time: u32,
    /// Visual active flag.
    pub active: bool,
    /// Tank contents.
    pub fluid: Option<FluidStack>,
    /// Tank capacity.
    pub tank_capacity: u32,
    /// Slot contents in slot order.
    pub slots: Vec<Option<ItemStack>>,
}

impl DistilleryView {
    /// Remaining fuel scaled to `pixels` (flame height).
    pub fn burn_progress(&self, pixels: u32) -> u32 {
        scaled(self.burn_time, self.max_burn_time, pixels)
    }

    /// Elapsed recipe progress scaled to `pixels` (arrow width).
    pub fn recipe_progress(&self, pixels: u32) -> u32 {
        let elapsed = self
            .max_recipe_burn_time
            .saturating_sub(self.recipe_burn_time);
        scaled(elapsed, self.max_recipe_burn_time, pixels)
    }

    /// Tank fill level scaled to `pixels`.
    pub fn tank_level(&self, pixels: u32) -> u32 {
        let amount = self.fluid.as_ref().map_or(0, |f| f.amount);
        scaled(amount, self.tank_capacity, pixels)
    }
}

fn scaled(value: u32, max: u32, pixels: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (u64::from(value.min(max)) * u64::from(pixels) / u64::from(max)) as u32
}
