//! Distillery Worldtest
//!
//! Drives a distillery through the host hooks the way a world would:
//! slot edits, fixed ticks, automation handlers and record save/load.

use std::sync::Arc;
use traincraft_core::{FluidStack, ItemStack, RegistryKey, SimTick};
use traincraft_world::{
    Action, BlockEntity, DistilleryRecipe, Distillery, Face, FluidHandler, Ingredient,
    ItemHandler, ItemRegistry, ProcessState, RecipeCatalog, RecordError, RecordPurpose,
    TickContext, BURN_SLOT, CONTAINER_INPUT_SLOT, CONTAINER_OUTPUT_SLOT, INPUT_SLOT,
    OUTPUT_SLOT,
};

fn key(s: &str) -> RegistryKey {
    RegistryKey::parse(s).unwrap()
}

fn stack(s: &str, count: u32) -> ItemStack {
    ItemStack::new(key(s), count)
}

fn recipe(id: &str, burn_time: u32, output: &str, fluid: Option<u32>) -> DistilleryRecipe {
    DistilleryRecipe {
        id: key(id),
        ingredient: Ingredient::of(key("traincraft:oil_sands")),
        input_amount: 4,
        burn_time,
        output: stack(output, 1),
        output_fluid: fluid.map(|amount| FluidStack::new(key("traincraft:diesel"), amount)),
    }
}

fn distillery_with(recipes: Vec<DistilleryRecipe>) -> Distillery {
    let catalog = RecipeCatalog::new(recipes).unwrap();
    Distillery::new(Arc::new(catalog), Arc::new(ItemRegistry::builtin()))
}

fn scenario_distillery() -> Distillery {
    distillery_with(vec![recipe(
        "traincraft:diesel_from_oil_sands",
        100,
        "traincraft:plastic",
        Some(50),
    )])
}

fn run_ticks(d: &mut Distillery, start: u64, count: u64) {
    for t in start..start + count {
        d.on_tick(&TickContext::server(SimTick(t)));
    }
}

fn count(d: &Distillery, slot: usize) -> u32 {
    d.stack_in_slot(slot).map_or(0, |s| s.count)
}

#[test]
fn coal_and_eight_inputs_craft_and_chain() {
    let mut d = scenario_distillery();
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 8)));
    assert_eq!(d.process_state(), ProcessState::Idle);

    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    assert_eq!(d.burn_time(), 1600);
    assert_eq!(d.max_burn_time(), 1600);
    assert_eq!(d.recipe_burn_time(), 100);
    assert_eq!(count(&d, INPUT_SLOT), 4);
    assert_eq!(count(&d, BURN_SLOT), 0);
    assert!(d.is_active());

    run_ticks(&mut d, 0, 100);
    assert_eq!(count(&d, OUTPUT_SLOT), 1);
    assert_eq!(d.tank().amount(), 50);
    assert_eq!(d.burn_time(), 1500);
    // Enough input remained, so the next batch started on the same tick.
    assert_eq!(d.process_state(), ProcessState::Crafting);
    assert_eq!(d.recipe_burn_time(), 100);
    assert_eq!(count(&d, INPUT_SLOT), 0);

    run_ticks(&mut d, 100, 100);
    assert_eq!(count(&d, OUTPUT_SLOT), 2);
    assert_eq!(d.tank().amount(), 100);
    assert_eq!(d.burn_time(), 1400);
    assert_eq!(d.process_state(), ProcessState::Idle);
}

#[test]
fn single_batch_clears_active_recipe() {
    let mut d = scenario_distillery();
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    assert_eq!(count(&d, INPUT_SLOT), 0);

    run_ticks(&mut d, 0, 100);
    assert_eq!(count(&d, OUTPUT_SLOT), 1);
    assert_eq!(d.tank().amount(), 50);
    assert_eq!(d.recipe_burn_time(), 0);
    assert_eq!(d.max_recipe_burn_time(), 0);
    assert!(d.active_recipe().is_none());
    assert!(!d.is_active());
    assert_eq!(d.burn_time(), 1500);
}

#[test]
fn first_declared_recipe_wins() {
    let mut d = distillery_with(vec![
        recipe("traincraft:first", 100, "traincraft:plastic", None),
        recipe("traincraft:second", 10, "traincraft:petroleum", None),
    ]);
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));
    assert_eq!(d.active_recipe(), Some(&key("traincraft:first")));
    assert_eq!(d.max_recipe_burn_time(), 100);
}

#[test]
fn blocked_first_recipe_does_not_fall_through() {
    let mut d = distillery_with(vec![
        recipe("traincraft:first", 100, "traincraft:plastic", None),
        recipe("traincraft:second", 10, "traincraft:petroleum", None),
    ]);
    d.set_stack(OUTPUT_SLOT, Some(stack("traincraft:petroleum", 1)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));

    assert_eq!(d.process_state(), ProcessState::Idle);
    assert_eq!(count(&d, INPUT_SLOT), 4);
}

#[test]
fn full_tank_of_other_fluid_blocks_start() {
    let mut d = scenario_distillery();
    let water = FluidStack::new(key("minecraft:water"), 16000);
    assert_eq!(d.fluid_handler().fill(&water, Action::Execute), 16000);

    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));
    assert_eq!(d.process_state(), ProcessState::Idle);
    assert_eq!(count(&d, INPUT_SLOT), 4);
}

#[test]
fn progress_stalls_without_fuel() {
    let mut d = distillery_with(vec![recipe(
        "traincraft:slow",
        150,
        "traincraft:plastic",
        None,
    )]);
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:stick", 1)));
    assert_eq!(d.burn_time(), 100);

    run_ticks(&mut d, 0, 120);
    assert_eq!(d.burn_time(), 0);
    assert_eq!(d.recipe_burn_time(), 50);
    assert_eq!(d.process_state(), ProcessState::Crafting);

    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    assert_eq!(d.burn_time(), 1600);
    run_ticks(&mut d, 120, 50);
    assert_eq!(count(&d, OUTPUT_SLOT), 1);
    assert_eq!(d.process_state(), ProcessState::Idle);
}

#[test]
fn fuel_is_consumed_one_item_at_a_time() {
    let mut d = scenario_distillery();
    d.set_stack(BURN_SLOT, Some(stack("minecraft:stick", 3)));
    assert_eq!(d.burn_time(), 100);
    assert_eq!(count(&d, BURN_SLOT), 2);

    run_ticks(&mut d, 0, 100);
    assert_eq!(d.burn_time(), 100);
    assert_eq!(count(&d, BURN_SLOT), 1);

    run_ticks(&mut d, 100, 200);
    assert_eq!(d.burn_time(), 0);
    assert_eq!(d.max_burn_time(), 0);
    assert_eq!(count(&d, BURN_SLOT), 0);
}

#[test]
fn non_fuel_in_burn_slot_is_ignored() {
    let mut d = scenario_distillery();
    d.set_stack(BURN_SLOT, Some(stack("traincraft:plastic", 5)));
    assert_eq!(d.burn_time(), 0);
    assert_eq!(count(&d, BURN_SLOT), 5);
}

#[test]
fn buckets_fill_one_per_change() {
    let mut d = scenario_distillery();
    let diesel = FluidStack::new(key("traincraft:diesel"), 2000);
    d.fluid_handler().fill(&diesel, Action::Execute);

    d.set_stack(CONTAINER_INPUT_SLOT, Some(stack("minecraft:bucket", 3)));
    assert_eq!(d.tank().amount(), 1000);
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 2);
    assert_eq!(count(&d, CONTAINER_OUTPUT_SLOT), 1);

    // A filled bucket does not stack, so the next one waits for room.
    let filled = d.take_stack(CONTAINER_OUTPUT_SLOT).unwrap();
    assert!(filled.tag.is_some());
    assert_eq!(d.tank().amount(), 0);
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 1);
    assert_eq!(count(&d, CONTAINER_OUTPUT_SLOT), 1);

    d.take_stack(CONTAINER_OUTPUT_SLOT);
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 1);
    assert_eq!(count(&d, CONTAINER_OUTPUT_SLOT), 0);
}

#[test]
fn produced_fluid_fills_waiting_bucket() {
    let mut d = distillery_with(vec![DistilleryRecipe {
        input_amount: 1,
        output_fluid: Some(FluidStack::new(key("traincraft:diesel"), 1000)),
        ..recipe("traincraft:diesel_batch", 10, "traincraft:plastic", None)
    }]);
    d.set_stack(CONTAINER_INPUT_SLOT, Some(stack("minecraft:bucket", 4)));
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 2)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    assert!(d.tank().is_empty());

    // The first batch's fluid lands while the second batch starts and
    // clears the input slot; the waiting bucket takes it.
    run_ticks(&mut d, 0, 10);
    assert_eq!(d.recipe_burn_time(), 10);
    assert!(d.tank().is_empty());
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 3);
    assert!(d.stack_in_slot(CONTAINER_OUTPUT_SLOT).unwrap().tag.is_some());

    // The second batch's fluid waits for room in the container output.
    run_ticks(&mut d, 10, 30);
    assert_eq!(count(&d, OUTPUT_SLOT), 2);
    assert_eq!(d.stack_in_slot(INPUT_SLOT), None);
    assert_eq!(d.tank().amount(), 1000);
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 3);

    let filled = d
        .item_handler(Some(Face::Down))
        .extract_item(1, 1, Action::Execute)
        .unwrap();
    assert!(filled.tag.is_some());
    assert!(d.tank().is_empty());
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 2);
    assert_eq!(count(&d, CONTAINER_OUTPUT_SLOT), 1);
}

#[test]
fn canister_takes_partial_tank() {
    let mut d = scenario_distillery();
    let diesel = FluidStack::new(key("traincraft:diesel"), 2500);
    d.fluid_handler().fill(&diesel, Action::Execute);

    d.set_stack(CONTAINER_INPUT_SLOT, Some(stack("traincraft:canister", 1)));
    assert!(d.tank().is_empty());
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 0);
    let canister = d.stack_in_slot(CONTAINER_OUTPUT_SLOT).unwrap();
    let stored = canister.tag.as_ref().unwrap().get_compound("Fluid").unwrap();
    assert_eq!(stored.get_int("Amount"), Some(2500));
}

#[test]
fn bucket_waits_for_a_full_bucket_of_fluid() {
    let mut d = scenario_distillery();
    d.fluid_handler()
        .fill(&FluidStack::new(key("traincraft:diesel"), 400), Action::Execute);
    d.set_stack(CONTAINER_INPUT_SLOT, Some(stack("minecraft:bucket", 1)));
    assert_eq!(d.tank().amount(), 400);
    assert_eq!(count(&d, CONTAINER_INPUT_SLOT), 1);
}

#[test]
fn sided_automation_respects_slot_rules() {
    let mut d = scenario_distillery();

    let mut top = d.item_handler(Some(Face::Up));
    assert_eq!(top.slots(), 1);
    let rejected = top.insert_item(0, stack("minecraft:coal", 4), Action::Execute);
    assert_eq!(rejected.map(|s| s.count), Some(4));
    let remainder = top.insert_item(0, stack("traincraft:oil_sands", 70), Action::Execute);
    assert_eq!(remainder.map(|s| s.count), Some(6));

    let mut side = d.item_handler(Some(Face::North));
    assert!(side
        .insert_item(0, stack("minecraft:coal", 2), Action::Simulate)
        .is_none());
    assert!(side
        .insert_item(0, stack("minecraft:coal", 2), Action::Execute)
        .is_none());

    // Coal arrived: fuel burns and the first batch starts.
    assert_eq!(d.burn_time(), 1600);
    assert_eq!(count(&d, BURN_SLOT), 1);
    assert_eq!(count(&d, INPUT_SLOT), 60);

    let mut all = d.item_handler(None);
    assert_eq!(all.slots(), 5);
    let output = all.insert_item(OUTPUT_SLOT, stack("traincraft:plastic", 1), Action::Execute);
    assert!(output.is_some());

    run_ticks(&mut d, 0, 100);
    let mut bottom = d.item_handler(Some(Face::Down));
    let simulated = bottom.extract_item(0, 64, Action::Simulate).unwrap();
    assert_eq!(simulated.count, 1);
    assert!(bottom.stack_in_slot(0).is_some());
    bottom.extract_item(0, 64, Action::Execute).unwrap();
    assert!(bottom.stack_in_slot(0).is_none());
}

#[test]
fn save_and_load_restores_counters_not_recipe() {
    let mut d = scenario_distillery();
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 8)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 2)));
    run_ticks(&mut d, 0, 40);

    let record = d.on_save(RecordPurpose::Save);
    let mut restored = scenario_distillery();
    restored.on_load(&record, RecordPurpose::Save).unwrap();

    assert_eq!(restored.inventory(), d.inventory());
    assert_eq!(restored.tank(), d.tank());
    assert_eq!(restored.burn_time(), 1560);
    assert_eq!(restored.max_burn_time(), 1600);
    assert_eq!(restored.recipe_burn_time(), 60);
    assert_eq!(restored.max_recipe_burn_time(), 100);
    assert!(restored.active_recipe().is_none());
    // Loading does not fire slot changes.
    assert!(restored.drain_events().is_empty());
}

#[test]
fn drop_record_keeps_contents_only() {
    let mut d = scenario_distillery();
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 8)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    run_ticks(&mut d, 0, 100);

    let record = d.on_save(RecordPurpose::Drop);
    assert!(!record.contains("burn_time"));
    assert!(record.contains("fluid"));

    let mut placed = scenario_distillery();
    placed.on_load(&record, RecordPurpose::Drop).unwrap();
    assert_eq!(placed.burn_time(), 0);
    assert_eq!(placed.tank().amount(), 50);
    assert_eq!(count(&placed, OUTPUT_SLOT), 1);
}

#[test]
fn sync_record_drives_client_view() {
    let mut d = scenario_distillery();
    d.set_stack(INPUT_SLOT, Some(stack("traincraft:oil_sands", 4)));
    d.set_stack(BURN_SLOT, Some(stack("minecraft:coal", 1)));
    run_ticks(&mut d, 0, 25);

    let mut client = scenario_distillery().with_side(traincraft_world::Side::Client);
    client
        .on_load(&d.on_save(RecordPurpose::Sync), RecordPurpose::Sync)
        .unwrap();
    let view = client.view();
    assert_eq!(view, d.view());
    assert!(view.active);
    assert_eq!(view.recipe_progress(24), 6);
}

#[test]
fn malformed_records_are_rejected() {
    let d = scenario_distillery();
    let mut record = d.on_save(RecordPurpose::Save);
    record.insert("id", "traincraft:boiler");
    let mut target = scenario_distillery();
    assert!(matches!(
        target.on_load(&record, RecordPurpose::Save),
        Err(RecordError::KindMismatch { .. })
    ));

    let mut record = d.on_save(RecordPurpose::Save);
    record.insert(
        "fluid",
        FluidStack::new(key("traincraft:diesel"), 20000).to_compound(),
    );
    assert_eq!(
        target.on_load(&record, RecordPurpose::Save),
        Err(RecordError::FluidExceedsCapacity {
            amount: 20000,
            capacity: 16000
        })
    );

    let mut record = d.on_save(RecordPurpose::Save);
    record.insert("items", 3);
    assert_eq!(
        target.on_load(&record, RecordPurpose::Save),
        Err(RecordError::WrongType("items"))
    );
}

#[test]
fn wrong_typed_counters_are_ignored() {
    let mut record = scenario_distillery().on_save(RecordPurpose::Save);
    record.insert("burn_time", "lots");
    record.insert("recipe_burn_time", -5);
    let mut d = scenario_distillery();
    d.on_load(&record, RecordPurpose::Save).unwrap();
    assert_eq!(d.burn_time(), 0);
    assert_eq!(d.recipe_burn_time(), 0);
}
