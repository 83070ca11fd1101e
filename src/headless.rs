use crate::config::TraincraftConfig;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use tracing::info;
use traincraft_core::{BlockPos, ItemStack, RegistryKey};
use traincraft_testkit::{HostHarness, JsonlSink};
use traincraft_world::{
    record_kind, BlockEntityStore, Distillery, FluidHandler, BURN_SLOT, DISTILLERY_KIND,
    INPUT_SLOT, OUTPUT_SLOT,
};

pub struct SimulateConfig {
    pub config: TraincraftConfig,
    /// Distilleries placed in a row along +X.
    pub machines: u32,
    pub ticks: u64,
    /// Batches of the first recipe's input loaded into each machine.
    pub batches: u32,
    pub fuel: RegistryKey,
    pub fuel_count: u32,
    pub events_path: PathBuf,
    /// Save directory; an existing store there is resumed.
    pub save_dir: Option<PathBuf>,
}

/// Final state of one machine.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSummary {
    pub pos: BlockPos,
    pub output: u32,
    pub fluid: u32,
    pub burn_time: u32,
    pub active: bool,
}

pub fn run(cfg: SimulateConfig) -> Result<Vec<MachineSummary>> {
    let (items, catalog) = cfg.config.load_content()?;
    let distillery_config = cfg.config.distillery;
    let make = || Distillery::with_config(catalog.clone(), items.clone(), distillery_config);

    let store = cfg
        .save_dir
        .as_deref()
        .map(BlockEntityStore::new)
        .transpose()?;

    let mut harness = match &store {
        Some(store) if store.exists() => {
            info!(path = %store.path().display(), "resuming distilleries from save");
            HostHarness::load(store, |_, record| {
                (record_kind(record) == Some(DISTILLERY_KIND)).then(&make)
            })?
        }
        _ => {
            let Some(recipe) = catalog.iter().next() else {
                bail!("No distillery recipes loaded");
            };
            let Some(input) = recipe.ingredient.matches().first() else {
                bail!("Recipe {} has no input", recipe.id);
            };
            let mut stack = ItemStack::new(input.item.clone(), recipe.input_amount * cfg.batches);
            if let Some(damage) = input.damage {
                stack = stack.with_damage(damage);
            }
            let input = stack;
            let fuel = ItemStack::new(cfg.fuel.clone(), cfg.fuel_count);

            let mut harness = HostHarness::new();
            for x in 0..cfg.machines as i32 {
                let pos = BlockPos::new(x, 64, 0);
                harness.place(pos, make());
                harness.edit(pos, |d| {
                    d.set_stack(INPUT_SLOT, Some(input.clone()));
                    d.set_stack(BURN_SLOT, Some(fuel.clone()));
                });
            }
            info!(
                machines = cfg.machines,
                recipe = %recipe.id,
                "placed distilleries"
            );
            harness
        }
    };

    harness.run(cfg.ticks);

    let mut sink = JsonlSink::create(&cfg.events_path)?;
    harness.write_events(&mut sink)?;
    sink.flush()?;
    info!(
        events = sink.written(),
        path = %cfg.events_path.display(),
        "wrote event log"
    );

    if let Some(store) = &store {
        harness
            .save(store)
            .with_context(|| format!("Failed to save to {}", store.path().display()))?;
        info!(path = %store.path().display(), "saved distilleries");
    }

    let summaries = harness
        .positions()
        .filter_map(|pos| {
            let d = harness.get(pos)?;
            Some(MachineSummary {
                pos,
                output: d.stack_in_slot(OUTPUT_SLOT).map_or(0, |s| s.count),
                fluid: d.tank().amount(),
                burn_time: d.burn_time(),
                active: harness.is_active(pos),
            })
        })
        .collect();
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_config() -> TraincraftConfig {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        TraincraftConfig {
            items_path: root.join("config/items.json"),
            recipes_path: root.join("config/distillery_recipes.json"),
            models_dir: root.join("assets/models"),
            ..TraincraftConfig::default()
        }
    }

    fn temp(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("traincraft_headless_{label}_{nanos}"))
    }

    fn simulate(ticks: u64, save_dir: Option<PathBuf>, events: PathBuf) -> SimulateConfig {
        SimulateConfig {
            config: repo_config(),
            machines: 2,
            ticks,
            batches: 2,
            fuel: RegistryKey::parse("minecraft:coal").unwrap(),
            fuel_count: 1,
            events_path: events,
            save_dir,
        }
    }

    #[test]
    fn two_batches_finish_in_two_hundred_ticks() {
        let events = temp("events").with_extension("jsonl");
        let summaries = run(simulate(200, None, events.clone())).unwrap();
        assert_eq!(summaries.len(), 2);
        for s in &summaries {
            assert_eq!(s.output, 2);
            assert_eq!(s.fluid, 100);
            assert_eq!(s.burn_time, 1400);
            assert!(!s.active);
        }
        assert!(std::fs::read_to_string(&events).unwrap().lines().count() > 0);
        std::fs::remove_file(&events).ok();
    }

    #[test]
    fn save_dir_resumes_mid_batch() {
        let dir = temp("save");
        let events = temp("events_resume").with_extension("jsonl");
        let first = run(simulate(150, Some(dir.clone()), events.clone())).unwrap();
        assert!(first.iter().all(|s| s.output == 1 && s.burn_time == 1450));

        // The active recipe is not saved, so the in-flight batch never finishes.
        let resumed = run(simulate(50, Some(dir.clone()), events.clone())).unwrap();
        assert_eq!(resumed.len(), 2);
        assert!(resumed.iter().all(|s| s.output == 1 && s.burn_time == 1400));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::remove_file(&events).ok();
    }
}
