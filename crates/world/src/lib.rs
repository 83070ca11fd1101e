//! Block entities, inventories, fluid tanks and the distillery machine.

mod block_entity;
mod distillery;
mod inventory;
mod item_registry;
mod persist;
mod recipe;
mod tank;

pub use block_entity::*;
pub use distillery::*;
pub use inventory::*;
pub use item_registry::*;
pub use persist::*;
pub use recipe::*;
pub use tank::*;

/// Whether a handler operation only reports its outcome or applies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Compute the result without mutating anything.
    Simulate,
    /// Apply the mutation.
    Execute,
}

impl Action {
    /// True for [`Action::Execute`].
    pub fn execute(self) -> bool {
        matches!(self, Action::Execute)
    }
}
