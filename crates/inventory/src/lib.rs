//! Inventory domain module.
//!
//! This crate contains the inventory record and its business rules, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod item;
pub mod validate;

pub use filter::InventoryFilter;
pub use item::{Condition, InventoryItem, ItemChanges, ItemFields, restocked_quantity};
