//! sea-orm entities for the warehouse schema.
//!
//! Relationships are declared so that query projections can join across tables, but services
//! resolve references with explicit repository lookups.

pub mod category;
pub mod inventory;
pub mod inventory_transaction;
pub mod item;
pub mod location;
