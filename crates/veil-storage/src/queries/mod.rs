//! SQL for the mapping store tables. Callers pass sealed bytes only.

pub mod mapping_entries;
pub mod store_meta;
