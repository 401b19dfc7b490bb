//! Observability for veil.
//! `tracing` crate with `EnvFilter`, per-crate log levels via `VEIL_LOG`.

pub mod setup;
pub mod spans;

pub use setup::init_tracing;
