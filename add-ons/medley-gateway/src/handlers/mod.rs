//! One submodule per sidebar screen family. The router in `main.rs`
//! wires exactly one route set per module; handlers never call each
//! other, and the only state shared between screens is the per-session
//! transcript plus the process-wide memo cache.

pub mod sessions;
pub mod stocks;
pub mod tables;
pub mod travel;
