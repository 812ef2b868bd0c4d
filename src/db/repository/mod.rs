//! Repository layer — entity-scoped database operations.

mod analysis;

pub use analysis::*;
