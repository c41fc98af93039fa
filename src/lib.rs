//! Life-Including-Rules: a toroidal Life-like automaton whose birth/death
//! rules are read every generation from a reserved area of its own grid.

pub mod error;
pub mod field;
pub use error::{FieldError, Result};
pub use field::{EngineConfig, LayoutKind, LifeField, RuleTable};
