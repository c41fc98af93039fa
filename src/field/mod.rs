//! Self-configuring Life field: engine, buffers, rules area and render contract.

mod engine;
mod grid;
mod kernel;
mod layout;
pub mod render;
mod rules;

pub use engine::{
    BrushSize, CellState, EditAction, EditBrush, EngineConfig, FieldStats, LifeField,
    MAX_FIELD_SIZE_LOG, MIN_FIELD_SIZE_LOG,
};
pub use grid::{FieldBuffers, Rect};
pub use layout::{BlockSize, Column, DrawRegion, LayoutKind, Placement, RegionShape, RulesArea};
pub use rules::{NEIGHBOR_COUNTS, RuleTable};
