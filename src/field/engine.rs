//! `LifeField`: the automaton engine and its edit primitives.

use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, trace};

use super::grid::FieldBuffers;
use super::kernel::{StepInput, advance_parallel, advance_serial};
use super::layout::{LayoutKind, RulesArea};
use super::rules::RuleTable;
use crate::error::{FieldError, Result};

pub const MIN_FIELD_SIZE_LOG: u32 = 6;
pub const MAX_FIELD_SIZE_LOG: u32 = 14;

/// Configuration for a [`LifeField`].
///
/// `EngineConfig::default()` gives a 64x64 field with the 5x5 near layout,
/// unbounded ages and a single-threaded step. Adjust via the builder methods.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Field side is `1 << field_size_log`.
    pub field_size_log: u32,
    /// Initial rules-area layout.
    pub layout: LayoutKind,
    /// Seed for random layouts. `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Threads used to compute one generation. `None` or 1 keeps the step
    /// on the calling thread.
    pub thread_count: Option<usize>,
    /// Stored ages saturate here.
    pub max_age: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field_size_log: MIN_FIELD_SIZE_LOG,
            layout: LayoutKind::default(),
            seed: None,
            thread_count: None,
            max_age: u32::MAX,
        }
    }
}

impl EngineConfig {
    pub fn field_size_log(mut self, log: u32) -> Self {
        self.field_size_log = log;
        self
    }

    pub fn layout(mut self, kind: LayoutKind) -> Self {
        self.layout = kind;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    pub fn max_age(mut self, max_age: u32) -> Self {
        self.max_age = max_age;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_FIELD_SIZE_LOG..=MAX_FIELD_SIZE_LOG).contains(&self.field_size_log) {
            return Err(FieldError::configuration(format!(
                "field_size_log must be in {MIN_FIELD_SIZE_LOG}..={MAX_FIELD_SIZE_LOG}, got {}",
                self.field_size_log
            )));
        }
        if self.max_age == 0 {
            return Err(FieldError::configuration("max_age must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellState {
    pub age: u32,
    pub protected: bool,
}

impl CellState {
    pub fn is_alive(&self) -> bool {
        self.age > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldStats {
    pub generation: u64,
    pub alive: usize,
    pub dead: usize,
}

impl fmt::Display for FieldStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Time: {}, Alive: {}, Dead: {}",
            self.generation, self.alive, self.dead
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BrushSize {
    #[default]
    Single,
    /// 5x5 square centered on the target cell.
    Square5,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EditAction {
    #[default]
    ToggleCell,
    ToggleProtection,
}

/// A pointer edit: what to toggle and over how many cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EditBrush {
    pub size: BrushSize,
    pub action: EditAction,
}

pub struct LifeField {
    buffers: FieldBuffers,
    area: RulesArea,
    rules: RuleTable,
    generation: u64,
    max_age: u32,
    rng: StdRng,
    pool: Option<rayon::ThreadPool>,
}

impl LifeField {
    /// Allocate a `2^field_size_log` square field, activate `kind` and reset.
    pub fn new(field_size_log: u32, kind: LayoutKind) -> Result<Self> {
        Self::with_config(
            EngineConfig::default()
                .field_size_log(field_size_log)
                .layout(kind),
        )
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let pool = match config.thread_count {
            Some(threads) if threads > 1 => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            _ => None,
        };
        let buffers = FieldBuffers::new(config.field_size_log);
        let area = RulesArea::new(config.layout, buffers.size(), &mut rng)?;
        debug!(
            size = buffers.size(),
            layout = %config.layout,
            threads = config.thread_count.unwrap_or(1),
            max_age = config.max_age,
            "initializing life field"
        );

        let mut field = Self {
            buffers,
            area,
            rules: RuleTable::conway(),
            generation: 0,
            max_age: config.max_age,
            rng,
            pool,
        };
        field.reset()?;
        Ok(field)
    }

    /// Clear the field, stamp the Conway pattern of the active layout,
    /// protect B0/D8 and rewind the generation counter.
    pub fn reset(&mut self) -> Result<()> {
        self.buffers.clear();
        self.area.write_initial_pattern(&mut self.buffers)?;
        self.area.apply_protection(&mut self.buffers)?;
        self.rules = self.area.read_rules(&self.buffers);
        self.generation = 0;
        info!(layout = %self.area.kind(), rules = %self.rules, "field reset");
        Ok(())
    }

    /// Reset, then drop a glider into each corner, all heading inwards.
    pub fn reset_with_gliders(&mut self) -> Result<()> {
        self.reset()?;
        let n = self.size();
        self.buffers.set_alive_cells(&[
            (2, 1),
            (3, 2),
            (1, 3),
            (2, 3),
            (3, 3),
            (n - 3, 1),
            (n - 4, 2),
            (n - 2, 3),
            (n - 3, 3),
            (n - 4, 3),
            (2, n - 2),
            (3, n - 3),
            (1, n - 4),
            (2, n - 4),
            (3, n - 4),
            (n - 3, n - 2),
            (n - 4, n - 3),
            (n - 2, n - 4),
            (n - 3, n - 4),
            (n - 4, n - 4),
        ])
    }

    /// Switch the rules-area layout. The field is fully reset; on error the
    /// previous layout and field stay untouched.
    pub fn set_layout(&mut self, kind: LayoutKind) -> Result<()> {
        let area = RulesArea::new(kind, self.size(), &mut self.rng)?;
        info!(from = %self.area.kind(), to = %kind, "switching rules area layout");
        self.area = area;
        self.reset()
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        self.rules = self.area.read_rules(&self.buffers);
        let size_log = self.buffers.size_log();
        let (current, protect, next) = self.buffers.step_views();
        let input = StepInput {
            current,
            protect,
            rules: &self.rules,
            size_log,
            max_age: self.max_age,
        };
        match &self.pool {
            Some(pool) => advance_parallel(pool, &input, next),
            None => advance_serial(&input, next),
        }
        self.buffers.swap();
        self.generation += 1;
        trace!(generation = self.generation, rules = %self.rules, "stepped");
    }

    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    pub fn toggle_protection(&mut self, x: usize, y: usize) -> Result<()> {
        self.buffers.check_cell(x, y)?;
        self.buffers.toggle_protect(x, y);
        Ok(())
    }

    /// Flip a cell between dead and age 1. Protected cells are left alone;
    /// the return value tells whether anything changed.
    pub fn toggle_cell(&mut self, x: usize, y: usize) -> Result<bool> {
        self.buffers.check_cell(x, y)?;
        if self.buffers.is_protected(x, y) {
            return Ok(false);
        }
        let age = u32::from(!self.buffers.is_alive(x, y));
        self.buffers.set_age(x, y, age);
        Ok(true)
    }

    pub fn negate_rect(&mut self, x: usize, y: usize, w: usize, h: usize) -> Result<()> {
        self.buffers.negate_rect(x, y, w, h)
    }

    /// Negate every unprotected cell of the field.
    pub fn invert(&mut self) -> Result<()> {
        let size = self.size();
        self.buffers.negate_rect(0, 0, size, size)
    }

    /// Set ages over a rectangle, ignoring protection.
    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, age: u32) -> Result<()> {
        self.buffers.fill_rect(x, y, w, h, age.min(self.max_age))
    }

    pub fn fill_protect_rect(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        flag: bool,
    ) -> Result<()> {
        self.buffers.fill_protect_rect(x, y, w, h, flag)
    }

    /// Make the listed cells alive with age 1, ignoring protection.
    pub fn set_alive_cells(&mut self, cells: &[(usize, usize)]) -> Result<()> {
        self.buffers.set_alive_cells(cells)
    }

    /// Apply a brush centered on `(x, y)`. The brush is clipped to the field;
    /// the center itself must lie inside it.
    pub fn edit(&mut self, x: usize, y: usize, brush: EditBrush) -> Result<()> {
        self.buffers.check_cell(x, y)?;
        let reach = match brush.size {
            BrushSize::Single => 0,
            BrushSize::Square5 => 2,
        };
        let last = self.size() - 1;
        for cy in y.saturating_sub(reach)..=(y + reach).min(last) {
            for cx in x.saturating_sub(reach)..=(x + reach).min(last) {
                match brush.action {
                    EditAction::ToggleProtection => self.buffers.toggle_protect(cx, cy),
                    EditAction::ToggleCell => {
                        self.toggle_cell(cx, cy)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn query(&self, x: usize, y: usize) -> Result<CellState> {
        self.buffers.check_cell(x, y)?;
        Ok(CellState {
            age: self.buffers.age(x, y),
            protected: self.buffers.is_protected(x, y),
        })
    }

    pub fn alive_count(&self) -> usize {
        self.buffers.alive_count()
    }

    pub fn generation_count(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> FieldStats {
        let alive = self.alive_count();
        FieldStats {
            generation: self.generation,
            alive,
            dead: self.size() * self.size() - alive,
        }
    }

    /// Rules in effect for the most recent step (or the reset pattern).
    pub fn rules(&self) -> RuleTable {
        self.rules
    }

    /// Rules the next step would use, read from the current grid.
    pub fn pending_rules(&self) -> RuleTable {
        self.area.read_rules(&self.buffers)
    }

    pub fn rules_area(&self) -> &RulesArea {
        &self.area
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.area.kind()
    }

    pub fn size(&self) -> usize {
        self.buffers.size()
    }

    pub fn buffers(&self) -> &FieldBuffers {
        &self.buffers
    }
}
