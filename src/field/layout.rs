//! Rules-area layouts: where the 18 birth/death indicators live on the grid.
//!
//! Every layout places 9 birth indicators (one per neighbor count) and 9
//! death indicators. A *dead* birth read-cell enables birth for that count;
//! a *live* death read-cell enables death. The inversion makes an all-dead
//! rules area mean "every count births", so the stamped Conway pattern marks
//! the counts where birth is off.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use tracing::debug;

use super::grid::{FieldBuffers, Rect};
use super::rules::{NEIGHBOR_COUNTS, RuleTable};
use crate::error::{FieldError, Result};

/// Side of the coarse cells used by [`LayoutKind::RandomBlocks`].
const RANDOM_BLOCK: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockSize {
    Five,
    Four,
}

impl BlockSize {
    fn shape(self) -> Shape {
        match self {
            BlockSize::Five => Shape::Block5,
            BlockSize::Four => Shape::Block4,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Clustered around the field center.
    Near,
    /// Spread over the four quadrants.
    Far,
}

/// Which rules-area layout is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Two stacked columns of 9 square blocks (birth left, death right).
    TwoColumnBlocks {
        block: BlockSize,
        placement: Placement,
    },
    /// 18 diagonal cell pairs; the lower-left cell of each pair is read.
    PairedCells { placement: Placement },
    /// 18 aligned 4x4 blocks at random, non-overlapping positions.
    RandomBlocks,
}

impl Default for LayoutKind {
    fn default() -> Self {
        Self::TwoColumnBlocks {
            block: BlockSize::Five,
            placement: Placement::Near,
        }
    }
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 7] = [
        LayoutKind::TwoColumnBlocks {
            block: BlockSize::Five,
            placement: Placement::Near,
        },
        LayoutKind::TwoColumnBlocks {
            block: BlockSize::Five,
            placement: Placement::Far,
        },
        LayoutKind::TwoColumnBlocks {
            block: BlockSize::Four,
            placement: Placement::Near,
        },
        LayoutKind::TwoColumnBlocks {
            block: BlockSize::Four,
            placement: Placement::Far,
        },
        LayoutKind::PairedCells {
            placement: Placement::Near,
        },
        LayoutKind::PairedCells {
            placement: Placement::Far,
        },
        LayoutKind::RandomBlocks,
    ];

    /// Short identifier, also accepted by `FromStr`.
    pub fn id(self) -> &'static str {
        match self {
            LayoutKind::TwoColumnBlocks { block, placement } => match (block, placement) {
                (BlockSize::Five, Placement::Near) => "2c9r5x5near",
                (BlockSize::Five, Placement::Far) => "2c9r5x5far",
                (BlockSize::Four, Placement::Near) => "2c9r4x4near",
                (BlockSize::Four, Placement::Far) => "2c9r4x4far",
            },
            LayoutKind::PairedCells { placement } => match placement {
                Placement::Near => "2x9pairsnear",
                Placement::Far => "2x9pairsfar",
            },
            LayoutKind::RandomBlocks => "rand",
        }
    }

    fn shape(self) -> Shape {
        match self {
            LayoutKind::TwoColumnBlocks { block, .. } => block.shape(),
            LayoutKind::PairedCells { .. } => Shape::Pair,
            LayoutKind::RandomBlocks => Shape::Block4,
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LayoutKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self> {
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = LayoutKind::ALL.iter().map(|k| k.id()).collect();
                FieldError::configuration(format!(
                    "unknown rules area layout: {s} (expected one of {})",
                    known.join(", ")
                ))
            })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Birth,
    Death,
}

impl Column {
    pub const BOTH: [Column; 2] = [Column::Birth, Column::Death];

    #[inline(always)]
    fn index(self) -> usize {
        match self {
            Column::Birth => 0,
            Column::Death => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionShape {
    /// Whole indicator block.
    Block,
    /// The single cell whose state is read as the rule bit.
    Indicator,
}

/// A frame the renderer should draw over the field. Purely descriptive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRegion {
    pub rect: Rect,
    pub column: Column,
    pub row: usize,
    pub shape: RegionShape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    Block5,
    Block4,
    Pair,
}

impl Shape {
    fn block_side(self) -> usize {
        match self {
            Shape::Block5 => 5,
            Shape::Block4 => 4,
            Shape::Pair => 1,
        }
    }

    /// Offset of the read cell from the anchor.
    fn read_offset(self) -> usize {
        match self {
            Shape::Block5 => 2,
            Shape::Block4 => 1,
            Shape::Pair => 0,
        }
    }

    /// Live cells that set one indicator in the initial pattern. For blocks
    /// the marker is a still life or oscillator that keeps the read cell alive
    /// under Conway rules.
    fn marker(self, (x, y): (usize, usize)) -> Vec<Rect> {
        match self {
            Shape::Block5 => vec![Rect::new(x + 1, y + 2, 3, 1)],
            Shape::Block4 => vec![Rect::new(x + 1, y + 1, 2, 2)],
            Shape::Pair => vec![Rect::cell(x, y), Rect::cell(x + 1, y - 1)],
        }
    }

    /// Square pieces `(x, y, side)` owned by one indicator.
    fn footprint(self, (x, y): (i64, i64)) -> Vec<(i64, i64, usize)> {
        match self {
            Shape::Pair => vec![(x, y, 1), (x + 1, y - 1, 1)],
            _ => vec![(x, y, self.block_side())],
        }
    }
}

/// Concrete anchors of the active layout for one field size.
#[derive(Clone, Debug)]
pub struct RulesArea {
    kind: LayoutKind,
    shape: Shape,
    anchors: [[(usize, usize); NEIGHBOR_COUNTS]; 2],
}

impl RulesArea {
    /// Compute and validate the anchors of `kind` on a `size`x`size` field.
    ///
    /// `rng` is only consulted by [`LayoutKind::RandomBlocks`].
    pub fn new<R: Rng>(kind: LayoutKind, size: usize, rng: &mut R) -> Result<Self> {
        let shape = kind.shape();
        let raw = match kind {
            LayoutKind::TwoColumnBlocks { block, placement } => {
                two_column_anchors(block, placement, size)
            }
            LayoutKind::PairedCells { placement } => pair_anchors(placement, size),
            LayoutKind::RandomBlocks => random_anchors(size, rng)?,
        };
        let anchors = validate(kind, shape, &raw, size)?;
        debug!(layout = %kind, size, "computed rules area anchors");
        Ok(Self {
            kind,
            shape,
            anchors,
        })
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Top-left cell of indicator `row` in `column`.
    ///
    /// # Panics
    ///
    /// Panics if `row` is not a neighbor count, i.e. `row >= NEIGHBOR_COUNTS`.
    pub fn anchor(&self, column: Column, row: usize) -> (usize, usize) {
        debug_assert!(row < NEIGHBOR_COUNTS, "indicator row {row} out of range");
        self.anchors[column.index()][row]
    }

    /// Cell whose aliveness encodes the rule bit of indicator `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= NEIGHBOR_COUNTS`.
    pub fn read_cell(&self, column: Column, row: usize) -> (usize, usize) {
        let (x, y) = self.anchor(column, row);
        let off = self.shape.read_offset();
        (x + off, y + off)
    }

    /// Every cell owned by the rules area, as rectangles.
    pub fn footprints(&self) -> Vec<Rect> {
        let mut out = Vec::with_capacity(2 * NEIGHBOR_COUNTS * 2);
        for column in Column::BOTH {
            for row in 0..NEIGHBOR_COUNTS {
                let (x, y) = self.anchor(column, row);
                for (x, y, side) in self.shape.footprint((x as i64, y as i64)) {
                    out.push(Rect::new(x as usize, y as usize, side, side));
                }
            }
        }
        out
    }

    /// Stamp markers for standard Conway rules (B3/D0145678).
    pub fn write_initial_pattern(&self, field: &mut FieldBuffers) -> Result<()> {
        let conway = RuleTable::conway();
        for row in 0..NEIGHBOR_COUNTS {
            if !conway.birth[row] {
                self.stamp_marker(field, Column::Birth, row)?;
            }
            if conway.death[row] {
                self.stamp_marker(field, Column::Death, row)?;
            }
        }
        Ok(())
    }

    fn stamp_marker(&self, field: &mut FieldBuffers, column: Column, row: usize) -> Result<()> {
        for rect in self.shape.marker(self.anchor(column, row)) {
            field.fill_rect(rect.x, rect.y, rect.w, rect.h, 1)?;
        }
        Ok(())
    }

    /// Freeze B0 and D8 so the field cannot flip into all-dead/all-alive strobing.
    pub fn apply_protection(&self, field: &mut FieldBuffers) -> Result<()> {
        for (column, row) in [(Column::Birth, 0), (Column::Death, NEIGHBOR_COUNTS - 1)] {
            let (x, y) = self.read_cell(column, row);
            field.fill_protect_rect(x, y, 1, 1, true)?;
        }
        Ok(())
    }

    pub fn read_rules(&self, field: &FieldBuffers) -> RuleTable {
        let mut rules = RuleTable {
            birth: [false; NEIGHBOR_COUNTS],
            death: [false; NEIGHBOR_COUNTS],
        };
        for row in 0..NEIGHBOR_COUNTS {
            let (bx, by) = self.read_cell(Column::Birth, row);
            let (dx, dy) = self.read_cell(Column::Death, row);
            rules.birth[row] = !field.is_alive(bx, by);
            rules.death[row] = field.is_alive(dx, dy);
        }
        rules
    }

    pub fn draw_regions(&self) -> Vec<DrawRegion> {
        let mut regions = Vec::with_capacity(2 * 2 * NEIGHBOR_COUNTS);
        for row in 0..NEIGHBOR_COUNTS {
            for column in Column::BOTH {
                if self.shape != Shape::Pair {
                    let (x, y) = self.anchor(column, row);
                    let side = self.shape.block_side();
                    regions.push(DrawRegion {
                        rect: Rect::new(x, y, side, side),
                        column,
                        row,
                        shape: RegionShape::Block,
                    });
                }
                let (x, y) = self.read_cell(column, row);
                regions.push(DrawRegion {
                    rect: Rect::cell(x, y),
                    column,
                    row,
                    shape: RegionShape::Indicator,
                });
            }
        }
        regions
    }
}

type RawAnchors = [[(i64, i64); NEIGHBOR_COUNTS]; 2];

fn two_column_anchors(block: BlockSize, placement: Placement, size: usize) -> RawAnchors {
    let n = size as i64;
    // Far blocks put their read cell on the quarter lines.
    let inset = block.shape().read_offset() as i64;
    let mut anchors = [[(0, 0); NEIGHBOR_COUNTS]; 2];
    for i in 0..NEIGHBOR_COUNTS as i64 {
        let (bx, dx, y) = match (placement, block) {
            (Placement::Near, BlockSize::Five) => (n / 2 - 5, n / 2, n / 2 - 20 + 5 * i),
            (Placement::Near, BlockSize::Four) => (n / 2 - 4, n / 2, n / 2 - 18 + 4 * i),
            (Placement::Far, _) => {
                let bx = n / 4 - inset;
                (bx, bx + n / 2, n / 18 - inset + (n / 9) * i)
            }
        };
        anchors[0][i as usize] = (bx, y);
        anchors[1][i as usize] = (dx, y);
    }
    anchors
}

fn pair_anchors(placement: Placement, size: usize) -> RawAnchors {
    let n = size as i64;
    let mut anchors = [[(0, 0); NEIGHBOR_COUNTS]; 2];
    for i in 0..NEIGHBOR_COUNTS as i64 {
        let (birth, death) = match placement {
            Placement::Near => {
                let (x, y) = (n / 2 - 6 + i, n / 2 - 2 + i);
                ((x, y), (x + 3, y - 3))
            }
            Placement::Far => {
                let (x, y) = (n / 4 - 6 + i, 3 * (n / 4) - 2 + i);
                ((x, y), (x + n / 2, y - n / 2))
            }
        };
        anchors[0][i as usize] = birth;
        anchors[1][i as usize] = death;
    }
    anchors
}

/// Rejection-sample 18 distinct cells of the coarse `(size / 4)^2` grid.
fn random_anchors<R: Rng>(size: usize, rng: &mut R) -> Result<RawAnchors> {
    let m = size / RANDOM_BLOCK;
    let slots = m * m;
    if slots < 2 * NEIGHBOR_COUNTS {
        return Err(FieldError::configuration(format!(
            "a {size}x{size} field has only {slots} random rule blocks, need {}",
            2 * NEIGHBOR_COUNTS
        )));
    }

    let mut picked: Vec<usize> = Vec::with_capacity(2 * NEIGHBOR_COUNTS);
    while picked.len() < 2 * NEIGHBOR_COUNTS {
        let candidate = rng.random_range(0..slots);
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }

    let mut anchors = [[(0, 0); NEIGHBOR_COUNTS]; 2];
    for (k, &slot) in picked.iter().enumerate() {
        let x = ((slot % m) * RANDOM_BLOCK) as i64;
        let y = ((slot / m) * RANDOM_BLOCK) as i64;
        anchors[k / NEIGHBOR_COUNTS][k % NEIGHBOR_COUNTS] = (x, y);
    }
    Ok(anchors)
}

fn validate(
    kind: LayoutKind,
    shape: Shape,
    raw: &RawAnchors,
    size: usize,
) -> Result<[[(usize, usize); NEIGHBOR_COUNTS]; 2]> {
    let mut rects: Vec<Rect> = Vec::with_capacity(4 * NEIGHBOR_COUNTS);
    for column in raw {
        for &anchor in column {
            for (x, y, side) in shape.footprint(anchor) {
                if x < 0 || y < 0 {
                    return Err(FieldError::configuration(format!(
                        "layout {kind} does not fit a {size}x{size} field: cell ({x}, {y})"
                    )));
                }
                let rect = Rect::new(x as usize, y as usize, side, side);
                if !rect.fits(size) {
                    return Err(FieldError::configuration(format!(
                        "layout {kind} does not fit a {size}x{size} field: {rect:?}"
                    )));
                }
                if let Some(other) = rects.iter().find(|r| r.intersects(&rect)) {
                    return Err(FieldError::configuration(format!(
                        "layout {kind} overlaps itself: {rect:?} and {other:?}"
                    )));
                }
                rects.push(rect);
            }
        }
    }

    let mut anchors = [[(0, 0); NEIGHBOR_COUNTS]; 2];
    for (c, column) in raw.iter().enumerate() {
        for (i, &(x, y)) in column.iter().enumerate() {
            anchors[c][i] = (x as usize, y as usize);
        }
    }
    Ok(anchors)
}
