//! Render adapter contract.
//!
//! The engine does not draw. [`render`] walks the field and hands a
//! [`RenderSink`] one palette index per cell, a mark per protected cell, the
//! optional grid and the rules-area frames. Mapping indices to pixels is the
//! sink's business.

use std::fmt::Write as _;

use super::engine::{FieldStats, LifeField};
use super::layout::{Column, DrawRegion, RegionShape};

pub const DEAD: u16 = 0;
/// Highest age index; older cells share it.
pub const AGE_SATURATED: u16 = 0xFF;
/// Live cell when age colors are off.
pub const ALIVE: u16 = 0x100;
/// Protection marks and rules-area frames.
pub const FRAME: u16 = 0x101;
pub const GRID: u16 = 0x102;

/// Number of rainbow bands an age palette needs (band 0 is black).
pub const AGE_BANDS: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_grid: bool,
    pub age_colors: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_grid: true,
            age_colors: false,
        }
    }
}

#[inline]
pub fn color_index(age: u32, age_colors: bool) -> u16 {
    match (age, age_colors) {
        (0, _) => DEAD,
        (_, false) => ALIVE,
        (age, true) => age.min(u32::from(AGE_SATURATED)) as u16,
    }
}

/// Rainbow band for an age index: 0 for 0, then the incremented binary
/// logarithm, capped at 8.
pub fn age_band(index: u16) -> u8 {
    let mut value = index;
    let mut band = 0u8;
    while value > 0 && band < AGE_BANDS - 1 {
        value >>= 1;
        band += 1;
    }
    band
}

pub trait RenderSink {
    fn cell(&mut self, x: usize, y: usize, color: u16);

    fn protected_mark(&mut self, _x: usize, _y: usize) {}

    fn grid_lines(&mut self, _size: usize) {}

    fn region(&mut self, _region: &DrawRegion) {}

    fn finish(&mut self, _stats: FieldStats) {}
}

/// Feed the whole field to `sink` in row-major order, then the overlays.
pub fn render<S: RenderSink + ?Sized>(field: &LifeField, sink: &mut S, options: RenderOptions) {
    let buffers = field.buffers();
    let size = buffers.size();
    let mut alive = 0usize;

    for (idx, (&age, &protected)) in buffers.ages().iter().zip(buffers.protection()).enumerate() {
        let (x, y) = (idx % size, idx / size);
        alive += usize::from(age > 0);
        sink.cell(x, y, color_index(age, options.age_colors));
        if protected {
            sink.protected_mark(x, y);
        }
    }

    if options.show_grid {
        sink.grid_lines(size);
    }
    for region in field.rules_area().draw_regions() {
        sink.region(&region);
    }

    sink.finish(FieldStats {
        generation: field.generation_count(),
        alive,
        dead: size * size - alive,
    });
}

/// Text sink: one character per cell.
///
/// `.` dead, `o` alive (or the age band digit with age colors), `+`/`@`
/// protected dead/alive. Indicator cells of the rules area use `b`/`B` for
/// birth and `d`/`D` for death unless protected.
#[derive(Clone, Debug, Default)]
pub struct AsciiSink {
    size: usize,
    chars: Vec<char>,
    stats: Option<FieldStats>,
}

impl AsciiSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, x: usize, y: usize) -> Option<&mut char> {
        let size = self.size;
        self.chars.get_mut(y * size + x)
    }

    pub fn stats(&self) -> Option<FieldStats> {
        self.stats
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.chars.len() + self.size + 64);
        for row in self.chars.chunks(self.size.max(1)) {
            out.extend(row);
            out.push('\n');
        }
        if let Some(stats) = self.stats {
            let _ = writeln!(out, "{stats}");
        }
        out
    }
}

impl RenderSink for AsciiSink {
    fn cell(&mut self, x: usize, y: usize, color: u16) {
        if x == 0 && y == 0 {
            self.chars.clear();
            self.size = 0;
        }
        if y == 0 {
            self.size = x + 1;
        }
        let ch = match color {
            DEAD => '.',
            ALIVE => 'o',
            index => char::from(b'0' + age_band(index)),
        };
        self.chars.push(ch);
    }

    fn protected_mark(&mut self, x: usize, y: usize) {
        if let Some(ch) = self.slot(x, y) {
            *ch = if *ch == '.' { '+' } else { '@' };
        }
    }

    fn region(&mut self, region: &DrawRegion) {
        if region.shape != RegionShape::Indicator {
            return;
        }
        let (x, y) = (region.rect.x, region.rect.y);
        let (dead, live) = match region.column {
            Column::Birth => ('b', 'B'),
            Column::Death => ('d', 'D'),
        };
        if let Some(ch) = self.slot(x, y) {
            *ch = match *ch {
                '.' => dead,
                '+' | '@' => *ch,
                _ => live,
            };
        }
    }

    fn finish(&mut self, stats: FieldStats) {
        self.stats = Some(stats);
    }
}
