//! Per-row generation kernel.
//!
//! Each row of `next` depends only on three rows of the frozen `current`
//! buffer, so rows can be computed in any order (or concurrently) with the
//! same result.

use rayon::prelude::*;

use super::rules::RuleTable;

#[derive(Clone, Copy)]
pub(crate) struct StepInput<'a> {
    pub current: &'a [u32],
    pub protect: &'a [bool],
    pub rules: &'a RuleTable,
    pub size_log: u32,
    pub max_age: u32,
}

impl StepInput<'_> {
    #[inline(always)]
    fn mask(&self) -> usize {
        (1usize << self.size_log) - 1
    }

    #[inline(always)]
    fn alive(&self, x: usize, y: usize) -> usize {
        usize::from(self.current[(y << self.size_log) | x] > 0)
    }
}

/// Live cells among the 8 toroidal Moore neighbors of `(x, y)`.
#[inline(always)]
pub(crate) fn count_neighbors(input: &StepInput<'_>, x: usize, y: usize) -> usize {
    let mask = input.mask();
    let xl = x.wrapping_sub(1) & mask;
    let xr = (x + 1) & mask;
    let yu = y.wrapping_sub(1) & mask;
    let yd = (y + 1) & mask;

    input.alive(xr, y)
        + input.alive(xr, yd)
        + input.alive(x, yd)
        + input.alive(xl, yd)
        + input.alive(xl, y)
        + input.alive(xl, yu)
        + input.alive(x, yu)
        + input.alive(xr, yu)
}

/// Fill one row of the next buffer.
#[inline]
pub(crate) fn advance_row(input: &StepInput<'_>, y: usize, next_row: &mut [u32]) {
    let base = y << input.size_log;
    for (x, out) in next_row.iter_mut().enumerate() {
        let age = input.current[base | x];
        *out = if input.protect[base | x] {
            age
        } else {
            let neighbors = count_neighbors(input, x, y);
            input.rules.advance(age, neighbors, input.max_age)
        };
    }
}

pub(crate) fn advance_serial(input: &StepInput<'_>, next: &mut [u32]) {
    let width = 1usize << input.size_log;
    for (y, row) in next.chunks_exact_mut(width).enumerate() {
        advance_row(input, y, row);
    }
}

pub(crate) fn advance_parallel(pool: &rayon::ThreadPool, input: &StepInput<'_>, next: &mut [u32]) {
    let width = 1usize << input.size_log;
    pool.install(|| {
        next.par_chunks_exact_mut(width)
            .enumerate()
            .for_each(|(y, row)| advance_row(input, y, row));
    });
}
