//! Double-buffered toroidal age grid plus the protection mask.
//!
//! Cells are stored row-major in flat vectors indexed by `(y << size_log) | x`.
//! Only neighbor counting wraps; every rectangle operation here expects a
//! rectangle that lies fully inside the field and rejects anything else.

use crate::error::{FieldError, Result};

/// Axis-aligned cell rectangle, never wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    pub const fn cell(x: usize, y: usize) -> Self {
        Self::new(x, y, 1, 1)
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// True when the rectangle fits inside a `size`x`size` field.
    pub fn fits(&self, size: usize) -> bool {
        matches!(self.x.checked_add(self.w), Some(r) if r <= size)
            && matches!(self.y.checked_add(self.h), Some(b) if b <= size)
    }
}

pub struct FieldBuffers {
    size_log: u32,
    size: usize,
    current: Vec<u32>,
    next: Vec<u32>,
    protect: Vec<bool>,
}

impl FieldBuffers {
    pub fn new(size_log: u32) -> Self {
        let size = 1usize << size_log;
        let cells = size * size;
        Self {
            size_log,
            size,
            current: vec![0; cells],
            next: vec![0; cells],
            protect: vec![false; cells],
        }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn size_log(&self) -> u32 {
        self.size_log
    }

    #[inline(always)]
    pub fn mask(&self) -> usize {
        self.size - 1
    }

    #[inline(always)]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.size && y < self.size);
        (y << self.size_log) | x
    }

    fn check(&self, rect: Rect) -> Result<()> {
        if rect.fits(self.size) {
            Ok(())
        } else {
            Err(FieldError::OutOfRange {
                x: rect.x,
                y: rect.y,
                w: rect.w,
                h: rect.h,
                size: self.size,
            })
        }
    }

    pub(crate) fn check_cell(&self, x: usize, y: usize) -> Result<()> {
        self.check(Rect::cell(x, y))
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, age: u32) -> Result<()> {
        self.check(Rect::new(x, y, w, h))?;
        for row in y..y + h {
            let start = (row << self.size_log) + x;
            self.current[start..start + w].fill(age);
        }
        Ok(())
    }

    pub fn fill_protect_rect(
        &mut self,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        flag: bool,
    ) -> Result<()> {
        self.check(Rect::new(x, y, w, h))?;
        for row in y..y + h {
            let start = (row << self.size_log) + x;
            self.protect[start..start + w].fill(flag);
        }
        Ok(())
    }

    /// Toggle every unprotected cell in the rectangle: dead becomes age 1,
    /// alive becomes dead. Protected cells are untouched.
    pub fn negate_rect(&mut self, x: usize, y: usize, w: usize, h: usize) -> Result<()> {
        self.check(Rect::new(x, y, w, h))?;
        for row in y..y + h {
            let start = (row << self.size_log) + x;
            let ages = &mut self.current[start..start + w];
            let protect = &self.protect[start..start + w];
            for (age, &locked) in ages.iter_mut().zip(protect) {
                if !locked {
                    *age = u32::from(*age == 0);
                }
            }
        }
        Ok(())
    }

    pub fn set_alive_cells(&mut self, cells: &[(usize, usize)]) -> Result<()> {
        for &(x, y) in cells {
            self.check_cell(x, y)?;
        }
        for &(x, y) in cells {
            let idx = self.index(x, y);
            self.current[idx] = 1;
        }
        Ok(())
    }

    /// Zero every age in both buffers and drop all protections.
    pub fn clear(&mut self) {
        self.current.fill(0);
        self.next.fill(0);
        self.protect.fill(false);
    }

    #[inline]
    pub(crate) fn is_alive(&self, x: usize, y: usize) -> bool {
        self.current[self.index(x, y)] > 0
    }

    #[inline]
    pub(crate) fn age(&self, x: usize, y: usize) -> u32 {
        self.current[self.index(x, y)]
    }

    #[inline]
    pub(crate) fn is_protected(&self, x: usize, y: usize) -> bool {
        self.protect[self.index(x, y)]
    }

    pub(crate) fn set_age(&mut self, x: usize, y: usize, age: u32) {
        let idx = self.index(x, y);
        self.current[idx] = age;
    }

    pub(crate) fn toggle_protect(&mut self, x: usize, y: usize) {
        let idx = self.index(x, y);
        self.protect[idx] = !self.protect[idx];
    }

    pub fn alive_count(&self) -> usize {
        self.current.iter().filter(|&&age| age > 0).count()
    }

    /// Read-only view of the current ages, row-major.
    pub fn ages(&self) -> &[u32] {
        &self.current
    }

    /// Read-only view of the protection mask, row-major.
    pub fn protection(&self) -> &[bool] {
        &self.protect
    }

    /// Frozen current buffer and mask alongside the writable next buffer.
    pub(crate) fn step_views(&mut self) -> (&[u32], &[bool], &mut [u32]) {
        (&self.current, &self.protect, &mut self.next)
    }

    /// Exchange current and next without copying cell data.
    #[inline]
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
