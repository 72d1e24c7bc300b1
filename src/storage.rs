//! Ordered bound-point storage with SoA layout.
//!
//! The store holds the sample points and the quadratic intersection points
//! between them, ordered left to right. Positions are dense indices `0..size`;
//! the optimizer finds adjacent intervals purely by position arithmetic, so an
//! insertion shifts every later record one slot to the right in all three
//! arrays at once.
//!
//! | Position parity | Role                                                        |
//! |-----------------|-------------------------------------------------------------|
//! | even            | sample point: `value = f(x)`, `slope = f'(x)`               |
//! | odd             | intersection point: `value` = lower bound there, `slope = 0` |
//!
//! The only exception is transient: during a refinement step the active
//! intersection record is overwritten with its true value just before the two
//! new intersections are inserted around it.

use crate::error::{QuadBoundError, Result};

/// Role of a record, derived from its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// `f` was evaluated here (or it is an interval endpoint).
    Sample,
    /// Meeting point of two adjacent quadratic lower-bounding pieces.
    Intersection,
}

impl PointKind {
    #[inline]
    pub fn of(position: usize) -> Self {
        if position % 2 == 0 {
            Self::Sample
        } else {
            Self::Intersection
        }
    }
}

/// One record of the store, materialized from the parallel arrays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundPoint {
    pub x: f64,
    pub value: f64,
    pub slope: f64,
    pub position: usize,
}

impl BoundPoint {
    pub fn kind(&self) -> PointKind {
        PointKind::of(self.position)
    }
}

/// Struct-of-Arrays bound storage.
///
/// # Memory Layout
///
/// - `xs[p]`: abscissa of the record at position `p`
/// - `values[p]`: true value (sample) or lower-bound value (intersection)
/// - `slopes[p]`: derivative at a sample, `0.0` at an intersection
///
/// The three arrays always have identical length; a record's position is its
/// index, so renumbering on insertion is the contiguous shift done by
/// `Vec::insert`.
#[derive(Debug, Clone, Default)]
pub struct IntervalStore {
    xs: Vec<f64>,
    values: Vec<f64>,
    slopes: Vec<f64>,
}

impl IntervalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            slopes: Vec::with_capacity(capacity),
        }
    }

    /// Seed a store with the three initial records: left endpoint, first
    /// intersection, right endpoint.
    pub fn seeded(left: (f64, f64, f64), mid: (f64, f64), right: (f64, f64, f64)) -> Self {
        let mut store = Self::with_capacity(64);
        store.push(left.0, left.1, left.2);
        store.push(mid.0, mid.1, 0.0);
        store.push(right.0, right.1, right.2);
        store
    }

    /// Append a record at position `size()`.
    pub fn push(&mut self, x: f64, value: f64, slope: f64) -> usize {
        self.xs.push(x);
        self.values.push(value);
        self.slopes.push(slope);
        self.debug_check_sync();
        self.xs.len() - 1
    }

    /// Number of records.
    #[inline]
    pub fn size(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Position of the last record, if any.
    #[inline]
    pub fn last_position(&self) -> Option<usize> {
        self.size().checked_sub(1)
    }

    #[inline]
    fn check(&self, position: usize) -> Result<()> {
        if position < self.size() {
            Ok(())
        } else {
            Err(QuadBoundError::OutOfRange {
                position,
                size: self.size(),
            })
        }
    }

    /// Record at `position`.
    ///
    /// # Errors
    /// `OutOfRange` if no record has that position.
    pub fn get(&self, position: usize) -> Result<BoundPoint> {
        self.check(position)?;
        Ok(BoundPoint {
            x: self.xs[position],
            value: self.values[position],
            slope: self.slopes[position],
            position,
        })
    }

    /// Value at `position`; used by the lower-bound scan.
    pub fn value(&self, position: usize) -> Result<f64> {
        self.check(position)?;
        Ok(self.values[position])
    }

    /// Insert a new record immediately after `position`.
    ///
    /// The new record gets `position + 1` and every record previously at
    /// `position + 1` or later moves one slot right. The position is
    /// validated before any array is touched, so the three arrays are shifted
    /// together or not at all.
    ///
    /// Returns the position of the new record.
    pub fn insert_after(&mut self, position: usize, x: f64, value: f64, slope: f64) -> Result<usize> {
        self.check(position)?;
        let at = position + 1;
        self.xs.insert(at, x);
        self.values.insert(at, value);
        self.slopes.insert(at, slope);
        self.debug_check_sync();
        Ok(at)
    }

    /// Overwrite value and slope at `position` without renumbering.
    pub fn update(&mut self, position: usize, value: f64, slope: f64) -> Result<()> {
        self.check(position)?;
        self.values[position] = value;
        self.slopes[position] = slope;
        Ok(())
    }

    /// Iterate over all records in position order.
    pub fn iter(&self) -> impl Iterator<Item = BoundPoint> + '_ {
        (0..self.size()).map(move |p| BoundPoint {
            x: self.xs[p],
            value: self.values[p],
            slope: self.slopes[p],
            position: p,
        })
    }

    /// Abscissas in position order.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Values in position order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Slopes in position order.
    pub fn slopes(&self) -> &[f64] {
        &self.slopes
    }

    /// True when abscissas are non-decreasing in position order.
    pub fn is_ordered(&self) -> bool {
        self.xs.windows(2).all(|w| w[0] <= w[1])
    }

    #[inline]
    fn debug_check_sync(&self) {
        debug_assert_eq!(self.xs.len(), self.values.len());
        debug_assert_eq!(self.xs.len(), self.slopes.len());
    }
}
