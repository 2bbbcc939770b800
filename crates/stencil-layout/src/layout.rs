//! # Layout maps
//!
//! A layout map assigns every logical dimension a physical position in the memory nesting
//! order. The dimension holding the largest position is the innermost one and has unit stride.
//! A position of `-1` detaches a dimension from the physical nesting.

use alloc::vec::Vec;
use core::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{INLINE_DIMS, LayoutError};

/// Position reported for coordinates that are not part of a layout.
pub const DETACHED: i32 = -1;

/// Logical to physical dimension mapping.
///
/// Implementors only need to provide [`dimension_count`](LayoutMap::dimension_count) and
/// [`position`](LayoutMap::position); the remaining methods derive from those. Types that can
/// answer [`max_physical_position`](LayoutMap::max_physical_position) without scanning should
/// override it.
pub trait LayoutMap {
    /// Declared number of entries in the map.
    fn dimension_count(&self) -> usize;

    /// Physical position of `logical`, which must be below
    /// [`dimension_count`](LayoutMap::dimension_count).
    fn position(&self, logical: usize) -> i32;

    /// Physical position of `logical`, or [`DETACHED`] when the coordinate lies outside the map.
    #[inline]
    fn physical_position(&self, logical: usize) -> i32 {
        if logical < self.dimension_count() {
            self.position(logical)
        } else {
            DETACHED
        }
    }

    /// Largest position of the map, `-1` for an empty map.
    fn max_physical_position(&self) -> i32 {
        (0..self.dimension_count())
            .map(|i| self.position(i))
            .max()
            .unwrap_or(DETACHED)
    }

    /// Whether no dimension of the map takes part in the physical nesting.
    #[inline]
    fn is_degenerate(&self) -> bool {
        self.max_physical_position() < 0
    }
}

impl<L: LayoutMap + ?Sized> LayoutMap for &L {
    fn dimension_count(&self) -> usize {
        (**self).dimension_count()
    }

    fn position(&self, logical: usize) -> i32 {
        (**self).position(logical)
    }

    fn max_physical_position(&self) -> i32 {
        (**self).max_physical_position()
    }
}

impl LayoutMap for [i32] {
    fn dimension_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn position(&self, logical: usize) -> i32 {
        self[logical]
    }
}

impl<const N: usize> LayoutMap for [i32; N] {
    fn dimension_count(&self) -> usize {
        N
    }

    #[inline]
    fn position(&self, logical: usize) -> i32 {
        self[logical]
    }
}

impl LayoutMap for Vec<i32> {
    fn dimension_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn position(&self, logical: usize) -> i32 {
        self[logical]
    }
}

/// Owned layout map, stored inline for the common ranks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutVector {
    positions: SmallVec<[i32; INLINE_DIMS]>,
}

impl LayoutVector {
    /// Create a layout from positions given in logical dimension order.
    pub fn new(positions: &[i32]) -> Self {
        Self {
            positions: SmallVec::from_slice(positions),
        }
    }

    /// The identity layout of rank `rank`: the last logical dimension is innermost.
    pub fn row_major(rank: usize) -> Self {
        (0..rank as i32).collect()
    }

    /// The reversed layout of rank `rank`: the first logical dimension is innermost.
    pub fn column_major(rank: usize) -> Self {
        (0..rank as i32).rev().collect()
    }
}

impl Deref for LayoutVector {
    type Target = [i32];

    fn deref(&self) -> &Self::Target {
        &self.positions
    }
}

impl FromIterator<i32> for LayoutVector {
    fn from_iter<T: IntoIterator<Item = i32>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[i32; N]> for LayoutVector {
    fn from(value: [i32; N]) -> Self {
        Self::new(&value)
    }
}

impl LayoutMap for LayoutVector {
    fn dimension_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    fn position(&self, logical: usize) -> i32 {
        self.positions[logical]
    }
}

/// Role of a logical dimension in the physical layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimRole {
    /// Innermost dimension, contiguous in memory.
    Unit,
    /// Outer dimension at the given physical position.
    Outer(usize),
    /// Not part of the physical nesting.
    Detached,
}

impl DimRole {
    /// Role of `logical` within `layout`.
    ///
    /// `max_position` must be the [`max_physical_position`](LayoutMap::max_physical_position) of
    /// `layout`; it is passed in so callers iterating over all dimensions scan the map once.
    #[inline]
    pub fn of<L: LayoutMap + ?Sized>(layout: &L, logical: usize, max_position: i32) -> Self {
        let value = layout.physical_position(logical);

        if value < 0 {
            DimRole::Detached
        } else if value == max_position {
            DimRole::Unit
        } else {
            DimRole::Outer(value as usize)
        }
    }

    /// Whether this dimension has unit stride.
    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, DimRole::Unit)
    }

    /// Slot of the raw stride table holding this dimension's stride, `None` for the unit
    /// dimension.
    ///
    /// Slot 0 of the raw table holds the total padded size; the stride of physical position `p`
    /// sits at `p + 1`.
    #[inline]
    pub fn raw_slot(&self) -> Option<usize> {
        match self {
            DimRole::Unit => None,
            DimRole::Outer(position) => Some(position + 1),
            DimRole::Detached => Some(0),
        }
    }

    /// Stride of this dimension read from a raw stride table.
    #[inline]
    pub fn stride(&self, raw_strides: &[usize]) -> usize {
        match self.raw_slot() {
            None => 1,
            Some(slot) => {
                debug_assert!(
                    slot < raw_strides.len(),
                    "Raw stride table too short: slot {slot} requested, {} available",
                    raw_strides.len()
                );
                raw_strides[slot]
            }
        }
    }
}

/// A layout map with the role of every dimension computed once.
///
/// Serializes as its positions; deserializing validates them and derives the roles again.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LayoutVector", into = "LayoutVector")]
pub struct ResolvedLayout {
    positions: LayoutVector,
    roles: SmallVec<[DimRole; INLINE_DIMS]>,
    max_position: i32,
}

impl ResolvedLayout {
    /// Resolve the roles of `layout` without validating it.
    ///
    /// A map that isn't a permutation yields meaningless but well-defined roles. Debug builds
    /// assert on out-of-range positions.
    pub fn from_map<L: LayoutMap + ?Sized>(layout: &L) -> Self {
        debug_assert!(
            Self::validate(layout).is_ok(),
            "Invalid layout map: {:?}",
            Self::validate(layout)
        );
        Self::build(layout)
    }

    /// Resolve the roles of `layout`, checking that its non-detached positions form a partial
    /// permutation of `0..dimension_count`.
    pub fn try_from_map<L: LayoutMap + ?Sized>(layout: &L) -> Result<Self, LayoutError> {
        Self::validate(layout)?;
        Ok(Self::build(layout))
    }

    /// Check that every position lies in `[-1, rank)` and is used at most once.
    pub fn validate<L: LayoutMap + ?Sized>(layout: &L) -> Result<(), LayoutError> {
        let rank = layout.dimension_count();
        let mut seen: SmallVec<[bool; INLINE_DIMS]> = smallvec::smallvec![false; rank];

        for i in 0..rank {
            let position = layout.position(i);
            if position == DETACHED {
                continue;
            }
            if position < DETACHED || position as usize >= rank {
                return Err(LayoutError::InvalidPermutation { position, rank });
            }
            if core::mem::replace(&mut seen[position as usize], true) {
                return Err(LayoutError::DuplicatePosition { position });
            }
        }

        Ok(())
    }

    fn build<L: LayoutMap + ?Sized>(layout: &L) -> Self {
        let rank = layout.dimension_count();
        let max_position = layout.max_physical_position();
        let positions: LayoutVector = (0..rank).map(|i| layout.position(i)).collect();
        let roles: SmallVec<[DimRole; INLINE_DIMS]> = (0..rank)
            .map(|i| DimRole::of(layout, i, max_position))
            .collect();

        log::trace!("Resolved layout (max position {max_position}): {roles:?}");

        Self {
            positions,
            roles,
            max_position,
        }
    }

    /// Roles in logical dimension order.
    pub fn roles(&self) -> &[DimRole] {
        &self.roles
    }

    /// Role of `logical`; coordinates outside the layout are detached.
    #[inline]
    pub fn role(&self, logical: usize) -> DimRole {
        self.roles
            .get(logical)
            .copied()
            .unwrap_or(DimRole::Detached)
    }

    /// Logical index of the unit-stride dimension, if any.
    pub fn unit_dimension(&self) -> Option<usize> {
        if self.max_position < 0 {
            return None;
        }
        self.roles.iter().position(DimRole::is_unit)
    }

    /// Stride of `logical` read from a raw stride table. Degenerate layouts give 0.
    #[inline]
    pub fn stride_for(&self, logical: usize, raw_strides: &[usize]) -> usize {
        if self.max_position < 0 {
            return 0;
        }
        self.role(logical).stride(raw_strides)
    }
}

impl TryFrom<LayoutVector> for ResolvedLayout {
    type Error = LayoutError;

    fn try_from(positions: LayoutVector) -> Result<Self, Self::Error> {
        Self::try_from_map(&positions)
    }
}

impl From<ResolvedLayout> for LayoutVector {
    fn from(layout: ResolvedLayout) -> Self {
        layout.positions
    }
}

impl LayoutMap for ResolvedLayout {
    fn dimension_count(&self) -> usize {
        self.positions.dimension_count()
    }

    #[inline]
    fn position(&self, logical: usize) -> i32 {
        self.positions.position(logical)
    }

    #[inline]
    fn max_physical_position(&self) -> i32 {
        self.max_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_position_identifies_unit_dimension() {
        let layout = [2, 0, 1];
        assert_eq!(layout.max_physical_position(), 2);
        assert_eq!(DimRole::of(&layout, 0, 2), DimRole::Unit);
        assert_eq!(DimRole::of(&layout, 1, 2), DimRole::Outer(0));
        assert_eq!(DimRole::of(&layout, 2, 2), DimRole::Outer(1));
    }

    #[test]
    fn out_of_range_coordinates_are_detached() {
        let layout = [0, 1];
        assert_eq!(layout.physical_position(5), DETACHED);
        assert_eq!(DimRole::of(&layout, 5, 1), DimRole::Detached);
    }

    #[test]
    fn empty_and_fully_masked_layouts_are_degenerate() {
        let empty: [i32; 0] = [];
        assert!(empty.is_degenerate());
        assert!([-1, -1].is_degenerate());
        assert!(!LayoutVector::row_major(1).is_degenerate());

        let masked = ResolvedLayout::from_map(&[-1, -1]);
        assert_eq!(masked.roles(), &[DimRole::Detached, DimRole::Detached]);
        assert_eq!(masked.unit_dimension(), None);
    }

    #[test]
    fn validation_rejects_non_permutations() {
        assert_eq!(
            ResolvedLayout::try_from_map(&[0, 3, 1]),
            Err(LayoutError::InvalidPermutation {
                position: 3,
                rank: 3
            })
        );
        assert_eq!(
            ResolvedLayout::try_from_map(&[1, 1, 0]),
            Err(LayoutError::DuplicatePosition { position: 1 })
        );
        assert_eq!(
            ResolvedLayout::try_from_map(&[0, -2]),
            Err(LayoutError::InvalidPermutation {
                position: -2,
                rank: 2
            })
        );
        assert!(ResolvedLayout::try_from_map(&[1, -1, 0]).is_ok());
    }

    #[test]
    fn resolved_layout_caches_roles() {
        let layout = ResolvedLayout::from_map(&LayoutVector::column_major(3));
        assert_eq!(
            layout.roles(),
            &[DimRole::Unit, DimRole::Outer(1), DimRole::Outer(0)]
        );
        assert_eq!(layout.unit_dimension(), Some(0));
        assert_eq!(layout.max_physical_position(), 2);
        assert_eq!(layout.role(7), DimRole::Detached);
    }

    #[test]
    fn raw_slots_are_shifted_by_one() {
        assert_eq!(DimRole::Unit.raw_slot(), None);
        assert_eq!(DimRole::Outer(0).raw_slot(), Some(1));
        assert_eq!(DimRole::Detached.raw_slot(), Some(0));
        assert_eq!(DimRole::Outer(1).stride(&[99, 40, 8, 1]), 8);
    }
}
