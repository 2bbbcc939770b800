//! # Origin
//!
//! Allocations of padded storages start with alignment padding in front of the halo of the
//! unit-stride dimension, sized so that the first real element lands on an alignment boundary.
//! The origin of a field is the first element past that padding.

use alloc::vec::Vec;
use core::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{DimRole, Halo, LayoutMap, StorageDescription, StorageMeta};

/// Alignment of the unit-stride dimension, in elements. Zero disables alignment.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Alignment(usize);

impl Alignment {
    /// No alignment enforced.
    pub const NONE: Self = Self(0);

    /// Alignment of `elems` elements.
    pub const fn new(elems: usize) -> Self {
        Self(elems)
    }

    /// Alignment in elements.
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Whether padding is inserted at all.
    pub const fn is_enabled(&self) -> bool {
        self.0 != 0
    }

    /// Padding elements to insert before a halo of `halo_width` elements so that the first real
    /// element is aligned. Always 0 when alignment is disabled or when the dimension doesn't have
    /// unit stride.
    #[inline]
    pub const fn left_padding(&self, halo_width: usize, unit_stride: bool) -> usize {
        if self.0 == 0 || !unit_stride {
            return 0;
        }
        (self.0 - halo_width % self.0) % self.0
    }

    /// Round `value` up to the next multiple of the alignment.
    #[inline]
    pub const fn align_up(&self, value: usize) -> usize {
        if self.0 == 0 {
            value
        } else {
            value.next_multiple_of(self.0)
        }
    }
}

impl Display for Alignment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            0 => f.write_str("unaligned"),
            elems => write!(f, "aligned to {elems} elements"),
        }
    }
}

/// Whether `coord` is the unit-stride dimension of `layout`.
#[inline]
pub fn is_unit_stride<L: LayoutMap + ?Sized>(layout: &L, coord: usize) -> bool {
    layout.physical_position(coord) == layout.max_physical_position()
}

/// Padding elements inserted before the halo of `coord`.
#[inline]
pub fn left_padding<M: StorageMeta + ?Sized>(meta: &M, coord: usize) -> usize {
    let unit_stride = is_unit_stride(meta.layout(), coord);
    meta.alignment()
        .left_padding(meta.halo().halo_width(coord), unit_stride)
}

/// Padding, halo and stride of one logical dimension.
#[derive(new, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimPadding {
    /// Logical dimension.
    pub dim: usize,
    /// Role in the physical layout.
    pub role: DimRole,
    /// Halo width.
    pub halo: usize,
    /// Alignment padding in front of the halo.
    pub left_padding: usize,
    /// Element stride.
    pub stride: usize,
}

impl DimPadding {
    /// Elements skipped by the padding along this dimension.
    pub fn padding_offset(&self) -> usize {
        self.left_padding * self.stride
    }

    /// Elements skipped by the padding and the halo along this dimension.
    pub fn interior_offset(&self) -> usize {
        (self.left_padding + self.halo) * self.stride
    }
}

impl Display for DimPadding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "dim {} ({:?}): halo {}, left padding {}, stride {}",
            self.dim, self.role, self.halo, self.left_padding, self.stride
        )
    }
}

/// Per-dimension padding breakdown of a storage, in logical order.
pub fn padding_breakdown<M: StorageMeta + ?Sized>(meta: &M) -> Vec<DimPadding> {
    let layout = meta.layout();
    let halo = meta.halo();
    let alignment = meta.alignment();
    let raw_strides = meta.raw_strides();
    let max_position = layout.max_physical_position();

    (0..meta.rank())
        .map(|i| {
            let role = DimRole::of(layout, i, max_position);
            let stride = if max_position < 0 {
                0
            } else {
                role.stride(raw_strides)
            };
            let halo = halo.halo_width(i);

            DimPadding::new(i, role, halo, alignment.left_padding(halo, role.is_unit()), stride)
        })
        .collect()
}

/// Elements between the allocation base and the origin, the sum over all dimensions of
/// `left_padding * stride`.
pub fn padding_offset<M: StorageMeta + ?Sized>(meta: &M) -> usize {
    let layout = meta.layout();
    let alignment = meta.alignment();

    if !alignment.is_enabled() {
        return 0;
    }

    let halo = meta.halo();
    let raw_strides = meta.raw_strides();
    let max_position = layout.max_physical_position();

    let mut offset = 0;
    for i in 0..meta.rank() {
        let unit_stride = layout.physical_position(i) == max_position;
        let left_padding = alignment.left_padding(halo.halo_width(i), unit_stride);
        if left_padding == 0 || max_position < 0 {
            continue;
        }
        offset += left_padding * DimRole::of(layout, i, max_position).stride(raw_strides);
    }

    offset
}

/// Elements between the allocation base and the first real element, past both the padding and
/// the halo of every dimension.
pub fn interior_offset<M: StorageMeta + ?Sized>(meta: &M) -> usize {
    padding_breakdown(meta)
        .iter()
        .map(DimPadding::interior_offset)
        .sum()
}

/// Element offset of the origin of field `field_index`.
///
/// The offset is the same for every field of a storage; the index only has to be valid.
#[inline]
pub fn origin_offset<S: StorageDescription + ?Sized>(storage: &S, field_index: usize) -> usize {
    debug_assert!(
        field_index < storage.field_count(),
        "Field {field_index} is out of range, the storage holds {} fields",
        storage.field_count()
    );

    padding_offset(storage.meta())
}

/// Pointer to the origin of field `field_index`: its base address advanced by
/// [`origin_offset`] elements.
///
/// The pointer is computed with wrapping arithmetic and never dereferenced here.
pub fn origin_ptr<S: StorageDescription + ?Sized>(
    storage: &S,
    field_index: usize,
) -> *const S::Elem {
    let offset = origin_offset(storage, field_index);
    storage.field(field_index).as_ptr().wrapping_add(offset)
}

/// Elements of field `field_index` starting at its origin.
pub fn origin_slice<S: StorageDescription + ?Sized>(
    storage: &S,
    field_index: usize,
) -> &[S::Elem] {
    let offset = origin_offset(storage, field_index);
    storage
        .field(field_index)
        .get(offset..)
        .unwrap_or_default()
}
