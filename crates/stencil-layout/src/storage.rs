//! # Storage descriptions
//!
//! The resolution functions read everything they need through [`StorageMeta`] and
//! [`StorageDescription`]. [`StorageInfo`] and [`FieldStorage`] implement both for owned,
//! host-side storages.

use alloc::vec;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{
    Alignment, DimRole, Halo, HaloWidths, LayoutError, LayoutMap, LayoutVector, ResolvedLayout,
    Shape,
};

/// Layout metadata of a storage.
pub trait StorageMeta {
    /// Logical to physical dimension mapping.
    type Layout: LayoutMap;
    /// Halo width accessor.
    type Halo: Halo;

    /// Number of logical dimensions.
    fn rank(&self) -> usize;

    /// Strides in physical order.
    ///
    /// Slot 0 holds the total padded element count; slot `p + 1` holds the stride of physical
    /// position `p`. The table holds at least `rank + 1` entries.
    fn raw_strides(&self) -> &[usize];

    /// Unaligned extents in logical order.
    fn unaligned_dims(&self) -> &[usize];

    /// The layout map.
    fn layout(&self) -> &Self::Layout;

    /// Alignment of the unit-stride dimension, in elements.
    fn alignment(&self) -> Alignment;

    /// The halo widths.
    fn halo(&self) -> &Self::Halo;
}

/// A storage made of one or more fields sharing the same layout metadata.
pub trait StorageDescription {
    /// Metadata shared by every field.
    type Meta: StorageMeta;
    /// Element type of the fields.
    type Elem;

    /// The layout metadata.
    fn meta(&self) -> &Self::Meta;

    /// Number of fields.
    fn field_count(&self) -> usize;

    /// Buffer of field `index`, starting at the allocation base.
    fn field(&self, index: usize) -> &[Self::Elem];
}

impl<M: StorageMeta + ?Sized> StorageMeta for &M {
    type Layout = M::Layout;
    type Halo = M::Halo;

    fn rank(&self) -> usize {
        (**self).rank()
    }

    fn raw_strides(&self) -> &[usize] {
        (**self).raw_strides()
    }

    fn unaligned_dims(&self) -> &[usize] {
        (**self).unaligned_dims()
    }

    fn layout(&self) -> &Self::Layout {
        (**self).layout()
    }

    fn alignment(&self) -> Alignment {
        (**self).alignment()
    }

    fn halo(&self) -> &Self::Halo {
        (**self).halo()
    }
}

/// Layout metadata of a padded storage, with the raw stride table computed from the unaligned
/// extents, the layout map, the halo widths and the alignment.
///
/// Only the inputs are serialized; deserializing runs [`StorageInfo::try_new`] again, so the
/// derived tables always agree with them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StorageInfoDesc", into = "StorageInfoDesc")]
pub struct StorageInfo {
    layout: ResolvedLayout,
    halo: HaloWidths,
    alignment: Alignment,
    unaligned_dims: Shape,
    padded_dims: Shape,
    raw_strides: Vec<usize>,
}

impl StorageInfo {
    /// Build the metadata of a storage.
    ///
    /// The unit-stride dimension is padded with `left_padding` elements in front of its halo and
    /// rounded up to a multiple of the alignment. Other dimensions are stored unpadded.
    pub fn try_new<L, H>(
        unaligned_dims: impl Into<Shape>,
        layout: &L,
        halo: H,
        alignment: Alignment,
    ) -> Result<Self, LayoutError>
    where
        L: LayoutMap + ?Sized,
        H: Into<HaloWidths>,
    {
        let unaligned_dims = unaligned_dims.into();
        let halo = halo.into();
        let rank = unaligned_dims.rank();

        if layout.dimension_count() != rank {
            return Err(LayoutError::RankMismatch {
                left: rank,
                right: layout.dimension_count(),
            });
        }
        if halo.rank() > rank {
            return Err(LayoutError::RankMismatch {
                left: rank,
                right: halo.rank(),
            });
        }

        let layout = ResolvedLayout::try_from_map(layout)?;

        let padded_dims: Shape = (0..rank)
            .map(|i| {
                let role = layout.role(i);
                let dim = unaligned_dims[i];
                if role.is_unit() && alignment.is_enabled() {
                    alignment.align_up(dim + alignment.left_padding(halo.halo_width(i), true))
                } else {
                    dim
                }
            })
            .collect();

        let raw_strides = Self::raw_strides_of(&layout, &padded_dims);

        log::debug!(
            "Storage info: dims {:?}, padded {:?}, raw strides {:?}, {alignment}",
            &*unaligned_dims,
            &*padded_dims,
            raw_strides
        );

        Ok(Self {
            layout,
            halo,
            alignment,
            unaligned_dims,
            padded_dims,
            raw_strides,
        })
    }

    // Strides chain from the innermost position outwards; positions without a dimension count
    // as extent 1. Slot 0 receives the total size.
    fn raw_strides_of(layout: &ResolvedLayout, padded_dims: &[usize]) -> Vec<usize> {
        let rank = padded_dims.len();
        let mut raw = vec![0; rank + 1];
        let max_position = layout.max_physical_position();

        if max_position < 0 {
            raw[0] = 1;
            return raw;
        }

        let mut extent_at = vec![1usize; max_position as usize + 1];
        for (dim, role) in layout.roles().iter().enumerate() {
            match role {
                DimRole::Unit => extent_at[max_position as usize] = padded_dims[dim],
                DimRole::Outer(position) => extent_at[*position] = padded_dims[dim],
                DimRole::Detached => {}
            }
        }

        let mut stride = 1;
        for position in (0..=max_position as usize).rev() {
            raw[position + 1] = stride;
            stride *= extent_at[position];
        }
        raw[0] = stride;

        raw
    }

    /// The resolved layout.
    pub fn resolved_layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    /// Extents including the alignment padding, in logical order.
    pub fn padded_dims(&self) -> &Shape {
        &self.padded_dims
    }

    /// Number of elements an allocation of this storage holds.
    pub fn size(&self) -> usize {
        self.raw_strides[0]
    }
}

impl StorageMeta for StorageInfo {
    type Layout = ResolvedLayout;
    type Halo = HaloWidths;

    fn rank(&self) -> usize {
        self.unaligned_dims.rank()
    }

    fn raw_strides(&self) -> &[usize] {
        &self.raw_strides
    }

    fn unaligned_dims(&self) -> &[usize] {
        &self.unaligned_dims
    }

    fn layout(&self) -> &Self::Layout {
        &self.layout
    }

    fn alignment(&self) -> Alignment {
        self.alignment
    }

    fn halo(&self) -> &Self::Halo {
        &self.halo
    }
}

/// Serialized form of a [`StorageInfo`].
#[derive(Serialize, Deserialize)]
struct StorageInfoDesc {
    alignment: Alignment,
    layout: LayoutVector,
    #[serde(default)]
    halo: HaloWidths,
    dims: Shape,
}

impl TryFrom<StorageInfoDesc> for StorageInfo {
    type Error = LayoutError;

    fn try_from(desc: StorageInfoDesc) -> Result<Self, Self::Error> {
        StorageInfo::try_new(desc.dims, &desc.layout, desc.halo, desc.alignment)
    }
}

impl From<StorageInfo> for StorageInfoDesc {
    fn from(info: StorageInfo) -> Self {
        Self {
            alignment: info.alignment,
            layout: info.layout.into(),
            halo: info.halo,
            dims: info.unaligned_dims,
        }
    }
}

/// Host storage holding `field_count` buffers laid out according to a [`StorageInfo`].
#[derive(Clone, Debug)]
pub struct FieldStorage<E> {
    info: StorageInfo,
    fields: Vec<Vec<E>>,
}

impl<E: Clone + Default> FieldStorage<E> {
    /// Allocate `field_count` default-initialized buffers of [`StorageInfo::size`] elements.
    pub fn new(info: StorageInfo, field_count: usize) -> Self {
        let fields = (0..field_count)
            .map(|_| vec![E::default(); info.size()])
            .collect();

        Self { info, fields }
    }
}

impl<E> FieldStorage<E> {
    /// Wrap existing buffers; each must hold at least [`StorageInfo::size`] elements.
    pub fn from_fields(info: StorageInfo, fields: Vec<Vec<E>>) -> Result<Self, LayoutError> {
        let required = info.size();
        if let Some((index, field)) = fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.len() < required)
        {
            return Err(LayoutError::FieldTooShort {
                index,
                required,
                actual: field.len(),
            });
        }

        Ok(Self { info, fields })
    }

    /// Buffer of field `index`, checked.
    pub fn try_field(&self, index: usize) -> Result<&[E], LayoutError> {
        self.fields
            .get(index)
            .map(Vec::as_slice)
            .ok_or(LayoutError::FieldOutOfRange {
                index,
                count: self.fields.len(),
            })
    }

    /// Mutable buffer of field `index`, checked.
    pub fn try_field_mut(&mut self, index: usize) -> Result<&mut [E], LayoutError> {
        let count = self.fields.len();
        self.fields
            .get_mut(index)
            .map(Vec::as_mut_slice)
            .ok_or(LayoutError::FieldOutOfRange { index, count })
    }

    /// The layout metadata.
    pub fn info(&self) -> &StorageInfo {
        &self.info
    }
}

impl<E> StorageDescription for FieldStorage<E> {
    type Meta = StorageInfo;
    type Elem = E;

    fn meta(&self) -> &Self::Meta {
        &self.info
    }

    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field(&self, index: usize) -> &[E] {
        &self.fields[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoHalo;
    use alloc::string::ToString;

    #[test]
    fn row_major_without_padding() {
        let layout = LayoutVector::row_major(3);
        let info = StorageInfo::try_new([4, 5, 6], &layout, NoHalo, Alignment::NONE).unwrap();

        assert_eq!(info.raw_strides(), &[120, 30, 6, 1]);
        assert_eq!(info.size(), 120);
        assert_eq!(&**info.padded_dims(), &[4, 5, 6]);
    }

    #[test]
    fn unit_dimension_is_padded_to_alignment() {
        // Dim 0 is innermost: 10 + (8 - 3) = 15, rounded up to 16.
        let info =
            StorageInfo::try_new([10, 4, 2], &[2, 0, 1], [3, 1, 1], Alignment::new(8)).unwrap();

        assert_eq!(&**info.padded_dims(), &[16, 4, 2]);
        assert_eq!(info.raw_strides(), &[128, 32, 16, 1]);
    }

    #[test]
    fn detached_dimensions_take_no_space() {
        let info =
            StorageInfo::try_new([3, 7, 2], &[1, -1, 0], NoHalo, Alignment::NONE).unwrap();

        assert_eq!(info.raw_strides(), &[6, 3, 1, 0]);
    }

    #[test]
    fn rank_mismatches_are_rejected() {
        assert_eq!(
            StorageInfo::try_new([3, 3], &[0, 1, 2], NoHalo, Alignment::NONE),
            Err(LayoutError::RankMismatch { left: 2, right: 3 })
        );
        assert_eq!(
            StorageInfo::try_new([3], &[0], [1, 1], Alignment::NONE),
            Err(LayoutError::RankMismatch { left: 1, right: 2 })
        );
    }

    #[test]
    fn field_access_is_checked() {
        let info = StorageInfo::try_new([2, 2], &[0, 1], NoHalo, Alignment::NONE).unwrap();
        let mut storage = FieldStorage::<f32>::new(info, 2);

        assert_eq!(storage.field_count(), 2);
        assert_eq!(storage.field(1).len(), 4);
        assert!(storage.try_field_mut(0).is_ok());
        assert_eq!(
            storage.try_field(2).err(),
            Some(LayoutError::FieldOutOfRange { index: 2, count: 2 })
        );
    }

    #[test]
    fn wrapped_fields_must_cover_the_allocation() {
        let info = StorageInfo::try_new([2, 2], &[0, 1], NoHalo, Alignment::NONE).unwrap();

        assert!(FieldStorage::from_fields(info.clone(), vec![vec![0u8; 4]]).is_ok());

        let err = FieldStorage::from_fields(info, vec![vec![0u8; 4], vec![0u8; 3]]).err();
        assert_eq!(
            err,
            Some(LayoutError::FieldTooShort {
                index: 1,
                required: 4,
                actual: 3
            })
        );
        assert_eq!(
            err.map(|err| err.to_string()).as_deref(),
            Some("Field 1 holds 3 elements, the storage requires 4")
        );
    }
}
