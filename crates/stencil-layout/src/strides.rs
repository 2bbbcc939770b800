use crate::{DimRole, LayoutMap, StorageMeta, Strides};

/// Stride of logical dimension `coord`, read from a raw stride table in physical order.
///
/// - A degenerate layout (no position `>= 0`) gives 0 for every coordinate.
/// - The dimension holding the largest physical position gives 1.
/// - Any other dimension at position `p` gives `raw_strides[p + 1]`; coordinates outside the
///   layout read slot 0.
///
/// The layout is not validated; a map that isn't a permutation yields a meaningless value.
#[inline]
pub fn stride_for<L: LayoutMap + ?Sized>(
    layout: &L,
    coord: usize,
    raw_strides: &[usize],
) -> usize {
    let max_position = layout.max_physical_position();
    if max_position < 0 {
        return 0;
    }

    DimRole::of(layout, coord, max_position).stride(raw_strides)
}

/// Strides of every logical dimension of a storage, in logical order.
pub fn resolve_strides<M: StorageMeta + ?Sized>(meta: &M) -> Strides {
    let layout = meta.layout();
    let raw_strides = meta.raw_strides();
    let max_position = layout.max_physical_position();

    debug_assert!(
        max_position < 0 || raw_strides.len() >= max_position as usize + 2,
        "Raw stride table holds {} entries, at least {} are required",
        raw_strides.len(),
        max_position + 2
    );

    if max_position < 0 {
        return crate::strides![0; meta.rank()];
    }

    (0..meta.rank())
        .map(|i| DimRole::of(layout, i, max_position).stride(raw_strides))
        .collect()
}
