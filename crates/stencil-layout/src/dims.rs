use crate::{Shape, StorageMeta};

/// Unaligned extents of a storage, in logical order.
pub fn extract_dims<M: StorageMeta + ?Sized>(meta: &M) -> Shape {
    let dims = meta.unaligned_dims();
    debug_assert!(
        dims.len() >= meta.rank(),
        "Unaligned extents hold {} entries for a storage of rank {}",
        dims.len(),
        meta.rank()
    );

    Shape::new(&dims[..meta.rank()])
}
