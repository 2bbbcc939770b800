use alloc::format;
use alloc::string::String;
use core::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Alignment, FieldStorage, HaloWidths, LayoutError, LayoutMap, ResolvedLayout, Shape,
    StorageDescription, StorageInfo, StorageMeta, Strides,
    config::{Logger, allocation::AllocationLogLevel, resolution::ResolutionLogLevel},
    extract_dims, interior_offset, origin_offset, padding_breakdown, resolve_strides,
};

/// Everything needed to address the unaligned region of one field: where it starts, how far
/// apart consecutive elements of each dimension are, and how many of them there are.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageView {
    /// Elements between the allocation base and the origin.
    pub origin_offset: usize,
    /// Size of one element in bytes.
    pub elem_size: usize,
    /// Element strides in logical order.
    pub strides: Strides,
    /// Unaligned extents in logical order.
    pub dims: Shape,
}

impl StorageView {
    /// Resolve the view of field `field_index`.
    pub fn new<S: StorageDescription + ?Sized>(storage: &S, field_index: usize) -> Self {
        let meta = storage.meta();

        Self {
            origin_offset: origin_offset(storage, field_index),
            elem_size: core::mem::size_of::<S::Elem>(),
            strides: resolve_strides(meta),
            dims: extract_dims(meta),
        }
    }

    /// Resolve the view of field `field_index` after checking the field index, the layout map
    /// and the length of the raw stride table.
    pub fn try_new<S: StorageDescription + ?Sized>(
        storage: &S,
        field_index: usize,
    ) -> Result<Self, LayoutError> {
        let meta = storage.meta();

        if field_index >= storage.field_count() {
            return Err(LayoutError::FieldOutOfRange {
                index: field_index,
                count: storage.field_count(),
            });
        }

        let layout = meta.layout();
        if layout.dimension_count() != meta.rank() {
            return Err(LayoutError::RankMismatch {
                left: meta.rank(),
                right: layout.dimension_count(),
            });
        }
        if meta.unaligned_dims().len() < meta.rank() {
            return Err(LayoutError::RankMismatch {
                left: meta.rank(),
                right: meta.unaligned_dims().len(),
            });
        }
        ResolvedLayout::validate(layout)?;

        let required = meta.rank() + 1;
        if meta.raw_strides().len() < required {
            return Err(LayoutError::StridesTooShort {
                required,
                actual: meta.raw_strides().len(),
            });
        }

        Ok(Self::new(storage, field_index))
    }

    /// Offset of the origin in bytes.
    pub fn origin_byte_offset(&self) -> usize {
        self.origin_offset * self.elem_size
    }

    /// Byte strides in logical order.
    pub fn byte_strides(&self) -> Strides {
        self.strides.iter().map(|s| s * self.elem_size).collect()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.rank()
    }
}

impl Display for StorageView {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "origin {} (+{} bytes), dims {:?}, strides {:?}",
            self.origin_offset,
            self.origin_byte_offset(),
            &*self.dims,
            &*self.strides
        )
    }
}

/// Builds storages and resolves views, reporting each step to the configured [`Logger`].
#[derive(Debug, Default)]
pub struct ViewResolver {
    logger: Logger,
}

impl ViewResolver {
    /// Create a resolver logging according to the global configuration.
    pub fn new() -> Self {
        Self {
            logger: Logger::new(),
        }
    }

    /// Create a resolver logging through `logger`.
    pub fn with_logger(logger: Logger) -> Self {
        Self { logger }
    }

    /// Build the metadata of a storage, see [`StorageInfo::try_new`].
    pub fn storage_info<L, H>(
        &mut self,
        unaligned_dims: impl Into<Shape>,
        layout: &L,
        halo: H,
        alignment: Alignment,
    ) -> Result<StorageInfo, LayoutError>
    where
        L: LayoutMap + ?Sized,
        H: Into<HaloWidths>,
    {
        let info = StorageInfo::try_new(unaligned_dims, layout, halo, alignment)?;

        if let AllocationLogLevel::Full = self.logger.log_level_allocation() {
            self.logger.log_allocation(&format!(
                "[Allocation] dims {:?}, padded {:?}, raw strides {:?}, {} elements, {alignment}",
                info.unaligned_dims(),
                &**info.padded_dims(),
                info.raw_strides(),
                info.size(),
            ));
        }

        Ok(info)
    }

    /// Allocate `field_count` fields for a storage.
    pub fn allocate<E: Clone + Default>(
        &mut self,
        info: StorageInfo,
        field_count: usize,
    ) -> FieldStorage<E> {
        if let AllocationLogLevel::Full = self.logger.log_level_allocation() {
            self.logger.log_allocation(&format!(
                "[Allocation] {field_count} fields of {} x {} bytes",
                info.size(),
                core::mem::size_of::<E>()
            ));
        }

        FieldStorage::new(info, field_count)
    }

    /// Resolve the view of field `field_index`, see [`StorageView::try_new`].
    pub fn resolve<S: StorageDescription + ?Sized>(
        &mut self,
        storage: &S,
        field_index: usize,
    ) -> Result<StorageView, LayoutError> {
        let view = StorageView::try_new(storage, field_index);

        match self.logger.log_level_resolution() {
            ResolutionLogLevel::Disabled => {}
            ResolutionLogLevel::Basic => self.log_view(field_index, &view),
            ResolutionLogLevel::Full => {
                self.log_view(field_index, &view);
                if view.is_ok() {
                    let meta = storage.meta();
                    for padding in padding_breakdown(meta) {
                        self.logger.log_resolution(&format!("  {padding}"));
                    }
                    self.logger.log_resolution(&format!(
                        "  first interior element at {}",
                        interior_offset(meta)
                    ));
                }
            }
        }

        view
    }

    fn log_view(&mut self, field_index: usize, view: &Result<StorageView, LayoutError>) {
        let msg: String = match view {
            Ok(view) => format!("[Resolution] field {field_index}: {view}"),
            Err(err) => format!("[Resolution] field {field_index}: {err}"),
        };
        self.logger.log_resolution(&msg);
    }
}
