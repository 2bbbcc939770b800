#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

//! # Stencil Layout
//!
//! Resolves the memory layout parameters of dense, halo-padded N-dimensional storages whose
//! logical dimension order differs from their physical nesting order:
//!
//! - the physical stride of every logical dimension ([`resolve_strides`], [`stride_for`]),
//! - the unaligned logical extents ([`extract_dims`]),
//! - the offset of the first real element past the alignment padding ([`origin_offset`],
//!   [`origin_ptr`]).
//!
//! All computations are pure and operate on a [`StorageDescription`]. Nothing in the core
//! allocates; [`StorageInfo`] and [`FieldStorage`] are plain implementations of the storage
//! contract that build a raw stride table in the expected format.
//!
//! ```rust
//! use stencil_layout::{Alignment, FieldStorage, StorageInfo, StorageView};
//!
//! // Dim 0 is innermost, padded from 10 + 5 to 16 elements for an 8 element alignment.
//! let info = StorageInfo::try_new([10, 4, 2], &[2, 0, 1], [3, 1, 1], Alignment::new(8))?;
//! let storage = FieldStorage::<f32>::new(info, 2);
//!
//! let view = StorageView::try_new(&storage, 0)?;
//! assert_eq!(view.origin_offset, 5);
//! assert_eq!(&*view.strides, &[1, 32, 16]);
//! assert_eq!(&*view.dims, &[10, 4, 2]);
//! # Ok::<(), stencil_layout::LayoutError>(())
//! ```

extern crate alloc;

#[macro_use]
extern crate derive_new;

pub(crate) const INLINE_DIMS: usize = 5;

/// Configuration module.
pub mod config;
/// Error types.
pub mod errors;

mod dims;
mod halo;
mod layout;
mod origin;
mod shape;
mod storage;
mod strides;
mod view;

pub use dims::*;
pub use errors::LayoutError;
pub use halo::*;
pub use layout::*;
pub use origin::*;
pub use shape::*;
pub use storage::*;
pub use strides::*;
pub use view::*;

/// Reexport for use in macros
pub use smallvec::{SmallVec, smallvec};
