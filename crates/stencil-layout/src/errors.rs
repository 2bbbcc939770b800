use thiserror::Error;

/// Errors raised while constructing a layout description.
///
/// The resolution functions themselves never fail; these only surface from the validated
/// constructors (`try_*`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A physical position lies outside `[-1, rank)`.
    #[error("Physical position {position} is out of range for a layout of rank {rank}")]
    InvalidPermutation {
        /// The offending position.
        position: i32,
        /// The number of dimensions in the layout.
        rank: usize,
    },

    /// Two logical dimensions were mapped to the same physical position.
    #[error("Physical position {position} is assigned to more than one dimension")]
    DuplicatePosition {
        /// The position used twice.
        position: i32,
    },

    /// Two descriptions that must agree on the number of dimensions don't.
    #[error("Rank mismatch: {left} != {right}")]
    RankMismatch {
        /// Rank of the first description.
        left: usize,
        /// Rank of the second description.
        right: usize,
    },

    /// The raw stride table is too short for the layout it is paired with.
    #[error("Raw stride table holds {actual} entries, {required} are required")]
    StridesTooShort {
        /// Minimum number of entries.
        required: usize,
        /// Number of entries provided.
        actual: usize,
    },

    /// A field buffer is smaller than the allocation its storage describes.
    #[error("Field {index} holds {actual} elements, the storage requires {required}")]
    FieldTooShort {
        /// The short field.
        index: usize,
        /// Elements required by the storage.
        required: usize,
        /// Elements in the buffer.
        actual: usize,
    },

    /// A field index is not backed by a buffer.
    #[error("Field {index} is out of range, the storage holds {count} fields")]
    FieldOutOfRange {
        /// The requested field.
        index: usize,
        /// Number of fields in the storage.
        count: usize,
    },
}
