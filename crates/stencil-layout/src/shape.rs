use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::INLINE_DIMS;

macro_rules! dims_container {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash,
        )]
        #[serde(transparent)]
        pub struct $name {
            dims: SmallVec<[usize; INLINE_DIMS]>,
        }

        impl $name {
            /// Create from a slice, in logical dimension order.
            pub fn new(dims: &[usize]) -> Self {
                Self {
                    dims: SmallVec::from_slice(dims),
                }
            }

            /// Create from an already built small vector.
            pub fn new_raw(dims: SmallVec<[usize; INLINE_DIMS]>) -> Self {
                Self { dims }
            }

            /// Number of dimensions.
            pub fn rank(&self) -> usize {
                self.dims.len()
            }

            /// Appends a dimension to the back.
            pub fn push(&mut self, value: usize) {
                self.dims.push(value)
            }

            /// Copy the values into a `Vec`.
            pub fn to_vec(&self) -> alloc::vec::Vec<usize> {
                self.dims.to_vec()
            }
        }

        impl Deref for $name {
            type Target = [usize];

            fn deref(&self) -> &Self::Target {
                &self.dims
            }
        }

        impl DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.dims
            }
        }

        impl From<&[usize]> for $name {
            fn from(dims: &[usize]) -> Self {
                Self::new(dims)
            }
        }

        impl<const N: usize> From<[usize; N]> for $name {
            fn from(dims: [usize; N]) -> Self {
                Self::new(&dims)
            }
        }

        impl From<alloc::vec::Vec<usize>> for $name {
            fn from(dims: alloc::vec::Vec<usize>) -> Self {
                Self {
                    dims: SmallVec::from_vec(dims),
                }
            }
        }

        impl FromIterator<usize> for $name {
            fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
                Self {
                    dims: iter.into_iter().collect(),
                }
            }
        }
    };
}

dims_container!(
    /// Unaligned logical extents of a storage, in logical dimension order.
    Shape
);

dims_container!(
    /// Element strides of a storage, indexed by logical dimension.
    Strides
);

/// Build a [`Shape`](crate::Shape) from a list of extents.
#[macro_export]
macro_rules! shape {
    () => (
        $crate::Shape::new_raw($crate::SmallVec::new())
    );
    ($elem:expr; $n:expr) => ({
        $crate::Shape::new_raw($crate::smallvec!($elem; $n))
    });
    ($($x:expr),+$(,)?) => ({
        $crate::Shape::new_raw($crate::smallvec!($($x),*))
    });
}

/// Build [`Strides`](crate::Strides) from a list of element strides.
#[macro_export]
macro_rules! strides {
    () => (
        $crate::Strides::new_raw($crate::SmallVec::new())
    );
    ($elem:expr; $n:expr) => ({
        $crate::Strides::new_raw($crate::smallvec!($elem; $n))
    });
    ($($x:expr),+$(,)?) => ({
        $crate::Strides::new_raw($crate::smallvec!($($x),*))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macros_build_expected_containers() {
        assert_eq!(shape![], Shape::new(&[]));
        assert_eq!(shape![4, 5, 6].rank(), 3);
        assert_eq!(&*strides![1; 3], &[1, 1, 1]);
        assert_eq!(strides![40, 8, 1], Strides::from([40, 8, 1]));
    }

    #[test]
    fn collects_from_iterator() {
        let strides: Strides = (1..=3).rev().collect();
        assert_eq!(strides.to_vec(), alloc::vec![3, 2, 1]);
    }
}
