use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::INLINE_DIMS;

/// Per-dimension halo widths: the number of boundary elements preceding the real region.
pub trait Halo {
    /// Halo width of logical dimension `dim`.
    fn halo_width(&self, dim: usize) -> usize;
}

impl<H: Halo + ?Sized> Halo for &H {
    fn halo_width(&self, dim: usize) -> usize {
        (**self).halo_width(dim)
    }
}

/// A storage without boundary region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoHalo;

impl Halo for NoHalo {
    fn halo_width(&self, _dim: usize) -> usize {
        0
    }
}

/// Halo widths indexed by logical dimension. Dimensions past the end have no halo.
impl<const N: usize> Halo for [usize; N] {
    fn halo_width(&self, dim: usize) -> usize {
        self.get(dim).copied().unwrap_or(0)
    }
}

impl Halo for [usize] {
    fn halo_width(&self, dim: usize) -> usize {
        self.get(dim).copied().unwrap_or(0)
    }
}

impl Halo for alloc::vec::Vec<usize> {
    fn halo_width(&self, dim: usize) -> usize {
        self.get(dim).copied().unwrap_or(0)
    }
}

/// Owned halo widths in logical dimension order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HaloWidths {
    widths: SmallVec<[usize; INLINE_DIMS]>,
}

impl HaloWidths {
    /// Create from widths given in logical dimension order.
    pub fn new(widths: &[usize]) -> Self {
        Self {
            widths: SmallVec::from_slice(widths),
        }
    }

    /// The same halo width on every one of `rank` dimensions.
    pub fn uniform(width: usize, rank: usize) -> Self {
        Self {
            widths: smallvec::smallvec![width; rank],
        }
    }

    /// Number of dimensions with an explicit width.
    pub fn rank(&self) -> usize {
        self.widths.len()
    }

    /// Replace the width of `dim`, growing the table with zeros when needed.
    pub fn with_width(mut self, dim: usize, width: usize) -> Self {
        if self.widths.len() <= dim {
            self.widths.resize(dim + 1, 0);
        }
        self.widths[dim] = width;
        self
    }
}

impl<const N: usize> From<[usize; N]> for HaloWidths {
    fn from(value: [usize; N]) -> Self {
        Self::new(&value)
    }
}

impl From<NoHalo> for HaloWidths {
    fn from(_: NoHalo) -> Self {
        Self::default()
    }
}

impl Halo for HaloWidths {
    fn halo_width(&self, dim: usize) -> usize {
        self.widths.get(dim).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dimensions_have_no_halo() {
        let halo = HaloWidths::new(&[3, 1]);
        assert_eq!(halo.halo_width(0), 3);
        assert_eq!(halo.halo_width(1), 1);
        assert_eq!(halo.halo_width(2), 0);
        assert_eq!([2usize, 2].halo_width(9), 0);
        assert_eq!(NoHalo.halo_width(0), 0);
    }

    #[test]
    fn with_width_grows_the_table() {
        let halo = HaloWidths::uniform(1, 2).with_width(3, 4);
        assert_eq!(halo.rank(), 4);
        assert_eq!(halo.halo_width(1), 1);
        assert_eq!(halo.halo_width(2), 0);
        assert_eq!(halo.halo_width(3), 4);
    }
}
