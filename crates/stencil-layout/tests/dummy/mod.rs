use stencil_layout::{Alignment, StorageDescription, StorageMeta};

/// A storage description handing out bare tables, the way an external storage library does.
///
/// Nothing is validated: the layout map, the raw strides and the fields are used as given.
#[derive(Clone, Debug)]
pub struct DummyStorage {
    pub layout: Vec<i32>,
    pub raw_strides: Vec<usize>,
    pub unaligned_dims: Vec<usize>,
    pub halo: Vec<usize>,
    pub alignment: Alignment,
    pub fields: Vec<Vec<f32>>,
}

impl DummyStorage {
    /// The three dimensional storage used throughout the tests: dim 0 is innermost, dims 1 and 2
    /// sit at physical positions 0 and 1.
    pub fn example() -> Self {
        Self {
            layout: vec![2, 0, 1],
            raw_strides: vec![0, 40, 8, 1],
            unaligned_dims: vec![6, 5, 4],
            halo: vec![3, 1, 1],
            alignment: Alignment::new(8),
            fields: vec![vec![0.0; 200], vec![1.0; 200]],
        }
    }

    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = Alignment::new(alignment);
        self
    }

    pub fn with_halo(mut self, halo: &[usize]) -> Self {
        self.halo = halo.to_vec();
        self
    }

    pub fn with_layout(mut self, layout: &[i32]) -> Self {
        self.layout = layout.to_vec();
        self
    }
}

impl StorageMeta for DummyStorage {
    type Layout = Vec<i32>;
    type Halo = Vec<usize>;

    fn rank(&self) -> usize {
        self.unaligned_dims.len()
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

impl StorageDescription for DummyStorage {
    type Meta = Self;
    type Elem = f32;

    fn meta(&self) -> &Self::Meta {
        self
    }

    fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn field(&self, index: usize) -> &[f32] {
        &self.fields[index]
    }
}
