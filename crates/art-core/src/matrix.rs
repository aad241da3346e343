/// Append-only store of category prototypes.
///
/// Rows are contiguous in one buffer, each exactly `width` (= 2M) long.
/// Row index is category identity; lower index means older category.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryMatrix {
    width: usize,
    data: Vec<f64>,
}

impl CategoryMatrix {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            data: Vec::new(),
        }
    }

    /// Prototype length (2M).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of committed categories.
    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.data.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, j: usize) -> &[f64] {
        &self.data[j * self.width..(j + 1) * self.width]
    }

    pub fn row_mut(&mut self, j: usize) -> &mut [f64] {
        &mut self.data[j * self.width..(j + 1) * self.width]
    }

    /// Commit a new prototype and return its index.
    pub fn push(&mut self, prototype: &[f64]) -> usize {
        assert_eq!(
            prototype.len(),
            self.width,
            "prototype length must match matrix width"
        );
        self.data.extend_from_slice(prototype);
        self.len() - 1
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.data.chunks_exact(self.width.max(1))
    }
}
