/// Dense row-major tensor of `f32` values.
///
/// Layers in this crate treat tensors as `[rows, cols]` matrices. A one
/// dimensional tensor (e.g. a bias vector) has a single-element shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Wraps `data` with the given shape.
    ///
    /// # Panics
    ///
    /// Panics if the product of `shape` does not equal `data.len()`.
    #[must_use]
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self { data, shape }
    }

    #[must_use]
    pub fn zeros(shape: Vec<usize>) -> Self {
        let len = shape.iter().product();
        Self { data: vec![0.0; len], shape }
    }

    /// Stacks equally sized rows into a `[rows.len(), cols]` matrix.
    ///
    /// # Panics
    ///
    /// Panics if any row is not `cols` long.
    #[must_use]
    pub fn from_rows<R: AsRef<[f32]>>(cols: usize, rows: &[R]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), cols, "ragged row");
            data.extend_from_slice(row);
        }
        Self::from_vec(vec![rows.len(), cols], data)
    }

    /// A single `[1, n]` row.
    #[must_use]
    pub fn row_vector(data: Vec<f32>) -> Self {
        let n = data.len();
        Self::from_vec(vec![1, n], data)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of rows; a 1-D tensor counts as one row.
    #[must_use]
    pub fn rows(&self) -> usize {
        if self.shape.len() < 2 { 1 } else { self.shape[0] }
    }

    /// Width of the innermost dimension.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let c = self.cols();
        &self.data[i * c..(i + 1) * c]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.cols().max(1)).take(self.rows())
    }

    /// Collapses a `[rows, 1]` column into a plain vector.
    ///
    /// # Panics
    ///
    /// Panics if the tensor has more than one column.
    #[must_use]
    pub fn into_column(self) -> Vec<f32> {
        assert_eq!(self.cols(), 1, "expected a single column");
        self.data
    }
}
