use thiserror::Error;

/// An error type for tensor operations.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// Tensor shape does not match the provided data.
    ///
    /// The product of the shape dimensions must equal the number of elements.
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// Index exceeds tensor bounds.
    #[error("Index {index} out of bounds for dimension of size {size}")]
    IndexOutOfBounds {
        /// The invalid index that was attempted
        index: usize,
        /// The size of the dimension being indexed
        size: usize,
    },
}

impl TensorError {
    /// Creates an InvalidShape error with clear context.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error with clear context.
    pub fn index_out_of_bounds(index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }
}

/// Computes the strides for a row-major (C-contiguous) tensor layout.
///
/// For row-major layout, the rightmost dimension has stride 1, and each dimension's
/// stride is the product of all dimensions to its right.
///
/// # Examples
///
/// ```rust
/// use pixops_tensor::get_strides_from_shape;
///
/// let strides = get_strides_from_shape([2, 3, 4]);
/// assert_eq!(strides, [12, 4, 1]);
/// ```
pub fn get_strides_from_shape<const N: usize>(shape: [usize; N]) -> [usize; N] {
    let mut strides: [usize; N] = [0; N];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// A multi-dimensional array (tensor) with owned data.
///
/// The elements are stored contiguously in row-major order: the rightmost dimension
/// varies fastest in memory. For image batches the layout is `[batch, rows, cols, channels]`.
///
/// # Type Parameters
///
/// * `T` - The element type stored in the tensor
/// * `N` - The number of dimensions
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T, const N: usize> {
    /// The storage of the tensor.
    pub storage: Vec<T>,
    /// The shape of the tensor.
    pub shape: [usize; N],
    /// The strides of the tensor data in memory.
    pub strides: [usize; N],
}

impl<T, const N: usize> Tensor<T, N> {
    /// Creates a new `Tensor` with the given shape and data.
    ///
    /// # Errors
    ///
    /// If the number of elements in the data does not match the shape of the tensor, an error is returned.
    ///
    /// # Example
    ///
    /// ```
    /// use pixops_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.shape, [2, 2]);
    /// assert_eq!(t.strides, [2, 1]);
    /// ```
    pub fn from_shape_vec(shape: [usize; N], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        Ok(Self {
            storage: data,
            shape,
            strides: get_strides_from_shape(shape),
        })
    }

    /// Creates a new `Tensor` with the given shape and a default value.
    ///
    /// # Example
    ///
    /// ```
    /// use pixops_tensor::Tensor3;
    ///
    /// let t = Tensor3::<u8>::from_shape_val([2, 1, 3], 2).unwrap();
    /// assert_eq!(t.as_slice(), vec![2, 2, 2, 2, 2, 2]);
    /// ```
    pub fn from_shape_val(shape: [usize; N], value: T) -> Result<Self, TensorError>
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self::from_shape_vec(shape, vec![value; numel])
    }

    /// Create a new `Tensor` with the given shape and a function to generate the data.
    ///
    /// The function `f` is called with the index of the element to generate.
    ///
    /// # Example
    ///
    /// ```
    /// use pixops_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_fn([2, 2], |[i, j]| (i * 2 + j) as u8).unwrap();
    /// assert_eq!(t.as_slice(), vec![0, 1, 2, 3]);
    /// ```
    pub fn from_shape_fn<F>(shape: [usize; N], f: F) -> Result<Self, TensorError>
    where
        F: Fn([usize; N]) -> T,
    {
        let numel = shape.iter().product::<usize>();
        let data: Vec<T> = (0..numel)
            .map(|i| {
                let mut index = [0; N];
                let mut j = i;
                for k in (0..N).rev() {
                    index[k] = j % shape[k];
                    j /= shape[k];
                }
                f(index)
            })
            .collect();
        Self::from_shape_vec(shape, data)
    }

    /// Get the data of the tensor as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    /// Get the data of the tensor as a mutable slice.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.storage
    }

    /// Returns the number of elements in the tensor.
    #[inline]
    pub fn numel(&self) -> usize {
        self.storage.len()
    }

    /// Get the offset of the element at the given index.
    ///
    /// Returns `None` if any index exceeds its dimension.
    pub fn get_iter_offset(&self, index: [usize; N]) -> Option<usize> {
        let mut offset = 0;
        for ((&idx, dim_size), stride) in index.iter().zip(self.shape).zip(self.strides) {
            if idx >= dim_size {
                return None;
            }
            offset += idx * stride;
        }
        Some(offset)
    }

    /// Get the element at the given index, checking if the index is out of bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use pixops_tensor::Tensor2;
    ///
    /// let t = Tensor2::<u8>::from_shape_vec([2, 2], vec![1, 2, 3, 4]).unwrap();
    /// assert_eq!(t.get([1, 0]), Some(&3));
    /// assert!(t.get([2, 0]).is_none());
    /// ```
    pub fn get(&self, index: [usize; N]) -> Option<&T> {
        self.get_iter_offset(index)
            .and_then(|i| self.storage.get(i))
    }

    /// Get a mutable reference to the element at the given index.
    pub fn get_mut(&mut self, index: [usize; N]) -> Option<&mut T> {
        self.get_iter_offset(index)
            .and_then(move |i| self.storage.get_mut(i))
    }

    /// Get the contiguous block of elements at `index` along the first dimension.
    ///
    /// For a batch of images this is the data of a single image.
    pub fn outer_slice(&self, index: usize) -> Option<&[T]> {
        let (&len, &stride) = (self.shape.first()?, self.strides.first()?);
        if index >= len {
            return None;
        }
        self.storage.get(index * stride..(index + 1) * stride)
    }

    /// Mutable version of [`Tensor::outer_slice`].
    pub fn outer_slice_mut(&mut self, index: usize) -> Option<&mut [T]> {
        let (&len, &stride) = (self.shape.first()?, self.strides.first()?);
        if index >= len {
            return None;
        }
        self.storage.get_mut(index * stride..(index + 1) * stride)
    }
}

#[cfg(test)]
mod tests {
    use crate::tensor::TensorError;
    use crate::{Tensor1, Tensor2, Tensor3, Tensor4};

    #[test]
    fn constructor_1d() -> Result<(), TensorError> {
        let t = Tensor1::<u8>::from_shape_vec([1], vec![1])?;
        assert_eq!(t.shape, [1]);
        assert_eq!(t.as_slice(), vec![1]);
        assert_eq!(t.strides, [1]);
        assert_eq!(t.numel(), 1);
        Ok(())
    }

    #[test]
    fn constructor_invalid_shape() {
        let res = Tensor2::<u8>::from_shape_vec([2, 3], vec![1, 2, 3, 4, 5]);
        assert_eq!(res, Err(TensorError::invalid_shape(6, 5)));
    }

    #[test]
    fn get_3d() -> Result<(), TensorError> {
        let t = Tensor3::<u8>::from_shape_vec([2, 1, 3], vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(t.strides, [3, 3, 1]);
        assert_eq!(t.get([0, 0, 2]), Some(&3));
        assert_eq!(t.get([1, 0, 0]), Some(&4));
        assert!(t.get([1, 1, 0]).is_none());
        Ok(())
    }

    #[test]
    fn get_mut() -> Result<(), TensorError> {
        let mut t = Tensor2::<f32>::from_shape_val([2, 2], 0.0)?;
        if let Some(v) = t.get_mut([1, 1]) {
            *v = 3.0;
        }
        assert_eq!(t.as_slice(), vec![0.0, 0.0, 0.0, 3.0]);
        Ok(())
    }

    #[test]
    fn from_shape_fn_4d() -> Result<(), TensorError> {
        let t = Tensor4::<usize>::from_shape_fn([2, 2, 1, 2], |[b, r, _, c]| b * 100 + r * 10 + c)?;
        assert_eq!(t.as_slice(), vec![0, 1, 10, 11, 100, 101, 110, 111]);
        Ok(())
    }

    #[test]
    fn outer_slice() -> Result<(), TensorError> {
        let mut t = Tensor3::<u8>::from_shape_vec([3, 2, 1], vec![1, 2, 3, 4, 5, 6])?;
        assert_eq!(t.outer_slice(1), Some(&[3u8, 4][..]));
        assert!(t.outer_slice(3).is_none());
        if let Some(s) = t.outer_slice_mut(2) {
            s.fill(0);
        }
        assert_eq!(t.as_slice(), vec![1, 2, 3, 4, 0, 0]);
        Ok(())
    }

    #[test]
    fn outer_slice_empty_inner() -> Result<(), TensorError> {
        let t = Tensor4::<u8>::from_shape_vec([2, 0, 3, 1], vec![])?;
        assert_eq!(t.outer_slice(1), Some(&[][..]));
        Ok(())
    }
}
