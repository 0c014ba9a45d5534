use crate::{Error, Result};

/// The dimensions of a tensor.
///
/// A validated, immutable list of non-negative dimension sizes. The number of elements it describes is computed once
/// at construction and is guaranteed to fit in a `usize`. An empty list of dimensions describes a scalar with a
/// single element, and any zero dimension describes an empty tensor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: Vec<i64>,
    element_count: usize,
}
impl Shape {
    /// Create a new shape from its dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if a dimension is negative or if the product of the dimensions overflows.
    pub fn new(dims: &[i64]) -> Result<Self> {
        let element_count = element_count(dims)?;
        Ok(Self {
            dims: dims.to_vec(),
            element_count,
        })
    }

    /// Returns the dimensions.
    pub fn dims(&self) -> &[i64] {
        &self.dims
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the number of elements, the product of all dimensions.
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Returns true if the shape has no dimensions.
    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// The row-major strides of the shape, in elements.
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.dims.len()];
        let mut stride = 1usize;
        for (s, &d) in strides.iter_mut().zip(&self.dims).rev() {
            *s = stride;
            // cannot overflow, the full product was checked at construction
            stride *= d as usize;
        }
        strides
    }

    /// The number of bytes required to store all elements of the given size.
    pub(crate) fn nbytes(&self, element_size: usize) -> Result<usize> {
        self.element_count
            .checked_mul(element_size)
            .filter(|&n| n <= isize::MAX as usize)
            .ok_or_else(|| Error::InvalidShape {
                dims: self.dims.clone(),
                reason: "the tensor size in bytes overflows",
            })
    }
}
impl AsRef<[i64]> for Shape {
    fn as_ref(&self) -> &[i64] {
        &self.dims
    }
}
impl TryFrom<&[i64]> for Shape {
    type Error = Error;
    fn try_from(dims: &[i64]) -> Result<Self> {
        Self::new(dims)
    }
}

/// Compute the number of elements described by the given dimensions.
///
/// # Errors
///
/// Returns [`Error::InvalidShape`] if a dimension is negative or if the product overflows a `usize`.
pub fn element_count(dims: &[i64]) -> Result<usize> {
    let invalid = |reason| Error::InvalidShape {
        dims: dims.to_vec(),
        reason,
    };
    dims.iter().try_fold(1usize, |acc, &d| {
        let d = usize::try_from(d).map_err(|_| invalid("negative dimension"))?;
        acc.checked_mul(d)
            .ok_or_else(|| invalid("the number of elements overflows"))
    })
}
