use ndarray::{ArrayBase, ArrayD, ArrayViewD, ArrayViewMutD, Dimension, IxDyn};

use crate::memory::MemoryAllocator;
use crate::tensor::Scalar;
use crate::value::Value;
use crate::{Error, Result};

fn array_dims(shape: &[i64]) -> Vec<usize> {
    // dims of a created value are non negative and their product fits in usize
    shape.iter().map(|&d| d as usize).collect()
}

impl<'a> Value<'a> {
    /// Create a dense tensor holding a copy of an ndarray array.
    ///
    /// The array may have any memory layout, the elements are copied in logical (row-major) order.
    ///
    /// ```
    /// use ndarray::array;
    /// use ortvalue::environment::Environment;
    /// use ortvalue::memory::CpuAllocator;
    /// use ortvalue::value::Value;
    ///
    /// Environment::init();
    /// let allocator = CpuAllocator::default_instance().unwrap();
    /// let value = Value::from_array(allocator, &array![[1.0_f32, 2.0], [3.0, 4.0]]).unwrap();
    /// assert_eq!(value.tensor_type_and_shape().unwrap().shape(), &[2, 2]);
    /// assert_eq!(value.tensor_data::<f32>().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    /// ```
    pub fn from_array<A, S, D>(
        allocator: &'a dyn MemoryAllocator,
        array: &ArrayBase<S, D>,
    ) -> Result<Self>
    where
        A: Scalar,
        S: ndarray::Data<Elem = A>,
        D: Dimension,
    {
        let shape = array
            .shape()
            .iter()
            .map(|&d| i64::try_from(d))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidArgument("array dimension does not fit in i64"))?;
        match array.as_slice() {
            Some(data) => Self::create_tensor_from_slice(allocator, &shape, data),
            None => {
                let data = array.iter().copied().collect::<Vec<_>>();
                Self::create_tensor_from_slice(allocator, &shape, &data)
            }
        }
    }

    /// Get an array view of a dense tensor of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the element type of the tensor is not `T`.
    pub fn as_array<T: Scalar>(&self) -> Result<ArrayViewD<'_, T>> {
        let dims = array_dims(self.tensor_type_and_shape()?.shape());
        let data = self.tensor_data::<T>()?;
        ArrayViewD::from_shape(IxDyn(&dims), data)
            .map_err(|_| Error::InvalidArgument("tensor data does not match its shape"))
    }

    /// Get a mutable array view of a dense tensor of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the element type of the tensor is not `T`.
    pub fn as_array_mut<T: Scalar>(&mut self) -> Result<ArrayViewMutD<'_, T>> {
        let dims = array_dims(self.tensor_type_and_shape()?.shape());
        let data = self.tensor_data_mut::<T>()?;
        ArrayViewMutD::from_shape(IxDyn(&dims), data)
            .map_err(|_| Error::InvalidArgument("tensor data does not match its shape"))
    }

    /// Get a copy of a string tensor as an array of owned strings.
    pub fn string_tensor_as_array(&self) -> Result<ArrayD<String>> {
        let dims = array_dims(self.tensor_type_and_shape()?.shape());
        let strings = self.string_tensor_as_vec()?;
        ArrayD::from_shape_vec(IxDyn(&dims), strings)
            .map_err(|_| Error::InvalidArgument("tensor data does not match its shape"))
    }
}
