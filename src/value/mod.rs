//! Module for [`Value`] and related types.
//!
//! A [`Value`] is a container for a dense or sparse tensor. It owns the tensor's backing storage, which is obtained
//! from the [`MemoryAllocator`] given at construction: a contiguous buffer for fixed-width element types, or a table
//! of variable-length strings for [`ElementType::String`].
//!
//! A value goes through the states `Created -> Populated -> Released`. Reads and writes are valid until the value is
//! released with [`Value::release`] (or dropped), after which every operation fails with
//! [`Error::UseAfterRelease`].
//!
//! ```
//! use ortvalue::environment::Environment;
//! use ortvalue::memory::CpuAllocator;
//! use ortvalue::value::Value;
//!
//! Environment::init();
//! let allocator = CpuAllocator::default_instance().unwrap();
//! let mut value = Value::create_tensor_with_empty_strings(allocator, &[1, 1, 3]).unwrap();
//! value.string_tensor_set_element_at("Ort", 1).unwrap();
//! assert_eq!(value.string_element(0).unwrap(), "");
//! assert_eq!(value.string_element(1).unwrap(), "Ort");
//! ```

use crate::log::verbose;
use crate::memory::{Allocation, MemoryAllocator, MemoryInfo};
use crate::tensor::strings::StringTable;
use crate::tensor::{ElementType, Scalar, Shape, TensorTypeAndShapeInfo};
use crate::{Error, Result};

mod fmt;

/// The type of the content of a [`Value`].
///
/// The discriminants are the ONNX value type codes. Only [`Tensor`](ValueType::Tensor) and
/// [`SparseTensor`](ValueType::SparseTensor) values can be created by this crate.
#[repr(i32)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ValueType {
    /// Unknown value type.
    Unknown = 0,
    /// A dense tensor.
    Tensor = 1,
    /// A sequence of values.
    Sequence = 2,
    /// A map from keys to values.
    Map = 3,
    /// An opaque, user defined value.
    Opaque = 4,
    /// A sparse tensor.
    SparseTensor = 5,
    /// An optional value.
    Optional = 6,
}
impl ValueType {
    /// Convert an ONNX value type code into a value type.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => ValueType::Unknown,
            1 => ValueType::Tensor,
            2 => ValueType::Sequence,
            3 => ValueType::Map,
            4 => ValueType::Opaque,
            5 => ValueType::SparseTensor,
            6 => ValueType::Optional,
            _ => return None,
        })
    }

    /// The ONNX value type code.
    pub fn as_raw(self) -> i32 {
        self as i32
    }
}

/// The storage format of a sparse tensor.
#[repr(i32)]
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum SparseFormat {
    /// No format.
    Undefined = 0,
    /// Coordinate format: a list of values and, for each value, its linear index or its coordinates.
    Coo = 1,
    /// Compressed sparse row/column format.
    Csrc = 2,
    /// Block sparse format.
    BlockSparse = 4,
}

enum TensorData<'a> {
    Numeric(Allocation<'a>),
    Strings(StringTable<'a>),
}

struct SparseData<'a> {
    format: SparseFormat,
    values_info: TensorTypeAndShapeInfo,
    values: Allocation<'a>,
    indices: Vec<i64>,
}

enum ValueKind<'a> {
    Tensor(TensorData<'a>),
    SparseTensor(SparseData<'a>),
}

struct ValueInner<'a> {
    allocator: &'a dyn MemoryAllocator,
    // for sparse tensors, the dense type and shape
    info: TensorTypeAndShapeInfo,
    kind: ValueKind<'a>,
}
impl ValueInner<'_> {
    fn value_type(&self) -> ValueType {
        match self.kind {
            ValueKind::Tensor(_) => ValueType::Tensor,
            ValueKind::SparseTensor(_) => ValueType::SparseTensor,
        }
    }
}

/// A dense or sparse tensor owning its backing storage.
///
/// See the [module documentation](self) for the lifecycle of a value.
pub struct Value<'a>(Option<ValueInner<'a>>);
impl<'a> Value<'a> {
    fn new_tensor(
        allocator: &'a dyn MemoryAllocator,
        info: TensorTypeAndShapeInfo,
        data: TensorData<'a>,
    ) -> Self {
        verbose!(
            "created {:?} tensor with shape {:?} on '{}'",
            info.element_type(),
            info.shape(),
            allocator.memory_info().name()
        );
        Self(Some(ValueInner {
            allocator,
            info,
            kind: ValueKind::Tensor(data),
        }))
    }

    /// Create a string tensor of the given shape with every element set to the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] if the shape has a negative dimension or describes too many elements.
    pub fn create_tensor_with_empty_strings(
        allocator: &'a dyn MemoryAllocator,
        shape: &[i64],
    ) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let table = StringTable::new(allocator, shape.element_count())?;
        let info = TensorTypeAndShapeInfo::new(ElementType::String, shape);
        Ok(Self::new_tensor(allocator, info, TensorData::Strings(table)))
    }

    /// Create a tensor of the given element type and shape.
    ///
    /// Fixed-width elements are zero-initialized, string elements are empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidShape`] for an invalid shape, or [`Error::MemoryAllocationFailed`] if the allocator
    /// could not provide the buffer.
    pub fn create_allocated_tensor(
        allocator: &'a dyn MemoryAllocator,
        element_type: ElementType,
        shape: &[i64],
    ) -> Result<Self> {
        let Some(element_size) = element_type.size_of() else {
            return Self::create_tensor_with_empty_strings(allocator, shape);
        };
        let shape = Shape::new(shape)?;
        let buffer = Allocation::new_zeroed(allocator, shape.nbytes(element_size)?)?;
        let info = TensorTypeAndShapeInfo::new(element_type, shape);
        Ok(Self::new_tensor(allocator, info, TensorData::Numeric(buffer)))
    }

    /// Create a tensor of the given shape holding a copy of `data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the length of `data` is not the number of elements of the shape.
    pub fn create_tensor_from_slice<T: Scalar>(
        allocator: &'a dyn MemoryAllocator,
        shape: &[i64],
        data: &[T],
    ) -> Result<Self> {
        let shape = Shape::new(shape)?;
        let len = shape.element_count();
        if data.len() != len {
            return Err(Error::LengthMismatch {
                expected: len,
                actual: data.len(),
            });
        }
        let mut buffer = Allocation::new_zeroed(allocator, shape.nbytes(std::mem::size_of::<T>())?)?;
        // Safety: the buffer holds `len` zeroed elements, a valid bit pattern for every scalar
        unsafe { buffer.as_mut_slice::<T>(len) }.copy_from_slice(data);
        let info = TensorTypeAndShapeInfo::new(T::TYPE, shape);
        Ok(Self::new_tensor(allocator, info, TensorData::Numeric(buffer)))
    }

    /// Create a string tensor of the given shape holding a copy of `strings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the number of strings is not the number of elements of the shape.
    pub fn create_string_tensor_from<S: AsRef<str>>(
        allocator: &'a dyn MemoryAllocator,
        shape: &[i64],
        strings: &[S],
    ) -> Result<Self> {
        let shape = Shape::new(shape)?;
        if strings.len() != shape.element_count() {
            return Err(Error::LengthMismatch {
                expected: shape.element_count(),
                actual: strings.len(),
            });
        }
        let mut table = StringTable::new(allocator, shape.element_count())?;
        for (i, s) in strings.iter().enumerate() {
            table.set(i, s.as_ref())?;
        }
        let info = TensorTypeAndShapeInfo::new(ElementType::String, shape);
        Ok(Self::new_tensor(allocator, info, TensorData::Strings(table)))
    }

    /// Create a sparse tensor in the coordinate (COO) format.
    ///
    /// # Arguments
    ///
    /// * `dense_shape` - The shape of the equivalent dense tensor.
    /// * `values` - The non-default values.
    /// * `indices` - Either one linear index (into the dense tensor) per value, or one full set of coordinates
    ///   per value, flattened, for a total of `values.len() * rank` indices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the number of indices matches neither layout or an index is out of
    /// the bounds of the dense shape.
    pub fn create_sparse_tensor_coo<T: Scalar>(
        allocator: &'a dyn MemoryAllocator,
        dense_shape: &[i64],
        values: &[T],
        indices: &[i64],
    ) -> Result<Self> {
        let dense_shape = Shape::new(dense_shape)?;
        let nnz = values.len();
        if nnz > dense_shape.element_count() {
            return Err(Error::InvalidArgument(
                "sparse tensor has more values than its dense shape has elements",
            ));
        }
        let in_bounds = |idx: i64, bound: i64| (0..bound).contains(&idx);
        if indices.len() == nnz {
            let count = dense_shape.element_count();
            let linear_in_bounds = |idx: i64| usize::try_from(idx).is_ok_and(|idx| idx < count);
            if !indices.iter().all(|&idx| linear_in_bounds(idx)) {
                return Err(Error::InvalidArgument("sparse linear index is out of bounds"));
            }
        } else if dense_shape.rank() > 0 && indices.len() == nnz * dense_shape.rank() {
            let coords_valid = indices.chunks_exact(dense_shape.rank()).all(|coords| {
                coords
                    .iter()
                    .zip(dense_shape.dims())
                    .all(|(&c, &d)| in_bounds(c, d))
            });
            if !coords_valid {
                return Err(Error::InvalidArgument("sparse coordinate is out of bounds"));
            }
        } else {
            return Err(Error::InvalidArgument(
                "sparse indices must hold one linear index or one set of coordinates per value",
            ));
        }

        let values_shape = Shape::new(&[nnz as i64])?;
        let mut buffer =
            Allocation::new_zeroed(allocator, values_shape.nbytes(std::mem::size_of::<T>())?)?;
        // Safety: the buffer holds `nnz` zeroed elements, a valid bit pattern for every scalar
        unsafe { buffer.as_mut_slice::<T>(nnz) }.copy_from_slice(values);

        verbose!(
            "created {:?} sparse tensor with dense shape {:?} and {} values",
            T::TYPE,
            dense_shape.dims(),
            nnz
        );
        Ok(Self(Some(ValueInner {
            allocator,
            info: TensorTypeAndShapeInfo::new(T::TYPE, dense_shape),
            kind: ValueKind::SparseTensor(SparseData {
                format: SparseFormat::Coo,
                values_info: TensorTypeAndShapeInfo::new(T::TYPE, values_shape),
                values: buffer,
                indices: indices.to_vec(),
            }),
        })))
    }

    fn inner(&self) -> Result<&ValueInner<'a>> {
        self.0.as_ref().ok_or(Error::UseAfterRelease)
    }

    fn dense(&self) -> Result<(&TensorTypeAndShapeInfo, &TensorData<'a>)> {
        let inner = self.inner()?;
        match &inner.kind {
            ValueKind::Tensor(data) => Ok((&inner.info, data)),
            ValueKind::SparseTensor(_) => Err(Error::InvalidValueType {
                expected: ValueType::Tensor,
                actual: ValueType::SparseTensor,
            }),
        }
    }

    fn dense_mut(&mut self) -> Result<(&TensorTypeAndShapeInfo, &mut TensorData<'a>)> {
        let inner = self.0.as_mut().ok_or(Error::UseAfterRelease)?;
        match &mut inner.kind {
            ValueKind::Tensor(data) => Ok((&inner.info, data)),
            ValueKind::SparseTensor(_) => Err(Error::InvalidValueType {
                expected: ValueType::Tensor,
                actual: ValueType::SparseTensor,
            }),
        }
    }

    fn sparse(&self) -> Result<&SparseData<'a>> {
        let inner = self.inner()?;
        match &inner.kind {
            ValueKind::SparseTensor(data) => Ok(data),
            ValueKind::Tensor(_) => Err(Error::InvalidValueType {
                expected: ValueType::SparseTensor,
                actual: ValueType::Tensor,
            }),
        }
    }

    fn strings(&self) -> Result<&StringTable<'a>> {
        match self.dense()? {
            (_, TensorData::Strings(table)) => Ok(table),
            (info, TensorData::Numeric(_)) => Err(Error::TypeMismatch {
                expected: ElementType::String,
                actual: info.element_type(),
            }),
        }
    }

    fn strings_mut(&mut self) -> Result<&mut StringTable<'a>> {
        match self.dense_mut()? {
            (_, TensorData::Strings(table)) => Ok(table),
            (info, TensorData::Numeric(_)) => Err(Error::TypeMismatch {
                expected: ElementType::String,
                actual: info.element_type(),
            }),
        }
    }

    /// Returns true if the value was released.
    pub fn is_released(&self) -> bool {
        self.0.is_none()
    }

    /// Release the value's storage.
    ///
    /// Every later operation except `release` itself fails with [`Error::UseAfterRelease`]. Releasing an already
    /// released value does nothing. Dropping a value releases it as well.
    pub fn release(&mut self) {
        if let Some(inner) = self.0.take() {
            verbose!(
                "released {:?} with shape {:?}",
                inner.value_type(),
                inner.info.shape()
            );
        }
    }

    /// Returns the type of the value.
    pub fn value_type(&self) -> Result<ValueType> {
        Ok(self.inner()?.value_type())
    }

    /// Returns true if the value is a dense tensor.
    pub fn is_tensor(&self) -> Result<bool> {
        Ok(self.value_type()? == ValueType::Tensor)
    }

    /// Returns true if the value is a sparse tensor.
    pub fn is_sparse_tensor(&self) -> Result<bool> {
        Ok(self.value_type()? == ValueType::SparseTensor)
    }

    /// Get the element type and shape of the tensor.
    ///
    /// For sparse tensors the shape is the dense shape.
    pub fn tensor_type_and_shape(&self) -> Result<TensorTypeAndShapeInfo> {
        Ok(self.inner()?.info.clone())
    }

    /// Get the descriptor of the memory the tensor's storage was obtained from.
    pub fn tensor_memory_info(&self) -> Result<&MemoryInfo> {
        Ok(self.inner()?.allocator.memory_info())
    }

    /// Get the string element at `index` as an owned string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `index` is not smaller than the number of elements, and
    /// [`Error::TypeMismatch`] if the tensor does not hold strings.
    pub fn string_element(&self, index: usize) -> Result<String> {
        self.string_element_as_str(index).map(str::to_owned)
    }

    /// Get the string element at `index`, borrowed from the tensor.
    pub fn string_element_as_str(&self, index: usize) -> Result<&str> {
        self.strings()?.get(index)
    }

    /// Get the UTF-8 encoded bytes of the string element at `index`.
    pub fn string_element_as_bytes(&self, index: usize) -> Result<&[u8]> {
        self.strings()?.get_bytes(index)
    }

    /// Overwrite the string element at `index`.
    ///
    /// No other element is affected.
    pub fn string_tensor_set_element_at(&mut self, text: &str, index: usize) -> Result<()> {
        self.strings_mut()?.set(index, text)
    }

    /// Overwrite the string element at `index` with UTF-8 encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidString`] if `utf8` is not valid UTF-8, in which case the tensor is unchanged.
    pub fn string_tensor_set_element_bytes_at(&mut self, utf8: &[u8], index: usize) -> Result<()> {
        let text = std::str::from_utf8(utf8).map_err(|_| Error::InvalidString)?;
        self.string_tensor_set_element_at(text, index)
    }

    /// Get a copy of all string elements, in row-major order.
    pub fn string_tensor_as_vec(&self) -> Result<Vec<String>> {
        Ok(self.strings()?.iter().map(str::to_owned).collect())
    }

    /// Get the elements of a dense tensor of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the element type of the tensor is not `T`.
    pub fn tensor_data<T: Scalar>(&self) -> Result<&[T]> {
        let (info, data) = self.dense()?;
        match data {
            TensorData::Numeric(buffer) if info.element_type() == T::TYPE => {
                // Safety: the buffer holds `element_count` valid elements of type T
                Ok(unsafe { buffer.as_slice::<T>(info.element_count()) })
            }
            _ => Err(Error::TypeMismatch {
                expected: T::TYPE,
                actual: info.element_type(),
            }),
        }
    }

    /// Get the elements of a dense tensor of type `T` for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the element type of the tensor is not `T`.
    pub fn tensor_data_mut<T: Scalar>(&mut self) -> Result<&mut [T]> {
        let (info, data) = self.dense_mut()?;
        match data {
            TensorData::Numeric(buffer) if info.element_type() == T::TYPE => {
                // Safety: the buffer holds `element_count` valid elements of type T
                Ok(unsafe { buffer.as_mut_slice::<T>(info.element_count()) })
            }
            _ => Err(Error::TypeMismatch {
                expected: T::TYPE,
                actual: info.element_type(),
            }),
        }
    }

    /// Get the raw bytes of a dense tensor with fixed-width elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for string tensors, which have no contiguous buffer.
    pub fn tensor_raw_data(&self) -> Result<&[u8]> {
        match self.dense()? {
            (_, TensorData::Numeric(buffer)) => Ok(buffer.as_bytes()),
            (_, TensorData::Strings(_)) => Err(Error::InvalidArgument(
                "string tensors have no contiguous data buffer",
            )),
        }
    }

    /// Get the storage format of a sparse tensor.
    pub fn sparse_format(&self) -> Result<SparseFormat> {
        Ok(self.sparse()?.format)
    }

    /// Get the element type and shape of the values of a sparse tensor, `[nnz]`.
    pub fn sparse_values_type_and_shape(&self) -> Result<TensorTypeAndShapeInfo> {
        Ok(self.sparse()?.values_info.clone())
    }

    /// Get the values of a sparse tensor of type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the element type of the tensor is not `T`.
    pub fn sparse_values<T: Scalar>(&self) -> Result<&[T]> {
        let sparse = self.sparse()?;
        let info = &sparse.values_info;
        if info.element_type() != T::TYPE {
            return Err(Error::TypeMismatch {
                expected: T::TYPE,
                actual: info.element_type(),
            });
        }
        // Safety: the buffer holds `nnz` valid elements of type T
        Ok(unsafe { sparse.values.as_slice::<T>(info.element_count()) })
    }

    /// Get the indices of a sparse tensor, as given at construction.
    pub fn sparse_indices(&self) -> Result<&[i64]> {
        Ok(&self.sparse()?.indices)
    }

    pub(crate) fn string_table(&self) -> Result<&StringTable<'a>> {
        self.strings()
    }
}
