use crate::tensor::{ElementType, Shape};

/// Describes the element type and the shape of a tensor.
///
/// A snapshot taken from a value by [`Value::tensor_type_and_shape`](crate::value::Value::tensor_type_and_shape).
/// The number of elements always equals the product of the shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TensorTypeAndShapeInfo {
    element_type: ElementType,
    shape: Shape,
}
impl TensorTypeAndShapeInfo {
    pub(crate) fn new(element_type: ElementType, shape: Shape) -> Self {
        Self {
            element_type,
            shape,
        }
    }

    /// Returns the type of the elements in the tensor.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns true if the tensor holds strings.
    pub fn is_string(&self) -> bool {
        self.element_type.is_string()
    }

    /// Returns the tensor's number of dimensions.
    pub fn dimensions_count(&self) -> usize {
        self.shape.rank()
    }

    /// Returns the sizes of the tensor at each dimension.
    pub fn shape(&self) -> &[i64] {
        self.shape.dims()
    }

    /// Returns the number of elements in the tensor.
    pub fn element_count(&self) -> usize {
        self.shape.element_count()
    }

    /// Returns the size of the tensor data in bytes, or `None` for string tensors.
    pub fn nbytes(&self) -> Option<usize> {
        // cannot overflow, checked when the tensor was allocated
        Some(self.element_type.size_of()? * self.shape.element_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields() {
        let info = TensorTypeAndShapeInfo::new(ElementType::Int32, Shape::new(&[2, 3]).unwrap());
        assert_eq!(info.element_type(), ElementType::Int32);
        assert!(!info.is_string());
        assert_eq!(info.dimensions_count(), 2);
        assert_eq!(info.shape(), &[2, 3]);
        assert_eq!(info.element_count(), 6);
        assert_eq!(info.nbytes(), Some(24));

        let info = TensorTypeAndShapeInfo::new(ElementType::String, Shape::new(&[]).unwrap());
        assert!(info.is_string());
        assert_eq!(info.dimensions_count(), 0);
        assert_eq!(info.element_count(), 1);
        assert_eq!(info.nbytes(), None);
    }
}
