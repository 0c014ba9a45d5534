//! Error types used in the [`ortvalue`](crate) crate.

use crate::tensor::ElementType;
use crate::value::ValueType;

/// Error type of all fallible operations in this crate.
///
/// Errors are returned synchronously by the call that caused them, nothing is retried or
/// swallowed internally.
#[derive(Clone, PartialEq, Eq, Hash, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /* Environment errors */
    //
    /// The runtime environment was not initialized before it was needed.
    ///
    /// Call [`Environment::init`](crate::environment::Environment::init) first.
    #[error("the runtime environment has not been initialized")]
    UninitializedEnvironment,

    /* Logical errors */
    //
    /// A shape has a negative dimension, or the number of elements (or bytes) it describes is not
    /// representable.
    #[error("invalid shape {dims:?}: {reason}")]
    InvalidShape {
        /// The offending dimensions.
        dims: Vec<i64>,
        /// Why the shape was rejected.
        reason: &'static str,
    },
    /// An element index is outside of `[0, len)`.
    #[error("index {index} is out of range for a tensor with {len} elements")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of elements of the tensor.
        len: usize,
    },
    /// The value was already released.
    #[error("the value was already released")]
    UseAfterRelease,
    /// The element type of a tensor does not match the requested one.
    #[error("element type mismatch: expected {expected:?}, found {actual:?}")]
    TypeMismatch {
        /// The element type the operation requires.
        expected: ElementType,
        /// The element type of the tensor.
        actual: ElementType,
    },
    /// The value is not of the kind the operation requires (for example a dense accessor on a
    /// sparse tensor).
    #[error("value type mismatch: expected {expected:?}, found {actual:?}")]
    InvalidValueType {
        /// The value type the operation requires.
        expected: ValueType,
        /// The value type of the value.
        actual: ValueType,
    },
    /// A buffer length does not match the number of elements described by a shape.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch {
        /// The number of elements described by the shape.
        expected: usize,
        /// The number of elements provided.
        actual: usize,
    },
    /// User provided an invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// Invalid string.
    ///
    /// Returned when bytes given as a string element are not valid UTF-8.
    #[error("string element is not valid UTF-8")]
    InvalidString,

    /* Resource errors */
    //
    /// Could not allocate the requested memory.
    #[error("failed to allocate {size} bytes")]
    MemoryAllocationFailed {
        /// The requested size in bytes.
        size: usize,
    },
}

pub(crate) type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::tensor::ElementType;
    use crate::tests::{check_send, check_sync};

    #[test]
    fn error_send_sync() {
        check_send::<Error>();
        check_sync::<Error>();
    }

    #[test]
    fn display() {
        assert_eq!(
            Error::IndexOutOfRange { index: 3, len: 3 }.to_string(),
            "index 3 is out of range for a tensor with 3 elements"
        );
        assert_eq!(
            Error::InvalidShape {
                dims: vec![2, -1],
                reason: "negative dimension"
            }
            .to_string(),
            "invalid shape [2, -1]: negative dimension"
        );
        assert_eq!(
            Error::TypeMismatch {
                expected: ElementType::String,
                actual: ElementType::Float
            }
            .to_string(),
            "element type mismatch: expected String, found Float"
        );
        assert_eq!(
            Error::UseAfterRelease.to_string(),
            "the value was already released"
        );
    }
}
