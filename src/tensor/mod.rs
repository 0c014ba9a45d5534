//! Element types, shapes and type/shape descriptors of tensors.
//!
//! A tensor is described by its [`ElementType`] and its [`Shape`], which together make a
//! [`TensorTypeAndShapeInfo`]. Fixed-width element types have a matching Rust type implementing the [`Scalar`]
//! trait, used to access the data of a tensor in a typed manner. Strings are the only element type of variable
//! width and are accessed through the string methods of [`Value`](crate::value::Value).
//!
//! With the `ndarray` feature, dense tensors can be created from and viewed as `ndarray` arrays, see
//! [`Value::from_array`](crate::value::Value::from_array) and [`Value::as_array`](crate::value::Value::as_array).

mod scalar;
pub use scalar::{ElementType, Scalar};

mod shape;
pub use shape::{element_count, Shape};

mod info;
pub use info::TensorTypeAndShapeInfo;

pub(crate) mod strings;

#[cfg(feature = "ndarray")]
mod array;
