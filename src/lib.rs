#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Tensor values, string tensors and allocators for an ONNX style inference runtime.
//!
//! The crate provides the value layer of an inference runtime: the containers that hold the inputs and outputs of
//! a model, together with the allocator their storage is obtained from and the metadata describing them.
//!
//! - [`environment`]: the process-wide runtime environment, which must be initialized before the default allocator
//!     can be used. It also holds the logging settings of the crate.
//! - [`memory`]: memory descriptors ([`MemoryInfo`](memory::MemoryInfo)), the
//!     [`MemoryAllocator`](memory::MemoryAllocator) trait and the default [`CpuAllocator`](memory::CpuAllocator).
//! - [`tensor`]: element types, shapes and the [`TensorTypeAndShapeInfo`](tensor::TensorTypeAndShapeInfo)
//!     descriptor.
//! - [`value`]: the [`Value`](value::Value) container for dense tensors, string tensors and sparse tensors.
//!
//! The following example populates a string tensor and reads it back:
//! ```rust
//! use ortvalue::environment::Environment;
//! use ortvalue::memory::CpuAllocator;
//! use ortvalue::value::Value;
//!
//! Environment::init();
//! let allocator = CpuAllocator::default_instance().unwrap();
//!
//! let mut value = Value::create_tensor_with_empty_strings(allocator, &[1, 1, 3]).unwrap();
//! for (i, s) in ["Hello", "Ort", "World"].iter().enumerate() {
//!     value.string_tensor_set_element_at(s, i).unwrap();
//! }
//!
//! let info = value.tensor_type_and_shape().unwrap();
//! assert!(info.is_string());
//! assert_eq!(info.shape(), &[1, 1, 3]);
//! assert_eq!(info.element_count(), 3);
//! assert_eq!(value.string_element(1).unwrap(), "Ort");
//! assert_eq!(value.tensor_memory_info().unwrap().name(), "Cpu");
//! ```
//!
//! ## Cargo Features
//! - `ndarray`:
//!     Conversions between dense tensors and `ndarray` arrays.
//!     Adds a dependency to the `ndarray` crate.
//!     This feature is enabled by default.
//! - `half`:
//!     Support for half precision floating point numbers using the [`half`](https://docs.rs/half/latest/half/) crate.
//!     Without this feature [`f16`](scalar::f16) and [`bf16`](scalar::bf16) are plain bit wrappers.
//! - `num-complex`:
//!     Support for complex numbers using the [`num-complex`](https://docs.rs/num/latest/num/complex/struct.Complex.html)
//!     crate. Without this feature [`Complex`](scalar::Complex) is a plain struct of real and imaginary parts.
//!
//! By default only the `ndarray` feature is enabled.
//!
//! ## Logging
//! The crate emits [`tracing`](https://docs.rs/tracing) events with the target `ortvalue`, filtered by the
//! [`LoggingLevel`](environment::LoggingLevel) of the environment. Install a `tracing` subscriber to collect them.

#[macro_use]
mod private;
mod log;

pub mod environment;
pub mod error;
pub mod memory;
pub mod scalar;
pub mod tensor;
pub mod value;

pub use error::Error;
pub(crate) use error::Result;

#[cfg(feature = "ndarray")]
pub use ndarray;

#[cfg(feature = "half")]
pub use half;

#[cfg(feature = "num-complex")]
pub use num_complex;
