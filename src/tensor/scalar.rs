/// Data types (dtypes) of tensor elements.
///
/// The discriminants are the ONNX `TensorProto.DataType` codes.
/// All variants except [`String`](ElementType::String) are fixed-width and have a matching [`Scalar`] type.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ElementType {
    /// 32-bit floating point, `f32`
    Float = 1,
    /// 8-bit unsigned integer, `u8`
    Uint8 = 2,
    /// 8-bit signed integer, `i8`
    Int8 = 3,
    /// 16-bit unsigned integer, `u16`
    Uint16 = 4,
    /// 16-bit signed integer, `i16`
    Int16 = 5,
    /// 32-bit signed integer, `i32`
    Int32 = 6,
    /// 64-bit signed integer, `i64`
    Int64 = 7,
    /// Variable-length UTF-8 string.
    String = 8,
    /// Boolean, `bool`
    Bool = 9,
    /// 16-bit floating point, [`ortvalue::scalar::f16`](`crate::scalar::f16`).
    Float16 = 10,
    /// 64-bit floating point, `f64`
    Double = 11,
    /// 32-bit unsigned integer, `u32`
    Uint32 = 12,
    /// 64-bit unsigned integer, `u64`
    Uint64 = 13,
    /// Complex with 32-bit floating point parts, [`ortvalue::scalar::Complex<f32>`](`crate::scalar::Complex`).
    Complex64 = 14,
    /// Complex with 64-bit floating point parts, [`ortvalue::scalar::Complex<f64>`](`crate::scalar::Complex`).
    Complex128 = 15,
    /// 16-bit floating point using the bfloat16 format, [`ortvalue::scalar::bf16`](`crate::scalar::bf16`).
    BFloat16 = 16,
    /// [`ortvalue::scalar::Float8_e4m3fn`](`crate::scalar::Float8_e4m3fn`).
    #[allow(non_camel_case_types)]
    Float8_e4m3fn = 17,
    /// [`ortvalue::scalar::Float8_e4m3fnuz`](`crate::scalar::Float8_e4m3fnuz`).
    #[allow(non_camel_case_types)]
    Float8_e4m3fnuz = 18,
    /// [`ortvalue::scalar::Float8_e5m2`](`crate::scalar::Float8_e5m2`).
    #[allow(non_camel_case_types)]
    Float8_e5m2 = 19,
    /// [`ortvalue::scalar::Float8_e5m2fnuz`](`crate::scalar::Float8_e5m2fnuz`).
    #[allow(non_camel_case_types)]
    Float8_e5m2fnuz = 20,
}
impl ElementType {
    /// Convert an ONNX data type code into an element type.
    ///
    /// Returns `None` for `UNDEFINED` (0) and for codes this crate does not support.
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            1 => ElementType::Float,
            2 => ElementType::Uint8,
            3 => ElementType::Int8,
            4 => ElementType::Uint16,
            5 => ElementType::Int16,
            6 => ElementType::Int32,
            7 => ElementType::Int64,
            8 => ElementType::String,
            9 => ElementType::Bool,
            10 => ElementType::Float16,
            11 => ElementType::Double,
            12 => ElementType::Uint32,
            13 => ElementType::Uint64,
            14 => ElementType::Complex64,
            15 => ElementType::Complex128,
            16 => ElementType::BFloat16,
            17 => ElementType::Float8_e4m3fn,
            18 => ElementType::Float8_e4m3fnuz,
            19 => ElementType::Float8_e5m2,
            20 => ElementType::Float8_e5m2fnuz,
            _ => return None,
        })
    }

    /// The ONNX data type code of this element type.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Returns true for the variable-length string type.
    pub fn is_string(self) -> bool {
        self == ElementType::String
    }

    /// The size in bytes of a single element, or `None` for strings.
    pub fn size_of(self) -> Option<usize> {
        Some(match self {
            ElementType::String => return None,
            ElementType::Uint8
            | ElementType::Int8
            | ElementType::Bool
            | ElementType::Float8_e4m3fn
            | ElementType::Float8_e4m3fnuz
            | ElementType::Float8_e5m2
            | ElementType::Float8_e5m2fnuz => 1,
            ElementType::Uint16
            | ElementType::Int16
            | ElementType::Float16
            | ElementType::BFloat16 => 2,
            ElementType::Float | ElementType::Int32 | ElementType::Uint32 => 4,
            ElementType::Int64
            | ElementType::Double
            | ElementType::Uint64
            | ElementType::Complex64 => 8,
            ElementType::Complex128 => 16,
        })
    }
}

/// A trait for fixed-width types that can be used as tensor elements.
///
/// Implemented for every [`ElementType`] except strings. The all-zeros bit pattern is a valid value of every
/// implementing type, which is what freshly allocated tensors contain.
pub trait Scalar: Copy + Send + Sync + std::fmt::Debug + 'static {
    /// The [`ElementType`] enum variant of the implementing type.
    const TYPE: ElementType;
    private_decl! {}
}
macro_rules! impl_scalar {
    ($rust_type:path, $element_type_variant:ident) => {
        impl Scalar for $rust_type {
            const TYPE: ElementType = ElementType::$element_type_variant;
            private_impl! {}
        }
    };
}

impl_scalar!(f32, Float);
impl_scalar!(u8, Uint8);
impl_scalar!(i8, Int8);
impl_scalar!(u16, Uint16);
impl_scalar!(i16, Int16);
impl_scalar!(i32, Int32);
impl_scalar!(i64, Int64);
impl_scalar!(bool, Bool);
impl_scalar!(crate::scalar::f16, Float16);
impl_scalar!(f64, Double);
impl_scalar!(u32, Uint32);
impl_scalar!(u64, Uint64);
impl_scalar!(crate::scalar::Complex<f32>, Complex64);
impl_scalar!(crate::scalar::Complex<f64>, Complex128);
impl_scalar!(crate::scalar::bf16, BFloat16);
impl_scalar!(crate::scalar::Float8_e4m3fn, Float8_e4m3fn);
impl_scalar!(crate::scalar::Float8_e4m3fnuz, Float8_e4m3fnuz);
impl_scalar!(crate::scalar::Float8_e5m2, Float8_e5m2);
impl_scalar!(crate::scalar::Float8_e5m2fnuz, Float8_e5m2fnuz);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_conversions() {
        let types = [
            (1, ElementType::Float),
            (2, ElementType::Uint8),
            (3, ElementType::Int8),
            (4, ElementType::Uint16),
            (5, ElementType::Int16),
            (6, ElementType::Int32),
            (7, ElementType::Int64),
            (8, ElementType::String),
            (9, ElementType::Bool),
            (10, ElementType::Float16),
            (11, ElementType::Double),
            (12, ElementType::Uint32),
            (13, ElementType::Uint64),
            (14, ElementType::Complex64),
            (15, ElementType::Complex128),
            (16, ElementType::BFloat16),
            (17, ElementType::Float8_e4m3fn),
            (18, ElementType::Float8_e4m3fnuz),
            (19, ElementType::Float8_e5m2),
            (20, ElementType::Float8_e5m2fnuz),
        ];
        for (raw, rust) in types {
            assert_eq!(ElementType::from_raw(raw), Some(rust));
            assert_eq!(rust.as_raw(), raw);
        }
        assert_eq!(ElementType::from_raw(0), None);
        assert_eq!(ElementType::from_raw(21), None);
        assert_eq!(ElementType::from_raw(-1), None);
    }

    #[test]
    fn sizes_match_rust_types() {
        fn check<S: Scalar>() {
            assert_eq!(S::TYPE.size_of(), Some(std::mem::size_of::<S>()));
        }
        check::<f32>();
        check::<u8>();
        check::<i8>();
        check::<u16>();
        check::<i16>();
        check::<i32>();
        check::<i64>();
        check::<bool>();
        check::<crate::scalar::f16>();
        check::<f64>();
        check::<u32>();
        check::<u64>();
        check::<crate::scalar::Complex<f32>>();
        check::<crate::scalar::Complex<f64>>();
        check::<crate::scalar::bf16>();
        check::<crate::scalar::Float8_e4m3fn>();
        check::<crate::scalar::Float8_e5m2fnuz>();
        assert_eq!(ElementType::String.size_of(), None);
        assert!(ElementType::String.is_string());
        assert!(!ElementType::Int64.is_string());
    }
}
