use crate::tensor::{ElementType, Scalar};
use crate::value::Value;

struct Elements<'v, 'a>(&'v Value<'a>);

impl std::fmt::Debug for Elements<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        fn add_elements<S: Scalar>(value: &Value, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            if let Ok(values) = value.sparse_values::<S>() {
                let indices = value.sparse_indices().map_err(|_| std::fmt::Error)?;
                return f
                    .debug_struct("Coo")
                    .field("values", &values)
                    .field("indices", &indices)
                    .finish();
            }
            cfg_if::cfg_if! { if #[cfg(feature = "ndarray")] {
                let array = value.as_array::<S>().map_err(|_| std::fmt::Error)?;
                std::fmt::Debug::fmt(&array, f)
            } else {
                let data = value.tensor_data::<S>().map_err(|_| std::fmt::Error)?;
                std::fmt::Debug::fmt(data, f)
            } }
        }

        let Ok(info) = self.0.tensor_type_and_shape() else {
            return Err(std::fmt::Error);
        };
        match info.element_type() {
            ElementType::String => {
                let table = self.0.string_table().map_err(|_| std::fmt::Error)?;
                f.debug_list().entries(table.iter()).finish()
            }
            ElementType::Float => add_elements::<f32>(self.0, f),
            ElementType::Uint8 => add_elements::<u8>(self.0, f),
            ElementType::Int8 => add_elements::<i8>(self.0, f),
            ElementType::Uint16 => add_elements::<u16>(self.0, f),
            ElementType::Int16 => add_elements::<i16>(self.0, f),
            ElementType::Int32 => add_elements::<i32>(self.0, f),
            ElementType::Int64 => add_elements::<i64>(self.0, f),
            ElementType::Bool => add_elements::<bool>(self.0, f),
            ElementType::Float16 => add_elements::<crate::scalar::f16>(self.0, f),
            ElementType::Double => add_elements::<f64>(self.0, f),
            ElementType::Uint32 => add_elements::<u32>(self.0, f),
            ElementType::Uint64 => add_elements::<u64>(self.0, f),
            ElementType::Complex64 => add_elements::<crate::scalar::Complex<f32>>(self.0, f),
            ElementType::Complex128 => add_elements::<crate::scalar::Complex<f64>>(self.0, f),
            ElementType::BFloat16 => add_elements::<crate::scalar::bf16>(self.0, f),
            ElementType::Float8_e4m3fn => {
                add_elements::<crate::scalar::Float8_e4m3fn>(self.0, f)
            }
            ElementType::Float8_e4m3fnuz => {
                add_elements::<crate::scalar::Float8_e4m3fnuz>(self.0, f)
            }
            ElementType::Float8_e5m2 => add_elements::<crate::scalar::Float8_e5m2>(self.0, f),
            ElementType::Float8_e5m2fnuz => {
                add_elements::<crate::scalar::Float8_e5m2fnuz>(self.0, f)
            }
        }
    }
}

impl std::fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (Ok(value_type), Ok(info)) = (self.value_type(), self.tensor_type_and_shape()) else {
            return f.write_str("Value(released)");
        };
        f.debug_struct("Value")
            .field("value_type", &value_type)
            .field("element_type", &info.element_type())
            .field("shape", &info.shape())
            .field("data", &Elements(self))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::memory::CpuAllocator;
    use crate::tests::init_environment;
    use crate::value::Value;

    #[test]
    fn debug_strings() {
        init_environment();
        let allocator = CpuAllocator::default_instance().unwrap();
        let value =
            Value::create_string_tensor_from(allocator, &[1, 1, 3], &["Hello", "Ort", "World"])
                .unwrap();
        let s = format!("{value:?}");
        assert!(s.starts_with("Value { value_type: Tensor, element_type: String"));
        assert!(s.contains("shape: [1, 1, 3]"));
        assert!(s.contains(r#"data: ["Hello", "Ort", "World"]"#));
    }

    #[test]
    fn debug_numeric_and_sparse() {
        init_environment();
        let allocator = CpuAllocator::default_instance().unwrap();
        let value = Value::create_tensor_from_slice(allocator, &[3], &[1_i32, 2, 3]).unwrap();
        let s = format!("{value:?}");
        assert!(s.contains("element_type: Int32"));
        assert!(s.contains("[1, 2, 3]"));

        let sparse =
            Value::create_sparse_tensor_coo(allocator, &[4], &[5_u8, 6], &[0, 3]).unwrap();
        let s = format!("{sparse:?}");
        assert!(s.contains("value_type: SparseTensor"));
        assert!(s.contains("Coo { values: [5, 6], indices: [0, 3] }"));
    }

    #[test]
    fn debug_released() {
        init_environment();
        let allocator = CpuAllocator::default_instance().unwrap();
        let mut value = Value::create_tensor_with_empty_strings(allocator, &[2]).unwrap();
        value.release();
        assert_eq!(format!("{value:?}"), "Value(released)");
    }
}
