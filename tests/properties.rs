use proptest::prelude::*;

use ortvalue::environment::Environment;
use ortvalue::memory::CpuAllocator;
use ortvalue::tensor::element_count;
use ortvalue::value::Value;
use ortvalue::Error;

fn allocator() -> &'static CpuAllocator {
    Environment::init();
    CpuAllocator::default_instance().unwrap()
}

proptest! {
    #[test]
    fn element_count_is_product_of_shape(shape in prop::collection::vec(0_i64..6, 0..5)) {
        let value = Value::create_tensor_with_empty_strings(allocator(), &shape).unwrap();
        let info = value.tensor_type_and_shape().unwrap();
        prop_assert_eq!(info.element_count() as i64, shape.iter().product::<i64>());
        prop_assert_eq!(info.dimensions_count(), shape.len());
        prop_assert_eq!(info.shape(), &shape[..]);
        prop_assert_eq!(element_count(&shape).unwrap(), info.element_count());
    }

    #[test]
    fn new_string_tensor_is_all_empty(shape in prop::collection::vec(0_i64..5, 0..4)) {
        let value = Value::create_tensor_with_empty_strings(allocator(), &shape).unwrap();
        let n = value.tensor_type_and_shape().unwrap().element_count();
        for i in 0..n {
            prop_assert_eq!(value.string_element(i).unwrap(), "");
        }
        prop_assert_eq!(
            value.string_element(n),
            Err(Error::IndexOutOfRange { index: n, len: n })
        );
    }

    #[test]
    fn writes_are_isolated(
        writes in prop::collection::vec((0_usize..8, ".{0,24}"), 0..64),
    ) {
        let mut value = Value::create_tensor_with_empty_strings(allocator(), &[2, 4]).unwrap();
        let mut expected = vec![String::new(); 8];
        for (index, text) in &writes {
            value.string_tensor_set_element_at(text, *index).unwrap();
            expected[*index] = text.clone();
        }
        prop_assert_eq!(value.string_tensor_as_vec().unwrap(), expected.clone());
        for (i, s) in expected.iter().enumerate() {
            prop_assert_eq!(value.string_element_as_bytes(i).unwrap(), s.as_bytes());
        }
    }

    #[test]
    fn negative_dimension_is_rejected(
        mut shape in prop::collection::vec(0_i64..4, 1..4),
        at in any::<prop::sample::Index>(),
        negative in i64::MIN..0,
    ) {
        let i = at.index(shape.len());
        shape[i] = negative;
        let is_invalid_shape = matches!(
            Value::create_tensor_with_empty_strings(allocator(), &shape),
            Err(Error::InvalidShape { .. })
        );
        prop_assert!(is_invalid_shape);
    }

    #[test]
    fn numeric_data_round_trips(data in prop::collection::vec(any::<i32>(), 0..32)) {
        let value = Value::create_tensor_from_slice(allocator(), &[data.len() as i64], &data).unwrap();
        prop_assert_eq!(value.tensor_data::<i32>().unwrap(), &data[..]);
    }
}
