use crate::core::{dtype::Element, errors::AllocationError};

/// Element count of `sizes`, failing instead of wrapping on overflow.
/// Any zero-sized dimension makes the count 0 regardless of its siblings.
pub(crate) fn checked_numel(sizes: &[usize]) -> Result<usize, AllocationError> {
    if sizes.contains(&0) {
        return Ok(0);
    }

    sizes
        .iter()
        .try_fold(1usize, |numel, &size| numel.checked_mul(size))
        .ok_or_else(|| AllocationError::Overflow(sizes.to_vec()))
}

/// Empty vector with room for `capacity` elements, or `Exhausted`.
pub(crate) fn try_reserve<T: Element>(capacity: usize) -> Result<Vec<T>, AllocationError> {
    let mut data = Vec::new();
    data.try_reserve_exact(capacity)
        .map_err(|_| AllocationError::Exhausted {
            capacity,
            dtype: T::DTYPE,
        })?;

    Ok(data)
}

#[cfg(test)]
mod utils_tests {
    use super::*;

    #[test]
    fn zero_dimension_wins() {
        assert_eq!(checked_numel(&[0, usize::MAX, 2]).unwrap(), 0);
        assert_eq!(checked_numel(&[usize::MAX, 2, 0]).unwrap(), 0);
        assert_eq!(checked_numel(&[]).unwrap(), 1);
    }

    #[test]
    fn overflow() {
        assert!(matches!(
            checked_numel(&[usize::MAX, 2]),
            Err(AllocationError::Overflow(_))
        ));
        assert!(matches!(
            try_reserve::<f32>(usize::MAX),
            Err(AllocationError::Exhausted { .. })
        ));
    }
}
