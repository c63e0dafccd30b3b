use crate::core::{
    dtype::{with_dtype, DType, Element, Scalar},
    errors::{AllocationError, DTypeMismatchError},
    utils::try_reserve,
};
use std::{
    fmt::{Debug, Formatter},
    sync::{Arc, PoisonError, RwLock},
};

/// Typed element storage. One variant per [`DType`].
pub enum Storage {
    U8(Vec<u8>),
    I32(Vec<i32>),
    F32(Vec<f32>),
}

impl Storage {
    fn len(&self) -> usize {
        match self {
            Storage::U8(data) => data.len(),
            Storage::I32(data) => data.len(),
            Storage::F32(data) => data.len(),
        }
    }
}

/// Reference-counted backing memory shared by a tensor and all of its views.
///
/// A buffer is allocated once, never resized, and dropped when the last
/// `Arc<Buffer>` held by a tensor goes away. Writes through any tensor are
/// visible through every other tensor sharing the buffer.
pub struct Buffer {
    dtype: DType,
    capacity: usize,
    storage: RwLock<Storage>,
}

impl Buffer {
    /// Allocates `capacity` zeroed elements of `dtype`.
    pub fn allocate(dtype: DType, capacity: usize) -> Result<Arc<Buffer>, AllocationError> {
        let storage = with_dtype!(dtype, T => zeroed::<T>(capacity)?);

        tracing::debug!(
            %dtype,
            capacity,
            nbytes = capacity * dtype.size_of(),
            "allocated buffer"
        );

        Ok(Arc::new(Buffer {
            dtype,
            capacity,
            storage: RwLock::new(storage),
        }))
    }

    pub(crate) fn from_vec<T: Element>(data: Vec<T>) -> Arc<Buffer> {
        tracing::trace!(dtype = %T::DTYPE, capacity = data.len(), "wrapped buffer");

        Arc::new(Buffer {
            dtype: T::DTYPE,
            capacity: data.len(),
            storage: RwLock::new(T::into_storage(data)),
        })
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Number of elements, not bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn nbytes(&self) -> usize {
        self.capacity * self.dtype.size_of()
    }

    /// Reads the element at a flat buffer offset.
    pub fn get(&self, offset: usize) -> Option<Scalar> {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);

        with_dtype!(self.dtype, T => T::slice(&storage)?.get(offset).map(|&elem| elem.into_scalar()))
    }

    pub(crate) fn with_slice<T, R>(
        &self,
        f: impl FnOnce(&[T]) -> R,
    ) -> Result<R, DTypeMismatchError>
    where
        T: Element,
    {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        let data = T::slice(&storage).ok_or(DTypeMismatchError {
            lhs: self.dtype,
            rhs: T::DTYPE,
        })?;

        Ok(f(data))
    }

    pub(crate) fn with_slice_mut<T, R>(
        &self,
        f: impl FnOnce(&mut [T]) -> R,
    ) -> Result<R, DTypeMismatchError>
    where
        T: Element,
    {
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        let data = T::slice_mut(&mut storage).ok_or(DTypeMismatchError {
            lhs: self.dtype,
            rhs: T::DTYPE,
        })?;

        Ok(f(data))
    }
}

fn zeroed<T: Element>(capacity: usize) -> Result<Storage, AllocationError> {
    let mut data = try_reserve::<T>(capacity)?;
    data.resize(capacity, T::zero());

    Ok(T::into_storage(data))
}

impl Drop for Buffer {
    fn drop(&mut self) {
        tracing::trace!(dtype = %self.dtype, capacity = self.capacity, "released buffer");
    }
}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let len = self
            .storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();

        f.debug_struct("Buffer")
            .field("dtype", &self.dtype)
            .field("capacity", &self.capacity)
            .field("len", &len)
            .finish()
    }
}
