use anyhow::{bail, Result};
use std::sync::Arc;

use crate::core::{
    buffer::Buffer,
    dtype::{with_dtype, DType, Element, Scalar},
    errors::*,
    iters::Strider,
    shape::{self, Shape},
    utils::{checked_numel, try_reserve},
};

/// A typed, strided view over a shared [`Buffer`].
///
/// Cloning a tensor, like every view operation, shares the buffer; writes made
/// through one are visible through the others.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) buffer: Arc<Buffer>,
    pub(crate) dtype: DType,
    pub(crate) shape: Shape,
}

impl Tensor {
    // --- Init ---

    pub(crate) fn init<T: Element>(data: Vec<T>, sizes: &[usize]) -> Result<Tensor> {
        shape::validate_numel(sizes, data.len())?;

        Ok(Tensor {
            buffer: Buffer::from_vec(data),
            dtype: T::DTYPE,
            shape: Shape::new(sizes),
        })
    }

    /// Allocates a contiguous tensor. Elements start zeroed.
    pub fn empty(sizes: &[usize], dtype: DType) -> Result<Tensor> {
        let capacity = checked_numel(sizes)?;

        Ok(Tensor {
            buffer: Buffer::allocate(dtype, capacity)?,
            dtype,
            shape: Shape::new(sizes),
        })
    }

    /// Allocates a tensor with every element set to `value` cast into `dtype`.
    pub fn fill(sizes: &[usize], dtype: DType, value: f64) -> Result<Tensor> {
        let tensor = Tensor::empty(sizes, dtype)?;

        with_dtype!(dtype, T => {
            let value = T::cast(value);
            tensor.buffer.with_slice_mut::<T, _>(|data| data.fill(value))?;
        });

        Ok(tensor)
    }

    /// `float32` tensor filled with `value`.
    pub fn full(sizes: &[usize], value: f64) -> Result<Tensor> {
        Tensor::fill(sizes, DType::F32, value)
    }

    pub fn ones(sizes: &[usize], dtype: DType) -> Result<Tensor> {
        Tensor::fill(sizes, dtype, 1.0)
    }

    pub fn zeros(sizes: &[usize], dtype: DType) -> Result<Tensor> {
        Tensor::empty(sizes, dtype)
    }

    pub fn new<T: Element>(data: &[T], sizes: &[usize]) -> Result<Tensor> {
        Tensor::init(data.to_vec(), sizes)
    }

    pub fn from_vec<T: Element>(data: Vec<T>, sizes: &[usize]) -> Result<Tensor> {
        Tensor::init(data, sizes)
    }

    pub fn scalar<T: Element>(value: T) -> Result<Tensor> {
        Tensor::init(vec![value], &[])
    }

    // --- Data ---

    /// Elements in logical row-major order.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.gather::<T>()
    }

    pub(crate) fn gather<T: Element>(&self) -> Result<Vec<T>> {
        let mut out = try_reserve::<T>(self.numel())?;
        self.buffer.with_slice::<T, _>(|data| {
            out.extend(Strider::new(&self.shape).map(|offset| data[offset]));
        })?;

        Ok(out)
    }

    /// Copies the viewed elements into a fresh, row-major buffer.
    pub fn contiguous(&self) -> Result<Tensor> {
        with_dtype!(self.dtype, T => Tensor::init(self.gather::<T>()?, self.sizes()))
    }

    /// Element at a flat buffer offset, independent of this view's layout.
    pub fn read_flat(&self, offset: usize) -> Option<Scalar> {
        self.buffer.get(offset)
    }

    pub fn get(&self, indices: &[usize]) -> Result<Scalar> {
        let offset = self.shape.offset_of(indices)?;

        match self.buffer.get(offset) {
            Some(scalar) => Ok(scalar),
            None => bail!(ViewBoundsError {
                sizes: self.sizes().to_vec(),
                offset: self.offset(),
                extent: offset + 1,
                capacity: self.buffer.capacity(),
            }),
        }
    }

    // --- Same Data, Different Shape ---

    pub(crate) fn with_shape(&self, shape: Shape) -> Result<Tensor> {
        checked_numel(&shape.sizes)?;
        let (extent, capacity) = (shape.extent(), self.buffer.capacity());

        if extent > capacity {
            bail!(ViewBoundsError {
                sizes: shape.sizes,
                offset: shape.offset,
                extent,
                capacity,
            });
        }

        Ok(Tensor {
            buffer: Arc::clone(&self.buffer),
            dtype: self.dtype,
            shape,
        })
    }

    /// Slice `index` of the first dimension, sharing this tensor's buffer.
    pub fn index(&self, index: usize) -> Result<Tensor> {
        self.with_shape(self.shape.index(index)?)
    }

    pub fn view(&self, sizes: &[usize]) -> Result<Tensor> {
        self.with_shape(self.shape.view(sizes)?)
    }

    pub fn expand(&self, expansions: &[usize]) -> Result<Tensor> {
        self.with_shape(self.shape.expand(expansions)?)
    }

    /// Like [`Tensor::expand`], but the result shape must be exactly what the
    /// broadcasting rules give for `self` against `sizes`.
    pub fn broadcast_to(&self, sizes: &[usize]) -> Result<Tensor> {
        if shape::broadcast_shapes(self.sizes(), sizes)? != sizes {
            bail!(BroadcastError {
                lhs_sizes: self.sizes().to_vec(),
                rhs_sizes: sizes.to_vec(),
            });
        }

        self.expand(sizes)
    }

    /// Removes `dimension` (which must have size 1), or every size-1
    /// dimension when `None`.
    pub fn squeeze(&self, dimension: Option<usize>) -> Result<Tensor> {
        self.with_shape(self.shape.squeeze(dimension)?)
    }

    pub fn unsqueeze(&self, dimension: usize) -> Result<Tensor> {
        self.with_shape(self.shape.unsqueeze(dimension)?)
    }

    pub fn transpose(&self, dim_1: usize, dim_2: usize) -> Result<Tensor> {
        self.with_shape(self.shape.transpose(dim_1, dim_2)?)
    }

    // --- Attributes ---

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn ndim(&self) -> usize {
        self.shape.rank()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.shape.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.shape.strides
    }

    pub fn offset(&self) -> usize {
        self.shape.offset
    }

    /// Bytes covered by the logical elements of this view.
    pub fn nbytes(&self) -> usize {
        self.numel().saturating_mul(self.dtype.size_of())
    }

    pub fn is_contiguous(&self) -> bool {
        self.shape.is_contiguous()
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn shares_buffer(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    // --- Validation ---

    pub(crate) fn valid_dtype(&self, rhs: &Tensor) -> Result<(), DTypeMismatchError> {
        if self.dtype != rhs.dtype {
            return Err(DTypeMismatchError {
                lhs: self.dtype,
                rhs: rhs.dtype,
            });
        }

        Ok(())
    }

    /// In-place writes need every logical position to own its element.
    pub(crate) fn valid_write_target(&self) -> Result<(), OverlapError> {
        let overlapping = self
            .sizes()
            .iter()
            .zip(self.strides())
            .any(|(&size, &stride)| size > 1 && stride == 0);

        if overlapping {
            return Err(OverlapError {
                sizes: self.sizes().to_vec(),
                strides: self.strides().to_vec(),
            });
        }

        Ok(())
    }
}
