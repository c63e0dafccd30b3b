use anyhow::Result;
use std::ops::{Add, Mul, Sub};

use crate::core::{
    dtype::{with_dtype, Element},
    iters::Strider,
    shape,
    tensor::Tensor,
};

/// Elementwise operators. Integer kinds wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

/// Right-hand side of an elementwise operation.
#[derive(Clone, Copy)]
pub enum Operand<'a> {
    Tensor(&'a Tensor),
    Scalar(f64),
}

impl<'a> From<&'a Tensor> for Operand<'a> {
    fn from(tensor: &'a Tensor) -> Operand<'a> {
        Operand::Tensor(tensor)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

/// Binds `$f` to the element function of `$op` for `$T` and evaluates `$body`.
macro_rules! with_op {
    ($op:expr, $T:ident, $f:ident => $body:expr) => {
        match $op {
            BinaryOp::Add => {
                let $f = <$T as Element>::add_elem;
                $body
            }
            BinaryOp::Sub => {
                let $f = <$T as Element>::sub_elem;
                $body
            }
            BinaryOp::Mul => {
                let $f = <$T as Element>::mul_elem;
                $body
            }
        }
    };
}

impl Tensor {
    // --- Out of place ---

    /// Applies `op` across `self` and `rhs`, broadcasting when their shapes
    /// differ, into a freshly allocated tensor.
    pub fn binary_op(&self, rhs: &Tensor, op: BinaryOp) -> Result<Tensor> {
        self.valid_dtype(rhs)?;

        with_dtype!(self.dtype, T => with_op!(op, T, f => self.zip::<T>(rhs, f)))
    }

    /// Applies `op(element, value)` with `value` cast into `self`'s dtype.
    pub fn scalar_op(&self, value: f64, op: BinaryOp) -> Result<Tensor> {
        with_dtype!(self.dtype, T => {
            let value = T::cast(value);
            with_op!(op, T, f => self.unary_map::<T>(|elem| f(elem, value)))
        })
    }

    pub(crate) fn unary_map<T: Element>(&self, f: impl Fn(T) -> T) -> Result<Tensor> {
        let mut data = self.gather::<T>()?;
        data.iter_mut().for_each(|elem| *elem = f(*elem));

        Tensor::init(data, self.sizes())
    }

    fn zip<T: Element>(&self, rhs: &Tensor, f: impl Fn(T, T) -> T) -> Result<Tensor> {
        let sizes = if self.sizes() == rhs.sizes() {
            self.sizes().to_vec()
        } else {
            let sizes = shape::broadcast_shapes(self.sizes(), rhs.sizes())?;
            tracing::trace!(lhs = ?self.sizes(), rhs = ?rhs.sizes(), out = ?sizes, "broadcast");
            sizes
        };

        let (lhs, rhs) = (self.expand(&sizes)?, rhs.expand(&sizes)?);
        let mut data = lhs.gather::<T>()?;

        rhs.buffer.with_slice::<T, _>(|rhs_data| {
            for (elem, offset) in data.iter_mut().zip(Strider::new(&rhs.shape)) {
                *elem = f(*elem, rhs_data[offset]);
            }
        })?;

        Tensor::init(data, &sizes)
    }

    // --- In place ---

    /// Writes `op(self, rhs)` back through `self`'s view. `rhs` may broadcast
    /// into `self`'s shape but never grow it.
    pub fn binary_op_in_place(&mut self, rhs: &Tensor, op: BinaryOp) -> Result<()> {
        self.valid_dtype(rhs)?;
        self.valid_write_target()?;
        let rhs = rhs.broadcast_to(self.sizes())?;

        with_dtype!(self.dtype, T => with_op!(op, T, f => self.zip_in_place::<T>(&rhs, f)))
    }

    pub fn scalar_op_in_place(&mut self, value: f64, op: BinaryOp) -> Result<()> {
        self.valid_write_target()?;

        with_dtype!(self.dtype, T => {
            let value = T::cast(value);
            with_op!(op, T, f => self.map_in_place::<T>(|elem| f(elem, value)))
        })
    }

    /// Copies `src`, broadcast to `self`'s shape, into `self`'s elements.
    pub fn assign(&mut self, src: &Tensor) -> Result<()> {
        self.valid_dtype(src)?;
        self.valid_write_target()?;
        let src = src.broadcast_to(self.sizes())?;

        with_dtype!(self.dtype, T => self.zip_in_place::<T>(&src, |_, new| new))
    }

    fn map_in_place<T: Element>(&self, f: impl Fn(T) -> T) -> Result<()> {
        self.buffer.with_slice_mut::<T, _>(|data| {
            for offset in Strider::new(&self.shape) {
                data[offset] = f(data[offset]);
            }
        })?;

        Ok(())
    }

    fn zip_in_place<T: Element>(&self, rhs: &Tensor, f: impl Fn(T, T) -> T) -> Result<()> {
        // `rhs` may alias `self`, so read it fully before taking the write lock.
        let rhs_data = rhs.gather::<T>()?;

        self.buffer.with_slice_mut::<T, _>(|data| {
            for (offset, rhs_elem) in Strider::new(&self.shape).zip(rhs_data) {
                data[offset] = f(data[offset], rhs_elem);
            }
        })?;

        Ok(())
    }

    fn operand_in_place(&mut self, rhs: Operand<'_>, op: BinaryOp) -> Result<()> {
        match rhs {
            Operand::Tensor(tensor) => self.binary_op_in_place(tensor, op),
            Operand::Scalar(value) => self.scalar_op_in_place(value, op),
        }
    }

    pub fn add_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<()> {
        self.operand_in_place(rhs.into(), BinaryOp::Add)
    }

    pub fn sub_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<()> {
        self.operand_in_place(rhs.into(), BinaryOp::Sub)
    }

    pub fn mul_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> Result<()> {
        self.operand_in_place(rhs.into(), BinaryOp::Mul)
    }
}

// --- Standard binary operations ---

macro_rules! binary_ops {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait for Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: Tensor) -> Self::Output {
                self.binary_op(&rhs, $op)
            }
        }

        impl $trait for &Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: &Tensor) -> Self::Output {
                self.binary_op(rhs, $op)
            }
        }

        impl $trait<Tensor> for &Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: Tensor) -> Self::Output {
                self.binary_op(&rhs, $op)
            }
        }

        impl $trait<&Tensor> for Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: &Tensor) -> Self::Output {
                self.binary_op(rhs, $op)
            }
        }

        impl $trait<f64> for Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: f64) -> Self::Output {
                self.scalar_op(rhs, $op)
            }
        }

        impl $trait<f64> for &Tensor {
            type Output = Result<Tensor>;
            fn $method(self, rhs: f64) -> Self::Output {
                self.scalar_op(rhs, $op)
            }
        }
    };
}

binary_ops!(Add, add, BinaryOp::Add);
binary_ops!(Sub, sub, BinaryOp::Sub);
binary_ops!(Mul, mul, BinaryOp::Mul);
