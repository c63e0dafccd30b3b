use anyhow::{bail, Result};

use crate::core::{
    dtype::{with_dtype, Element},
    errors::{RankError, ShapeMismatchError},
    shape,
    tensor::Tensor,
    utils::{checked_numel, try_reserve},
};

impl Tensor {
    /// Batched matrix product over the last two dimensions.
    ///
    /// Leading dimensions are batches and must be identical in both operands;
    /// `[.., m, n] @ [.., n, l] -> [.., m, l]`.
    pub fn matmul(&self, rhs: &Tensor) -> Result<Tensor> {
        self.valid_dtype(rhs)?;

        let (lhs_rank, rhs_rank) = (self.ndim(), rhs.ndim());
        if lhs_rank < 2 || rhs_rank < 2 {
            bail!(RankError {
                lhs: lhs_rank,
                rhs: rhs_rank,
            });
        }

        let (lhs_sizes, rhs_sizes) = (self.sizes(), rhs.sizes());
        let (m, n1) = (lhs_sizes[lhs_rank - 2], lhs_sizes[lhs_rank - 1]);
        let (n2, l) = (rhs_sizes[rhs_rank - 2], rhs_sizes[rhs_rank - 1]);
        let (batch_sizes, rhs_batch_sizes) =
            (&lhs_sizes[..lhs_rank - 2], &rhs_sizes[..rhs_rank - 2]);

        if n1 != n2 {
            bail!(ShapeMismatchError::Matmul { n1, n2 });
        }

        if batch_sizes != rhs_batch_sizes {
            bail!(ShapeMismatchError::Batch {
                lhs: batch_sizes.to_vec(),
                rhs: rhs_batch_sizes.to_vec(),
            });
        }

        let sizes = [batch_sizes, &[m, l]].concat();
        let capacity = checked_numel(&sizes)?;
        let batches = shape::numel(batch_sizes);
        tracing::debug!(dtype = %self.dtype, batches, m, n = n1, l, "matmul");

        with_dtype!(self.dtype, T => self.matmul_kernel::<T>(rhs, capacity, (m, n1, l), &sizes))
    }

    // O(batches * m * n * l)

    fn matmul_kernel<T: Element>(
        &self,
        rhs: &Tensor,
        capacity: usize,
        (m, n, l): (usize, usize, usize),
        sizes: &[usize],
    ) -> Result<Tensor> {
        let mut data = try_reserve::<T>(capacity)?;
        data.resize(capacity, T::zero());

        if capacity == 0 {
            return Tensor::init(data, sizes);
        }

        let batches = capacity / (m * l);
        let (lhs_data, rhs_data) = (self.gather::<T>()?, rhs.gather::<T>()?);

        for batch in 0..batches {
            let (lhs_start, rhs_start, out_start) = (batch * m * n, batch * n * l, batch * m * l);

            for row in 0..m {
                for k in 0..n {
                    let lhs_elem = lhs_data[lhs_start + row * n + k];
                    let rhs_row = rhs_start + k * l;
                    let out_row = out_start + row * l;

                    for col in 0..l {
                        let product = lhs_elem.mul_elem(rhs_data[rhs_row + col]);
                        data[out_row + col] = data[out_row + col].add_elem(product);
                    }
                }
            }
        }

        Tensor::init(data, sizes)
    }
}

/// Free-function form of [`Tensor::matmul`].
pub fn matmul(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    lhs.matmul(rhs)
}
