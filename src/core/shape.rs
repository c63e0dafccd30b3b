use crate::core::{errors::*, utils::checked_numel};
use std::cmp::max;

/// Layout of a tensor over its buffer: per-dimension sizes, per-dimension
/// strides in elements, and the element offset of index `[0, .., 0]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Shape {
    pub sizes: Vec<usize>,
    pub strides: Vec<usize>,
    pub offset: usize,
}

/// Canonical row-major strides, in elements. The last dimension has stride 1.
///
/// Strides saturate at `usize::MAX`, which only happens next to a zero-sized
/// dimension, where no stride is ever followed.
pub fn row_major_strides(sizes: &[usize]) -> Vec<usize> {
    let mut current: usize = 1;
    let mut strides = sizes
        .iter()
        .rev()
        .map(|&size| {
            let stride = current;
            current = current.saturating_mul(size);
            stride
        })
        .collect::<Vec<usize>>();
    strides.reverse();

    strides
}

/// Product of `sizes`, saturating at `usize::MAX`. A 0d shape holds a single
/// element and any zero-sized dimension makes it 0.
pub fn numel(sizes: &[usize]) -> usize {
    checked_numel(sizes).unwrap_or(usize::MAX)
}

pub fn validate_numel(sizes: &[usize], numel: usize) -> Result<(), ShapeMismatchError> {
    if self::numel(sizes) != numel {
        return Err(ShapeMismatchError::Numel {
            sizes: sizes.to_vec(),
            numel,
        });
    }

    Ok(())
}

/// Right-aligns both shapes and pairs dimensions that are equal or 1.
pub fn broadcast_shapes(
    lhs_sizes: &[usize],
    rhs_sizes: &[usize],
) -> Result<Vec<usize>, BroadcastError> {
    let mut lhs_iter = lhs_sizes.iter();
    let mut rhs_iter = rhs_sizes.iter();

    let max_len = max(lhs_sizes.len(), rhs_sizes.len());
    let mut result = Vec::with_capacity(max_len);

    loop {
        match (lhs_iter.next_back(), rhs_iter.next_back()) {
            (Some(&l), Some(&r)) => {
                if l == r || r == 1 {
                    result.push(l);
                } else if l == 1 {
                    result.push(r);
                } else {
                    return Err(BroadcastError {
                        lhs_sizes: lhs_sizes.to_vec(),
                        rhs_sizes: rhs_sizes.to_vec(),
                    });
                }
            }
            (Some(&l), None) => result.push(l),
            (None, Some(&r)) => result.push(r),
            (None, None) => break,
        }
    }

    result.reverse();
    Ok(result)
}

impl Shape {
    pub fn new(sizes: &[usize]) -> Shape {
        Shape {
            sizes: sizes.to_vec(),
            strides: row_major_strides(sizes),
            offset: 0,
        }
    }

    pub(crate) fn rank(&self) -> usize {
        self.sizes.len()
    }

    pub(crate) fn numel(&self) -> usize {
        numel(&self.sizes)
    }

    /// One past the furthest buffer element reachable through this layout.
    pub(crate) fn extent(&self) -> usize {
        if self.numel() == 0 {
            return self.offset;
        }

        self.sizes
            .iter()
            .zip(&self.strides)
            .map(|(&size, &stride)| (size - 1).saturating_mul(stride))
            .fold(self.offset, usize::saturating_add)
            .saturating_add(1)
    }

    // --- Shape operations ---

    pub(crate) fn view(&self, sizes: &[usize]) -> Result<Shape, ReshapeError> {
        if !self.is_contiguous() {
            return Err(ReshapeError::NonContiguous {
                sizes: self.sizes.to_vec(),
            });
        }

        if self.numel() != numel(sizes) {
            return Err(ReshapeError::Numel {
                current_shape: self.sizes.to_vec(),
                new_shape: sizes.to_vec(),
            });
        }

        Ok(Shape {
            sizes: sizes.to_vec(),
            strides: row_major_strides(sizes),
            offset: self.offset,
        })
    }

    /// Stretches size-1 dimensions (and missing leading ones) to `expansions`
    /// with stride 0, so every logical position reads the same element.
    pub(crate) fn expand(&self, expansions: &[usize]) -> Result<Shape, BroadcastError> {
        if self.sizes == expansions {
            return Ok(self.clone());
        }

        let error = || BroadcastError {
            lhs_sizes: self.sizes.to_vec(),
            rhs_sizes: expansions.to_vec(),
        };

        let padding = expansions
            .len()
            .checked_sub(self.rank())
            .ok_or_else(error)?;

        let (sizes, strides) = expansions
            .iter()
            .enumerate()
            .map(|(d, &expansion)| {
                let (size, stride) = match d.checked_sub(padding) {
                    Some(d) => (self.sizes[d], self.strides[d]),
                    None => (1, 0),
                };

                if size == expansion {
                    Ok((size, stride))
                } else if size == 1 {
                    Ok((expansion, 0))
                } else {
                    Err(error())
                }
            })
            .collect::<Result<Vec<(usize, usize)>, BroadcastError>>()?
            .into_iter()
            .unzip();

        Ok(Shape {
            sizes,
            strides,
            offset: self.offset,
        })
    }

    pub(crate) fn squeeze(&self, dimension: Option<usize>) -> Result<Shape, DimensionError> {
        let Some(dimension) = dimension else {
            let (sizes, strides) = self
                .sizes
                .iter()
                .zip(&self.strides)
                .filter_map(|(&size, &stride)| (size != 1).then_some((size, stride)))
                .unzip();

            return Ok(Shape {
                sizes,
                strides,
                offset: self.offset,
            });
        };

        self.valid_dimension(dimension, self.rank())?;

        let size = self.sizes[dimension];
        if size != 1 {
            return Err(DimensionError::NotSingleton { dimension, size });
        }

        let mut shape = self.clone();
        shape.sizes.remove(dimension);
        shape.strides.remove(dimension);

        Ok(shape)
    }

    pub(crate) fn unsqueeze(&self, dimension: usize) -> Result<Shape, DimensionError> {
        self.valid_dimension(dimension, self.rank() + 1)?;

        let stride = match self.sizes.get(dimension) {
            Some(&size) => self.strides[dimension].saturating_mul(size),
            None => 1,
        };

        let mut shape = self.clone();
        shape.sizes.insert(dimension, 1);
        shape.strides.insert(dimension, stride);

        Ok(shape)
    }

    pub(crate) fn transpose(&self, dim_1: usize, dim_2: usize) -> Result<Shape, DimensionError> {
        self.valid_dimension(dim_1, self.rank())?;
        self.valid_dimension(dim_2, self.rank())?;

        let mut shape = self.clone();
        shape.sizes.swap(dim_1, dim_2);
        shape.strides.swap(dim_1, dim_2);

        Ok(shape)
    }

    // --- Index ---

    /// Slice along the first dimension. The result keeps the parent's strides.
    pub(crate) fn index(&self, index: usize) -> Result<Shape, IndexError> {
        let (&size, &stride) = self
            .sizes
            .first()
            .zip(self.strides.first())
            .ok_or(IndexError::Scalar)?;

        if index >= size {
            return Err(IndexError::OutOfRange {
                index,
                dimension: 0,
                size,
            });
        }

        Ok(Shape {
            sizes: self.sizes[1..].to_vec(),
            strides: self.strides[1..].to_vec(),
            offset: self.offset + index * stride,
        })
    }

    /// Buffer offset of a full multi-index.
    pub(crate) fn offset_of(&self, indices: &[usize]) -> Result<usize, IndexError> {
        if indices.len() != self.rank() {
            return Err(IndexError::Rank {
                num_indices: indices.len(),
                num_dimensions: self.rank(),
            });
        }

        indices
            .iter()
            .zip(self.sizes.iter().zip(&self.strides))
            .enumerate()
            .try_fold(self.offset, |offset, (dimension, (&index, (&size, &stride)))| {
                if index >= size {
                    Err(IndexError::OutOfRange {
                        index,
                        dimension,
                        size,
                    })
                } else {
                    Ok(offset + index * stride)
                }
            })
    }

    // --- Validation ---

    /// Row-major contiguous, ignoring the stride of size-1 dimensions.
    pub(crate) fn is_contiguous(&self) -> bool {
        if self.numel() == 0 {
            return true;
        }

        let mut expected = 1;

        for (&size, &stride) in self.sizes.iter().zip(&self.strides).rev() {
            if size == 1 {
                continue;
            }

            if stride != expected {
                return false;
            }

            expected *= size;
        }

        true
    }

    fn valid_dimension(&self, dimension: usize, rank: usize) -> Result<(), DimensionError> {
        if dimension >= rank {
            return Err(DimensionError::OutOfRange { dimension, rank });
        }

        Ok(())
    }
}
