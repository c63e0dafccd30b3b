use crate::core::dtype::DType;
use thiserror::Error;

// --- DType ---

#[derive(Error, Debug)]
#[error("Data types must match, got {lhs} and {rhs}.")]
pub struct DTypeMismatchError {
    pub lhs: DType,
    pub rhs: DType,
}

#[derive(Error, Debug)]
#[error("Unsupported data type `{0}`. Expected one of uint8, int32, float32.")]
pub struct UnsupportedKindError(pub String);

// --- Shape ---

#[derive(Error, Debug)]
pub enum ShapeMismatchError {
    #[error("Number of elements ({numel}) does not match shape {sizes:?}.")]
    Numel { sizes: Vec<usize>, numel: usize },

    #[error("Cannot be matrix multiplied. [.. x m x n1] @ [.. x n2 x l], n1 ({n1}) != n2 ({n2}).")]
    Matmul { n1: usize, n2: usize },

    #[error("Batch dimensions {lhs:?} and {rhs:?} of matrix multiplication operands differ.")]
    Batch { lhs: Vec<usize>, rhs: Vec<usize> },
}

#[derive(Error, Debug)]
pub enum ReshapeError {
    #[error("Tensor of shape {sizes:?} is not contiguous and cannot be viewed without a copy.")]
    NonContiguous { sizes: Vec<usize> },

    #[error("Tensor of shape {current_shape:?} cannot be viewed as {new_shape:?}.")]
    Numel {
        current_shape: Vec<usize>,
        new_shape: Vec<usize>,
    },
}

#[derive(Error, Debug)]
#[error("Shapes {lhs_sizes:?} and {rhs_sizes:?} cannot be broadcast together.")]
pub struct BroadcastError {
    pub lhs_sizes: Vec<usize>,
    pub rhs_sizes: Vec<usize>,
}

#[derive(Error, Debug)]
#[error("View of shape {sizes:?} at offset {offset} reaches element {extent}, past buffer capacity {capacity}.")]
pub struct ViewBoundsError {
    pub sizes: Vec<usize>,
    pub offset: usize,
    pub extent: usize,
    pub capacity: usize,
}

#[derive(Error, Debug)]
#[error("Cannot write in place through shape {sizes:?} with strides {strides:?}, several positions share one element.")]
pub struct OverlapError {
    pub sizes: Vec<usize>,
    pub strides: Vec<usize>,
}

// --- Index, Dims ---

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index {index} is out of range for dimension {dimension}, of size {size}.")]
    OutOfRange {
        index: usize,
        dimension: usize,
        size: usize,
    },

    #[error("Cannot index into a 0d tensor.")]
    Scalar,

    #[error("Number of indices ({num_indices}) does not match the number of dimensions {num_dimensions}.")]
    Rank {
        num_indices: usize,
        num_dimensions: usize,
    },
}

#[derive(Error, Debug)]
pub enum DimensionError {
    #[error("Dimension {dimension} is out of range for a tensor of rank {rank}.")]
    OutOfRange { dimension: usize, rank: usize },

    #[error("Dimension {dimension} has size {size}, only size 1 can be squeezed.")]
    NotSingleton { dimension: usize, size: usize },
}

// --- Matmul ---

#[derive(Error, Debug)]
#[error("Matrix multiplication needs at least 2 dimensions, got ranks {lhs} and {rhs}.")]
pub struct RankError {
    pub lhs: usize,
    pub rhs: usize,
}

// --- Allocation ---

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("Element count of shape {0:?} overflows `usize`.")]
    Overflow(Vec<usize>),

    #[error("Could not allocate {capacity} elements of {dtype}.")]
    Exhausted { capacity: usize, dtype: DType },
}
