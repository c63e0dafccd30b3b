/*!
Strided n-dimensional tensors over a small closed set of element types.

Tensors are views (`shape`, `strides`, `offset`) over a reference-counted
[`Buffer`]. Indexing, `view`, `expand`, `squeeze` and friends never copy;
they share the buffer, so in-place writes through a view land in its parent.

```
use tensr::{DType, Tensor};

let parent = Tensor::ones(&[3, 4, 2], DType::F32)?;
let mut child = parent.index(0)?;
child.mul_in_place(2.0)?;

assert_eq!(parent.index(0)?.to_vec::<f32>()?, vec![2.0; 8]);
assert_eq!(parent.index(1)?.to_vec::<f32>()?, vec![1.0; 8]);
# Ok::<(), anyhow::Error>(())
```
*/

mod core;

pub use crate::core::{
    buffer::Buffer,
    display::PrintOptions,
    dtype::{DType, Element, Scalar},
    errors,
    ops::{matmul, BinaryOp, Operand},
    shape::{broadcast_shapes, numel, row_major_strides, validate_numel},
    tensor::Tensor,
};
