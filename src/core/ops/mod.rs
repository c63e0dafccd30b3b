mod elem_ops;
mod matmul;

pub use elem_ops::{BinaryOp, Operand};
pub use matmul::matmul;
