pub mod buffer;
pub mod display;
pub mod dtype;
pub mod errors;
mod iters;
pub mod ops;
pub mod shape;
pub mod tensor;
mod utils;
