use std::fmt::{Debug, Display, Formatter, Result};

use crate::core::tensor::Tensor;

/// Rendering options for [`Tensor::to_string_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Digits after the decimal point for floating point elements.
    pub precision: usize,
    /// Values per line before wrapping the innermost dimension.
    pub values_per_line: usize,
    /// Indentation of continuation lines, usually the width of `Tensor(`.
    pub padding: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            precision: 4,
            values_per_line: 8,
            padding: 7,
        }
    }
}

impl Tensor {
    pub fn to_string_with(&self, options: &PrintOptions) -> String {
        format!(
            "Tensor({},\n{:padding$}numel={}, shape={:?}, ndim={}, strides={:?}, dtype={}, msize={})",
            self.format_data(options, 0, self.offset()),
            "",
            self.numel(),
            self.sizes(),
            self.ndim(),
            self.strides(),
            self.dtype(),
            self.nbytes(),
            padding = options.padding,
        )
    }

    fn format_elem(&self, options: &PrintOptions, offset: usize) -> String {
        let precision = options.precision;

        self.read_flat(offset)
            .map(|elem| format!("{elem:.precision$}"))
            .unwrap_or_default()
    }

    fn format_data(&self, options: &PrintOptions, dimension: usize, offset: usize) -> String {
        if self.ndim() == 0 {
            return self.format_elem(options, offset);
        }

        let (size, stride) = (self.sizes()[dimension], self.strides()[dimension]);
        let indent = " ".repeat(options.padding + dimension + 1);
        let mut out = String::from("[");

        if dimension + 1 == self.ndim() {
            for i in 0..size {
                if i > 0 {
                    out.push(',');
                    if options.values_per_line > 0 && i % options.values_per_line == 0 {
                        out.push('\n');
                        out.push_str(&indent);
                    } else {
                        out.push(' ');
                    }
                }

                out.push_str(&self.format_elem(options, offset + i * stride));
            }
        } else {
            let separator = format!(",{}{indent}", "\n".repeat(self.ndim() - dimension - 1));

            for i in 0..size {
                if i > 0 {
                    out.push_str(&separator);
                }

                out.push_str(&self.format_data(options, dimension + 1, offset + i * stride));
            }
        }

        out.push(']');
        out
    }
}

impl Debug for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_struct("Tensor")
            .field("dtype", &self.dtype())
            .field("dims", &self.ndim())
            .field("elems", &self.numel())
            .field("shape", &self.sizes())
            .field("strides", &self.strides())
            .field("offset", &self.offset())
            .finish()
    }
}

impl Display for Tensor {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.to_string_with(&PrintOptions::default()))
    }
}

#[cfg(test)]
mod display_tests {
    use super::*;
    use crate::DType;

    #[test]
    fn nested_brackets() {
        let tensor = Tensor::fill(&[2, 2], DType::F32, 1.5).unwrap();
        let options = PrintOptions {
            padding: 0,
            ..PrintOptions::default()
        };

        let text = tensor.to_string_with(&options);
        assert!(text.starts_with("Tensor([[1.5000, 1.5000],\n [1.5000, 1.5000]],"));
        assert!(text.ends_with(
            "numel=4, shape=[2, 2], ndim=2, strides=[2, 1], dtype=float32, msize=16)"
        ));
    }

    #[test]
    fn wraps_long_rows() {
        let tensor = Tensor::from_vec((0..10).collect::<Vec<i32>>(), &[10]).unwrap();
        let text = tensor.to_string();

        assert!(text.starts_with("Tensor([0, 1, 2, 3, 4, 5, 6, 7,\n        8, 9],"));
    }

    #[test]
    fn empty() {
        let tensor = Tensor::zeros(&[0, 3], DType::F32).unwrap();
        assert!(tensor.to_string().starts_with("Tensor([],"));
    }

    #[test]
    fn scalar() {
        let tensor = Tensor::scalar(7u8).unwrap();
        assert!(tensor.to_string().starts_with("Tensor(7,"));
    }
}
