use crate::core::{buffer::Storage, errors::UnsupportedKindError};
use num_traits::Zero;
use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

/// The closed set of element kinds a tensor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    U8,
    I32,
    F32,
}

impl DType {
    /// Size of a single element in bytes.
    pub fn size_of(self) -> usize {
        match self {
            DType::U8 => std::mem::size_of::<u8>(),
            DType::I32 => std::mem::size_of::<i32>(),
            DType::F32 => std::mem::size_of::<f32>(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DType::U8 => "uint8",
            DType::I32 => "int32",
            DType::F32 => "float32",
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = UnsupportedKindError;

    fn from_str(name: &str) -> Result<DType, UnsupportedKindError> {
        match name {
            "uint8" | "u8" => Ok(DType::U8),
            "int32" | "i32" => Ok(DType::I32),
            "float32" | "f32" => Ok(DType::F32),
            other => Err(UnsupportedKindError(other.to_string())),
        }
    }
}

impl TryFrom<&str> for DType {
    type Error = UnsupportedKindError;

    fn try_from(name: &str) -> Result<DType, UnsupportedKindError> {
        name.parse()
    }
}

/// A single value of one of the supported element kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    U8(u8),
    I32(i32),
    F32(f32),
}

impl Scalar {
    /// Converts a generic `f64` into `dtype`, clamping into `[0, 255]` for `U8`
    /// and truncating toward zero for the integer kinds.
    pub fn cast(value: f64, dtype: DType) -> Scalar {
        match dtype {
            DType::U8 => Scalar::U8(u8::cast(value)),
            DType::I32 => Scalar::I32(i32::cast(value)),
            DType::F32 => Scalar::F32(f32::cast(value)),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Scalar::U8(_) => DType::U8,
            Scalar::I32(_) => DType::I32,
            Scalar::F32(_) => DType::F32,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match *self {
            Scalar::U8(value) => value.into(),
            Scalar::I32(value) => value.into(),
            Scalar::F32(value) => value.into(),
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::U8(value) => write!(f, "{value}"),
            Scalar::I32(value) => write!(f, "{value}"),
            Scalar::F32(value) => match f.precision() {
                Some(precision) => write!(f, "{value:.precision$}"),
                None => write!(f, "{value}"),
            },
        }
    }
}

/// Rust types that back one [`DType`].
///
/// Kernels are written once against `Element` and monomorphized per kind; the
/// tag is matched a single time per operation, never per element.
pub trait Element: Copy + Zero + Into<f64> + PartialEq + Debug + Display + 'static {
    const DTYPE: DType;

    fn cast(value: f64) -> Self;

    fn to_f64(self) -> f64 {
        self.into()
    }

    fn add_elem(self, rhs: Self) -> Self;

    fn sub_elem(self, rhs: Self) -> Self;

    fn mul_elem(self, rhs: Self) -> Self;

    fn into_scalar(self) -> Scalar;

    fn into_storage(data: Vec<Self>) -> Storage;

    fn slice(storage: &Storage) -> Option<&[Self]>;

    fn slice_mut(storage: &mut Storage) -> Option<&mut [Self]>;
}

macro_rules! integer_element {
    ($type:ident, $variant:ident) => {
        impl Element for $type {
            const DTYPE: DType = DType::$variant;

            // `as` from f64 truncates toward zero and saturates at the type bounds.
            fn cast(value: f64) -> $type {
                value as $type
            }

            fn add_elem(self, rhs: $type) -> $type {
                self.wrapping_add(rhs)
            }

            fn sub_elem(self, rhs: $type) -> $type {
                self.wrapping_sub(rhs)
            }

            fn mul_elem(self, rhs: $type) -> $type {
                self.wrapping_mul(rhs)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            fn into_storage(data: Vec<$type>) -> Storage {
                Storage::$variant(data)
            }

            fn slice(storage: &Storage) -> Option<&[$type]> {
                match storage {
                    Storage::$variant(data) => Some(data),
                    _ => None,
                }
            }

            fn slice_mut(storage: &mut Storage) -> Option<&mut [$type]> {
                match storage {
                    Storage::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }
    };
}

integer_element!(u8, U8);
integer_element!(i32, I32);

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    fn cast(value: f64) -> f32 {
        value as f32
    }

    fn add_elem(self, rhs: f32) -> f32 {
        self + rhs
    }

    fn sub_elem(self, rhs: f32) -> f32 {
        self - rhs
    }

    fn mul_elem(self, rhs: f32) -> f32 {
        self * rhs
    }

    fn into_scalar(self) -> Scalar {
        Scalar::F32(self)
    }

    fn into_storage(data: Vec<f32>) -> Storage {
        Storage::F32(data)
    }

    fn slice(storage: &Storage) -> Option<&[f32]> {
        match storage {
            Storage::F32(data) => Some(data),
            _ => None,
        }
    }

    fn slice_mut(storage: &mut Storage) -> Option<&mut [f32]> {
        match storage {
            Storage::F32(data) => Some(data),
            _ => None,
        }
    }
}

/// Binds `$T` to the Rust type behind `$dtype` and evaluates `$body` once.
macro_rules! with_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::core::dtype::DType::U8 => {
                type $T = u8;
                $body
            }
            $crate::core::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::core::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
        }
    };
}

pub(crate) use with_dtype;

#[cfg(test)]
mod dtype_tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(DType::U8.size_of(), 1);
        assert_eq!(DType::I32.size_of(), 4);
        assert_eq!(DType::F32.size_of(), 4);
    }

    #[test]
    fn u8_clamps() {
        assert_eq!(Scalar::cast(300.0, DType::U8), Scalar::U8(255));
        assert_eq!(Scalar::cast(-5.0, DType::U8), Scalar::U8(0));
        assert_eq!(Scalar::cast(7.9, DType::U8), Scalar::U8(7));
    }

    #[test]
    fn i32_truncates_toward_zero() {
        assert_eq!(Scalar::cast(1.5, DType::I32), Scalar::I32(1));
        assert_eq!(Scalar::cast(-1.5, DType::I32), Scalar::I32(-1));
    }

    #[test]
    fn f32_narrows() {
        assert_eq!(Scalar::cast(0.25, DType::F32), Scalar::F32(0.25));
    }

    #[test]
    fn parse_names() {
        assert_eq!("float32".parse::<DType>().unwrap(), DType::F32);
        assert_eq!(DType::try_from("uint8").unwrap(), DType::U8);
        assert!("float64".parse::<DType>().is_err());
        assert_eq!(DType::I32.to_string(), "int32");
    }

    #[test]
    fn integer_overflow_wraps() {
        assert_eq!(250u8.add_elem(10), 4);
        assert_eq!(i32::MAX.mul_elem(2), -2);
    }
}
