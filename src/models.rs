//! Data models for vertex aggregation.
//!
//! Shapes, element types, and the per-target results reported
//! back to the command line.

use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use std::fmt;

/// Extents of an n-dimensional dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// All axes after the leading one.
    pub fn trailing(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }

    /// Total number of elements.
    pub fn element_count(&self) -> usize {
        self.0.iter().product()
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

/// Renders like a tuple: `(5, 3)`, `(5,)`, `()`.
impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => write!(f, "()"),
            [single] => write!(f, "({},)", single),
            dims => {
                let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Element types that can be concatenated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F16,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Signed,
    Unsigned,
    Float,
}

impl ElementType {
    /// Map an HDF5 type descriptor onto a supported element type.
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Option<Self> {
        match descriptor {
            TypeDescriptor::Boolean => Some(ElementType::Bool),
            TypeDescriptor::Integer(size) => Some(match size {
                IntSize::U1 => ElementType::I8,
                IntSize::U2 => ElementType::I16,
                IntSize::U4 => ElementType::I32,
                IntSize::U8 => ElementType::I64,
            }),
            TypeDescriptor::Unsigned(size) => Some(match size {
                IntSize::U1 => ElementType::U8,
                IntSize::U2 => ElementType::U16,
                IntSize::U4 => ElementType::U32,
                IntSize::U8 => ElementType::U64,
            }),
            TypeDescriptor::Float(FloatSize::U2) => Some(ElementType::F16),
            TypeDescriptor::Float(FloatSize::U4) => Some(ElementType::F32),
            TypeDescriptor::Float(FloatSize::U8) => Some(ElementType::F64),
            _ => None,
        }
    }

    fn kind(self) -> Kind {
        match self {
            ElementType::Bool => Kind::Bool,
            ElementType::I8 | ElementType::I16 | ElementType::I32 | ElementType::I64 => {
                Kind::Signed
            }
            ElementType::U8 | ElementType::U16 | ElementType::U32 | ElementType::U64 => {
                Kind::Unsigned
            }
            ElementType::F16 | ElementType::F32 | ElementType::F64 => Kind::Float,
        }
    }

    /// Size of one element in bytes.
    fn size(self) -> usize {
        match self {
            ElementType::Bool | ElementType::I8 | ElementType::U8 => 1,
            ElementType::I16 | ElementType::U16 | ElementType::F16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }

    fn signed(size: usize) -> Self {
        match size {
            1 => ElementType::I8,
            2 => ElementType::I16,
            4 => ElementType::I32,
            _ => ElementType::I64,
        }
    }

    fn float(size: usize) -> Self {
        match size {
            2 => ElementType::F16,
            4 => ElementType::F32,
            _ => ElementType::F64,
        }
    }

    /// Smallest signed type holding both a signed and an unsigned type.
    /// `u64` has no signed partner and falls back to `f64`.
    fn signed_holding(signed: Self, unsigned: Self) -> Self {
        if signed.size() > unsigned.size() {
            signed
        } else if unsigned.size() < 8 {
            Self::signed(unsigned.size() * 2)
        } else {
            ElementType::F64
        }
    }

    /// Smallest float holding `float` and every value of an integer type.
    fn float_holding(float: Self, integer: Self) -> Self {
        let needed = match integer.size() {
            1 => 2,
            2 => 4,
            _ => 8,
        };
        Self::float(float.size().max(needed))
    }

    /// Common type two members are stacked as.
    ///
    /// Follows numpy's promotion table: `bool` yields to anything, mixed
    /// floats take the wider one, integers mixed with floats take a float
    /// wide enough for the integer, and mixed signedness takes a signed
    /// type wide enough for both.
    pub fn promote(self, other: Self) -> Self {
        match (self.kind(), other.kind()) {
            (Kind::Bool, _) => other,
            (_, Kind::Bool) => self,
            (Kind::Float, Kind::Float)
            | (Kind::Signed, Kind::Signed)
            | (Kind::Unsigned, Kind::Unsigned) => {
                if self.size() >= other.size() {
                    self
                } else {
                    other
                }
            }
            (Kind::Float, _) => Self::float_holding(self, other),
            (_, Kind::Float) => Self::float_holding(other, self),
            (Kind::Signed, Kind::Unsigned) => Self::signed_holding(self, other),
            (Kind::Unsigned, Kind::Signed) => Self::signed_holding(other, self),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Bool => "bool",
            ElementType::I8 => "i8",
            ElementType::I16 => "i16",
            ElementType::I32 => "i32",
            ElementType::I64 => "i64",
            ElementType::U8 => "u8",
            ElementType::U16 => "u16",
            ElementType::U32 => "u32",
            ElementType::U64 => "u64",
            ElementType::F16 => "f16",
            ElementType::F32 => "f32",
            ElementType::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

/// What happened to a single target group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    /// Full path of the target group.
    pub group_path: String,
    /// Name of the derived dataset inside the group.
    pub dataset_name: String,
    /// Shape of the derived dataset.
    pub shape: Shape,
    /// Whether an earlier derived dataset was replaced.
    pub replaced: bool,
    /// Whether the dataset was actually written (false on dry runs).
    pub written: bool,
}

impl TargetOutcome {
    /// Console line reported for this target.
    pub fn report_line(&self) -> String {
        if self.written {
            format!(
                "New dataset '{}' created with shape: {}",
                self.dataset_name, self.shape
            )
        } else {
            format!(
                "Dataset '{}' would be created in '{}' with shape: {}",
                self.dataset_name, self.group_path, self.shape
            )
        }
    }
}

/// Summary of a complete run over one file.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Full path of the source group, if one was needed.
    pub source_path: Option<String>,
    /// Source members in concatenation order.
    pub members: Vec<String>,
    /// One entry per processed target group.
    pub targets: Vec<TargetOutcome>,
}

impl RunSummary {
    /// Number of derived datasets that replaced an earlier one.
    pub fn replaced_count(&self) -> usize {
        self.targets.iter().filter(|t| t.replaced).count()
    }
}
