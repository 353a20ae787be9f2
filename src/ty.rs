//! Sorts of values in the symbolic encoding.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Bit width of array indices and lengths.
pub const INDEX_BITS: u32 = 256;

/// Defines the kinds of sorts.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// The Boolean sort.
    Bool,
    /// Unbounded mathematical integers.
    Int,
    /// Unsigned integers of the given bit width.
    UInt(u32),
    /// Arrays indexed by integers with the given element sort.
    Array(Box<SortKind>),
    /// A named tuple sort.
    Tuple(TupleSort),
}

/// A tuple sort. Its name is the identity of the sort within a verification
/// session: two tuple sorts with the same name must have the same components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleSort {
    pub name: String,
    pub components: Vec<SortKind>,
}

impl SortKind {
    /// The sort of array indices, `uint256`.
    pub fn index() -> SortKind {
        SortKind::UInt(INDEX_BITS)
    }

    pub fn array(element: SortKind) -> SortKind {
        SortKind::Array(Box::new(element))
    }

    /// The tuple `(elements, length)` that represents a dynamically sized
    /// array of `element`s, named after the element sort.
    pub fn array_tuple(element: SortKind) -> SortKind {
        let name = format!("t_array_{}", element.mangle());
        SortKind::named_array_tuple(name, element)
    }

    /// Like [`SortKind::array_tuple`], but with an explicit tuple name.
    pub fn named_array_tuple(name: impl Into<String>, element: SortKind) -> SortKind {
        SortKind::Tuple(TupleSort {
            name: name.into(),
            components: vec![SortKind::array(element), SortKind::index()],
        })
    }

    pub fn as_tuple(&self) -> Option<&TupleSort> {
        match self {
            SortKind::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    /// For array sorts, return the element sort.
    pub fn array_element(&self) -> Option<&SortKind> {
        match self {
            SortKind::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, SortKind::Array(_))
    }

    /// Is this an integer sort that is used for indices and arithmetic?
    pub fn is_integer(&self) -> bool {
        matches!(self, SortKind::Int | SortKind::UInt(_))
    }

    /// A name fragment for this sort that only consists of characters valid
    /// in SMT-LIB simple symbols. Different sorts without tuples get
    /// different fragments; tuples are represented by their name.
    pub fn mangle(&self) -> String {
        match self {
            SortKind::Bool => "bool".to_owned(),
            SortKind::Int => "int".to_owned(),
            SortKind::UInt(bits) => format!("uint{}", bits),
            SortKind::Array(element) => format!("array_{}", element.mangle()),
            SortKind::Tuple(tuple) => tuple.name.clone(),
        }
    }
}

impl fmt::Debug for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Int => write!(f, "Int"),
            Self::UInt(bits) => f.debug_tuple("UInt").field(bits).finish(),
            Self::Array(element) => f.debug_tuple("Array").field(element).finish(),
            Self::Tuple(tuple) => f
                .debug_tuple("Tuple")
                .field(&tuple.name)
                .field(&tuple.components)
                .finish(),
        }
    }
}

impl fmt::Display for SortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::UInt(bits) => write!(f, "uint{}", bits),
            Self::Array(element) => write!(f, "{}[]", element),
            Self::Tuple(tuple) => {
                write!(f, "{}(", tuple.name)?;
                if let [front @ .., last] = tuple.components.as_slice() {
                    for part in front.iter() {
                        write!(f, "{}, ", part)?;
                    }
                    write!(f, "{}", last)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortParseError {
    #[error("empty sort")]
    Empty,
    #[error("unknown sort `{0}`")]
    UnknownSort(String),
    #[error("invalid bit width in `{0}`, expected a number between 1 and {max}", max = INDEX_BITS)]
    InvalidWidth(String),
}

/// Parses `bool`, `int`, `uint`, `uint<N>` and arrays thereof written with
/// `[]` suffixes, e.g. `uint8[][]`. Tuple sorts cannot be written down.
impl FromStr for SortKind {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(element) = s.strip_suffix("[]") {
            return Ok(SortKind::array(element.parse()?));
        }
        match s {
            "" => Err(SortParseError::Empty),
            "bool" => Ok(SortKind::Bool),
            "int" => Ok(SortKind::Int),
            "uint" => Ok(SortKind::index()),
            _ => {
                let bits = s
                    .strip_prefix("uint")
                    .ok_or_else(|| SortParseError::UnknownSort(s.to_owned()))?;
                match bits.parse::<u32>() {
                    Ok(bits) if (1..=INDEX_BITS).contains(&bits) => Ok(SortKind::UInt(bits)),
                    _ => Err(SortParseError::InvalidWidth(s.to_owned())),
                }
            }
        }
    }
}
