//! # Logical Types
//!
//! Partition columns in a Hudi table are declared with Hive type names
//! (`string`, `int`, `decimal(10,2)`, ...). The engine works with logical types
//! instead, which are looked up by [`TypeSignature`] through a [`TypeManager`].
//!
//! ## Type Tags
//!
//! Every [`Type`] maps onto a small closed set of [`TypeTag`]s. The tag is what
//! the partition value decoders are keyed by: all integer widths share one decoder,
//! `varchar` and `char` share another, and so on. Width-specific behaviour (range
//! checks, character trimming) is handled inside the decoder using the full type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HudiError, Result};

/// Largest precision a decimal type may declare.
pub const MAX_DECIMAL_PRECISION: u8 = 38;

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    /// 32-bit IEEE float.
    Real,
    /// 64-bit IEEE float.
    Double,
    Decimal { precision: u8, scale: u8 },
    /// Variable-length string; `None` means unbounded.
    Varchar(Option<u32>),
    /// Fixed-length, space-padded string.
    Char(u32),
    /// Days since 1970-01-01.
    Date,
    /// Milliseconds since the Unix epoch, UTC.
    Timestamp,
}

/// Decoder family for a logical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean,
    Integer,
    Floating,
    Decimal,
    String,
    Date,
    Timestamp,
}

impl Type {
    pub fn tag(&self) -> TypeTag {
        match self {
            Type::Boolean => TypeTag::Boolean,
            Type::TinyInt | Type::SmallInt | Type::Integer | Type::BigInt => TypeTag::Integer,
            Type::Real | Type::Double => TypeTag::Floating,
            Type::Decimal { .. } => TypeTag::Decimal,
            Type::Varchar(_) | Type::Char(_) => TypeTag::String,
            Type::Date => TypeTag::Date,
            Type::Timestamp => TypeTag::Timestamp,
        }
    }

    /// Inclusive value range of an integer type, `None` for every other type.
    pub fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            Type::TinyInt => Some((i8::MIN as i64, i8::MAX as i64)),
            Type::SmallInt => Some((i16::MIN as i64, i16::MAX as i64)),
            Type::Integer => Some((i32::MIN as i64, i32::MAX as i64)),
            Type::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    pub fn signature(&self) -> TypeSignature {
        match self {
            Type::Boolean => TypeSignature::new("boolean"),
            Type::TinyInt => TypeSignature::new("tinyint"),
            Type::SmallInt => TypeSignature::new("smallint"),
            Type::Integer => TypeSignature::new("integer"),
            Type::BigInt => TypeSignature::new("bigint"),
            Type::Real => TypeSignature::new("real"),
            Type::Double => TypeSignature::new("double"),
            Type::Decimal { precision, scale } => TypeSignature::with_parameters(
                "decimal",
                vec![*precision as u32, *scale as u32],
            ),
            Type::Varchar(None) => TypeSignature::new("varchar"),
            Type::Varchar(Some(len)) => TypeSignature::with_parameters("varchar", vec![*len]),
            Type::Char(len) => TypeSignature::with_parameters("char", vec![*len]),
            Type::Date => TypeSignature::new("date"),
            Type::Timestamp => TypeSignature::new("timestamp"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signature())
    }
}

/// Name of a type plus its numeric parameters, e.g. `decimal(10,2)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSignature {
    pub base: String,
    pub parameters: Vec<u32>,
}

impl TypeSignature {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(base: impl Into<String>, parameters: Vec<u32>) -> Self {
        Self {
            base: base.into(),
            parameters,
        }
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if !self.parameters.is_empty() {
            let params: Vec<String> = self.parameters.iter().map(|p| p.to_string()).collect();
            write!(f, "({})", params.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for TypeSignature {
    type Err = HudiError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(open) = s.find('(') else {
            if s.is_empty() || s.contains(')') {
                return Err(HudiError::UnknownType(s.to_string()));
            }
            return Ok(TypeSignature::new(s.to_ascii_lowercase()));
        };
        let inner = s[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| HudiError::UnknownType(s.to_string()))?;
        let parameters = inner
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| HudiError::UnknownType(s.to_string()))?;
        Ok(TypeSignature::with_parameters(
            s[..open].trim().to_ascii_lowercase(),
            parameters,
        ))
    }
}

/// Type-lookup service: resolves a signature to a logical type.
pub trait TypeManager: Send + Sync {
    fn get_type(&self, signature: &TypeSignature) -> Option<Type>;

    /// Like [`TypeManager::get_type`], failing for unknown signatures.
    fn resolve(&self, signature: &TypeSignature) -> Result<Type> {
        self.get_type(signature)
            .ok_or_else(|| HudiError::UnknownType(signature.to_string()))
    }
}

/// The built-in primitive types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeManager;

impl TypeManager for BuiltinTypeManager {
    fn get_type(&self, signature: &TypeSignature) -> Option<Type> {
        let params = signature.parameters.as_slice();
        let ty = match (signature.base.as_str(), params) {
            ("boolean", []) => Type::Boolean,
            ("tinyint", []) => Type::TinyInt,
            ("smallint", []) => Type::SmallInt,
            ("integer", []) => Type::Integer,
            ("bigint", []) => Type::BigInt,
            ("real", []) => Type::Real,
            ("double", []) => Type::Double,
            ("decimal", [precision, scale]) => {
                if *precision == 0
                    || *precision > MAX_DECIMAL_PRECISION as u32
                    || scale > precision
                {
                    return None;
                }
                Type::Decimal {
                    precision: *precision as u8,
                    scale: *scale as u8,
                }
            }
            ("varchar", []) => Type::Varchar(None),
            ("varchar", [len]) => Type::Varchar(Some(*len)),
            ("char", [len]) => Type::Char(*len),
            ("date", []) => Type::Date,
            ("timestamp", []) => Type::Timestamp,
            _ => return None,
        };
        Some(ty)
    }
}
