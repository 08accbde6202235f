//! Typed command parameters.
//!
//! Every leaf command declares an ordered list of [`ParamKind`]s. When a line
//! names the command, the remaining tokens are converted with [`parse_args`];
//! a conversion failure makes the command report "not matched" so dispatch
//! keeps looking.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The type of a single command parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Bool,
    Str,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::UChar => "unsigned char",
            Self::Short => "short",
            Self::UShort => "unsigned short",
            Self::Int => "int",
            Self::UInt => "unsigned int",
            Self::Long => "long",
            Self::ULong => "unsigned long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
            Self::Str => "string",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "char" => Some(Self::Char),
            "unsigned char" => Some(Self::UChar),
            "short" => Some(Self::Short),
            "unsigned short" => Some(Self::UShort),
            "int" => Some(Self::Int),
            "unsigned int" => Some(Self::UInt),
            "long" => Some(Self::Long),
            "unsigned long" => Some(Self::ULong),
            "float" => Some(Self::Float),
            "double" => Some(Self::Double),
            "bool" => Some(Self::Bool),
            "string" => Some(Self::Str),
            _ => None,
        }
    }

    /// Label shown in help output, e.g. `<int>`.
    pub fn label(&self) -> String {
        format!("<{}>", self.as_str())
    }

    /// Convert one token, or `None` if it is not a valid value of this kind.
    pub fn parse(&self, token: &str) -> Option<Value> {
        match self {
            Self::Char => single_char(token).map(Value::Char),
            Self::UChar => single_char(token)
                .and_then(|c| u8::try_from(u32::from(c)).ok())
                .map(Value::UChar),
            Self::Short => token.parse().ok().map(Value::Short),
            Self::UShort => token.parse().ok().map(Value::UShort),
            Self::Int => token.parse().ok().map(Value::Int),
            Self::UInt => token.parse().ok().map(Value::UInt),
            Self::Long => token.parse().ok().map(Value::Long),
            Self::ULong => token.parse().ok().map(Value::ULong),
            Self::Float => token.parse().ok().map(Value::Float),
            Self::Double => token.parse().ok().map(Value::Double),
            Self::Bool => match token {
                "1" | "true" => Some(Value::Bool(true)),
                "0" | "false" => Some(Value::Bool(false)),
                _ => None,
            },
            Self::Str => Some(Value::Str(token.to_string())),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn single_char(token: &str) -> Option<char> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// A converted argument handed to a command action.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Char(char),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    /// Signed integer view of any integer variant that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Short(v) => Some(v.into()),
            Self::UShort(v) => Some(v.into()),
            Self::Int(v) => Some(v.into()),
            Self::UInt(v) => Some(v.into()),
            Self::Long(v) => Some(v),
            Self::ULong(v) => i64::try_from(v).ok(),
            Self::UChar(v) => Some(v.into()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::UShort(v) => Some(v.into()),
            Self::UInt(v) => Some(v.into()),
            Self::ULong(v) => Some(v),
            Self::UChar(v) => Some(v.into()),
            Self::Short(v) => u64::try_from(v).ok(),
            Self::Int(v) => u64::try_from(v).ok(),
            Self::Long(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v.into()),
            Self::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match *self {
            Self::Char(c) => Some(c),
            Self::UChar(b) => Some(char::from(b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::UChar(b) => write!(f, "{}", char::from(*b)),
            Self::Short(v) => write!(f, "{}", v),
            Self::UShort(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::ULong(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Why a token sequence did not fit a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} arguments, got {got}")]
    Arity { expected: usize, got: usize },

    #[error("argument {index} ({token:?}) is not a valid {kind}")]
    Invalid {
        index: usize,
        token: String,
        kind: ParamKind,
    },
}

/// Convert `tokens` against the ordered schema `kinds`.
pub fn parse_args(kinds: &[ParamKind], tokens: &[&str]) -> Result<Vec<Value>, ParseError> {
    if kinds.len() != tokens.len() {
        return Err(ParseError::Arity {
            expected: kinds.len(),
            got: tokens.len(),
        });
    }

    kinds
        .iter()
        .zip(tokens)
        .enumerate()
        .map(|(index, (kind, token))| {
            kind.parse(token).ok_or_else(|| ParseError::Invalid {
                index,
                token: token.to_string(),
                kind: *kind,
            })
        })
        .collect()
}
