//! The declared-type grammar for slice contracts.
//!
//! Closed set of primitives plus `list<T>` and `optional<T>` wrappers,
//! recursively composable to any depth. Parsed by a small recursive-descent
//! parser rather than string pattern matching so nesting is unbounded, and
//! rendered back to exactly one canonical spelling.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A declared type. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Signed integer.
    Int,
    /// Floating point number.
    Float,
    /// True/false.
    Boolean,
    /// Timestamp with date and time-of-day.
    DateTime,
    /// Calendar date.
    Date,
    /// Untyped key/value mapping.
    Dict,
    /// Homogeneous list of a nested type.
    List(Box<FieldType>),
    /// Nullable wrapper around a nested type.
    Optional(Box<FieldType>),
}

/// A type expression the grammar rejected.
#[derive(Debug, Clone, Error)]
#[error("invalid type expression '{expr}': {reason}")]
pub struct TypeError {
    /// The expression as written.
    pub expr: String,
    /// Why it was rejected.
    pub reason: String,
}

impl FieldType {
    /// Parse a type expression. The whole input must be consumed.
    pub fn parse(expr: &str) -> Result<Self, TypeError> {
        let mut parser = TypeParser::new(expr);
        let ty = parser.parse_type()?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("trailing characters after type"));
        }
        Ok(ty)
    }

    /// Depth of `list`/`optional` nesting (a bare primitive has depth 0).
    pub fn nesting_depth(&self) -> usize {
        match self {
            Self::List(inner) | Self::Optional(inner) => 1 + inner.nesting_depth(),
            _ => 0,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::DateTime => write!(f, "datetime"),
            Self::Date => write!(f, "date"),
            Self::Dict => write!(f, "dict"),
            Self::List(inner) => write!(f, "list<{}>", inner),
            Self::Optional(inner) => write!(f, "optional<{}>", inner),
        }
    }
}

// Contracts serialize types as their canonical source spelling, so the
// artifact stays readable and byte-stable.
impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let expr = String::deserialize(deserializer)?;
        Self::parse(&expr).map_err(D::Error::custom)
    }
}

/// Recursive-descent parser over a single type expression.
struct TypeParser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> TypeParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse_type(&mut self) -> Result<FieldType, TypeError> {
        self.skip_whitespace();
        let name = self.read_identifier();
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }

        match name.as_str() {
            "string" => Ok(FieldType::String),
            "int" => Ok(FieldType::Int),
            "float" => Ok(FieldType::Float),
            "boolean" => Ok(FieldType::Boolean),
            "datetime" => Ok(FieldType::DateTime),
            "date" => Ok(FieldType::Date),
            "dict" => Ok(FieldType::Dict),
            "list" => Ok(FieldType::List(Box::new(self.parse_angle_arg("list")?))),
            "optional" => Ok(FieldType::Optional(Box::new(
                self.parse_angle_arg("optional")?,
            ))),
            other => Err(self.error(format!("unknown type name '{}'", other))),
        }
    }

    fn parse_angle_arg(&mut self, head: &str) -> Result<FieldType, TypeError> {
        self.skip_whitespace();
        if !self.consume('<') {
            return Err(self.error(format!("'{}' requires a '<type>' argument", head)));
        }
        let inner = self.parse_type()?;
        self.skip_whitespace();
        if !self.consume('>') {
            return Err(self.error(format!("unterminated '{}<...>'", head)));
        }
        Ok(inner)
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .map(|c| c.is_ascii_alphanumeric())
            .unwrap_or(false)
        {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while self
            .chars
            .get(self.pos)
            .map(|c| c.is_whitespace())
            .unwrap_or(false)
        {
            self.pos += 1;
        }
    }

    fn consume(&mut self, expected: char) -> bool {
        if self.chars.get(self.pos) == Some(&expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, reason: impl Into<String>) -> TypeError {
        TypeError {
            expr: self.input.trim().to_string(),
            reason: reason.into(),
        }
    }
}
