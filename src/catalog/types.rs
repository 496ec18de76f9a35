//! Data types for QuarryDB
//!
//! This module defines the column data types supported by the
//! table-definition subsystem, including arbitrarily nested composites.
//! Rendering is canonical and lossless: re-parsing a rendered type
//! string yields an equal `DataType`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Column data types
///
/// Scalar integer widths are canonical: `INT` in SQL input normalizes to
/// the 32-bit signed variant and renders as `INT32`. Composite types
/// nest recursively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type
    Boolean,
    /// 8-bit integer
    TinyInt { unsigned: bool },
    /// 16-bit integer
    SmallInt { unsigned: bool },
    /// 32-bit integer
    Int { unsigned: bool },
    /// 64-bit integer
    BigInt { unsigned: bool },
    /// Single-precision floating point
    Float,
    /// Double-precision floating point
    Double,
    /// Fixed-point decimal with precision and scale
    Decimal(u8, u8),
    /// Date (days since epoch)
    Date,
    /// Timestamp (date + time)
    Timestamp,
    /// Variable-length character string
    String,
    /// Semi-structured JSON-like value
    Variant,
    /// Homogeneous array
    Array(Box<DataType>),
    /// Ordered heterogeneous tuple
    Tuple(Vec<DataType>),
    /// Key/value map
    Map(Box<DataType>, Box<DataType>),
}

impl DataType {
    /// Parse a type token (including nested composite syntax) into a
    /// canonical `DataType`. Fails with `UnsupportedType` on anything
    /// unrecognized.
    pub fn parse(input: &str) -> Result<DataType> {
        let mut scanner = TypeScanner::new(input);
        let data_type = scanner.parse_type()?;
        scanner.skip_whitespace();
        if !scanner.is_at_end() {
            return Err(Error::UnsupportedType(input.trim().to_string()));
        }
        Ok(data_type)
    }

    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt { .. }
                | DataType::SmallInt { .. }
                | DataType::Int { .. }
                | DataType::BigInt { .. }
                | DataType::Float
                | DataType::Double
                | DataType::Decimal(_, _)
        )
    }

    /// Check if this type is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::TinyInt { .. }
                | DataType::SmallInt { .. }
                | DataType::Int { .. }
                | DataType::BigInt { .. }
        )
    }

    /// Whether a bloom filter index may be declared over a column of
    /// this type. Fixed-point decimals, floats, variants and composites
    /// are excluded.
    pub fn is_bloom_indexable(&self) -> bool {
        matches!(
            self,
            DataType::Boolean
                | DataType::TinyInt { .. }
                | DataType::SmallInt { .. }
                | DataType::Int { .. }
                | DataType::BigInt { .. }
                | DataType::String
                | DataType::Date
                | DataType::Timestamp
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unsigned_suffix = |u: &bool| if *u { " UNSIGNED" } else { "" };
        match self {
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::TinyInt { unsigned } => write!(f, "INT8{}", unsigned_suffix(unsigned)),
            DataType::SmallInt { unsigned } => write!(f, "INT16{}", unsigned_suffix(unsigned)),
            DataType::Int { unsigned } => write!(f, "INT32{}", unsigned_suffix(unsigned)),
            DataType::BigInt { unsigned } => write!(f, "INT64{}", unsigned_suffix(unsigned)),
            DataType::Float => write!(f, "FLOAT32"),
            DataType::Double => write!(f, "FLOAT64"),
            DataType::Decimal(p, s) => write!(f, "DECIMAL({}, {})", p, s),
            DataType::Date => write!(f, "DATE"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::String => write!(f, "STRING"),
            DataType::Variant => write!(f, "VARIANT"),
            DataType::Array(inner) => write!(f, "ARRAY({})", inner),
            DataType::Tuple(items) => {
                write!(f, "TUPLE(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", i + 1, item)?;
                }
                write!(f, ")")
            }
            DataType::Map(key, value) => write!(f, "MAP({}, {})", key, value),
        }
    }
}

/// Recursive-descent scanner over a type token.
///
/// Accepts both the SQL surface spellings (`INT`, `VARCHAR`, `DOUBLE`)
/// and the canonical rendered spellings (`INT32`, `STRING`, `FLOAT64`),
/// so rendered output round-trips through `DataType::parse`.
struct TypeScanner {
    input: Vec<char>,
    position: usize,
}

impl TypeScanner {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn parse_type(&mut self) -> Result<DataType> {
        self.skip_whitespace();
        let word = self.read_word()?;
        let upper = word.to_uppercase();

        let data_type = match upper.as_str() {
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "TINYINT" | "INT8" => DataType::TinyInt {
                unsigned: self.consume_unsigned(),
            },
            "SMALLINT" | "INT16" => DataType::SmallInt {
                unsigned: self.consume_unsigned(),
            },
            "INT" | "INTEGER" | "INT32" => DataType::Int {
                unsigned: self.consume_unsigned(),
            },
            "BIGINT" | "INT64" => DataType::BigInt {
                unsigned: self.consume_unsigned(),
            },
            "FLOAT" | "FLOAT32" => DataType::Float,
            "DOUBLE" | "FLOAT64" => DataType::Double,
            "DECIMAL" | "NUMERIC" => {
                self.expect_char('(')?;
                let precision = self.read_number()?;
                self.expect_char(',')?;
                let scale = self.read_number()?;
                self.expect_char(')')?;
                let precision = u8::try_from(precision).map_err(|_| self.unsupported())?;
                let scale = u8::try_from(scale).map_err(|_| self.unsupported())?;
                if precision == 0 || scale > precision {
                    return Err(self.unsupported());
                }
                DataType::Decimal(precision, scale)
            }
            "DATE" => DataType::Date,
            "TIMESTAMP" | "DATETIME" => DataType::Timestamp,
            "VARCHAR" | "STRING" | "TEXT" => {
                // A VARCHAR length constraint is legal input but not part
                // of the canonical type.
                if self.peek_char() == Some('(') {
                    self.expect_char('(')?;
                    self.read_number()?;
                    self.expect_char(')')?;
                }
                DataType::String
            }
            "VARIANT" | "JSON" => DataType::Variant,
            "ARRAY" => {
                self.expect_char('(')?;
                let inner = self.parse_type()?;
                self.expect_char(')')?;
                DataType::Array(Box::new(inner))
            }
            "TUPLE" => {
                self.expect_char('(')?;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    // The canonical rendering prefixes each field with
                    // its 1-based position; plain field lists are also
                    // accepted. A position that is present must match
                    // the field's actual place.
                    if self.peek_char().map(|c| c.is_ascii_digit()) == Some(true) {
                        let position = self.read_number()?;
                        if position != items.len() as u64 + 1 {
                            return Err(self.unsupported());
                        }
                    }
                    items.push(self.parse_type()?);
                    self.skip_whitespace();
                    match self.peek_char() {
                        Some(',') => {
                            self.position += 1;
                        }
                        Some(')') => {
                            self.position += 1;
                            break;
                        }
                        _ => return Err(self.unsupported()),
                    }
                }
                DataType::Tuple(items)
            }
            "MAP" => {
                self.expect_char('(')?;
                let key = self.parse_type()?;
                self.expect_char(',')?;
                let value = self.parse_type()?;
                self.expect_char(')')?;
                DataType::Map(Box::new(key), Box::new(value))
            }
            _ => return Err(Error::UnsupportedType(word)),
        };

        Ok(data_type)
    }

    /// Consume a trailing `UNSIGNED` keyword if present.
    fn consume_unsigned(&mut self) -> bool {
        let saved = self.position;
        self.skip_whitespace();
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.position += 1;
            } else {
                break;
            }
        }
        let word: String = self.input[start..self.position].iter().collect();
        if word.eq_ignore_ascii_case("UNSIGNED") {
            true
        } else {
            self.position = saved;
            false
        }
    }

    fn read_word(&mut self) -> Result<String> {
        self.skip_whitespace();
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.position += 1;
            } else {
                break;
            }
        }
        if start == self.position {
            return Err(self.unsupported());
        }
        Ok(self.input[start..self.position].iter().collect())
    }

    fn read_number(&mut self) -> Result<u64> {
        self.skip_whitespace();
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.position += 1;
            } else {
                break;
            }
        }
        if start == self.position {
            return Err(self.unsupported());
        }
        let text: String = self.input[start..self.position].iter().collect();
        text.parse::<u64>().map_err(|_| self.unsupported())
    }

    fn expect_char(&mut self, expected: char) -> Result<()> {
        self.skip_whitespace();
        if self.peek_char() == Some(expected) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.unsupported())
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map(|c| c.is_whitespace()) == Some(true) {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn unsupported(&self) -> Error {
        let text: String = self.input.iter().collect();
        Error::UnsupportedType(text.trim().to_string())
    }
}
