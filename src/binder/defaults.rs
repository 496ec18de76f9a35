//! Constant folding for column DEFAULT expressions
//!
//! A default must reduce to a literal at bind time: literals,
//! deterministic arithmetic over literals, and a small allow-list of
//! scalar functions fold; everything else is rejected. The single
//! symbolic case is `now()`, which is stored as a deferred marker and
//! re-evaluated per inserted row — and which is only legal on the
//! CREATE TABLE path.

use crate::catalog::{DataType, DefaultValue, Literal};
use crate::error::{Error, Result};
use crate::sql::{BinaryOperator, Expr, UnaryOperator};

/// Which DDL path is binding the column. ADD COLUMN through ALTER must
/// not introduce a deferred `now()` default: existing rows would have
/// no value to backfill deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMode {
    Create,
    Alter,
}

/// Scalar functions that fold over literal arguments
const FOLDABLE_FUNCTIONS: [&str; 4] = ["abs", "upper", "lower", "concat"];

/// Fold a DEFAULT expression against the column's resolved type.
pub fn fold_default(
    column: &str,
    expr: &Expr,
    data_type: &DataType,
    nullable: bool,
    mode: FoldMode,
) -> Result<DefaultValue> {
    if let Expr::FunctionCall { name, args } = expr {
        if name.eq_ignore_ascii_case("now") && args.is_empty() {
            return match mode {
                FoldMode::Create => Ok(DefaultValue::DeferredNow),
                FoldMode::Alter => Err(invalid(
                    column,
                    "now() default cannot be added to an existing table",
                )),
            };
        }
    }

    let literal = fold_expr(column, expr)?;
    let literal = coerce_literal(column, literal, data_type, nullable)?;
    Ok(DefaultValue::Literal(literal))
}

fn invalid(column: &str, reason: impl Into<String>) -> Error {
    Error::InvalidDefaultExpression {
        column: column.to_string(),
        reason: reason.into(),
    }
}

/// Reduce an expression tree to a single literal.
fn fold_expr(column: &str, expr: &Expr) -> Result<Literal> {
    match expr {
        Expr::Literal(literal) => Ok(literal.clone()),
        Expr::Column(name) => Err(invalid(
            column,
            format!("default cannot reference column '{}'", name),
        )),
        Expr::UnaryOp { op, expr } => {
            let operand = fold_expr(column, expr)?;
            match op {
                UnaryOperator::Plus => Ok(operand),
                UnaryOperator::Minus => match operand {
                    Literal::Int(i) => i
                        .checked_neg()
                        .map(Literal::Int)
                        .ok_or_else(|| invalid(column, "arithmetic overflow in default")),
                    Literal::UInt(u) if u <= i64::MAX as u64 => Ok(Literal::Int(-(u as i64))),
                    Literal::Float(v) => Ok(Literal::Float(-v)),
                    other => Err(invalid(column, format!("cannot negate {}", other))),
                },
            }
        }
        Expr::BinaryOp { op, left, right } => {
            let left = fold_expr(column, left)?;
            let right = fold_expr(column, right)?;
            fold_binary(column, *op, left, right)
        }
        Expr::FunctionCall { name, args } => fold_function(column, name, args),
    }
}

fn fold_binary(column: &str, op: BinaryOperator, left: Literal, right: Literal) -> Result<Literal> {
    use BinaryOperator::*;

    let as_f64 = |l: &Literal| -> Option<f64> {
        match l {
            Literal::Int(i) => Some(*i as f64),
            Literal::UInt(u) => Some(*u as f64),
            Literal::Float(v) => Some(*v),
            _ => None,
        }
    };
    let as_i64 = |l: &Literal| -> Option<i64> {
        match l {
            Literal::Int(i) => Some(*i),
            Literal::UInt(u) if *u <= i64::MAX as u64 => Some(*u as i64),
            _ => None,
        }
    };

    // Integer arithmetic stays integral; division always goes through
    // floats so `3 / 2` folds to 1.5.
    if let (Some(a), Some(b)) = (as_i64(&left), as_i64(&right)) {
        let folded = match op {
            Plus => a.checked_add(b),
            Minus => a.checked_sub(b),
            Multiply => a.checked_mul(b),
            Modulo => {
                if b == 0 {
                    return Err(invalid(column, "modulo by zero"));
                }
                a.checked_rem(b)
            }
            Divide => {
                if b == 0 {
                    return Err(invalid(column, "division by zero"));
                }
                let value = a as f64 / b as f64;
                return Ok(if value.fract() == 0.0 {
                    Literal::Int(value as i64)
                } else {
                    Literal::Float(value)
                });
            }
        };
        return folded
            .map(Literal::Int)
            .ok_or_else(|| invalid(column, "arithmetic overflow in default"));
    }

    if let (Some(a), Some(b)) = (as_f64(&left), as_f64(&right)) {
        let value = match op {
            Plus => a + b,
            Minus => a - b,
            Multiply => a * b,
            Divide => {
                if b == 0.0 {
                    return Err(invalid(column, "division by zero"));
                }
                a / b
            }
            Modulo => {
                if b == 0.0 {
                    return Err(invalid(column, "modulo by zero"));
                }
                a % b
            }
        };
        return Ok(Literal::Float(value));
    }

    Err(invalid(
        column,
        format!("cannot apply arithmetic to {} and {}", left, right),
    ))
}

fn fold_function(column: &str, name: &str, args: &[Expr]) -> Result<Literal> {
    let lowered = name.to_lowercase();
    if !FOLDABLE_FUNCTIONS.contains(&lowered.as_str()) {
        return Err(invalid(
            column,
            format!("function {}() is not allowed in a default expression", name),
        ));
    }

    let args = args
        .iter()
        .map(|arg| fold_expr(column, arg))
        .collect::<Result<Vec<_>>>()?;

    match (lowered.as_str(), args.as_slice()) {
        ("abs", [Literal::Int(i)]) => Ok(Literal::Int(i.abs())),
        ("abs", [Literal::UInt(u)]) => Ok(Literal::UInt(*u)),
        ("abs", [Literal::Float(v)]) => Ok(Literal::Float(v.abs())),
        ("upper", [Literal::Str(s)]) => Ok(Literal::Str(s.to_uppercase())),
        ("lower", [Literal::Str(s)]) => Ok(Literal::Str(s.to_lowercase())),
        ("concat", parts) if !parts.is_empty() => {
            let mut out = String::new();
            for part in parts {
                match part {
                    Literal::Str(s) => out.push_str(s),
                    other => {
                        return Err(invalid(
                            column,
                            format!("concat() argument {} is not a string", other),
                        ))
                    }
                }
            }
            Ok(Literal::Str(out))
        }
        _ => Err(invalid(
            column,
            format!("invalid arguments to {}() in default expression", name),
        )),
    }
}

/// Check the folded literal against the column's type family.
fn coerce_literal(
    column: &str,
    literal: Literal,
    data_type: &DataType,
    nullable: bool,
) -> Result<Literal> {
    if literal == Literal::Null {
        if nullable || *data_type == DataType::Variant {
            return Ok(literal);
        }
        return Err(invalid(column, "NULL default on a NOT NULL column"));
    }

    match data_type {
        DataType::TinyInt { unsigned }
        | DataType::SmallInt { unsigned }
        | DataType::Int { unsigned }
        | DataType::BigInt { unsigned } => match literal {
            Literal::Int(i) => {
                if *unsigned && i < 0 {
                    Err(invalid(column, "negative default on an unsigned column"))
                } else {
                    Ok(Literal::Int(i))
                }
            }
            Literal::UInt(_) => Ok(literal),
            Literal::Float(v) if v.fract() == 0.0 => Ok(Literal::Int(v as i64)),
            other => Err(invalid(
                column,
                format!("default {} is not an integer", other),
            )),
        },
        DataType::Float | DataType::Double | DataType::Decimal(_, _) => match literal {
            Literal::Int(_) | Literal::UInt(_) | Literal::Float(_) => Ok(literal),
            other => Err(invalid(column, format!("default {} is not numeric", other))),
        },
        DataType::Boolean => match literal {
            Literal::Boolean(_) => Ok(literal),
            other => Err(invalid(column, format!("default {} is not a boolean", other))),
        },
        DataType::String => match literal {
            Literal::Str(_) => Ok(literal),
            other => Err(invalid(column, format!("default {} is not a string", other))),
        },
        // Date and timestamp defaults arrive either as date text or as
        // an epoch offset.
        DataType::Date | DataType::Timestamp => match literal {
            Literal::Str(_) | Literal::Int(_) | Literal::UInt(_) => Ok(literal),
            other => Err(invalid(
                column,
                format!("default {} is not a date or timestamp literal", other),
            )),
        },
        DataType::Variant => Ok(literal),
        DataType::Array(_) | DataType::Tuple(_) | DataType::Map(_, _) => match literal {
            Literal::Str(_) | Literal::Raw(_) => Ok(literal),
            other => Err(invalid(
                column,
                format!("default {} is not valid for a composite column", other),
            )),
        },
    }
}
