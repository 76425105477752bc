use super::Value;
use crate::{Error, Result};

/// A partial-update assignment: `column = value` or `column = column <op> value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub op: AssignmentOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    /// Replace the current value.
    Set,
    Add,
    Sub,
    Mul,
    Rem,
}

impl Assignment {
    /// Parses a column specifier such as `"gid+"`; the trailing operator
    /// character selects the mode and defaults to [`AssignmentOp::Set`].
    pub fn parse(spec: &str, value: impl Into<Value>) -> Assignment {
        let (column, op) = AssignmentOp::split(spec);
        Assignment {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }
}

impl AssignmentOp {
    /// Splits a trailing operator character off a column specifier.
    pub fn split(spec: &str) -> (&str, AssignmentOp) {
        let spec = spec.trim();
        let op = match spec.chars().last() {
            Some('+') => AssignmentOp::Add,
            Some('-') => AssignmentOp::Sub,
            Some('*') => AssignmentOp::Mul,
            Some('%') => AssignmentOp::Rem,
            Some('=') => AssignmentOp::Set,
            _ => return (spec, AssignmentOp::Set),
        };
        (spec[..spec.len() - 1].trim_end(), op)
    }

    /// The SQL operator, or `None` for a plain assignment.
    pub fn symbol(self) -> Option<char> {
        match self {
            AssignmentOp::Set => None,
            AssignmentOp::Add => Some('+'),
            AssignmentOp::Sub => Some('-'),
            AssignmentOp::Mul => Some('*'),
            AssignmentOp::Rem => Some('%'),
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, AssignmentOp::Set)
    }

    /// Computes the value a row holds after applying this operation, the same
    /// way the backend evaluates `current <op> operand`.
    ///
    /// Integer operands stay integral; mixing in a float promotes to `F64`.
    /// Arithmetic on null yields null, as in SQL.
    pub fn apply(self, current: &Value, operand: &Value) -> Result<Value> {
        if self.is_set() {
            return Ok(operand.clone());
        }

        if current.is_null() || operand.is_null() {
            return Ok(Value::Null);
        }

        let integral = matches!(current, Value::I64(_) | Value::U64(_) | Value::Bool(_))
            && matches!(operand, Value::I64(_) | Value::U64(_) | Value::Bool(_));

        if integral {
            let (Some(lhs), Some(rhs)) = (current.to_i64(), operand.to_i64()) else {
                return Err(Error::invalid_statement(format!(
                    "{current:?} {} {operand:?} overflows a 64-bit integer",
                    self.symbol().unwrap_or('=')
                )));
            };
            let result = match self {
                AssignmentOp::Add => lhs.checked_add(rhs),
                AssignmentOp::Sub => lhs.checked_sub(rhs),
                AssignmentOp::Mul => lhs.checked_mul(rhs),
                AssignmentOp::Rem if rhs == 0 => {
                    return Err(Error::invalid_statement("modulo by zero"))
                }
                AssignmentOp::Rem => lhs.checked_rem(rhs),
                AssignmentOp::Set => unreachable!(),
            };
            return match result {
                Some(value) => Ok(Value::I64(value)),
                None => Err(Error::invalid_statement(format!(
                    "{lhs} {} {rhs} overflows a 64-bit integer",
                    self.symbol().unwrap_or('=')
                ))),
            };
        }

        let (Some(lhs), Some(rhs)) = (current.to_f64(), operand.to_f64()) else {
            let bad = if current.to_f64().is_none() { current } else { operand };
            return Err(Error::type_conversion(bad.clone(), super::Type::F64));
        };

        Ok(Value::F64(match self {
            AssignmentOp::Add => lhs + rhs,
            AssignmentOp::Sub => lhs - rhs,
            AssignmentOp::Mul => lhs * rhs,
            AssignmentOp::Rem => lhs % rhs,
            AssignmentOp::Set => unreachable!(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_trailing_operator() {
        assert_eq!(AssignmentOp::split("gid+"), ("gid", AssignmentOp::Add));
        assert_eq!(AssignmentOp::split("gid -"), ("gid", AssignmentOp::Sub));
        assert_eq!(AssignmentOp::split("score*"), ("score", AssignmentOp::Mul));
        assert_eq!(AssignmentOp::split("slot%"), ("slot", AssignmentOp::Rem));
        assert_eq!(AssignmentOp::split("name="), ("name", AssignmentOp::Set));
        assert_eq!(AssignmentOp::split("name"), ("name", AssignmentOp::Set));
    }

    #[test]
    fn integer_arithmetic() {
        let apply = |op: AssignmentOp, a: i64, b: i64| op.apply(&Value::I64(a), &Value::I64(b)).unwrap();
        assert_eq!(apply(AssignmentOp::Add, 5, 3), Value::I64(8));
        assert_eq!(apply(AssignmentOp::Sub, 5, 7), Value::I64(-2));
        assert_eq!(apply(AssignmentOp::Mul, 5, 3), Value::I64(15));
        assert_eq!(apply(AssignmentOp::Rem, 5, 3), Value::I64(2));
        assert_eq!(apply(AssignmentOp::Set, 5, 3), Value::I64(3));
    }

    #[test]
    fn float_promotion() {
        let result = AssignmentOp::Add.apply(&Value::I64(1), &Value::F64(0.5)).unwrap();
        assert_eq!(result, Value::F64(1.5));
    }

    #[test]
    fn modulo_by_zero_fails() {
        let err = AssignmentOp::Rem.apply(&Value::I64(1), &Value::I64(0)).unwrap_err();
        assert!(err.is_invalid_statement());
    }

    #[test]
    fn arithmetic_on_text_fails() {
        let err = AssignmentOp::Add
            .apply(&Value::from("jet"), &Value::I64(1))
            .unwrap_err();
        assert!(err.is_type_conversion());
    }
}
