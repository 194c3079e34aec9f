use crate::{compile::Operator, log::{Error, INCOMPATIBLE_TYPES}};
use serde_json::{Number, Value};

/// Return true if the given [`Value`] is truthy.
///
/// Falsy values are false, zero, empty strings, empty arrays, empty
/// objects and null. Everything else is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(boolean) => *boolean,
        Value::Number(number) => number.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(string) => !string.is_empty(),
        Value::Array(array) => !array.is_empty(),
        Value::Object(object) => !object.is_empty(),
        Value::Null => false,
    }
}

/// Apply the given [`Operator`] to two [`Value`] instances, producing a
/// new `Value`.
///
/// Arithmetic on two integers stays in integers, any float operand
/// promotes the result to float. Equality works across all types, while
/// ordering and arithmetic are defined per type.
///
/// # Errors
///
/// Returns an [`Error`] if the `Operator` cannot be applied to the types,
/// or the arithmetic does not produce a representable number.
pub fn apply_operator(left: &Value, operator: Operator, right: &Value) -> Result<Value, Error> {
    match operator {
        Operator::Equal => return Ok(Value::Bool(values_equal(left, right))),
        Operator::NotEqual => return Ok(Value::Bool(!values_equal(left, right))),
        Operator::And | Operator::Or => {
            unreachable!("logical operators are evaluated by the renderer")
        }
        _ => {}
    }

    let result = match (left, right) {
        (Value::Number(left), Value::Number(right)) => match operator {
            Operator::Add | Operator::Subtract | Operator::Multiply | Operator::Divide => {
                return apply_arithmetic(left, operator, right)
            }
            Operator::Greater => Value::Bool(as_f64(left) > as_f64(right)),
            Operator::Lesser => Value::Bool(as_f64(left) < as_f64(right)),
            Operator::GreaterOrEqual => Value::Bool(as_f64(left) >= as_f64(right)),
            Operator::LesserOrEqual => Value::Bool(as_f64(left) <= as_f64(right)),
            _ => unreachable!(),
        },
        (Value::String(left), Value::String(right)) => match operator {
            Operator::Add => Value::String(format!("{left}{right}")),
            Operator::Greater => Value::Bool(left > right),
            Operator::Lesser => Value::Bool(left < right),
            Operator::GreaterOrEqual => Value::Bool(left >= right),
            Operator::LesserOrEqual => Value::Bool(left <= right),
            unsupported => {
                return Err(Error::render(INCOMPATIBLE_TYPES).with_help(format!(
                    "operator `{unsupported}` is invalid on string types"
                )))
            }
        },
        (left, right) => {
            return Err(Error::render(INCOMPATIBLE_TYPES).with_help(format!(
                "operator `{operator}` cannot be applied to `{left}` and `{right}`"
            )))
        }
    };

    Ok(result)
}

/// Apply an arithmetic [`Operator`] to two numbers.
///
/// # Errors
///
/// Returns an [`Error`] on division by zero, integer overflow, or a
/// result that does not fit in a JSON number.
fn apply_arithmetic(left: &Number, operator: Operator, right: &Number) -> Result<Value, Error> {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        let result = match operator {
            Operator::Add => left.checked_add(right),
            Operator::Subtract => left.checked_sub(right),
            Operator::Multiply => left.checked_mul(right),
            Operator::Divide => {
                if right == 0 {
                    return Err(Error::render("division by zero"));
                }
                // Integer division stays exact, everything else falls
                // through to float. The remainder itself can overflow,
                // for i64::MIN / -1.
                match left.checked_rem(right) {
                    Some(0) => left.checked_div(right),
                    Some(_) => return float_number(left as f64 / right as f64),
                    None => None,
                }
            }
            _ => unreachable!(),
        };

        return match result {
            Some(result) => Ok(Value::Number(Number::from(result))),
            None => Err(Error::render("numeric overflow")),
        };
    }

    let (left, right) = (as_f64(left), as_f64(right));
    match operator {
        Operator::Add => float_number(left + right),
        Operator::Subtract => float_number(left - right),
        Operator::Multiply => float_number(left * right),
        Operator::Divide => {
            if right == 0.0 {
                return Err(Error::render("division by zero"));
            }
            float_number(left / right)
        }
        _ => unreachable!(),
    }
}

/// Wrap the float in a [`Value`], unless it is not finite.
fn float_number(value: f64) -> Result<Value, Error> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| Error::render("numeric overflow"))
}

/// Read any [`Number`] as a float.
fn as_f64(number: &Number) -> f64 {
    number.as_f64().expect("json numbers are representable as f64")
}

/// Compare two [`Value`] instances for equality.
///
/// Numbers compare by numeric value, so `1` and `1.0` are equal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => as_f64(left) == as_f64(right),
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_operator, is_truthy};
    use crate::compile::Operator;
    use serde_json::json;

    #[test]
    fn test_truthy_values() {
        for value in [
            json!("lorem"),
            json!(12),
            json!(-12),
            json!(114.4),
            json!(true),
            json!(["lorem"]),
            json!({"lorem": "ipsum"}),
        ] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn test_falsy_values() {
        for value in [
            json!(""),
            json!(0),
            json!(0.0),
            json!(false),
            json!([]),
            json!({}),
            json!(null),
        ] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        let result = apply_operator(&json!(2), Operator::Add, &json!(3)).unwrap();
        assert_eq!(result, json!(5));
        assert!(result.is_i64());
    }

    #[test]
    fn test_division_promotes_when_inexact() {
        assert_eq!(
            apply_operator(&json!(7), Operator::Divide, &json!(2)).unwrap(),
            json!(3.5)
        );
        assert_eq!(
            apply_operator(&json!(6), Operator::Divide, &json!(2)).unwrap(),
            json!(3)
        );
    }

    #[test]
    fn test_division_by_zero() {
        assert!(apply_operator(&json!(1), Operator::Divide, &json!(0)).is_err());
    }

    #[test]
    fn test_division_overflow() {
        assert!(apply_operator(&json!(i64::MIN), Operator::Divide, &json!(-1)).is_err());
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            apply_operator(&json!("ab"), Operator::Add, &json!("cd")).unwrap(),
            json!("abcd")
        );
    }

    #[test]
    fn test_equality_across_types() {
        assert_eq!(
            apply_operator(&json!(1), Operator::Equal, &json!("1")).unwrap(),
            json!(false)
        );
        assert_eq!(
            apply_operator(&json!(1), Operator::Equal, &json!(1.0)).unwrap(),
            json!(true)
        );
        assert_eq!(
            apply_operator(&json!(null), Operator::NotEqual, &json!(1)).unwrap(),
            json!(true)
        );
    }

    #[test]
    fn test_incompatible_arithmetic() {
        assert!(apply_operator(&json!("a"), Operator::Subtract, &json!(1)).is_err());
        assert!(apply_operator(&json!([1]), Operator::Greater, &json!([1, 2])).is_err());
    }
}
