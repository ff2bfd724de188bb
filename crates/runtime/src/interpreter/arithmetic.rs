// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the arithmetic built-ins.
//
// the coercion rule is shared by most of them: if every operand is an
// Int the result is an Int computed exactly (wrapping like native
// two's-complement 64-bit arithmetic), otherwise the operands widen to
// Real. `Divide` always returns Real and `FloorDivide`/`Mod` always
// return Int.

use peisik_types::{value::Value, ApplicationError, RuntimeError};

/// variadic sum.
pub fn plus(values: &mut Vec<Value>) -> Result<Value, Box<dyn RuntimeError>> {
    // keep an exact integer sum alongside the widened one and return
    // the widened sum only when a Real argument appears
    let mut int_sum = 0i64;
    let mut real_sum = 0f64;
    let mut saw_real = false;

    while let Some(value) = values.pop() {
        match value {
            Value::Int(int_value) => {
                int_sum = int_sum.wrapping_add(int_value);
                real_sum += int_value as f64;
            }
            Value::Real(real_value) => {
                real_sum += real_value;
                saw_real = true;
            }
            _ => {
                return Err(ApplicationError::new("+ arguments must be Int or Real.").into());
            }
        }
    }

    if saw_real {
        Ok(Value::Real(real_sum))
    } else {
        Ok(Value::Int(int_sum))
    }
}

/// the unary minus.
pub fn negate(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    match value {
        Value::Int(int_value) => Ok(Value::Int(int_value.wrapping_neg())),
        Value::Real(real_value) => Ok(Value::Real(-real_value)),
        _ => Err(ApplicationError::new("- arguments must be Int or Real.").into()),
    }
}

pub fn minus(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Int(left_value.wrapping_sub(*right_value)))
    } else {
        Ok(Value::Real(
            left.as_numeric_real()? - right.as_numeric_real()?,
        ))
    }
}

pub fn multiply(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Int(left_value.wrapping_mul(*right_value)))
    } else {
        Ok(Value::Real(
            left.as_numeric_real()? * right.as_numeric_real()?,
        ))
    }
}

pub fn divide(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if right.as_numeric_real()? == 0.0 {
        return Err(ApplicationError::new("Division by zero.").into());
    }

    Ok(Value::Real(
        left.as_numeric_real()? / right.as_numeric_real()?,
    ))
}

/// integer division; the quotient truncates toward zero.
pub fn floor_divide(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if right.as_numeric_real()? == 0.0 {
        return Err(ApplicationError::new("Division by zero.").into());
    }

    // exact when both operands are integers
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Int(left_value.wrapping_div(*right_value)))
    } else {
        Ok(Value::Int(
            (left.as_numeric_real()? / right.as_numeric_real()?) as i64,
        ))
    }
}

/// integer-only remainder, always in `[0, |modulus|)`.
pub fn modulo(value: &Value, modulus: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if modulus.as_int()? == 0 {
        return Err(ApplicationError::new("Division by zero in %.").into());
    }

    let modulus = modulus.as_int()?;
    let mut result = value.as_int()?.wrapping_rem(modulus);
    if result < 0 {
        result = result.wrapping_add(modulus.wrapping_abs());
    }

    Ok(Value::Int(result))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use peisik_types::{value::Value, ApplicationError, InterpreterError, RuntimeError};

    use crate::interpreter::arithmetic::{
        divide, floor_divide, minus, modulo, multiply, negate, plus,
    };

    #[test]
    fn test_plus_sums_and_widens() {
        let mut values = vec![Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(plus(&mut values).unwrap(), Value::Int(6));

        let mut values = vec![Value::Int(1), Value::Real(0.5)];
        assert_eq!(plus(&mut values).unwrap(), Value::Real(1.5));

        // the empty sum is the integer zero
        let mut values = vec![];
        assert_eq!(plus(&mut values).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_plus_wraps_like_native_i64() {
        let mut values = vec![Value::Int(i64::MAX), Value::Int(1)];
        assert_eq!(plus(&mut values).unwrap(), Value::Int(i64::MIN));
    }

    #[test]
    fn test_plus_rejects_non_numeric_arguments() {
        let mut values = vec![Value::Int(1), Value::Bool(true)];
        let error = plus(&mut values).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
        assert_eq!(error.get_message(), "+ arguments must be Int or Real.");
    }

    #[test]
    fn test_negate() {
        assert_eq!(negate(&Value::Int(7)).unwrap(), Value::Int(-7));
        assert_eq!(negate(&Value::Real(-2.5)).unwrap(), Value::Real(2.5));
        assert_eq!(negate(&Value::Int(i64::MIN)).unwrap(), Value::Int(i64::MIN));

        let error = negate(&Value::Bool(false)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
    }

    #[test]
    fn test_minus_and_multiply_keep_ints_exact() {
        assert_eq!(
            minus(&Value::Int(5), &Value::Int(3)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            minus(&Value::Int(5), &Value::Real(0.5)).unwrap(),
            Value::Real(4.5)
        );
        assert_eq!(
            multiply(&Value::Int(6), &Value::Int(7)).unwrap(),
            Value::Int(42)
        );
        assert_eq!(
            multiply(&Value::Real(1.5), &Value::Int(4)).unwrap(),
            Value::Real(6.0)
        );
    }

    #[test]
    fn test_divide_always_returns_real() {
        assert_eq!(
            divide(&Value::Int(7), &Value::Int(2)).unwrap(),
            Value::Real(3.5)
        );
        assert_eq!(
            divide(&Value::Real(1.0), &Value::Real(4.0)).unwrap(),
            Value::Real(0.25)
        );

        let error = divide(&Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
        assert_eq!(error.get_message(), "Division by zero.");

        // a Real zero divisor is rejected as well
        let error = divide(&Value::Int(1), &Value::Real(0.0)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
    }

    #[test]
    fn test_floor_divide_truncates_toward_zero() {
        assert_eq!(
            floor_divide(&Value::Int(7), &Value::Int(2)).unwrap(),
            Value::Int(3)
        );
        assert_eq!(
            floor_divide(&Value::Int(-7), &Value::Int(2)).unwrap(),
            Value::Int(-3)
        );
        assert_eq!(
            floor_divide(&Value::Real(-7.0), &Value::Int(2)).unwrap(),
            Value::Int(-3)
        );

        let error = floor_divide(&Value::Int(1), &Value::Int(0)).unwrap_err();
        assert_eq!(error.get_message(), "Division by zero.");
    }

    #[test]
    fn test_modulo_is_non_negative() {
        assert_eq!(
            modulo(&Value::Int(7), &Value::Int(3)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            modulo(&Value::Int(-7), &Value::Int(3)).unwrap(),
            Value::Int(2)
        );
        assert_eq!(
            modulo(&Value::Int(7), &Value::Int(-3)).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            modulo(&Value::Int(-7), &Value::Int(-3)).unwrap(),
            Value::Int(2)
        );

        let error = modulo(&Value::Int(1), &Value::Int(0)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
        assert_eq!(error.get_message(), "Division by zero in %.");
    }

    #[test]
    fn test_modulo_is_integer_only() {
        let error = modulo(&Value::Real(7.0), &Value::Int(3)).unwrap_err();
        assert!(error.as_any().is::<InterpreterError>());
        let error = modulo(&Value::Int(7), &Value::Real(3.0)).unwrap_err();
        assert!(error.as_any().is::<InterpreterError>());
    }
}
