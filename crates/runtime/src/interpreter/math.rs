// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the Math module built-ins. the argument widens through the numeric
// accessor unless noted; domain violations are application errors
// because they are caused by the values the user program computed.

use peisik_types::{value::Value, ApplicationError, PrimitiveType, RuntimeError};

/// `Abs` keeps the argument type: Int stays Int, Real stays Real.
pub fn abs(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    match value {
        Value::Int(int_value) => Ok(Value::Int(int_value.wrapping_abs())),
        _ => Ok(Value::Real(value.as_real()?.abs())),
    }
}

pub fn acos(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    let real_value = value.as_numeric_real()?;
    if real_value < -1.0 || real_value > 1.0 {
        return Err(ApplicationError::new("Math.Acos called with argument outside [-1, 1].").into());
    }

    Ok(Value::Real(real_value.acos()))
}

pub fn asin(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    let real_value = value.as_numeric_real()?;
    if real_value < -1.0 || real_value > 1.0 {
        return Err(ApplicationError::new("Math.Asin called with argument outside [-1, 1].").into());
    }

    Ok(Value::Real(real_value.asin()))
}

pub fn atan(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Real(value.as_numeric_real()?.atan()))
}

pub fn ceil(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Int(value.as_numeric_real()?.ceil() as i64))
}

pub fn cos(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Real(value.as_numeric_real()?.cos()))
}

pub fn exp(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Real(value.as_numeric_real()?.exp()))
}

pub fn floor(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Int(value.as_numeric_real()?.floor() as i64))
}

/// the natural logarithm.
pub fn log(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if value.as_numeric_real()? < 0.0 {
        return Err(ApplicationError::new("Called Math.Log with negative argument.").into());
    }

    Ok(Value::Real(value.as_numeric_real()?.ln()))
}

pub fn pow(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    // a negative base with a fractional exponent has no real result;
    // an Int exponent is always safe
    if left.as_numeric_real()? < 0.0 && right.primitive_type() == PrimitiveType::Real {
        return Err(ApplicationError::new(
            "Called Math.Pow with negative argument and non-integer exponent.",
        )
        .into());
    }

    Ok(Value::Real(
        left.as_numeric_real()?.powf(right.as_numeric_real()?),
    ))
}

/// rounds half away from zero, like the C library `round`.
pub fn round(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Int(value.as_numeric_real()?.round() as i64))
}

pub fn sin(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Real(value.as_numeric_real()?.sin()))
}

pub fn sqrt(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if value.as_numeric_real()? < 0.0 {
        return Err(ApplicationError::new("Called Math.Sqrt with negative argument.").into());
    }

    Ok(Value::Real(value.as_numeric_real()?.sqrt()))
}

pub fn tan(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    Ok(Value::Real(value.as_numeric_real()?.tan()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use peisik_types::{value::Value, ApplicationError, InterpreterError, RuntimeError};

    use crate::interpreter::math::{abs, acos, asin, ceil, exp, floor, log, pow, round, sqrt};

    #[test]
    fn test_abs_keeps_the_argument_type() {
        assert_eq!(abs(&Value::Int(-7)).unwrap(), Value::Int(7));
        assert_eq!(abs(&Value::Real(-2.5)).unwrap(), Value::Real(2.5));

        // Abs reads the Real payload directly, a Bool faults instead of
        // widening
        let error = abs(&Value::Bool(true)).unwrap_err();
        assert!(error.as_any().is::<InterpreterError>());
    }

    #[test]
    fn test_arc_functions_check_their_domain() {
        assert_eq!(acos(&Value::Real(1.0)).unwrap(), Value::Real(0.0));
        assert_eq!(asin(&Value::Int(0)).unwrap(), Value::Real(0.0));

        let error = acos(&Value::Real(1.5)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
        assert_eq!(
            error.get_message(),
            "Math.Acos called with argument outside [-1, 1]."
        );
        let error = asin(&Value::Real(-1.5)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
    }

    #[test]
    fn test_rounding_functions_return_int() {
        assert_eq!(ceil(&Value::Real(2.1)).unwrap(), Value::Int(3));
        assert_eq!(ceil(&Value::Real(-2.1)).unwrap(), Value::Int(-2));
        assert_eq!(floor(&Value::Real(2.9)).unwrap(), Value::Int(2));
        assert_eq!(floor(&Value::Real(-2.1)).unwrap(), Value::Int(-3));
        assert_eq!(round(&Value::Real(2.5)).unwrap(), Value::Int(3));
        assert_eq!(round(&Value::Real(-2.5)).unwrap(), Value::Int(-3));
        assert_eq!(round(&Value::Int(4)).unwrap(), Value::Int(4));
    }

    #[test]
    fn test_log_and_sqrt_reject_negative_arguments() {
        assert_eq!(log(&Value::Real(1.0)).unwrap(), Value::Real(0.0));
        assert_eq!(sqrt(&Value::Int(9)).unwrap(), Value::Real(3.0));

        let error = log(&Value::Int(-1)).unwrap_err();
        assert_eq!(
            error.get_message(),
            "Called Math.Log with negative argument."
        );
        let error = sqrt(&Value::Real(-4.0)).unwrap_err();
        assert_eq!(
            error.get_message(),
            "Called Math.Sqrt with negative argument."
        );
    }

    #[test]
    fn test_pow_rejects_negative_base_with_real_exponent() {
        assert_eq!(
            pow(&Value::Int(2), &Value::Int(10)).unwrap(),
            Value::Real(1024.0)
        );
        assert_eq!(
            pow(&Value::Int(-2), &Value::Int(2)).unwrap(),
            Value::Real(4.0)
        );

        let error = pow(&Value::Int(-2), &Value::Real(2.0)).unwrap_err();
        assert!(error.as_any().is::<ApplicationError>());
        assert_eq!(
            error.get_message(),
            "Called Math.Pow with negative argument and non-integer exponent."
        );
    }

    #[test]
    fn test_exp() {
        assert_eq!(exp(&Value::Int(0)).unwrap(), Value::Real(1.0));
    }
}
