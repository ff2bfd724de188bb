// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the relational built-ins. two Int operands compare exactly, any other
// combination widens through the numeric accessor, which also rejects a
// Bool mixed with a numeric operand.

use peisik_types::{value::Value, RuntimeError};

pub fn equal(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    match (left, right) {
        (Value::Bool(left_value), Value::Bool(right_value)) => {
            Ok(Value::Bool(left_value == right_value))
        }
        (Value::Int(left_value), Value::Int(right_value)) => {
            Ok(Value::Bool(left_value == right_value))
        }
        _ => Ok(Value::Bool(
            left.as_numeric_real()? == right.as_numeric_real()?,
        )),
    }
}

pub fn not_equal(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    match (left, right) {
        (Value::Bool(left_value), Value::Bool(right_value)) => {
            Ok(Value::Bool(left_value != right_value))
        }
        (Value::Int(left_value), Value::Int(right_value)) => {
            Ok(Value::Bool(left_value != right_value))
        }
        _ => Ok(Value::Bool(
            left.as_numeric_real()? != right.as_numeric_real()?,
        )),
    }
}

pub fn less(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Bool(left_value < right_value))
    } else {
        Ok(Value::Bool(
            left.as_numeric_real()? < right.as_numeric_real()?,
        ))
    }
}

pub fn less_equal(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Bool(left_value <= right_value))
    } else {
        Ok(Value::Bool(
            left.as_numeric_real()? <= right.as_numeric_real()?,
        ))
    }
}

pub fn greater(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Bool(left_value > right_value))
    } else {
        Ok(Value::Bool(
            left.as_numeric_real()? > right.as_numeric_real()?,
        ))
    }
}

pub fn greater_equal(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Int(left_value), Value::Int(right_value)) = (left, right) {
        Ok(Value::Bool(left_value >= right_value))
    } else {
        Ok(Value::Bool(
            left.as_numeric_real()? >= right.as_numeric_real()?,
        ))
    }
}
