// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the logical built-ins double as bit operations: two Bool operands get
// the logical meaning, everything else must be Int and gets the bitwise
// one.

use peisik_types::{value::Value, RuntimeError};

pub fn and(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Bool(left_value), Value::Bool(right_value)) = (left, right) {
        Ok(Value::Bool(left_value & right_value))
    } else {
        Ok(Value::Int(left.as_int()? & right.as_int()?))
    }
}

pub fn or(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Bool(left_value), Value::Bool(right_value)) = (left, right) {
        Ok(Value::Bool(left_value | right_value))
    } else {
        Ok(Value::Int(left.as_int()? | right.as_int()?))
    }
}

pub fn xor(left: &Value, right: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    if let (Value::Bool(left_value), Value::Bool(right_value)) = (left, right) {
        Ok(Value::Bool(left_value ^ right_value))
    } else {
        Ok(Value::Int(left.as_int()? ^ right.as_int()?))
    }
}

pub fn not(value: &Value) -> Result<Value, Box<dyn RuntimeError>> {
    match value {
        Value::Bool(bool_value) => Ok(Value::Bool(!bool_value)),
        _ => Ok(Value::Int(!value.as_int()?)),
    }
}
