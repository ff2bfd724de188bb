// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

use crate::{InterpreterError, PrimitiveType};

/// a tagged primitive value.
///
/// the payload always corresponds to the tag. the typed accessors fail
/// with an `InterpreterError` when the bytecode asks for the wrong one,
/// since that indicates a miscompiled module rather than a user error.
/// values are freely copied; the only mutation path is through the
/// tag-checked `set_*` and `assign` operations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Void,
    Bool(bool),
    Int(i64),
    Real(f64),
}

impl Value {
    /// construct a value from the binary module encoding: a type tag
    /// plus a raw 64-bit payload.
    ///
    /// `Int` takes the payload verbatim, `Bool` the low bit, and `Real`
    /// reinterprets the raw bits as an IEEE-754 binary64. a zero payload
    /// therefore produces the zero value of every type, which is also
    /// how local variable slots are initialized.
    pub fn new(ptype: PrimitiveType, raw_value: i64) -> Self {
        match ptype {
            PrimitiveType::NoType | PrimitiveType::Void => Value::Void,
            PrimitiveType::Int => Value::Int(raw_value),
            PrimitiveType::Real => Value::Real(f64::from_bits(raw_value as u64)),
            PrimitiveType::Bool => Value::Bool(raw_value & 1 != 0),
        }
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Value::Void => PrimitiveType::Void,
            Value::Bool(_) => PrimitiveType::Bool,
            Value::Int(_) => PrimitiveType::Int,
            Value::Real(_) => PrimitiveType::Real,
        }
    }

    pub fn as_bool(&self) -> Result<bool, InterpreterError> {
        match self {
            Value::Bool(value) => Ok(*value),
            _ => Err(InterpreterError::new(
                "Trying to get bool value of a non-bool constant.",
            )),
        }
    }

    pub fn as_int(&self) -> Result<i64, InterpreterError> {
        match self {
            Value::Int(value) => Ok(*value),
            _ => Err(InterpreterError::new(
                "Trying to get int value of a non-int constant.",
            )),
        }
    }

    pub fn as_real(&self) -> Result<f64, InterpreterError> {
        match self {
            Value::Real(value) => Ok(*value),
            _ => Err(InterpreterError::new(
                "Trying to get real value of a non-real constant.",
            )),
        }
    }

    /// the floating-point value of this object, widening an `Int`
    /// through a value-preserving cast. fails for non-numeric tags.
    pub fn as_numeric_real(&self) -> Result<f64, InterpreterError> {
        match self {
            Value::Real(value) => Ok(*value),
            Value::Int(value) => Ok(*value as f64),
            _ => Err(InterpreterError::new(
                "Trying to get real value of non-numeric constant.",
            )),
        }
    }

    pub fn set_bool(&mut self, new_value: bool) -> Result<(), InterpreterError> {
        match self {
            Value::Bool(value) => {
                *value = new_value;
                Ok(())
            }
            _ => Err(InterpreterError::new(
                "Trying to set bool value of a non-bool constant.",
            )),
        }
    }

    pub fn set_int(&mut self, new_value: i64) -> Result<(), InterpreterError> {
        match self {
            Value::Int(value) => {
                *value = new_value;
                Ok(())
            }
            _ => Err(InterpreterError::new(
                "Trying to set int value of a non-int constant.",
            )),
        }
    }

    pub fn set_real(&mut self, new_value: f64) -> Result<(), InterpreterError> {
        match self {
            Value::Real(value) => {
                *value = new_value;
                Ok(())
            }
            _ => Err(InterpreterError::new(
                "Trying to set real value of a non-real constant.",
            )),
        }
    }

    /// overwrite this slot with another value of the same type.
    pub fn assign(&mut self, new_value: Value) -> Result<(), InterpreterError> {
        if self.primitive_type() != new_value.primitive_type() {
            return Err(InterpreterError::new("Type mismatch in value assignment."));
        }

        *self = new_value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{value::Value, PrimitiveType};

    #[test]
    fn test_value_construction_from_raw() {
        assert_eq!(Value::new(PrimitiveType::Void, 0), Value::Void);
        assert_eq!(Value::new(PrimitiveType::Int, -7), Value::Int(-7));
        assert_eq!(
            Value::new(PrimitiveType::Real, 2.5f64.to_bits() as i64),
            Value::Real(2.5)
        );

        // only the low bit of the payload is significant for bool
        assert_eq!(Value::new(PrimitiveType::Bool, 1), Value::Bool(true));
        assert_eq!(Value::new(PrimitiveType::Bool, 0), Value::Bool(false));
        assert_eq!(Value::new(PrimitiveType::Bool, 2), Value::Bool(false));
        assert_eq!(Value::new(PrimitiveType::Bool, 3), Value::Bool(true));

        // the zero payload is the zero value of every type
        assert_eq!(Value::new(PrimitiveType::Int, 0), Value::Int(0));
        assert_eq!(Value::new(PrimitiveType::Real, 0), Value::Real(0.0));
        assert_eq!(Value::new(PrimitiveType::Bool, 0), Value::Bool(false));
    }

    #[test]
    fn test_typed_accessors_check_the_tag() {
        let bool_value = Value::Bool(true);
        let int_value = Value::Int(11);
        let real_value = Value::Real(3.25);
        let void_value = Value::Void;

        assert_eq!(bool_value.primitive_type(), PrimitiveType::Bool);
        assert_eq!(int_value.primitive_type(), PrimitiveType::Int);
        assert_eq!(real_value.primitive_type(), PrimitiveType::Real);
        assert_eq!(void_value.primitive_type(), PrimitiveType::Void);

        assert_eq!(bool_value.as_bool().unwrap(), true);
        assert_eq!(int_value.as_int().unwrap(), 11);
        assert_eq!(real_value.as_real().unwrap(), 3.25);

        // every mismatched accessor fails
        assert!(bool_value.as_int().is_err());
        assert!(bool_value.as_real().is_err());
        assert!(int_value.as_bool().is_err());
        assert!(int_value.as_real().is_err());
        assert!(real_value.as_bool().is_err());
        assert!(real_value.as_int().is_err());
        assert!(void_value.as_bool().is_err());
        assert!(void_value.as_int().is_err());
        assert!(void_value.as_real().is_err());
    }

    #[test]
    fn test_numeric_widening() {
        assert_eq!(Value::Int(7).as_numeric_real().unwrap(), 7.0);
        assert_eq!(Value::Real(3.5).as_numeric_real().unwrap(), 3.5);
        assert!(Value::Bool(true).as_numeric_real().is_err());
        assert!(Value::Void.as_numeric_real().is_err());
    }

    #[test]
    fn test_scalar_set_checks_the_tag() {
        let mut value = Value::Int(0);
        value.set_int(23).unwrap();
        assert_eq!(value, Value::Int(23));
        assert!(value.set_bool(true).is_err());
        assert!(value.set_real(1.0).is_err());

        let mut value = Value::Real(0.0);
        value.set_real(0.5).unwrap();
        assert_eq!(value, Value::Real(0.5));
        assert!(value.set_int(1).is_err());

        let mut value = Value::Bool(false);
        value.set_bool(true).unwrap();
        assert_eq!(value, Value::Bool(true));
        assert!(value.set_int(1).is_err());
    }

    #[test]
    fn test_assign_requires_matching_tags() {
        let mut slot = Value::Int(1);
        slot.assign(Value::Int(2)).unwrap();
        assert_eq!(slot, Value::Int(2));

        assert!(slot.assign(Value::Real(2.0)).is_err());
        assert!(slot.assign(Value::Bool(false)).is_err());
        assert!(slot.assign(Value::Void).is_err());

        // the slot keeps its old payload after a failed assignment
        assert_eq!(slot, Value::Int(2));
    }
}
