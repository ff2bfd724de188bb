// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

//! helpers for composing module binaries.
//!
//! the compiler is the real producer of module binaries; these helpers
//! exist so that unit tests can build small fixtures without carrying
//! pre-compiled files around.

use peisik_types::{
    internal_function::InternalFunction,
    opcode::{BytecodeOp, Opcode},
    value::Value,
    PrimitiveType,
};

use crate::module_image::{FunctionEntry, ModuleImage, BYTECODE_VERSION, MAGIC_NUMBER};

/// a builder for bytecode sequences.
pub struct BytecodeWriter {
    ops: Vec<BytecodeOp>,
}

#[allow(clippy::new_without_default)]
impl BytecodeWriter {
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// append an instruction without a meaningful parameter.
    pub fn write_opcode(mut self, opcode: Opcode) -> Self {
        self.ops.push(BytecodeOp::new(opcode, 0));
        self
    }

    /// append an instruction with a parameter.
    pub fn write_opcode_i16(mut self, opcode: Opcode, param: i16) -> Self {
        self.ops.push(BytecodeOp::new(opcode, param));
        self
    }

    /// append a `CallIx` instruction invoking an internal function.
    pub fn write_internal_call(mut self, opcode: Opcode, function: InternalFunction) -> Self {
        self.ops.push(BytecodeOp::new(opcode, function as u16 as i16));
        self
    }

    pub fn to_ops(self) -> Vec<BytecodeOp> {
        self.ops
    }
}

/// serialize a module with a single function, which is also the main
/// function. the local type list includes the parameters.
pub fn build_module_binary_with_single_function(
    return_type: PrimitiveType,
    parameter_count: i16,
    local_types: Vec<PrimitiveType>,
    bytecode: Vec<BytecodeOp>,
    constants: Vec<Value>,
) -> Vec<u8> {
    build_module_binary(
        0,
        constants,
        vec![FunctionEntry {
            return_type,
            parameter_count,
            local_types,
            bytecode,
        }],
    )
}

/// serialize a complete module binary.
pub fn build_module_binary(
    main_function_index: i16,
    constants: Vec<Value>,
    functions: Vec<FunctionEntry>,
) -> Vec<u8> {
    let image = ModuleImage {
        main_function_index,
        constants,
        functions,
    };
    save_module_image(&image)
}

/// the inverse of `ModuleImage::load`.
pub fn save_module_image(image: &ModuleImage) -> Vec<u8> {
    let mut buffer = Vec::new();

    buffer.extend_from_slice(&MAGIC_NUMBER.to_le_bytes());
    buffer.extend_from_slice(&BYTECODE_VERSION.to_le_bytes());
    buffer.extend_from_slice(&(image.main_function_index as u16 as u32).to_le_bytes());

    buffer.extend_from_slice(&(image.constants.len() as i32).to_le_bytes());
    for constant in &image.constants {
        buffer.extend_from_slice(&(constant.primitive_type() as u16 as i16).to_le_bytes());
        buffer.extend_from_slice(&[0u8; 6]); // the unused constant name
        buffer.extend_from_slice(&constant_raw_value(constant).to_le_bytes());
    }

    buffer.extend_from_slice(&(image.functions.len() as i32).to_le_bytes());
    for function in &image.functions {
        buffer.extend_from_slice(&(function.return_type as u16 as i16).to_le_bytes());
        buffer.extend_from_slice(&function.parameter_count.to_le_bytes());
        buffer.extend_from_slice(&(function.local_types.len() as i16).to_le_bytes());
        for local_type in &function.local_types {
            buffer.extend_from_slice(&(*local_type as u16 as i16).to_le_bytes());
        }
        if function.local_types.len() % 2 == 1 {
            buffer.extend_from_slice(&[0u8; 2]);
        }

        buffer.extend_from_slice(&(function.bytecode.len() as i32).to_le_bytes());
        for op in &function.bytecode {
            buffer.extend_from_slice(&(op.opcode as u16 as i16).to_le_bytes());
            buffer.extend_from_slice(&op.param.to_le_bytes());
        }
    }

    buffer
}

/// the raw 64-bit payload a constant is stored as.
fn constant_raw_value(value: &Value) -> i64 {
    match value {
        Value::Void => 0,
        Value::Bool(value) => *value as i64,
        Value::Int(value) => *value,
        Value::Real(value) => value.to_bits() as i64,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use peisik_types::{
        internal_function::InternalFunction,
        opcode::{BytecodeOp, Opcode},
        value::Value,
        PrimitiveType,
    };

    use crate::{
        module_image::ModuleImage,
        utils::{build_module_binary_with_single_function, BytecodeWriter},
    };

    #[test]
    fn test_bytecode_writer() {
        let ops = BytecodeWriter::new()
            .write_opcode_i16(Opcode::PushConst, 1)
            .write_internal_call(Opcode::CallI2, InternalFunction::Plus)
            .write_opcode(Opcode::Return)
            .to_ops();

        assert_eq!(
            ops,
            vec![
                BytecodeOp::new(Opcode::PushConst, 1),
                BytecodeOp::new(Opcode::CallI2, InternalFunction::Plus as u16 as i16),
                BytecodeOp::new(Opcode::Return, 0),
            ]
        );
    }

    #[test]
    fn test_module_binary_round_trip() {
        let code = BytecodeWriter::new()
            .write_opcode_i16(Opcode::PushConst, 0)
            .write_opcode_i16(Opcode::PopLocal, 0)
            .write_opcode(Opcode::Return)
            .to_ops();

        let binary = build_module_binary_with_single_function(
            PrimitiveType::Void,
            0,
            vec![PrimitiveType::Real],
            code.clone(),
            vec![Value::Real(-0.25)],
        );

        let image = ModuleImage::load(&binary).unwrap();
        assert_eq!(image.main_function_index, 0);
        assert_eq!(image.constants, vec![Value::Real(-0.25)]);
        assert_eq!(image.functions[0].return_type, PrimitiveType::Void);
        assert_eq!(image.functions[0].local_types, vec![PrimitiveType::Real]);
        assert_eq!(image.functions[0].bytecode, code);
    }
}
