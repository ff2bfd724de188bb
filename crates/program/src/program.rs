// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

use peisik_binary::module_image::ModuleImage;
use peisik_types::{opcode::BytecodeOp, value::Value, InterpreterError, PrimitiveType};

/// a single function of the program image.
#[derive(Debug, PartialEq)]
pub struct Function {
    function_index: i16,
    return_type: PrimitiveType,
    parameter_count: i16,
    local_types: Vec<PrimitiveType>,
    bytecode: Vec<BytecodeOp>,
}

impl Function {
    /// the position of this function in the function table.
    pub fn function_index(&self) -> i16 {
        self.function_index
    }

    pub fn return_type(&self) -> PrimitiveType {
        self.return_type
    }

    pub fn parameter_count(&self) -> i16 {
        self.parameter_count
    }

    /// the declared types of all local variable slots. the first
    /// `parameter_count` entries belong to the parameters.
    pub fn local_types(&self) -> &[PrimitiveType] {
        &self.local_types
    }

    pub fn bytecode(&self) -> &[BytecodeOp] {
        &self.bytecode
    }
}

/// the immutable program image executed by the interpreter.
///
/// built once from a loaded module; the function at position `i` of the
/// function table has function index `i`, which is exactly what the
/// `Call` instruction parameter refers to.
#[derive(Debug, PartialEq)]
pub struct Program {
    main_function_index: i16,
    constants: Vec<Value>,
    functions: Vec<Function>,
}

impl Program {
    pub fn new(image: ModuleImage) -> Self {
        let functions = image
            .functions
            .into_iter()
            .enumerate()
            .map(|(index, entry)| Function {
                function_index: index as i16,
                return_type: entry.return_type,
                parameter_count: entry.parameter_count,
                local_types: entry.local_types,
                bytecode: entry.bytecode,
            })
            .collect::<Vec<_>>();

        Self {
            main_function_index: image.main_function_index,
            constants: image.constants,
            functions,
        }
    }

    pub fn constant(&self, index: i16) -> Result<Value, InterpreterError> {
        if index < 0 || index as usize >= self.constants.len() {
            return Err(InterpreterError::new("Constant index out of range."));
        }

        Ok(self.constants[index as usize])
    }

    pub fn constant_count(&self) -> i16 {
        self.constants.len() as i16
    }

    pub fn function(&self, index: i16) -> Result<&Function, InterpreterError> {
        if index < 0 || index as usize >= self.functions.len() {
            return Err(InterpreterError::new("Function index out of range."));
        }

        Ok(&self.functions[index as usize])
    }

    pub fn function_count(&self) -> i16 {
        self.functions.len() as i16
    }

    pub fn main_function_index(&self) -> i16 {
        self.main_function_index
    }
}
