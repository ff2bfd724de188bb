// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

// the "module binary" layout (all fields little-endian):
//
//              |------------------------------------------------------|
//              | magic number (u32) "PEIS"                            |
//              | bytecode version (u32), must equal 6                 |
//              | main function index (u32, used as i16)               |
//              |------------------------------------------------------|
//              | constant count (i32)                                 |
//   const 0 -> | type tag (i16) | name (6 bytes, discarded)           |
//              | raw value (i64, interpreted per type tag)            |
//              | ...                                                  |
//              |------------------------------------------------------|
//              | function count (i32), at most 32768                  |
//    func 0 -> | return type (i16) | parameter count (i16)            |
//              | local count (i16, includes the parameters)           |
//              | local types (i16 each)                               |
//              | padding (2 bytes, only when local count is odd)      |
//              | code size (i32)                                      |
//              | instructions (opcode i16 + parameter i16 each)       |
//              | ...                                                  |
//              |------------------------------------------------------|
//
// the loader checks the header, the counts and every type tag, and
// rejects the `NoType` sentinel. it deliberately does NOT validate
// opcode numbers, parameter meanings, control-flow targets or stack
// effects, those are enforced dynamically by the interpreter.

use peisik_types::{
    opcode::{BytecodeOp, Opcode},
    value::Value,
    PrimitiveType,
};

use crate::BinaryError;

pub const MAGIC_NUMBER: u32 = 0x53494550; // "PEIS" read as a little-endian u32
pub const BYTECODE_VERSION: u32 = 6;
pub const MAX_FUNCTION_COUNT: i32 = 32768;

// constants carry a fixed-width UTF-8 name for the compiler's benefit,
// the interpreter discards it
const CONSTANT_NAME_LENGTH: usize = 6;

/// a function deserialized from a module binary.
///
/// the function table index is not stored in the binary; it is assigned
/// from the table position when the program image is built.
#[derive(Debug, PartialEq)]
pub struct FunctionEntry {
    pub return_type: PrimitiveType,
    pub parameter_count: i16,
    pub local_types: Vec<PrimitiveType>,
    pub bytecode: Vec<BytecodeOp>,
}

/// the deserialized form of a module binary.
#[derive(Debug, PartialEq)]
pub struct ModuleImage {
    pub main_function_index: i16,
    pub constants: Vec<Value>,
    pub functions: Vec<FunctionEntry>,
}

impl ModuleImage {
    pub fn load(binary: &[u8]) -> Result<ModuleImage, BinaryError> {
        let mut reader = ModuleReader::new(binary);

        let magic = reader.read_u32()?;
        if magic != MAGIC_NUMBER {
            return Err(BinaryError::new("Not a compiled Peisik file."));
        }

        let version = reader.read_u32()?;
        if version != BYTECODE_VERSION {
            return Err(BinaryError::new("Wrong bytecode version."));
        }

        let main_function_index = reader.read_u32()? as i16;

        let constant_count = reader.read_i32()?;
        if constant_count < 0 {
            return Err(BinaryError::new("Constant count less than 0."));
        }

        let mut constants = Vec::new();
        for _ in 0..constant_count {
            let ptype = read_primitive_type(&mut reader)?;
            reader.read_bytes(CONSTANT_NAME_LENGTH)?;
            let raw_value = reader.read_i64()?;
            constants.push(Value::new(ptype, raw_value));
        }

        let function_count = reader.read_i32()?;
        if function_count < 0 {
            return Err(BinaryError::new("Function count less than 0."));
        }
        if function_count > MAX_FUNCTION_COUNT {
            return Err(BinaryError::new("Too many functions."));
        }

        let mut functions = Vec::new();
        for _ in 0..function_count {
            functions.push(read_function(&mut reader)?);
        }

        if main_function_index < 0 || main_function_index as i32 >= function_count {
            return Err(BinaryError::new("Main function index out of range."));
        }

        Ok(ModuleImage {
            main_function_index,
            constants,
            functions,
        })
    }
}

fn read_function(reader: &mut ModuleReader) -> Result<FunctionEntry, BinaryError> {
    let return_type = read_primitive_type(reader)?;

    let parameter_count = reader.read_i16()?;
    if parameter_count < 0 {
        return Err(BinaryError::new("Parameter count less than 0."));
    }

    let local_count = reader.read_i16()?;
    if local_count < 0 {
        return Err(BinaryError::new("Local count less than 0."));
    }

    let mut local_types = Vec::with_capacity(local_count as usize);
    for _ in 0..local_count {
        local_types.push(read_primitive_type(reader)?);
    }

    // an odd-length local type list is padded back to 4-byte alignment
    if local_count % 2 == 1 {
        reader.read_bytes(2)?;
    }

    let code_size = reader.read_i32()?;
    if code_size < 0 {
        return Err(BinaryError::new("Code size less than 0."));
    }

    let mut bytecode = Vec::new();
    for _ in 0..code_size {
        let opcode = Opcode::from_u16(reader.read_i16()? as u16);
        let param = reader.read_i16()?;
        bytecode.push(BytecodeOp::new(opcode, param));
    }

    Ok(FunctionEntry {
        return_type,
        parameter_count,
        local_types,
        bytecode,
    })
}

fn read_primitive_type(reader: &mut ModuleReader) -> Result<PrimitiveType, BinaryError> {
    let tag = reader.read_i16()?;
    PrimitiveType::from_u16(tag as u16).ok_or_else(|| BinaryError::new("Invalid constant type."))
}

/// a cursor over the raw module bytes.
struct ModuleReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ModuleReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn read_bytes(&mut self, length: usize) -> Result<&'a [u8], BinaryError> {
        let end = self.offset + length;
        if end > self.data.len() {
            return Err(BinaryError::new("Unexpected end of file."));
        }

        let bytes = &self.data[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_i16(&mut self) -> Result<i16, BinaryError> {
        let bytes = self.read_bytes(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, BinaryError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, BinaryError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i64(&mut self) -> Result<i64, BinaryError> {
        let bytes = self.read_bytes(8)?;
        Ok(i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }
}
