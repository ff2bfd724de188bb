// Copyright (c) 2023 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions,
// more details in file LICENSE and CONTRIBUTING.

use std::io::Write;

use peisik_program::program::{Function, Program};
use peisik_types::{
    internal_function::InternalFunction,
    opcode::{Opcode, MAX_OPCODE_NUMBER},
    value::Value,
    InterpreterError, PrimitiveType, RuntimeError,
};

mod arithmetic;
mod bitwise;
mod comparison;
mod math;

/// per-call activation record.
///
/// the local slots are zero-initialized from the declared local types;
/// the first `parameter_count` of them receive the arguments on entry.
struct StackFrame {
    function_index: i16,
    operand_stack: Vec<Value>,
    locals: Vec<Value>,
    program_counter: usize,
}

impl StackFrame {
    fn new(function: &Function) -> Self {
        let locals = function
            .local_types()
            .iter()
            .map(|local_type| Value::new(*local_type, 0))
            .collect::<Vec<_>>();

        Self {
            function_index: function.function_index(),
            operand_stack: Vec::new(),
            locals,
            program_counter: 0,
        }
    }
}

pub struct Interpreter<'a> {
    program: Program,

    // the call stack, the frame of the executing function is at the end
    stack: Vec<StackFrame>,

    // the shared argument stack of the internal-call dispatch,
    // empty between dispatches
    internal_call_args: Vec<Value>,

    opcode_counts: [usize; MAX_OPCODE_NUMBER],
    trace: bool,
    should_halt: bool,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(program: Program, output: &'a mut dyn Write) -> Self {
        Self {
            program,
            stack: Vec::new(),
            internal_call_args: Vec::new(),
            opcode_counts: [0; MAX_OPCODE_NUMBER],
            trace: false,
            should_halt: false,
            output,
        }
    }

    /// controls whether every executed instruction is written to the
    /// output sink.
    pub fn set_trace(&mut self, value: bool) {
        self.trace = value;
    }

    /// runs the program to completion.
    ///
    /// returns when the main function returns or the program calls
    /// `FailFast`; any structural or domain error aborts execution
    /// immediately and is propagated to the caller.
    pub fn execute(&mut self) -> Result<(), Box<dyn RuntimeError>> {
        let main_function = self.program.function(self.program.main_function_index())?;
        self.stack.push(StackFrame::new(main_function));

        while !self.should_halt {
            self.step()?;
        }

        Ok(())
    }

    /// fetch, count, trace and dispatch a single instruction.
    fn step(&mut self) -> Result<(), Box<dyn RuntimeError>> {
        let frame_count = self.stack.len();
        let frame = match self.stack.last_mut() {
            Some(frame) => frame,
            None => return Err(InterpreterError::new("Call stack is empty.").into()),
        };

        let function = self.program.function(frame.function_index)?;
        let bytecode = function.bytecode();

        if frame.program_counter >= bytecode.len() {
            return Err(InterpreterError::new("Out of bytecode bounds.").into());
        }
        let op = bytecode[frame.program_counter];
        frame.program_counter += 1;

        self.opcode_counts[op.opcode as usize] += 1;
        if self.trace {
            writeln!(
                self.output,
                "* {:>3}:{:<3} {:<12} {}",
                frame.function_index,
                frame.program_counter - 1,
                op.opcode.name(),
                op.param
            )
            .map_err(write_error)?;
        }

        match op.opcode {
            Opcode::PushConst => {
                let constant = self.program.constant(op.param)?;
                frame.operand_stack.push(constant);
            }
            Opcode::PushLocal => {
                let value = frame
                    .locals
                    .get(op.param as usize)
                    .copied()
                    .ok_or_else(|| InterpreterError::new("Local index out of range."))?;
                frame.operand_stack.push(value);
            }
            Opcode::PopLocal => {
                let value = pop_top(&mut frame.operand_stack)?;
                let local = frame
                    .locals
                    .get_mut(op.param as usize)
                    .ok_or_else(|| InterpreterError::new("Local index out of range."))?;
                local.assign(value)?;
            }
            Opcode::PopDiscard => {
                pop_top(&mut frame.operand_stack)?;
            }
            Opcode::Call => {
                let callee = self.program.function(op.param)?;
                let mut callee_frame = StackFrame::new(callee);

                // arguments are evaluated left to right, so they sit on
                // the caller's stack with the last one on top
                let parameter_count = callee.parameter_count() as usize;
                for slot in (0..parameter_count).rev() {
                    let argument = pop_top(&mut frame.operand_stack)?;
                    match callee_frame.locals.get_mut(slot) {
                        Some(local) => *local = argument,
                        None => {
                            return Err(InterpreterError::new("Local index out of range.").into())
                        }
                    }
                }

                // a direct self-call immediately followed by Return is a
                // tail call; reusing the slot of the current frame turns
                // the recursion into a jump. stack traces lose the elided
                // frames, they were of little use anyway.
                let is_tail_call = op.param == frame.function_index
                    && bytecode.get(frame.program_counter).map(|next| next.opcode)
                        == Some(Opcode::Return);
                if is_tail_call {
                    self.stack.pop();
                }
                self.stack.push(callee_frame);
            }
            Opcode::Return => {
                let return_type = function.return_type();
                if frame_count == 1 {
                    // this is the return of the main function; a
                    // non-Void return value is printed before halting
                    if return_type != PrimitiveType::Void {
                        let return_value = match frame.operand_stack.last() {
                            Some(value) => *value,
                            None => {
                                return Err(
                                    InterpreterError::new("Operand stack underflow.").into()
                                )
                            }
                        };
                        write_value(self.output, &return_value)?;
                        writeln!(self.output).map_err(write_error)?;
                    }
                    self.should_halt = true;
                } else if return_type != PrimitiveType::Void {
                    // move the return value onto the caller's stack
                    let return_value = pop_top(&mut frame.operand_stack)?;
                    self.stack.pop();
                    if let Some(caller_frame) = self.stack.last_mut() {
                        caller_frame.operand_stack.push(return_value);
                    }
                } else {
                    self.stack.pop();
                }
            }
            Opcode::Jump => {
                jump_relative(frame, op.param)?;
            }
            Opcode::JumpFalse => {
                let condition = pop_top(&mut frame.operand_stack)?.as_bool()?;
                if !condition {
                    jump_relative(frame, op.param)?;
                }
            }
            Opcode::CallI0
            | Opcode::CallI1
            | Opcode::CallI2
            | Opcode::CallI3
            | Opcode::CallI4
            | Opcode::CallI5
            | Opcode::CallI6
            | Opcode::CallI7 => {
                // the opcode suffix is the number of operands to move;
                // they keep their stack order on the argument stack
                let argument_count = (op.opcode as u16 - Opcode::CallI0 as u16) as usize;
                for _ in 0..argument_count {
                    let argument = pop_top(&mut frame.operand_stack)?;
                    self.internal_call_args.push(argument);
                }

                let call_result = self.dispatch_internal_call(op.param);
                self.internal_call_args.clear();
                let call_result = call_result?;

                if call_result.primitive_type() != PrimitiveType::Void {
                    if let Some(frame) = self.stack.last_mut() {
                        frame.operand_stack.push(call_result);
                    }
                }
            }
            Opcode::Invalid => {
                return Err(InterpreterError::new("Unknown opcode").into());
            }
        }

        Ok(())
    }

    /// invoke the internal function identified by `code` on the
    /// arguments currently on the internal-call argument stack.
    ///
    /// the caller clears the argument stack afterwards.
    fn dispatch_internal_call(&mut self, code: i16) -> Result<Value, Box<dyn RuntimeError>> {
        let function = InternalFunction::from_u16(code as u16).unwrap_or(InternalFunction::Invalid);

        let args = &mut self.internal_call_args;
        match function {
            InternalFunction::Plus => arithmetic::plus(args),
            InternalFunction::Minus => {
                if args.len() == 1 {
                    let value = pop_top(args)?;
                    arithmetic::negate(&value)
                } else if args.len() == 2 {
                    let left = pop_top(args)?;
                    let right = pop_top(args)?;
                    arithmetic::minus(&left, &right)
                } else {
                    Err(InterpreterError::new("- expects 1 or 2 parameters.").into())
                }
            }
            InternalFunction::Multiply => call_two_arg(args, arithmetic::multiply),
            InternalFunction::Divide => call_two_arg(args, arithmetic::divide),
            InternalFunction::FloorDivide => call_two_arg(args, arithmetic::floor_divide),
            InternalFunction::Mod => call_two_arg(args, arithmetic::modulo),
            InternalFunction::Equal => call_two_arg(args, comparison::equal),
            InternalFunction::NotEqual => call_two_arg(args, comparison::not_equal),
            InternalFunction::Less => call_two_arg(args, comparison::less),
            InternalFunction::LessEqual => call_two_arg(args, comparison::less_equal),
            InternalFunction::Greater => call_two_arg(args, comparison::greater),
            InternalFunction::GreaterEqual => call_two_arg(args, comparison::greater_equal),
            InternalFunction::And => call_two_arg(args, bitwise::and),
            InternalFunction::Or => call_two_arg(args, bitwise::or),
            InternalFunction::Not => call_one_arg(args, bitwise::not),
            InternalFunction::Xor => call_two_arg(args, bitwise::xor),
            InternalFunction::Print => {
                // the last moved argument is on top, so popping prints
                // the arguments in their evaluation order
                while let Some(value) = args.pop() {
                    write_value(self.output, &value)?;
                    if !args.is_empty() {
                        write!(self.output, " ").map_err(write_error)?;
                    }
                }
                writeln!(self.output).map_err(write_error)?;
                Ok(Value::Void)
            }
            InternalFunction::FailFast => {
                writeln!(
                    self.output,
                    "The program requested termination by calling FailFast. Stack trace:"
                )
                .map_err(write_error)?;
                // every live frame has fetched at least one instruction,
                // so the program counter points one past the call site
                for frame in self.stack.iter().rev() {
                    writeln!(
                        self.output,
                        "Function {}, instruction {}",
                        frame.function_index,
                        frame.program_counter - 1
                    )
                    .map_err(write_error)?;
                }
                self.should_halt = true;
                Ok(Value::Void)
            }
            InternalFunction::MathAbs => call_one_arg(args, math::abs),
            InternalFunction::MathAcos => call_one_arg(args, math::acos),
            InternalFunction::MathAsin => call_one_arg(args, math::asin),
            InternalFunction::MathAtan => call_one_arg(args, math::atan),
            InternalFunction::MathCeil => call_one_arg(args, math::ceil),
            InternalFunction::MathCos => call_one_arg(args, math::cos),
            InternalFunction::MathExp => call_one_arg(args, math::exp),
            InternalFunction::MathFloor => call_one_arg(args, math::floor),
            InternalFunction::MathLog => call_one_arg(args, math::log),
            InternalFunction::MathPow => call_two_arg(args, math::pow),
            InternalFunction::MathRound => call_one_arg(args, math::round),
            InternalFunction::MathSin => call_one_arg(args, math::sin),
            InternalFunction::MathSqrt => call_one_arg(args, math::sqrt),
            InternalFunction::MathTan => call_one_arg(args, math::tan),
            InternalFunction::Invalid => {
                writeln!(self.output, "Trying to call internal function {}", code)
                    .map_err(write_error)?;
                Err(InterpreterError::new("Unknown internal function.").into())
            }
        }
    }

    /// write the opcode-count report: the total number of executed
    /// instructions, then one line per opcode sorted by hit count.
    pub fn print_op_count(&mut self) -> Result<(), Box<dyn RuntimeError>> {
        // the reserved zero entry is excluded from the report
        let mut sorted_ops = (1..MAX_OPCODE_NUMBER)
            .map(|number| (Opcode::from_u16(number as u16), self.opcode_counts[number]))
            .collect::<Vec<_>>();
        let total = sorted_ops.iter().map(|(_, hits)| hits).sum::<usize>();
        sorted_ops.sort_by(|left, right| right.1.cmp(&left.1));

        writeln!(self.output, "-- Executed opcode count: {}", total).map_err(write_error)?;
        for (opcode, hits) in sorted_ops {
            writeln!(self.output, "{:<12}{}", opcode.name(), hits).map_err(write_error)?;
        }

        Ok(())
    }
}

fn pop_top(operand_stack: &mut Vec<Value>) -> Result<Value, InterpreterError> {
    operand_stack
        .pop()
        .ok_or_else(|| InterpreterError::new("Operand stack underflow."))
}

/// apply the already-incremented program counter adjustment of the
/// `Jump` and `JumpFalse` instructions.
fn jump_relative(frame: &mut StackFrame, delta: i16) -> Result<(), InterpreterError> {
    let target = frame.program_counter as i64 + delta as i64 - 1;
    if target < 0 {
        return Err(InterpreterError::new("Out of bytecode bounds."));
    }

    frame.program_counter = target as usize;
    Ok(())
}

fn call_one_arg(
    args: &mut Vec<Value>,
    function: fn(&Value) -> Result<Value, Box<dyn RuntimeError>>,
) -> Result<Value, Box<dyn RuntimeError>> {
    if args.len() != 1 {
        return Err(InterpreterError::new("The called function expects 1 parameter.").into());
    }

    let value = pop_top(args)?;
    function(&value)
}

fn call_two_arg(
    args: &mut Vec<Value>,
    function: fn(&Value, &Value) -> Result<Value, Box<dyn RuntimeError>>,
) -> Result<Value, Box<dyn RuntimeError>> {
    if args.len() != 2 {
        return Err(InterpreterError::new("The called function expects 2 parameters.").into());
    }

    let left = pop_top(args)?;
    let right = pop_top(args)?;
    function(&left, &right)
}

fn write_value(output: &mut dyn Write, value: &Value) -> Result<(), Box<dyn RuntimeError>> {
    match value {
        Value::Bool(true) => write!(output, "true").map_err(write_error)?,
        Value::Bool(false) => write!(output, "false").map_err(write_error)?,
        Value::Int(int_value) => write!(output, "{}", int_value).map_err(write_error)?,
        // the shortest round-trip decimal form, so that the same program
        // prints the same text on every platform
        Value::Real(real_value) => write!(output, "{}", real_value).map_err(write_error)?,
        Value::Void => {
            return Err(InterpreterError::new("Trying to print a value of type Void.").into());
        }
    }

    Ok(())
}

fn write_error(_: std::io::Error) -> InterpreterError {
    InterpreterError::new("Failed to write to the output stream.")
}
