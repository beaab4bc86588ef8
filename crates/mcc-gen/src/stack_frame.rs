//! Stack-slot assignment.
//!
//! There is no register allocator: every variable and temporary lives in
//! its own 8-byte stack slot for the whole function. Offsets are
//! assigned in two passes: parameters in declaration order, then every
//! remaining name sorted ascending, so the layout is a pure function of
//! the IR and never depends on emission order.

use std::collections::HashMap;

use mcc_ir::ir::{Instruction, IrFunction, Operand};

#[derive(Debug)]
pub struct StackFrame {
    offsets: HashMap<String, i32>,
    next_offset: i32,
    frame_size: i32,
}

impl StackFrame {
    pub fn build(function: &IrFunction) -> Self {
        let mut offsets = HashMap::new();
        let mut offset: i32 = 0;

        for param in &function.params {
            offset -= 8;
            offsets.insert(param.clone(), offset);
        }

        let mut locals: Vec<String> = collect_names(function)
            .into_iter()
            .filter(|name| !offsets.contains_key(name))
            .collect();
        locals.sort();
        for name in locals {
            offset -= 8;
            offsets.insert(name, offset);
        }

        let frame_size = round_to_16((-offset) as u32) as i32;
        Self {
            offsets,
            next_offset: offset,
            frame_size,
        }
    }

    pub fn frame_size(&self) -> i32 {
        self.frame_size
    }

    /// Returns the `[rbp - N]` offset for `name`, allocating a fresh slot
    /// past the precomputed frame if it was never seen during the scan.
    pub fn get_loc(&mut self, name: &str) -> i32 {
        if let Some(&offset) = self.offsets.get(name) {
            return offset;
        }
        self.next_offset -= 8;
        let offset = self.next_offset;
        self.offsets.insert(name.to_string(), offset);
        self.frame_size = round_to_16((-offset) as u32) as i32;
        offset
    }
}

fn round_to_16(n: u32) -> u32 {
    (n + 15) & !15
}

fn collect_names(function: &IrFunction) -> Vec<String> {
    let mut names = Vec::new();
    for block in function.blocks.values() {
        for instr in &block.instructions {
            collect_instruction_names(instr, &mut names);
        }
    }
    names
}

fn collect_operand_name(operand: &Operand, names: &mut Vec<String>) {
    match operand {
        Operand::Var(name) | Operand::Temp(name) => names.push(name.clone()),
        Operand::Const(_) | Operand::StringConst(_) => {}
    }
}

fn collect_instruction_names(instr: &Instruction, names: &mut Vec<String>) {
    match instr {
        Instruction::Binary {
            result, lhs, rhs, ..
        } => {
            collect_operand_name(result, names);
            collect_operand_name(lhs, names);
            collect_operand_name(rhs, names);
        }
        Instruction::Unary {
            result, operand, ..
        } => {
            collect_operand_name(result, names);
            collect_operand_name(operand, names);
        }
        Instruction::Assign { result, value } => {
            collect_operand_name(result, names);
            collect_operand_name(value, names);
        }
        Instruction::JumpIf { cond, .. } | Instruction::JumpIfNot { cond, .. } => {
            collect_operand_name(cond, names);
        }
        Instruction::Jump { .. } => {}
        Instruction::Return { value } => {
            if let Some(value) = value {
                collect_operand_name(value, names);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use mcc_ir::ir::BasicBlock;

    fn function_with(params: Vec<&str>, instructions: Vec<Instruction>) -> IrFunction {
        let mut block = BasicBlock::new("entry_0");
        block.instructions = instructions;
        let mut blocks = IndexMap::new();
        blocks.insert("entry_0".to_string(), block);
        IrFunction {
            name: "f".to_string(),
            params: params.into_iter().map(String::from).collect(),
            entry: "entry_0".to_string(),
            blocks,
        }
    }

    #[test]
    fn params_are_assigned_before_locals() {
        let f = function_with(
            vec!["a", "b"],
            vec![Instruction::Assign {
                result: Operand::Var("x".to_string()),
                value: Operand::Const(1),
            }],
        );
        let mut frame = StackFrame::build(&f);
        assert_eq!(frame.get_loc("a"), -8);
        assert_eq!(frame.get_loc("b"), -16);
        assert_eq!(frame.get_loc("x"), -24);
    }

    #[test]
    fn frame_size_rounds_to_16() {
        let f = function_with(vec!["a"], vec![]);
        let frame = StackFrame::build(&f);
        assert_eq!(frame.frame_size(), 16);
    }

    #[test]
    fn locals_are_ordered_ascending_by_name() {
        let f = function_with(
            vec![],
            vec![
                Instruction::Assign {
                    result: Operand::Var("z".to_string()),
                    value: Operand::Const(1),
                },
                Instruction::Assign {
                    result: Operand::Var("a".to_string()),
                    value: Operand::Const(2),
                },
            ],
        );
        let mut frame = StackFrame::build(&f);
        assert_eq!(frame.get_loc("a"), -8);
        assert_eq!(frame.get_loc("z"), -16);
    }

    #[test]
    fn unknown_name_gets_a_lazily_allocated_slot() {
        let f = function_with(vec!["a"], vec![]);
        let mut frame = StackFrame::build(&f);
        assert_eq!(frame.get_loc("a"), -8);
        assert_eq!(frame.get_loc("ghost"), -16);
        assert_eq!(frame.frame_size(), 16);
    }
}
