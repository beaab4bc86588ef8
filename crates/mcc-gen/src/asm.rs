//! IR → x86-64 NASM text emission.
//!
//! There is no register allocator: every operand not already holding an
//! immediate is read from and written to its stack slot through `rax`
//! (and `rcx` for the rare second scratch register `idiv` needs). Blocks
//! are emitted in IR order with an explicit jump out of every block;
//! nothing falls through implicitly, even when the next block in the
//! listing is also the jump target.

use std::fmt::Write as _;

use indexmap::IndexMap;

use mcc_ir::ir::{BinOpcode, Instruction, IrFunction, IrProgram, Operand, UnOpcode};

use crate::error::Result;
use crate::stack_frame::StackFrame;

/// System V AMD64 integer argument registers. MC functions are never
/// called with more than six arguments in practice (the grammar doesn't
/// forbid it, but extra parameters are silently left unbound, a
/// consequence of the fixed-width register ABI this generator targets).
const ARG_REGISTERS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

pub struct AsmGenerator {
    output: String,
    string_pool: IndexMap<String, String>,
}

impl AsmGenerator {
    pub fn new() -> Self {
        Self {
            output: String::new(),
            string_pool: IndexMap::new(),
        }
    }

    pub fn generate(&mut self, program: &IrProgram) -> Result<String> {
        self.collect_strings(program);

        self.output.push_str("section .text\n");
        self.output.push_str("global _start\n\n");

        for function in &program.functions {
            self.generate_function(function)?;
            self.output.push('\n');
        }

        self.generate_start();

        if !self.string_pool.is_empty() {
            self.generate_data_section();
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn collect_strings(&mut self, program: &IrProgram) {
        for function in &program.functions {
            for block in function.blocks.values() {
                for instr in &block.instructions {
                    self.collect_strings_in_instruction(instr);
                }
            }
        }
    }

    fn collect_strings_in_instruction(&mut self, instr: &Instruction) {
        let mut note = |operand: &Operand, pool: &mut IndexMap<String, String>| {
            if let Operand::StringConst(value) = operand {
                if !pool.contains_key(value) {
                    let label = format!("str_{}", pool.len());
                    pool.insert(value.clone(), label);
                }
            }
        };
        match instr {
            Instruction::Assign { value, .. } => note(value, &mut self.string_pool),
            Instruction::Return { value: Some(value) } => note(value, &mut self.string_pool),
            _ => {}
        }
    }

    fn generate_start(&mut self) {
        self.output.push_str("_start:\n");
        self.output.push_str("    call main\n");
        self.output.push_str("    mov rdi, rax\n");
        self.output.push_str("    mov rax, 60\n");
        self.output.push_str("    syscall\n");
    }

    fn generate_data_section(&mut self) {
        self.output.push_str("\nsection .data\n");
        for (value, label) in &self.string_pool {
            let bytes: Vec<String> = value.bytes().map(|b| b.to_string()).collect();
            let _ = writeln!(self.output, "{}: db {}, 0", label, bytes.join(", "));
        }
    }

    fn generate_function(&mut self, function: &IrFunction) -> Result<()> {
        let mut frame = StackFrame::build(function);
        // Pre-size the frame before emitting the prologue: the stack
        // slots touched by instruction lowering are exactly the ones the
        // scan already found, so this pass only reads offsets.
        let frame_size = frame.frame_size();

        let _ = writeln!(self.output, "{}:", function.name);
        self.output.push_str("    push rbp\n");
        self.output.push_str("    mov rbp, rsp\n");
        if frame_size > 0 {
            let _ = writeln!(self.output, "    sub rsp, {}", frame_size);
        }

        for (i, param) in function.params.iter().enumerate().take(ARG_REGISTERS.len()) {
            let offset = frame.get_loc(param);
            let _ = writeln!(self.output, "    mov [rbp{}], {}", offset, ARG_REGISTERS[i]);
        }

        for block in function.blocks.values() {
            let _ = writeln!(self.output, "{}_{}:", function.name, block.label);
            for instr in &block.instructions {
                self.generate_instruction(function, &mut frame, instr)?;
            }
        }

        let _ = writeln!(self.output, "{}_epilogue:", function.name);
        self.output.push_str("    leave\n");
        self.output.push_str("    ret\n");
        Ok(())
    }

    fn operand_str(&self, frame: &mut StackFrame, operand: &Operand) -> String {
        match operand {
            Operand::Const(value) => value.to_string(),
            Operand::Var(name) | Operand::Temp(name) => {
                format!("[rbp{}]", frame.get_loc(name))
            }
            Operand::StringConst(value) => self
                .string_pool
                .get(value)
                .expect("string constant collected during the prior scan")
                .clone(),
        }
    }

    fn jump_target(&self, function: &IrFunction, target: &str) -> String {
        format!("{}_{}", function.name, target)
    }

    fn generate_instruction(
        &mut self,
        function: &IrFunction,
        frame: &mut StackFrame,
        instr: &Instruction,
    ) -> Result<()> {
        match instr {
            Instruction::Binary {
                op, result, lhs, rhs,
            } => self.generate_binary(frame, *op, result, lhs, rhs),
            Instruction::Unary {
                op,
                result,
                operand,
            } => self.generate_unary(frame, *op, result, operand),
            Instruction::Assign { result, value } => {
                self.load_into_rax(frame, value);
                self.store_rax(frame, result);
            }
            Instruction::Jump { target } => {
                let _ = writeln!(self.output, "    jmp {}", self.jump_target(function, target));
            }
            Instruction::JumpIf { cond, target } => {
                self.load_into_rax(frame, cond);
                self.output.push_str("    cmp rax, 0\n");
                let _ = writeln!(self.output, "    jne {}", self.jump_target(function, target));
            }
            Instruction::JumpIfNot { cond, target } => {
                self.load_into_rax(frame, cond);
                self.output.push_str("    cmp rax, 0\n");
                let _ = writeln!(self.output, "    je {}", self.jump_target(function, target));
            }
            Instruction::Return { value } => {
                if let Some(value) = value {
                    self.load_into_rax(frame, value);
                }
                let _ = writeln!(self.output, "    jmp {}_epilogue", function.name);
            }
        }
        Ok(())
    }

    fn load_into_rax(&mut self, frame: &mut StackFrame, operand: &Operand) {
        match operand {
            Operand::StringConst(value) => {
                let label = self
                    .string_pool
                    .get(value)
                    .expect("string constant collected during the prior scan")
                    .clone();
                let _ = writeln!(self.output, "    lea rax, [rel {}]", label);
            }
            other => {
                let src = self.operand_str(frame, other);
                let _ = writeln!(self.output, "    mov rax, {}", src);
            }
        }
    }

    fn store_rax(&mut self, frame: &mut StackFrame, result: &Operand) {
        let dst = self.operand_str(frame, result);
        let _ = writeln!(self.output, "    mov {}, rax", dst);
    }

    fn generate_binary(
        &mut self,
        frame: &mut StackFrame,
        op: BinOpcode,
        result: &Operand,
        lhs: &Operand,
        rhs: &Operand,
    ) {
        if op == BinOpcode::Div {
            self.load_into_rax(frame, lhs);
            self.output.push_str("    cqo\n");
            let rhs_str = self.operand_str(frame, rhs);
            let _ = writeln!(self.output, "    mov rcx, {}", rhs_str);
            self.output.push_str("    idiv rcx\n");
            self.store_rax(frame, result);
            return;
        }

        self.load_into_rax(frame, lhs);
        let rhs_str = self.operand_str(frame, rhs);
        match op {
            BinOpcode::Add => {
                let _ = writeln!(self.output, "    add rax, {}", rhs_str);
            }
            BinOpcode::Sub => {
                let _ = writeln!(self.output, "    sub rax, {}", rhs_str);
            }
            BinOpcode::Mul => {
                let _ = writeln!(self.output, "    imul rax, {}", rhs_str);
            }
            BinOpcode::Div => unreachable!("handled above"),
            BinOpcode::Eq | BinOpcode::NotEq | BinOpcode::Lt | BinOpcode::Gt | BinOpcode::Le
            | BinOpcode::Ge => {
                let _ = writeln!(self.output, "    cmp rax, {}", rhs_str);
                let set = match op {
                    BinOpcode::Eq => "sete",
                    BinOpcode::NotEq => "setne",
                    BinOpcode::Lt => "setl",
                    BinOpcode::Gt => "setg",
                    BinOpcode::Le => "setle",
                    BinOpcode::Ge => "setge",
                    _ => unreachable!(),
                };
                let _ = writeln!(self.output, "    {} al", set);
                self.output.push_str("    movzx rax, al\n");
            }
        }
        self.store_rax(frame, result);
    }

    fn generate_unary(
        &mut self,
        frame: &mut StackFrame,
        op: UnOpcode,
        result: &Operand,
        operand: &Operand,
    ) {
        self.load_into_rax(frame, operand);
        match op {
            UnOpcode::Neg => self.output.push_str("    neg rax\n"),
            UnOpcode::Not => {
                self.output.push_str("    cmp rax, 0\n");
                self.output.push_str("    sete al\n");
                self.output.push_str("    movzx rax, al\n");
            }
        }
        self.store_rax(frame, result);
    }
}

impl Default for AsmGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn generate(program: &IrProgram) -> Result<String> {
    AsmGenerator::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_ir::generate as generate_ir;
    use mcc_lex::tokenize;
    use mcc_par::parse;

    fn generate_asm(src: &str) -> String {
        let program = parse(tokenize(src).unwrap()).unwrap();
        let ir = generate_ir(&program);
        generate(&ir).unwrap()
    }

    #[test]
    fn emits_preamble_and_start() {
        let asm = generate_asm("void main() {\n}\n");
        assert!(asm.contains("section .text"));
        assert!(asm.contains("global _start"));
        assert!(asm.contains("_start:"));
        assert!(asm.contains("call main"));
    }

    #[test]
    fn function_gets_prologue_and_epilogue() {
        let asm = generate_asm("void main() {\n}\n");
        assert!(asm.contains("main:"));
        assert!(asm.contains("push rbp"));
        assert!(asm.contains("mov rbp, rsp"));
        assert!(asm.contains("main_epilogue:"));
        assert!(asm.contains("leave"));
    }

    #[test]
    fn parameters_are_copied_from_argument_registers() {
        let asm = generate_asm("int add(int a, int b) {\n    return a + b;\n}\n");
        assert!(asm.contains("mov [rbp-8], rdi"));
        assert!(asm.contains("mov [rbp-16], rsi"));
    }

    #[test]
    fn division_uses_idiv_with_sign_extension() {
        let asm = generate_asm("void main() {\n    int x = 10 / 2;\n}\n");
        assert!(asm.contains("cqo"));
        assert!(asm.contains("idiv rcx"));
    }

    #[test]
    fn string_constants_land_in_the_data_section() {
        let asm = generate_asm("void main() {\n    string s = \"hi\";\n}\n");
        assert!(asm.contains("section .data"));
        assert!(asm.contains("str_0: db 104, 105, 0"));
        assert!(asm.contains("lea rax, [rel str_0]"));
    }

    #[test]
    fn if_blocks_use_conventional_label_prefixes_qualified_by_function_name() {
        let asm = generate_asm("void main() {\n    if 1 {\n        return;\n    }\n}\n");
        assert!(asm.contains("main_if_then_0:"));
        assert!(asm.contains("main_if_else_0:"));
        assert!(asm.contains("main_if_end_0:"));
    }

    #[test]
    fn comparisons_lower_to_setcc_and_zero_extend() {
        let asm = generate_asm("void main() {\n    int x = 1 < 2;\n}\n");
        assert!(asm.contains("setl al"));
        assert!(asm.contains("movzx rax, al"));
    }
}
