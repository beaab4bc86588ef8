//! AST → IR lowering.
//!
//! By the time a program reaches this stage it has already passed
//! semantic analysis, so lowering is infallible: every name is bound,
//! every type checks, and there is nothing left for this stage to
//! reject.

use indexmap::IndexMap;

use mcc_par::ast::{self, BinOp, Expr, Stmt, UnOp};

use crate::ir::{BasicBlock, BinOpcode, Instruction, IrFunction, IrProgram, Operand, UnOpcode};

pub struct IrGenerator {
    label_counter: usize,
    entry_counter: usize,
    temp_counter: usize,
    blocks: IndexMap<String, BasicBlock>,
    current: BasicBlock,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self {
            label_counter: 0,
            entry_counter: 0,
            temp_counter: 0,
            blocks: IndexMap::new(),
            current: BasicBlock::new("unused"),
        }
    }

    pub fn generate(&mut self, program: &ast::Program) -> IrProgram {
        let functions = program
            .functions
            .iter()
            .map(|f| self.generate_function(f))
            .collect();
        IrProgram { functions }
    }

    fn generate_function(&mut self, function: &ast::Function) -> IrFunction {
        self.temp_counter = 0;
        self.blocks = IndexMap::new();
        let entry = self.new_entry_label();
        self.current = BasicBlock::new(entry.clone());

        for stmt in &function.body {
            self.lower_stmt(stmt);
        }
        self.finish_block();

        IrFunction {
            name: function.name.clone(),
            params: function.params.iter().map(|p| p.name.clone()).collect(),
            entry,
            blocks: std::mem::take(&mut self.blocks),
        }
    }

    fn new_entry_label(&mut self) -> String {
        let n = self.entry_counter;
        self.entry_counter += 1;
        format!("entry_{}", n)
    }

    fn next_label_index(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    fn new_temp(&mut self) -> Operand {
        let name = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        Operand::Temp(name)
    }

    fn emit(&mut self, instruction: Instruction) {
        self.current.instructions.push(instruction);
    }

    /// Pushes the current block and opens a fresh one under `label`.
    /// Blocks are emitted in the order they're opened, never reordered.
    fn start_block(&mut self, label: String) {
        self.finish_block();
        self.current = BasicBlock::new(label);
    }

    fn finish_block(&mut self) {
        let block = std::mem::replace(&mut self.current, BasicBlock::new("unused"));
        self.blocks.insert(block.label.clone(), block);
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl {
                ty,
                name,
                initializer,
                ..
            } => {
                let value = match initializer {
                    Some(expr) => self.lower_expr(expr),
                    None => default_value(*ty),
                };
                self.emit(Instruction::Assign {
                    result: Operand::Var(name.clone()),
                    value,
                });
            }
            Stmt::Assign { name, value, .. } => {
                let value = self.lower_expr(value);
                self.emit(Instruction::Assign {
                    result: Operand::Var(name.clone()),
                    value,
                });
            }
            Stmt::Return { value, .. } => {
                let value = value.as_ref().map(|expr| self.lower_expr(expr));
                self.emit(Instruction::Return { value });
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => self.lower_if(cond, then_branch, else_branch),
            Stmt::While { cond, body, .. } => self.lower_while(cond, body),
        }
    }

    fn lower_if(&mut self, cond: &Expr, then_branch: &[Stmt], else_branch: &[Stmt]) {
        let idx = self.next_label_index();
        let then_label = format!("if_then_{}", idx);
        let else_label = format!("if_else_{}", idx);
        let end_label = format!("if_end_{}", idx);

        let cond_value = self.lower_expr(cond);
        self.emit(Instruction::JumpIfNot {
            cond: cond_value,
            target: else_label.clone(),
        });
        self.emit(Instruction::Jump {
            target: then_label.clone(),
        });

        self.start_block(then_label);
        for stmt in then_branch {
            self.lower_stmt(stmt);
        }
        self.emit(Instruction::Jump {
            target: end_label.clone(),
        });

        self.start_block(else_label);
        for stmt in else_branch {
            self.lower_stmt(stmt);
        }
        self.emit(Instruction::Jump {
            target: end_label.clone(),
        });

        self.start_block(end_label);
    }

    fn lower_while(&mut self, cond: &Expr, body: &[Stmt]) {
        let idx = self.next_label_index();
        let cond_label = format!("while_cond_{}", idx);
        let body_label = format!("while_body_{}", idx);
        let end_label = format!("while_end_{}", idx);

        self.emit(Instruction::Jump {
            target: cond_label.clone(),
        });

        self.start_block(cond_label.clone());
        let cond_value = self.lower_expr(cond);
        self.emit(Instruction::JumpIfNot {
            cond: cond_value,
            target: end_label.clone(),
        });
        self.emit(Instruction::Jump {
            target: body_label.clone(),
        });

        self.start_block(body_label);
        for stmt in body {
            self.lower_stmt(stmt);
        }
        self.emit(Instruction::Jump {
            target: cond_label,
        });

        self.start_block(end_label);
    }

    fn lower_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::IntLiteral { value, .. } => {
                let result = self.new_temp();
                self.emit(Instruction::Assign {
                    result: result.clone(),
                    value: Operand::Const(*value),
                });
                result
            }
            Expr::StringLiteral { value, .. } => {
                let result = self.new_temp();
                self.emit(Instruction::Assign {
                    result: result.clone(),
                    value: Operand::StringConst(value.clone()),
                });
                result
            }
            Expr::Identifier { name, .. } => Operand::Var(name.clone()),
            Expr::Unary { op, operand, .. } => {
                let operand = self.lower_expr(operand);
                let result = self.new_temp();
                self.emit(Instruction::Unary {
                    op: lower_unop(*op),
                    result: result.clone(),
                    operand,
                });
                result
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                let lhs = self.lower_expr(left);
                let rhs = self.lower_expr(right);
                let result = self.new_temp();
                self.emit(Instruction::Binary {
                    op: lower_binop(*op),
                    result: result.clone(),
                    lhs,
                    rhs,
                });
                result
            }
        }
    }
}

impl Default for IrGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn default_value(ty: ast::Type) -> Operand {
    match ty {
        ast::Type::Int => Operand::Const(0),
        ast::Type::Str => Operand::StringConst(String::new()),
        ast::Type::Void => Operand::Const(0),
    }
}

fn lower_unop(op: UnOp) -> UnOpcode {
    match op {
        UnOp::Neg => UnOpcode::Neg,
        UnOp::Not => UnOpcode::Not,
    }
}

fn lower_binop(op: BinOp) -> BinOpcode {
    match op {
        BinOp::Add => BinOpcode::Add,
        BinOp::Sub => BinOpcode::Sub,
        BinOp::Mul => BinOpcode::Mul,
        BinOp::Div => BinOpcode::Div,
        BinOp::Eq => BinOpcode::Eq,
        BinOp::NotEq => BinOpcode::NotEq,
        BinOp::Lt => BinOpcode::Lt,
        BinOp::Gt => BinOpcode::Gt,
        BinOp::Le => BinOpcode::Le,
        BinOp::Ge => BinOpcode::Ge,
    }
}

pub fn generate(program: &ast::Program) -> IrProgram {
    IrGenerator::new().generate(program)
}
