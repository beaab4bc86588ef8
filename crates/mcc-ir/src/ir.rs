//! The intermediate representation.
//!
//! A tagged `Operand` stands in for a plain result/operand1/operand2
//! string field; it carries the same information (temporary, variable,
//! or literal) without the caller having to parse a name to tell them
//! apart, while round-tripping to the identical text a naive
//! string-based encoding would produce.

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Temp(String),
    Var(String),
    Const(i64),
    StringConst(String),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Temp(name) | Operand::Var(name) => f.write_str(name),
            Operand::Const(value) => write!(f, "{}", value),
            Operand::StringConst(value) => write!(f, "{:?}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpcode {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Binary {
        op: BinOpcode,
        result: Operand,
        lhs: Operand,
        rhs: Operand,
    },
    Unary {
        op: UnOpcode,
        result: Operand,
        operand: Operand,
    },
    Assign {
        result: Operand,
        value: Operand,
    },
    Jump {
        target: String,
    },
    JumpIf {
        cond: Operand,
        target: String,
    },
    JumpIfNot {
        cond: Operand,
        target: String,
    },
    Return {
        value: Option<Operand>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }
}

/// Ordered by insertion; codegen emits blocks in the order the
/// generator created them, never alphabetically or by label.
#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<String>,
    pub entry: String,
    pub blocks: IndexMap<String, BasicBlock>,
}

impl IrFunction {
    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.get(label)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IrProgram {
    pub functions: Vec<IrFunction>,
}
