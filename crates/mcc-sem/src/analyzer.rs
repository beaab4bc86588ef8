//! Name resolution and type checking.
//!
//! Types are inferred directly off each expression's shape. There is no
//! unification or generalization step, since the type system is closed
//! to three members (`int`, `void`, `string`).

use rustc_hash::FxHashMap;

use mcc_par::ast::{BinOp, Expr, Function, Program, Stmt, Type, UnOp};
use mcc_util::{CompileError, Result, Stage};

use crate::scope::ScopeStack;

#[derive(Clone)]
struct Signature {
    params: Vec<Type>,
    return_type: Type,
}

pub struct SemanticAnalyzer {
    functions: FxHashMap<String, Signature>,
    scopes: ScopeStack,
    current_return_type: Type,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            functions: FxHashMap::default(),
            scopes: ScopeStack::new(),
            current_return_type: Type::Void,
        }
    }

    pub fn analyze(&mut self, program: &Program) -> Result<()> {
        for function in &program.functions {
            self.register_function(function)?;
        }
        for function in &program.functions {
            self.check_function(function)?;
        }
        Ok(())
    }

    fn register_function(&mut self, function: &Function) -> Result<()> {
        if self.functions.contains_key(&function.name) {
            return Err(CompileError::new(
                Stage::Semantic,
                format!("function '{}' is already defined", function.name),
                function.span,
            ));
        }
        self.functions.insert(
            function.name.clone(),
            Signature {
                params: function.params.iter().map(|p| p.ty).collect(),
                return_type: function.return_type,
            },
        );
        Ok(())
    }

    fn check_function(&mut self, function: &Function) -> Result<()> {
        self.current_return_type = function.return_type;
        self.scopes.push();
        for param in &function.params {
            if !self.scopes.declare(&param.name, param.ty) {
                self.scopes.pop();
                return Err(CompileError::new(
                    Stage::Semantic,
                    format!(
                        "parameter '{}' is already declared in function '{}'",
                        param.name, function.name
                    ),
                    function.span,
                ));
            }
        }
        let result = self.check_block(&function.body);
        self.scopes.pop();
        result
    }

    fn check_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::VarDecl {
                ty,
                name,
                initializer,
                span,
            } => {
                if *ty == Type::Void {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!("variable '{}' cannot be declared void", name),
                        *span,
                    ));
                }
                if let Some(init) = initializer {
                    let init_ty = self.infer_type(init)?;
                    if init_ty != *ty {
                        return Err(CompileError::new(
                            Stage::Semantic,
                            format!(
                                "cannot initialize '{}' of type {} with value of type {}",
                                name, ty, init_ty
                            ),
                            init.span(),
                        ));
                    }
                }
                if !self.scopes.declare(name, *ty) {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!("'{}' is already declared in this scope", name),
                        *span,
                    ));
                }
                Ok(())
            }
            Stmt::Assign { name, value, span } => {
                let declared = self.scopes.lookup(name).ok_or_else(|| {
                    CompileError::new(
                        Stage::Semantic,
                        format!("assignment to undeclared variable '{}'", name),
                        *span,
                    )
                })?;
                // Unreachable given VarDecl rejects `void` up front; kept
                // as a defensive check.
                if declared == Type::Void {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!("cannot assign to void variable '{}'", name),
                        *span,
                    ));
                }
                let value_ty = self.infer_type(value)?;
                if value_ty != declared {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!(
                            "cannot assign value of type {} to '{}' of type {}",
                            value_ty, name, declared
                        ),
                        value.span(),
                    ));
                }
                Ok(())
            }
            Stmt::Return { value, span } => match (value, self.current_return_type) {
                (None, Type::Void) => Ok(()),
                (None, expected) => Err(CompileError::new(
                    Stage::Semantic,
                    format!("function must return a value of type {}", expected),
                    *span,
                )),
                (Some(expr), Type::Void) => Err(CompileError::new(
                    Stage::Semantic,
                    "void function must not return a value".to_string(),
                    expr.span(),
                )),
                (Some(expr), expected) => {
                    let actual = self.infer_type(expr)?;
                    if actual != expected {
                        return Err(CompileError::new(
                            Stage::Semantic,
                            format!("expected return type {}, found {}", expected, actual),
                            expr.span(),
                        ));
                    }
                    Ok(())
                }
            },
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.check_condition(cond)?;
                self.scopes.push();
                let then_result = self.check_block(then_branch);
                self.scopes.pop();
                then_result?;
                self.scopes.push();
                let else_result = self.check_block(else_branch);
                self.scopes.pop();
                else_result
            }
            Stmt::While { cond, body, .. } => {
                self.check_condition(cond)?;
                self.scopes.push();
                let result = self.check_block(body);
                self.scopes.pop();
                result
            }
        }
    }

    fn check_condition(&mut self, cond: &Expr) -> Result<()> {
        let ty = self.infer_type(cond)?;
        if ty != Type::Int {
            return Err(CompileError::new(
                Stage::Semantic,
                format!("condition must be of type int, found {}", ty),
                cond.span(),
            ));
        }
        Ok(())
    }

    fn infer_type(&self, expr: &Expr) -> Result<Type> {
        match expr {
            Expr::IntLiteral { .. } => Ok(Type::Int),
            Expr::StringLiteral { .. } => Ok(Type::Str),
            Expr::Identifier { name, span } => self.scopes.lookup(name).ok_or_else(|| {
                CompileError::new(
                    Stage::Semantic,
                    format!("use of undeclared identifier '{}'", name),
                    *span,
                )
            }),
            Expr::Unary { op, operand, span } => {
                let operand_ty = self.infer_type(operand)?;
                if operand_ty != Type::Int {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!(
                            "operator '{}' requires an int operand, found {}",
                            unop_symbol(*op),
                            operand_ty
                        ),
                        *span,
                    ));
                }
                Ok(Type::Int)
            }
            Expr::Binary {
                left, op, right, ..
            } => {
                let left_ty = self.infer_type(left)?;
                let right_ty = self.infer_type(right)?;
                if left_ty != Type::Int || right_ty != Type::Int {
                    return Err(CompileError::new(
                        Stage::Semantic,
                        format!(
                            "operator '{}' requires int operands, found {} and {}",
                            binop_symbol(*op),
                            left_ty,
                            right_ty
                        ),
                        expr.span(),
                    ));
                }
                Ok(Type::Int)
            }
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn unop_symbol(op: UnOp) -> &'static str {
    match op {
        UnOp::Neg => "-",
        UnOp::Not => "!",
    }
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
    }
}

pub fn analyze(program: &Program) -> Result<()> {
    SemanticAnalyzer::new().analyze(program)
}
