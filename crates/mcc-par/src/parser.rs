//! Recursive-descent parser.
//!
//! Each grammar production gets its own named method rather than a
//! generic Pratt/binding-power loop: the grammar is small and fixed, and
//! the explicit layering (`comparison` → `term` → `factor` → `primary`)
//! reads directly off the precedence table.
//!
//! Error handling is minimal by design: on a syntax error the parser
//! records the error and synchronizes to the next `;`, but only at
//! statement boundaries. A malformed expression inside a statement is
//! not partially recovered from.

use mcc_lex::{Token, TokenKind};
use mcc_util::{CompileError, Result, Span, Stage};

use crate::ast::{BinOp, Expr, Function, Param, Program, Stmt, Type, UnOp};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Program> {
        self.program()
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {}, found {:?}", what, self.current().kind)))
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::new(Stage::Parse, message, self.current_span())
    }

    /// Advances to the next `;` (consuming it) or EOF. Used only when
    /// recovering from a bad statement, never inside expression parsing.
    fn synchronize(&mut self) {
        loop {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::EndOfFile => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    // program := { function } EOF
    fn program(&mut self) -> Result<Program> {
        let mut functions = Vec::new();
        self.skip_newlines();
        while !self.check(&TokenKind::EndOfFile) {
            functions.push(self.function()?);
            self.skip_newlines();
        }
        Ok(Program { functions })
    }

    // function := type_ IDENTIFIER "(" params ")" block
    fn function(&mut self) -> Result<Function> {
        let start = self.current_span();
        let return_type = self.type_()?;
        let name = self.identifier_name()?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.params()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.skip_newlines();
        let body = self.block()?;
        Ok(Function {
            name,
            return_type,
            params,
            body,
            span: start,
        })
    }

    // params := [ param { "," param } ]
    fn params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();
        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }
        params.push(self.param()?);
        while self.check(&TokenKind::Comma) {
            self.advance();
            params.push(self.param()?);
        }
        Ok(params)
    }

    // param := type_ IDENTIFIER
    fn param(&mut self) -> Result<Param> {
        let ty = self.type_()?;
        let name = self.identifier_name()?;
        Ok(Param { ty, name })
    }

    // type_ := "int" | "void" | "string"
    fn type_(&mut self) -> Result<Type> {
        let ty = match self.current().kind {
            TokenKind::Int => Type::Int,
            TokenKind::Void => Type::Void,
            TokenKind::Str => Type::Str,
            _ => return Err(self.error("expected a type")),
        };
        self.advance();
        Ok(ty)
    }

    fn identifier_name(&mut self) -> Result<String> {
        match self.current().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("expected an identifier")),
        }
    }

    // block := "{" { NEWLINE } { stmt } "}"
    fn block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::EndOfFile) {
            stmts.push(self.stmt());
            self.skip_newlines();
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        // stmt() only records via synchronize() on error; collect here so
        // a single malformed statement doesn't abort the whole block.
        let mut resolved = Vec::with_capacity(stmts.len());
        for s in stmts {
            resolved.push(s?);
        }
        Ok(resolved)
    }

    fn stmt(&mut self) -> Result<Stmt> {
        let result = match self.current().kind {
            TokenKind::Int | TokenKind::Void | TokenKind::Str => self.var_decl(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Identifier(_) => self.assign(),
            _ => Err(self.error(format!("unexpected token {:?}", self.current().kind))),
        };
        if result.is_err() {
            self.synchronize();
        }
        result
    }

    // var_decl := type_ IDENTIFIER [ "=" expr ] ";"
    fn var_decl(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        let ty = self.type_()?;
        let name = self.identifier_name()?;
        let initializer = if self.check(&TokenKind::Assign) {
            self.advance();
            Some(self.expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::VarDecl {
            ty,
            name,
            initializer,
            span: start,
        })
    }

    // assign := IDENTIFIER "=" expr ";"
    fn assign(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        let name = self.identifier_name()?;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.expr()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Assign {
            name,
            value,
            span: start,
        })
    }

    // return_stmt := "return" [ expr ] ";"
    fn return_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.advance();
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Return { value, span: start })
    }

    /// Parens around the condition are optional and, if present,
    /// discarded; they carry no grammatical meaning.
    fn condition(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::LParen) {
            self.advance();
            let cond = self.expr()?;
            self.expect(TokenKind::RParen, "')'")?;
            Ok(cond)
        } else {
            self.expr()
        }
    }

    // if_stmt := "if" condition block [ "else" block ]
    fn if_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.advance();
        let cond = self.condition()?;
        self.skip_newlines();
        let then_branch = self.block()?;
        let mut else_branch = Vec::new();
        let save = self.pos;
        self.skip_newlines();
        if self.check(&TokenKind::Else) {
            self.advance();
            self.skip_newlines();
            else_branch = self.block()?;
        } else {
            self.pos = save;
        }
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
            span: start,
        })
    }

    // while_stmt := "while" condition block
    fn while_stmt(&mut self) -> Result<Stmt> {
        let start = self.current_span();
        self.advance();
        let cond = self.condition()?;
        self.skip_newlines();
        let body = self.block()?;
        Ok(Stmt::While {
            cond,
            body,
            span: start,
        })
    }

    // expr := comparison
    fn expr(&mut self) -> Result<Expr> {
        self.comparison()
    }

    // comparison := term { ("==" | "!=" | "<" | ">" | "<=" | ">=") term }
    fn comparison(&mut self) -> Result<Expr> {
        let mut left = self.term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Eq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Ge => BinOp::Ge,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.term()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // term := factor { ("+" | "-") factor }
    fn term(&mut self) -> Result<Expr> {
        let mut left = self.factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.factor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // factor := primary { ("*" | "/") primary }
    fn factor(&mut self) -> Result<Expr> {
        let mut left = self.primary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            let span = left.span();
            self.advance();
            let right = self.primary()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    // primary := INT | STRING | IDENTIFIER | "-" primary | "!" primary
    //          | "(" expr ")"
    fn primary(&mut self) -> Result<Expr> {
        let start = self.current_span();
        match self.current().kind.clone() {
            TokenKind::IntLiteral(value) => {
                self.advance();
                Ok(Expr::IntLiteral { value, span: start })
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                Ok(Expr::StringLiteral { value, span: start })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier { name, span: start })
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.primary()?;
                Ok(Expr::Unary {
                    op: UnOp::Neg,
                    operand: Box::new(operand),
                    span: start,
                })
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.primary()?;
                Ok(Expr::Unary {
                    op: UnOp::Not,
                    operand: Box::new(operand),
                    span: start,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(self.error(format!("unexpected token {:?} in expression", other))),
        }
    }
}

pub fn parse(tokens: Vec<Token>) -> Result<Program> {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcc_lex::tokenize;

    fn parse_src(src: &str) -> Result<Program> {
        parse(tokenize(src).unwrap())
    }

    #[test]
    fn parses_empty_function() {
        let prog = parse_src("void main() {\n}\n").unwrap();
        assert_eq!(prog.functions.len(), 1);
        assert_eq!(prog.functions[0].name, "main");
        assert_eq!(prog.functions[0].return_type, Type::Void);
        assert!(prog.functions[0].params.is_empty());
        assert!(prog.functions[0].body.is_empty());
    }

    #[test]
    fn parses_params() {
        let prog = parse_src("int add(int a, int b) {\n    return a + b;\n}\n").unwrap();
        let f = &prog.functions[0];
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.params[0].name, "a");
        assert_eq!(f.params[1].name, "b");
    }

    #[test]
    fn parses_var_decl_with_initializer() {
        let prog = parse_src("void main() {\n    int x = 5;\n}\n").unwrap();
        match &prog.functions[0].body[0] {
            Stmt::VarDecl {
                ty,
                name,
                initializer,
                ..
            } => {
                assert_eq!(*ty, Type::Int);
                assert_eq!(name, "x");
                assert!(initializer.is_some());
            }
            other => panic!("expected VarDecl, got {:?}", other),
        }
    }

    #[test]
    fn precedence_groups_mul_before_add() {
        let prog = parse_src("void main() {\n    int x = 1 + 2 * 3;\n}\n").unwrap();
        match &prog.functions[0].body[0] {
            Stmt::VarDecl {
                initializer: Some(Expr::Binary { op, right, .. }),
                ..
            } => {
                assert_eq!(*op, BinOp::Add);
                assert!(matches!(**right, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected binary add, got {:?}", other),
        }
    }

    #[test]
    fn if_without_else_leaves_else_branch_empty() {
        let prog = parse_src("void main() {\n    if x < 1 {\n        return;\n    }\n}\n").unwrap();
        match &prog.functions[0].body[0] {
            Stmt::If { else_branch, .. } => assert!(else_branch.is_empty()),
            other => panic!("expected If, got {:?}", other),
        }
    }

    #[test]
    fn if_with_else() {
        let prog = parse_src(
            "void main() {\n    if x < 1 {\n        return;\n    } else {\n        return;\n    }\n}\n",
        )
        .unwrap();
        match &prog.functions[0].body[0] {
            Stmt::If { else_branch, .. } => assert_eq!(else_branch.len(), 1),
            other => panic!("expected If, got {:?}", other),
        }
    }

    #[test]
    fn parenthesized_condition_is_accepted() {
        let prog = parse_src("void main() {\n    while (x < 1) {\n        x = x + 1;\n    }\n}\n")
            .unwrap();
        assert!(matches!(prog.functions[0].body[0], Stmt::While { .. }));
    }

    #[test]
    fn missing_semicolon_is_a_parse_error() {
        assert!(parse_src("void main() {\n    int x = 5\n}\n").is_err());
    }

    #[test]
    fn unary_operators() {
        let prog = parse_src("void main() {\n    int x = -5;\n    int y = !0;\n}\n").unwrap();
        assert!(matches!(
            prog.functions[0].body[0],
            Stmt::VarDecl {
                initializer: Some(Expr::Unary { op: UnOp::Neg, .. }),
                ..
            }
        ));
        assert!(matches!(
            prog.functions[0].body[1],
            Stmt::VarDecl {
                initializer: Some(Expr::Unary { op: UnOp::Not, .. }),
                ..
            }
        ));
    }
}
