//! Recursive-descent parser building the AST from the token stream.
//!
//! Statement separators (newlines and `;`) may appear in any number
//! between statements. The first syntax error aborts the parse.

use crate::ast::{ArithOp, CmpOp, Expr, Program, Stmt};
use crate::lexer::{Token, TokenKind};
use crate::{Error, Result};

/// Parse a token stream into a program.
pub fn parse(tokens: &[Token]) -> Result<Program> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_program()
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl Parser<'_> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut body = Vec::new();
        self.skip_separators();
        while self.peek().is_some() {
            body.push(self.parse_stmt()?);
            self.skip_separators();
        }
        Ok(Program { body })
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.peek() {
            Some(TokenKind::Let) => self.parse_let(),
            Some(TokenKind::Print) => self.parse_print(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            _ => Err(self.unexpected("a statement")),
        }
    }

    fn parse_let(&mut self) -> Result<Stmt> {
        self.advance(); // `let`
        let name = self.expect_ident()?;
        self.expect(&TokenKind::Assign, "`=`")?;
        let value = self.parse_expr()?;
        Ok(Stmt::Let { name, value })
    }

    fn parse_print(&mut self) -> Result<Stmt> {
        self.advance(); // `print`
        self.expect(&TokenKind::LParen, "`(`")?;
        let value = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(Stmt::Print(value))
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.advance(); // `if`
        self.expect(&TokenKind::LParen, "`(`")?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        let then_body = self.parse_block()?;
        let else_body = if self.check(&TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.advance(); // `while`
        self.expect(&TokenKind::LParen, "`(`")?;
        let condition = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "`)`")?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.skip_separators();
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut body = Vec::new();
        self.skip_separators();
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_stmt()?);
            self.skip_separators();
        }
        self.advance(); // `}`
        Ok(body)
    }

    // ── Expressions, lowest precedence first ──

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_addsub()?;
        while let Some(spelling) = self.peek().and_then(cmp_spelling) {
            self.advance();
            let op = CmpOp::try_from(spelling)?;
            let rhs = self.parse_addsub()?;
            lhs = Expr::Comparison {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_addsub(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_muldiv()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => ArithOp::Add,
                Some(TokenKind::Minus) => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_muldiv()?;
            lhs = Expr::Arith {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_muldiv(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => ArithOp::Mul,
                Some(TokenKind::Slash) => ArithOp::Div,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Arith {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(TokenKind::Number(lexeme)) => {
                self.advance();
                Ok(Expr::Number(lexeme))
            }
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(Expr::Variable(name))
            }
            Some(TokenKind::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            Some(TokenKind::Str(_)) => Err(Error::Parse(format!(
                "string literals are not supported in expressions (byte {})",
                self.offset()
            ))),
            _ => Err(self.unexpected("an expression")),
        }
    }

    // ── Token stream helpers ──

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn expect(&mut self, kind: &TokenKind, describe: &str) -> Result<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(describe))
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.peek().cloned() {
            Some(TokenKind::Ident(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// Newlines and semicolons separate statements but carry no meaning.
    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(TokenKind::Newline | TokenKind::Semi)) {
            self.advance();
        }
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or_else(|| self.tokens.last().map_or(0, |t| t.span.end), |t| t.span.start)
    }

    fn unexpected(&self, expected: &str) -> Error {
        match self.tokens.get(self.pos) {
            Some(token) => Error::Parse(format!(
                "expected {expected}, found {:?} at byte {}",
                token.kind, token.span.start
            )),
            None => Error::Parse(format!("expected {expected}, found end of input")),
        }
    }
}

/// Source spelling of a relational token, if it is one.
fn cmp_spelling(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Lt => Some("<"),
        TokenKind::Le => Some("<="),
        TokenKind::EqEq => Some("=="),
        TokenKind::Ne => Some("!="),
        TokenKind::Ge => Some(">="),
        TokenKind::Gt => Some(">"),
        _ => None,
    }
}
