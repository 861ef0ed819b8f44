//! Lexer for FLC source text, built on logos.

use logos::Logos;
use std::ops::Range;

use crate::{Error, Result};

/// Token set of the surface language.
///
/// Number lexemes are kept textually: classification into `i32`/`f64`
/// (by presence of a decimal point) happens during lowering. String
/// literals and the `main` / `|` surface are recognized but take part in
/// no grammar production.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    #[token("print")]
    Print,
    #[token("main")]
    Main,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("let")]
    Let,

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().to_owned())]
    Number(String),

    // Three quoting forms; the triple-quoted form wins over two adjacent
    // double-quoted strings by priority.
    #[regex(r#""""[^"]*""""#, |lex| lex.slice().to_owned(), priority = 4)]
    #[regex(r#""[^"\n]*""#, |lex| lex.slice().to_owned(), priority = 3)]
    #[regex(r"'[^'\n]*'", |lex| lex.slice().to_owned(), priority = 3)]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_owned())]
    Ident(String),

    #[token("==")]
    EqEq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semi,
    #[token("|")]
    Pipe,

    #[token("\n")]
    Newline,
}

/// A token together with its byte span in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize a whole source buffer.
///
/// Fails on the first unrecognized input with the byte offset where it
/// starts.
pub fn lex(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    while let Some(kind) = lexer.next() {
        match kind {
            Ok(kind) => tokens.push(Token {
                kind,
                span: lexer.span(),
            }),
            Err(()) => return Err(Error::Lex(lexer.span().start)),
        }
    }
    Ok(tokens)
}
