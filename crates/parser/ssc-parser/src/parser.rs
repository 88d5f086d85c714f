//! Single-pass recursive descent parser
//!
//! Every production calls into [`Compilation`] as soon as its operands are
//! available, so instructions appear in source order and no tree is built.
//!
//! ```text
//! program    := (statement? (NEWLINE | ';'))* EOF
//! statement  := 'print' (STRING | expr) | IDENT '=' expr
//! expr       := additive (('>' | '<' | '==') additive)*
//! additive   := term (('+' | '-') term)*
//! term       := unary (('*' | '/' | '%' | '^') unary)*
//! unary      := '-' unary | primary
//! primary    := NUMBER | IDENT | '(' expr ')'
//! ```

use crate::error::ParseError;
use crate::lexer::{LexError, Lexer, Token, TokenKind};
use miette::{NamedSource, SourceSpan};
use ssc_codegen::{BinaryOp, Compilation, EmitError, Value};
use tracing::trace;

/// Parser state over one source file
pub struct Parser<'src, 'c> {
    lexer: Lexer<'src>,
    source: &'src str,
    name: String,
    current: Token,
    compilation: &'c mut Compilation,
}

impl<'src, 'c> Parser<'src, 'c> {
    /// Create a parser positioned at the first token
    ///
    /// # Errors
    /// Returns a lexical [`ParseError`] if the first token is malformed
    pub fn new(
        source: &'src str,
        name: impl Into<String>,
        compilation: &'c mut Compilation,
    ) -> Result<Self, ParseError> {
        let mut parser = Self {
            lexer: Lexer::new(source),
            source,
            name: name.into(),
            current: Token {
                kind: TokenKind::Eof,
                span: (0, 0).into(),
            },
            compilation,
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Parse and lower the whole input
    ///
    /// # Errors
    /// Returns the first syntax or emission error; emission stops there
    pub fn parse_program(&mut self) -> Result<(), ParseError> {
        loop {
            match self.current.kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::StatementEnd => self.advance()?,
                _ => {
                    self.statement()?;
                    match self.current.kind {
                        TokenKind::Eof => return Ok(()),
                        TokenKind::StatementEnd => self.advance()?,
                        _ => return Err(self.unexpected("end of statement")),
                    }
                }
            }
        }
    }

    fn statement(&mut self) -> Result<(), ParseError> {
        match self.current.kind.clone() {
            TokenKind::Print => {
                self.advance()?;
                if let TokenKind::Str(text) = &self.current.kind {
                    let text = text.clone();
                    let span = self.current.span;
                    self.advance()?;
                    trace!(%text, "print string");
                    self.emit(span, |c| c.print_literal_string(&text))?;
                } else {
                    let span = self.current.span;
                    let value = self.expression()?;
                    trace!("print number");
                    self.emit(span, |c| c.print_number(value))?;
                }
                Ok(())
            }
            TokenKind::Ident(name) => {
                let span = self.current.span;
                self.advance()?;
                self.expect(&TokenKind::Assign, "`=`")?;
                let value = self.expression()?;
                trace!(%name, "assignment");
                self.emit(span, |c| c.write(&name, value))
            }
            _ => Err(self.unexpected("`print` or an assignment")),
        }
    }

    fn expression(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.additive()?;
        while let Some(symbol) = self.operator(&[">", "<", "=="]) {
            let span = self.current.span;
            self.advance()?;
            let rhs = self.additive()?;
            lhs = self.emit(span, |c| c.binary_op(lhs, rhs, symbol))?;
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.term()?;
        while let Some(symbol) = self.operator(&["+", "-"]) {
            let span = self.current.span;
            self.advance()?;
            let rhs = self.term()?;
            lhs = self.emit(span, |c| c.binary_op(lhs, rhs, symbol))?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(symbol) = self.operator(&["*", "/", "%", "^"]) {
            let span = self.current.span;
            self.advance()?;
            let rhs = self.unary()?;
            lhs = self.emit(span, |c| c.binary_op(lhs, rhs, symbol))?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Value, ParseError> {
        if self.operator(&["-"]).is_none() {
            return self.primary();
        }
        let span = self.current.span;
        self.advance()?;
        if let TokenKind::Number(value) = self.current.kind {
            self.advance()?;
            return Ok(self.compilation.double_constant(-value));
        }
        let operand = self.unary()?;
        self.emit(span, |c| {
            let zero = c.double_constant(0.0);
            c.apply(zero, operand, BinaryOp::Sub)
        })
    }

    fn primary(&mut self) -> Result<Value, ParseError> {
        match self.current.kind.clone() {
            TokenKind::Number(value) => {
                self.advance()?;
                Ok(self.compilation.double_constant(value))
            }
            TokenKind::Ident(name) => {
                let span = self.current.span;
                self.advance()?;
                self.emit(span, |c| c.read(&name))
            }
            TokenKind::LParen => {
                self.advance()?;
                let value = self.expression()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(value)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// The current token's symbol if it is one of `symbols`
    fn operator(&self, symbols: &[&'static str]) -> Option<&'static str> {
        match self.current.kind {
            TokenKind::Op(symbol) if symbols.contains(&symbol) => Some(symbol),
            _ => None,
        }
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<(), ParseError> {
        if &self.current.kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token().map_err(|err| self.lex_error(err))?;
        Ok(())
    }

    fn emit<T>(
        &mut self,
        span: SourceSpan,
        action: impl FnOnce(&mut Compilation) -> Result<T, EmitError>,
    ) -> Result<T, ParseError> {
        action(self.compilation).map_err(|source| ParseError::Emit {
            source,
            span,
            src: self.named_source(),
        })
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        if self.current.kind == TokenKind::Eof {
            ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: (self.source.len(), 0).into(),
                src: self.named_source(),
            }
        } else {
            ParseError::UnexpectedToken {
                token: self.current.kind.describe(),
                expected: expected.to_string(),
                span: self.current.span,
                src: self.named_source(),
            }
        }
    }

    fn lex_error(&self, err: LexError) -> ParseError {
        let src = self.named_source();
        match err {
            LexError::UnexpectedChar { ch, offset } => ParseError::UnexpectedChar {
                ch,
                span: (offset, ch.len_utf8()).into(),
                src,
            },
            LexError::UnterminatedString { start, len } => ParseError::UnterminatedString {
                span: (start, len).into(),
                src,
            },
            LexError::InvalidNumber { text, start } => ParseError::InvalidNumber {
                span: (start, text.len()).into(),
                text,
                src,
            },
        }
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.to_string())
    }
}
