//! Streaming tokenizer

use miette::SourceSpan;

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Variable name
    Ident(String),
    /// `print`
    Print,
    /// Numeric literal
    Number(f64),
    /// String literal with escapes resolved
    Str(String),
    /// `=`
    Assign,
    /// Binary operator symbol, supported or not
    Op(&'static str),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// Newline or `;`
    StatementEnd,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description for diagnostics
    pub fn describe(&self) -> String {
        match self {
            Self::Ident(name) => name.clone(),
            Self::Print => "print".to_string(),
            Self::Number(value) => value.to_string(),
            Self::Str(text) => format!("\"{text}\""),
            Self::Assign => "=".to_string(),
            Self::Op(symbol) => (*symbol).to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::StatementEnd => "end of statement".to_string(),
            Self::Eof => "end of file".to_string(),
        }
    }
}

/// A token with its byte span
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was lexed
    pub kind: TokenKind,
    /// Byte range in the source
    pub span: SourceSpan,
}

/// Lexical errors, converted into parse errors by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Character that starts no token
    UnexpectedChar { ch: char, offset: usize },
    /// String literal without closing quote
    UnterminatedString { start: usize, len: usize },
    /// Malformed numeric literal
    InvalidNumber { text: String, start: usize },
}

/// Tokenizer over a source string
pub struct Lexer<'src> {
    source: &'src str,
    pos: usize,
}

impl<'src> Lexer<'src> {
    /// Create a lexer at the start of `source`
    pub fn new(source: &'src str) -> Self {
        Self { source, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek_char() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '#' => {
                    while self.peek_char().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
    }

    /// Produce the next token; `Eof` repeats once input is exhausted
    ///
    /// # Errors
    /// Returns a [`LexError`] for malformed input
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match ch {
            '\n' | ';' => TokenKind::StatementEnd,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '+' => TokenKind::Op("+"),
            '-' => TokenKind::Op("-"),
            '*' => TokenKind::Op("*"),
            '/' => TokenKind::Op("/"),
            '>' => TokenKind::Op(">"),
            '<' => TokenKind::Op("<"),
            '%' => TokenKind::Op("%"),
            '^' => TokenKind::Op("^"),
            '=' if self.peek_char() == Some('=') => {
                self.bump();
                TokenKind::Op("==")
            }
            '=' => TokenKind::Assign,
            '"' => return self.string(start),
            c if c.is_ascii_digit() || (c == '.' && self.peek_char().is_some_and(|n| n.is_ascii_digit())) => {
                return self.number(start);
            }
            c if c.is_alphabetic() || c == '_' => {
                while self.peek_char().is_some_and(|n| n.is_alphanumeric() || n == '_') {
                    self.bump();
                }
                match &self.source[start..self.pos] {
                    "print" => TokenKind::Print,
                    name => TokenKind::Ident(name.to_string()),
                }
            }
            other => {
                return Err(LexError::UnexpectedChar {
                    ch: other,
                    offset: start,
                });
            }
        };
        Ok(self.token(kind, start))
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: (start, self.pos - start).into(),
        }
    }

    fn number(&mut self, start: usize) -> Result<Token, LexError> {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let exp_digit = match self.peek_second() {
                Some('+' | '-') => self.source[self.pos..].chars().nth(2),
                other => other,
            };
            if exp_digit.is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.bump();
                }
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
            }
        }
        let text = &self.source[start..self.pos];
        match text.parse::<f64>() {
            Ok(value) => Ok(self.token(TokenKind::Number(value), start)),
            Err(_) => Err(LexError::InvalidNumber {
                text: text.to_string(),
                start,
            }),
        }
    }

    fn string(&mut self, start: usize) -> Result<Token, LexError> {
        let mut text = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(LexError::UnterminatedString {
                        start,
                        len: self.pos - start,
                    });
                }
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => {
                        return Err(LexError::UnterminatedString {
                            start,
                            len: self.pos - start,
                        });
                    }
                },
                Some(other) => text.push(other),
            }
        }
        Ok(self.token(TokenKind::Str(text), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push(token.kind);
        }
    }

    #[test]
    fn test_assignment_tokens() {
        assert_eq!(
            kinds("x = 3.5 + y2"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(3.5),
                TokenKind::Op("+"),
                TokenKind::Ident("y2".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators_and_statement_ends() {
        assert_eq!(
            kinds("a == b; c % d\n"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Op("=="),
                TokenKind::Ident("b".to_string()),
                TokenKind::StatementEnd,
                TokenKind::Ident("c".to_string()),
                TokenKind::Op("%"),
                TokenKind::Ident("d".to_string()),
                TokenKind::StatementEnd,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("1e3"), vec![TokenKind::Number(1000.0)]);
        assert_eq!(kinds(".5"), vec![TokenKind::Number(0.5)]);
        assert_eq!(kinds("2.5E-1"), vec![TokenKind::Number(0.25)]);
        assert_eq!(
            kinds("2e"),
            vec![TokenKind::Number(2.0), TokenKind::Ident("e".to_string())]
        );
    }

    #[test]
    fn test_print_string_with_escapes() {
        assert_eq!(
            kinds(r#"print "say \"hi\"\n""#),
            vec![TokenKind::Print, TokenKind::Str("say \"hi\"\n".to_string())]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("# setup\nx = 1 # trailing"),
            vec![
                TokenKind::StatementEnd,
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_errors() {
        let mut lexer = Lexer::new("\"open");
        assert_eq!(
            lexer.next_token().unwrap_err(),
            LexError::UnterminatedString { start: 0, len: 5 }
        );

        let mut lexer = Lexer::new("1.2.3");
        assert_eq!(
            lexer.next_token().unwrap_err(),
            LexError::InvalidNumber {
                text: "1.2.3".to_string(),
                start: 0
            }
        );

        let mut lexer = Lexer::new("@");
        assert_eq!(
            lexer.next_token().unwrap_err(),
            LexError::UnexpectedChar { ch: '@', offset: 0 }
        );
    }
}
