//! Lexer for recipe text.

use std::fmt;

use crate::{Result, StemshiftError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of ASCII letters and digits.
    Word(String),
    /// `->`
    Arrow,
    /// `;`
    Semicolon,
    /// `save(` with no space between the keyword and the parenthesis.
    SaveOpen,
    LParen,
    RParen,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word(word) => f.write_str(word),
            TokenKind::Arrow => f.write_str("->"),
            TokenKind::Semicolon => f.write_str(";"),
            TokenKind::SaveOpen => f.write_str("save("),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Eof => f.write_str("end of recipe"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

impl Token {
    /// Builds a syntax error pointing at this token.
    pub fn error(&self, message: impl Into<String>) -> StemshiftError {
        StemshiftError::Syntax {
            line: self.line,
            col: self.col,
            message: message.into(),
            fragment: self.kind.to_string(),
        }
    }
}

/// Splits recipe text into tokens. The returned vector always ends with a
/// single [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(&c) = self.chars.peek() {
            let (line, col) = (self.line, self.col);
            let kind = match c {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                c if c.is_ascii_alphanumeric() => self.word(),
                '-' => {
                    self.bump();
                    if self.chars.peek() == Some(&'>') {
                        self.bump();
                        TokenKind::Arrow
                    } else {
                        return Err(StemshiftError::Syntax {
                            line,
                            col,
                            message: "expected `->`".to_string(),
                            fragment: "-".to_string(),
                        });
                    }
                }
                ';' => {
                    self.bump();
                    TokenKind::Semicolon
                }
                '(' => {
                    self.bump();
                    TokenKind::LParen
                }
                ')' => {
                    self.bump();
                    TokenKind::RParen
                }
                other => {
                    return Err(StemshiftError::Syntax {
                        line,
                        col,
                        message: "unexpected character".to_string(),
                        fragment: other.to_string(),
                    });
                }
            };
            self.tokens.push(Token { kind, line, col });
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            line: self.line,
            col: self.col,
        });
        Ok(self.tokens)
    }

    fn word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(&c) = self.chars.peek() {
            if !c.is_ascii_alphanumeric() {
                break;
            }
            word.push(c);
            self.bump();
        }

        if word == "save" && self.chars.peek() == Some(&'(') {
            self.bump();
            return TokenKind::SaveOpen;
        }
        TokenKind::Word(word)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }
}
