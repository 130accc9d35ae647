//! Recursive-descent parser for recipes.
//!
//! ```text
//! program := expr (";" expr)* ";"?
//! expr    := source ("->" action)* "->" sink
//! sink    := "drop" | "save(" IDENT ")" | IDENT
//! ```
//!
//! The parser enforces the shape of the program (terminators, connectors,
//! keyword-only action slots, save groups) and tags every slot with a typed
//! [`Term`]. Whether the first slot really is a source and the last slot
//! really is a sink is left to the compiler, which reports those cases with
//! their own error kinds.

use std::fmt;

use super::{
    classify::{self, Lexeme, TokenClass},
    token::{tokenize, Token, TokenKind},
};
use crate::{actions::Action, Result};

/// One typed slot of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Source(String),
    Action(Action),
    Connector,
    Drop,
    /// Inner identifiers of `save(..)`.
    Save(Vec<String>),
    /// Plain identifier in the sink slot.
    Ident(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Source(name) | Term::Ident(name) => f.write_str(name),
            Term::Action(action) => write!(f, "{action}"),
            Term::Connector => f.write_str(classify::CONNECTOR),
            Term::Drop => f.write_str(classify::DROP),
            Term::Save(names) => write!(f, "{}{}{}", classify::SAVE_OPEN, names.join(" "), classify::SAVE_CLOSE),
        }
    }
}

/// The terms between two statement terminators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub terms: Vec<Term>,
    pub line: usize,
    pub col: usize,
}

impl Expression {
    /// Builds an expression that did not come from recipe text.
    pub fn new(terms: Vec<Term>) -> Self {
        Self {
            terms,
            line: 0,
            col: 0,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Parses recipe text into expressions, in declaration order.
pub fn parse(source: &str) -> Result<Vec<Expression>> {
    Parser::new(tokenize(source)?).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Vec<Expression>> {
        if self.is_at_end() {
            return Err(self.peek().error("expected at least one expression"));
        }

        let mut expressions = Vec::new();

        loop {
            expressions.push(self.parse_expression()?);

            match self.peek().kind {
                TokenKind::Semicolon => {
                    self.advance();
                    if self.is_at_end() {
                        break;
                    }
                }
                TokenKind::Eof => break,
                _ => return Err(self.peek().error("expected `->` or `;`")),
            }
        }

        Ok(expressions)
    }

    fn parse_expression(&mut self) -> Result<Expression> {
        let (line, col) = (self.peek().line, self.peek().col);

        let mut slots = vec![self.parse_slot()?];
        while self.check(&TokenKind::Arrow) {
            self.advance();
            slots.push(self.parse_slot()?);
        }

        let last = slots.len() - 1;
        let mut terms = Vec::with_capacity(slots.len() * 2);
        for (index, (class, token)) in slots.into_iter().enumerate() {
            if index > 0 {
                terms.push(Term::Connector);
            }

            let term = match class {
                // Any identifier may name a source, keywords included.
                TokenClass::Name(name) if index == 0 => Term::Source(name),
                TokenClass::Action(action) if index == 0 => {
                    Term::Source(action.keyword().to_string())
                }
                TokenClass::Drop if index == 0 => Term::Source(classify::DROP.to_string()),
                TokenClass::Name(name) if index == last => Term::Ident(name),
                TokenClass::Action(action) => Term::Action(action),
                TokenClass::Drop if index == last => Term::Drop,
                TokenClass::Save(names) if index == 0 || index == last => Term::Save(names),
                TokenClass::Connector => return Err(token.error("unexpected `->`")),
                _ => return Err(token.error("expected an action keyword")),
            };
            terms.push(term);
        }

        Ok(Expression { terms, line, col })
    }

    /// Reads one slot (a word or a save group) and classifies it.
    fn parse_slot(&mut self) -> Result<(TokenClass, Token)> {
        let token = self.peek().clone();
        let lexeme = match &token.kind {
            TokenKind::Word(word) => {
                self.advance();
                Lexeme::plain(word.clone())
            }
            TokenKind::SaveOpen => {
                self.advance();
                self.parse_save_group(&token)?
            }
            _ => {
                return Err(token.error("expected a track name, an action, `drop` or `save(..)`"));
            }
        };

        Ok((classify::classify(&lexeme)?, token))
    }

    fn parse_save_group(&mut self, open: &Token) -> Result<Lexeme> {
        let name = match &self.peek().kind {
            TokenKind::Word(word) => word.clone(),
            _ => return Err(self.peek().error("expected a track name inside `save(..)`")),
        };
        self.advance();

        if !self.check(&TokenKind::RParen) {
            return Err(self.peek().error(format!(
                "expected `)` to close the save declaration opened at {}:{}",
                open.line, open.col
            )));
        }
        self.advance();

        Ok(Lexeme::save(name))
    }

    fn peek(&self) -> &Token {
        let index = self.pos.min(self.tokens.len().saturating_sub(1));
        &self.tokens[index]
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.tokens.is_empty() || self.check(&TokenKind::Eof)
    }
}
