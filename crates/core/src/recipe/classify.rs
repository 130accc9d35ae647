//! Role assignment for expression slots.
//!
//! A slot holds either a plain token (`flat`, `->`, `piano2`) or a grouped
//! token (`save(` `piano2` `)`). Roles are decided from the token's own
//! shape and keyword membership, never from where it sits in the expression.

use std::fmt;

use crate::{actions::Action, Result, StemshiftError};

pub const CONNECTOR: &str = "->";
pub const DROP: &str = "drop";
pub const SAVE_OPEN: &str = "save(";
pub const SAVE_CLOSE: &str = ")";

/// A token as it occupies one expression slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme {
    Plain(String),
    Group(Vec<String>),
}

impl Lexeme {
    pub fn plain(text: impl Into<String>) -> Self {
        Lexeme::Plain(text.into())
    }

    /// The grouped form of `save(name)`.
    pub fn save(name: impl Into<String>) -> Self {
        Lexeme::Group(vec![SAVE_OPEN.to_string(), name.into(), SAVE_CLOSE.to_string()])
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Plain(text) => f.write_str(text),
            Lexeme::Group(parts) => f.write_str(&parts.concat()),
        }
    }
}

/// The grammar category a lexeme belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClass {
    Action(Action),
    Connector,
    Drop,
    /// Inner identifiers of a save group. A well formed group has one.
    Save(Vec<String>),
    /// Any non-reserved identifier, usable as a source or a sink.
    Name(String),
}

/// Classifies one lexeme. Categories are mutually exclusive: action keywords
/// and `drop` classify by keyword, never as [`TokenClass::Name`]. The parser
/// still lets them name a source, since a source slot takes any identifier.
pub fn classify(lexeme: &Lexeme) -> Result<TokenClass> {
    match lexeme {
        Lexeme::Plain(text) if text == CONNECTOR => Ok(TokenClass::Connector),
        Lexeme::Plain(text) if text == DROP => Ok(TokenClass::Drop),
        Lexeme::Plain(text) => {
            if let Some(action) = Action::from_keyword(text) {
                Ok(TokenClass::Action(action))
            } else if is_identifier(text) {
                Ok(TokenClass::Name(text.clone()))
            } else {
                Err(mismatch(lexeme))
            }
        }
        Lexeme::Group(parts) => match parts.as_slice() {
            [open, inner @ .., close]
                if open == SAVE_OPEN
                    && close == SAVE_CLOSE
                    && inner.iter().all(|part| is_identifier(part)) =>
            {
                Ok(TokenClass::Save(inner.to_vec()))
            }
            _ => Err(mismatch(lexeme)),
        },
    }
}

/// `[A-Za-z0-9]+`
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric())
}

/// True for identifiers that may name a source track. Keywords qualify: a
/// track saved as `save(flat)` must stay readable.
pub fn is_source(lexeme: &Lexeme) -> bool {
    matches!(lexeme, Lexeme::Plain(text) if is_identifier(text))
}

/// True for lexemes that may end an expression.
pub fn is_sink(lexeme: &Lexeme) -> bool {
    matches!(
        classify(lexeme),
        Ok(TokenClass::Drop | TokenClass::Save(_) | TokenClass::Name(_))
    )
}

fn mismatch(lexeme: &Lexeme) -> StemshiftError {
    StemshiftError::GrammarMismatch {
        token: lexeme.to_string(),
    }
}
