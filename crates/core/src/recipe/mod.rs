//! The recipe language: tokenizer, classifier, parser and pipeline compiler.
//!
//! A recipe is a list of `;`-separated expressions of the form
//! `source -> action -> ... -> sink`, for example
//!
//! ```text
//! piano -> flat -> save(piano2);
//! piano2 -> octaveup -> save(piano3);
//! drums -> drop;
//! ```
//!
//! [`compile`] turns the text into [`Pipeline`] values in declaration order.

pub mod classify;
mod compiler;
mod parser;
pub mod token;

pub use classify::{classify, Lexeme, TokenClass};
pub use compiler::{compile, Compiler, Pipeline};
pub use parser::{parse, Expression, Parser, Term};
