//! Core library for stemshift.
//!
//! A recipe describes how the stems of a song (bass, drums, other, piano,
//! vocals) are transformed and which results are mixed back together. The
//! crate compiles recipe text into [`Pipeline`] values, runs them against a
//! [`TrackStore`] seeded by an external splitter, and merges every track the
//! recipe marked with `save(..)`.
//!
//! ```no_run
//! use std::path::Path;
//! use stemshift_core::{AppConfig, Session};
//!
//! # fn main() -> stemshift_core::Result<()> {
//! let mut session = Session::from_config(&AppConfig::default());
//! session.run_recipe(
//!     "vocals -> save(vocals); piano -> flat -> save(piano2);",
//!     Path::new("out.wav"),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod audio;
pub mod config;
pub mod error;
pub mod executor;
pub mod merge;
pub mod recipe;
pub mod session;
pub mod track;

pub use actions::{Action, ActionRegistry, TrackTransform};
pub use audio::{TrackExporter, TrackSource, WavExporter, WavStemSource};
pub use config::{AppConfig, ExportConfig, StemConfig};
pub use error::{Result, StemshiftError};
pub use executor::Executor;
pub use merge::{merge_saved, Merger, WavMerger};
pub use recipe::{compile, Compiler, Expression, Pipeline, Term};
pub use session::{Session, SessionReport};
pub use track::{Channel, StemLayout, Track, TrackStore};
