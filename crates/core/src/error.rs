use std::path::PathBuf;

/// Result alias that carries the custom [`StemshiftError`] type.
pub type Result<T> = std::result::Result<T, StemshiftError>;

/// Common error type for the core crate.
///
/// Recipe errors are split by the stage that detects them: the tokenizer and
/// parser raise [`StemshiftError::Syntax`], the pipeline compiler raises
/// [`StemshiftError::InvalidSource`], [`StemshiftError::MissingSink`] and
/// [`StemshiftError::GrammarMismatch`], and the executor raises
/// [`StemshiftError::MissingSource`]. Every one of them is fatal for the run.
#[derive(Debug, thiserror::Error)]
pub enum StemshiftError {
    /// Recipe text does not match the grammar.
    #[error("syntax error at {line}:{col}: {message} (near `{fragment}`)")]
    Syntax {
        line: usize,
        col: usize,
        message: String,
        fragment: String,
    },

    /// The leading term of an expression is not a valid source.
    #[error("the first element of an expression must be a valid source, got `{token}`")]
    InvalidSource { token: String },

    /// An expression ended without resolving a sink.
    #[error("no valid sink was provided in expression `{expression}`")]
    MissingSink { expression: String },

    /// A term passed the grammar but the compiler could not place it. This
    /// points at an inconsistency between the parser and the compiler rather
    /// than at bad user input.
    #[error("token `{token}` is not part of the recipe grammar")]
    GrammarMismatch { token: String },

    /// A pipeline referenced a track that is not in the store yet.
    #[error("no track has been loaded with the name `{name}` yet (pipeline: {pipeline})")]
    MissingSource { name: String, pipeline: String },

    /// Nothing in the store was marked with `save(..)`.
    #[error("no tracks were marked for saving; add at least one `save(name)` sink")]
    NoSavedTracks,

    /// Combining or exporting the saved tracks failed.
    #[error("failed to merge {files:?}: {reason}")]
    Merge { files: Vec<PathBuf>, reason: String },

    /// Sample data that cannot form a track (bad channel count, ragged frames).
    #[error("invalid track: {reason}")]
    InvalidTrack { reason: String },

    /// Reading or writing a WAV file failed.
    #[error("audio error for `{}`: {reason}", path.display())]
    Audio { path: PathBuf, reason: String },

    /// Invalid configuration or command line input.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around config (de)serialisation errors.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl StemshiftError {
    /// Stable short code for the error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StemshiftError::Syntax { .. } => "SYNTAX",
            StemshiftError::InvalidSource { .. } => "INVALID_SOURCE",
            StemshiftError::MissingSink { .. } => "MISSING_SINK",
            StemshiftError::GrammarMismatch { .. } => "GRAMMAR_MISMATCH",
            StemshiftError::MissingSource { .. } => "MISSING_SOURCE",
            StemshiftError::NoSavedTracks => "NO_SAVED_TRACKS",
            StemshiftError::Merge { .. } => "MERGE",
            StemshiftError::InvalidTrack { .. } => "INVALID_TRACK",
            StemshiftError::Audio { .. } => "AUDIO",
            StemshiftError::Config(_) => "CONFIG",
            StemshiftError::Io(_) => "IO",
            StemshiftError::Json(_) => "JSON",
        }
    }

    /// True for errors raised while turning recipe text into pipelines.
    pub fn is_recipe_error(&self) -> bool {
        matches!(
            self,
            StemshiftError::Syntax { .. }
                | StemshiftError::InvalidSource { .. }
                | StemshiftError::MissingSink { .. }
                | StemshiftError::GrammarMismatch { .. }
        )
    }

    pub(crate) fn audio(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Audio {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_report_position_and_fragment() {
        let err = StemshiftError::Syntax {
            line: 2,
            col: 14,
            message: "expected an action".to_string(),
            fragment: "fake".to_string(),
        };

        let text = err.to_string();
        assert!(text.contains("2:14"));
        assert!(text.contains("fake"));
        assert_eq!(err.kind(), "SYNTAX");
        assert!(err.is_recipe_error());
    }

    #[test]
    fn runtime_errors_are_not_recipe_errors() {
        let err = StemshiftError::MissingSource {
            name: "piano2".to_string(),
            pipeline: "piano2 -> octaveup -> save(piano3)".to_string(),
        };

        assert!(!err.is_recipe_error());
        assert!(err.to_string().contains("piano2"));
        assert!(!StemshiftError::NoSavedTracks.is_recipe_error());
    }
}
