use std::fmt;

use tracing::debug;

use super::parser::{self, Expression, Term};
use crate::{actions::Action, Result, StemshiftError};

/// One compiled `source -> actions -> sink` unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub source: String,
    pub actions: Vec<Action>,
    pub sink: String,
    /// Set when the sink was written as `save(name)`.
    pub save: bool,
}

impl Pipeline {
    pub fn new(
        source: impl Into<String>,
        actions: Vec<Action>,
        sink: impl Into<String>,
        save: bool,
    ) -> Self {
        Self {
            source: source.into(),
            actions,
            sink: sink.into(),
            save,
        }
    }
}

/// Renders the pipeline back in recipe syntax.
impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;
        for action in &self.actions {
            write!(f, " -> {action}")?;
        }
        if self.save {
            write!(f, " -> save({})", self.sink)
        } else {
            write!(f, " -> {}", self.sink)
        }
    }
}

/// Turns parsed expressions into pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Parses and compiles a whole recipe. Expressions that end in `drop`
    /// produce no pipeline; everything else keeps declaration order.
    pub fn compile(&self, source: &str) -> Result<Vec<Pipeline>> {
        let expressions = parser::parse(source)?;
        let mut pipelines = Vec::with_capacity(expressions.len());
        for expression in &expressions {
            match self.compile_expression(expression)? {
                Some(pipeline) => {
                    debug!(%pipeline, "compiled pipeline");
                    pipelines.push(pipeline);
                }
                None => debug!(%expression, "expression dropped"),
            }
        }
        Ok(pipelines)
    }

    /// Compiles one expression. `Ok(None)` means the expression was dropped.
    pub fn compile_expression(&self, expression: &Expression) -> Result<Option<Pipeline>> {
        let mut terms = expression.terms.iter();
        let source = match terms.next() {
            None => return Ok(None),
            Some(Term::Source(name)) => name.clone(),
            Some(other) => {
                return Err(StemshiftError::InvalidSource {
                    token: other.to_string(),
                })
            }
        };

        let mut actions = Vec::new();
        let mut sink = None;
        let mut save = false;
        for term in terms {
            match term {
                Term::Connector => continue,
                Term::Action(action) => actions.push(*action),
                Term::Drop => return Ok(None),
                Term::Save(names) => match names.as_slice() {
                    [name] => {
                        sink = Some(name.clone());
                        save = true;
                    }
                    _ => {
                        return Err(StemshiftError::GrammarMismatch {
                            token: term.to_string(),
                        })
                    }
                },
                Term::Ident(name) => {
                    sink = Some(name.clone());
                    save = false;
                }
                Term::Source(_) => {
                    return Err(StemshiftError::GrammarMismatch {
                        token: term.to_string(),
                    })
                }
            }
        }

        let sink = sink.ok_or_else(|| StemshiftError::MissingSink {
            expression: expression.to_string(),
        })?;

        Ok(Some(Pipeline {
            source,
            actions,
            sink,
            save,
        }))
    }
}

/// Tokenizes, parses and compiles `source` in one go.
pub fn compile(source: &str) -> Result<Vec<Pipeline>> {
    Compiler::new().compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(text: &str) -> String {
        text.to_string()
    }

    #[test]
    fn compiles_a_save_pipeline() {
        let pipelines = compile("vocals -> save(vocals);").unwrap();
        assert_eq!(pipelines, vec![Pipeline::new("vocals", vec![], "vocals", true)]);
    }

    #[test]
    fn keeps_declaration_and_action_order() {
        let recipe = "
            vocals -> save(vocals);
            piano -> save(piano);
            piano -> flat -> late -> save(piano2);
            piano2 -> octaveup -> mix;
        ";
        let pipelines = compile(recipe).unwrap();
        assert_eq!(pipelines.len(), 4);
        assert_eq!(pipelines[2].actions, vec![Action::Flat, Action::Late]);
        assert_eq!(pipelines[3], Pipeline::new("piano2", vec![Action::OctaveUp], "mix", false));
    }

    #[test]
    fn dropped_expressions_produce_no_pipeline() {
        let pipelines = compile("drums -> octavedown -> drop; bass -> drop; vocals -> v2").unwrap();
        assert_eq!(pipelines, vec![Pipeline::new("vocals", vec![], "v2", false)]);
    }

    #[test]
    fn leading_save_is_an_invalid_source() {
        let err = compile("save(vocals);").unwrap_err();
        assert!(matches!(err, StemshiftError::InvalidSource { ref token } if token == "save(vocals)"));
        assert_eq!(compile("save(a) -> b").unwrap_err().kind(), "INVALID_SOURCE");
    }

    #[test]
    fn keyword_named_tracks_can_be_read_back() {
        let pipelines = compile("vocals -> save(flat); flat -> sharp -> save(out)").unwrap();
        assert_eq!(
            pipelines,
            vec![
                Pipeline::new("vocals", vec![], "flat", true),
                Pipeline::new("flat", vec![Action::Sharp], "out", true),
            ]
        );
        assert_eq!(
            compile("drop -> save(x)").unwrap(),
            vec![Pipeline::new("drop", vec![], "x", true)]
        );
    }

    #[test]
    fn empty_recipe_is_rejected() {
        assert_eq!(compile("").unwrap_err().kind(), "SYNTAX");
        assert_eq!(compile(" \n ").unwrap_err().kind(), "SYNTAX");
    }

    #[test]
    fn expression_without_sink_is_missing_sink() {
        assert_eq!(compile("vocals -> flat;").unwrap_err().kind(), "MISSING_SINK");
        assert_eq!(compile("vocals").unwrap_err().kind(), "MISSING_SINK");
        assert_eq!(compile("flat").unwrap_err().kind(), "MISSING_SINK");
    }

    #[test]
    fn unknown_action_fails_before_compilation() {
        assert_eq!(
            compile("vocals -> fake -> save(vocals);").unwrap_err().kind(),
            "SYNTAX"
        );
    }

    #[test]
    fn save_groups_need_exactly_one_name() {
        let compiler = Compiler::new();
        for names in [vec![], vec![name("a"), name("b")]] {
            let expression = Expression::new(vec![
                Term::Source(name("vocals")),
                Term::Connector,
                Term::Save(names),
            ]);
            let err = compiler.compile_expression(&expression).unwrap_err();
            assert_eq!(err.kind(), "GRAMMAR_MISMATCH");
        }
    }

    #[test]
    fn misplaced_source_term_is_a_grammar_mismatch() {
        let expression = Expression::new(vec![
            Term::Source(name("vocals")),
            Term::Connector,
            Term::Source(name("piano")),
        ]);
        let err = Compiler::new().compile_expression(&expression).unwrap_err();
        assert_eq!(err.kind(), "GRAMMAR_MISMATCH");
    }

    #[test]
    fn last_sink_wins_in_hand_built_expressions() {
        let expression = Expression::new(vec![
            Term::Source(name("vocals")),
            Term::Connector,
            Term::Save(vec![name("first")]),
            Term::Connector,
            Term::Ident(name("second")),
        ]);
        let pipeline = Compiler::new().compile_expression(&expression).unwrap().unwrap();
        assert_eq!(pipeline.sink, "second");
        assert!(!pipeline.save);
    }

    #[test]
    fn empty_expression_is_skipped() {
        let pipeline = Compiler::new().compile_expression(&Expression::new(vec![])).unwrap();
        assert!(pipeline.is_none());
    }

    #[test]
    fn display_matches_recipe_syntax() {
        let pipeline = Pipeline::new("piano", vec![Action::Flat, Action::Early], "piano2", true);
        assert_eq!(pipeline.to_string(), "piano -> flat -> early -> save(piano2)");
        assert_eq!(compile(&pipeline.to_string()).unwrap(), vec![pipeline]);
    }
}
