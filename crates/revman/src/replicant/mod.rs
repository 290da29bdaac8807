//! Abstract generation ("replicant")
//!
//! Grammars are minijinja templates rendered against an [`AbstractContext`].
//! Undefined values are errors, so a grammar asking for data the review does
//! not have fails instead of printing blanks.

mod context;

use std::fs;

use minijinja::{Environment, UndefinedBehavior};
use tracing::{debug, info, span, Level};

pub use context::{AbstractContext, ComparisonContext, EffectContext, OutcomeContext, SubgroupContext};

use crate::core::{AbstractGenerator, GrammarSource, Result, RevManError};
use crate::document::Review;

/// Grammar used when none is given
pub const BUILTIN_GRAMMAR: &str = include_str!("../../grammars/abstract-en.j2");

/// minijinja-backed abstract generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplicantGenerator;

impl ReplicantGenerator {
    pub fn new() -> Self {
        Self
    }

    fn load(grammar: &GrammarSource) -> Result<String> {
        match grammar {
            GrammarSource::Builtin => Ok(BUILTIN_GRAMMAR.to_string()),
            GrammarSource::File(path) => fs::read_to_string(path).map_err(|e| {
                RevManError::generation_error(format!(
                    "Cannot read grammar file '{}': {}",
                    path.display(),
                    e
                ))
            }),
        }
    }

    /// Render an already loaded grammar
    pub fn render(&self, review: &Review, source: &str) -> Result<String> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_filter("plural", plural);

        let template = env
            .template_from_str(source)
            .map_err(|e| RevManError::generation_error(format!("Invalid grammar: {}", e)))?;

        let context = AbstractContext::new(review);
        template
            .render(&context)
            .map_err(|e| RevManError::generation_error(e.to_string()))
    }
}

impl AbstractGenerator for ReplicantGenerator {
    fn generate(&self, review: &Review, grammar: &GrammarSource) -> Result<String> {
        let generate_span = span!(Level::INFO, "generate_abstract", grammar = %grammar);
        let _enter = generate_span.enter();

        let source = Self::load(grammar)?;
        debug!(grammar_len = source.len(), "Grammar loaded");

        let text = self.render(review, &source)?;
        info!(text_len = text.len(), "Abstract generated");
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "replicant"
    }
}

/// `{{ n | plural("study", "studies") }}`
fn plural(count: usize, one: String, many: String) -> String {
    if count == 1 {
        one
    } else {
        many
    }
}
