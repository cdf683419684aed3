//! Code block formatting
//!
//! Turns a fenced code block into per-line token lists ready for
//! rendering, optionally flagging lines picked by a highlight spec.

mod lines;
mod range;
mod token;
mod tokenizer;

pub use lines::{format_lines, group_lines, mark_highlighted, split_lines, Line, LineContent, SplitToken};
pub use range::HighlightRange;
pub use token::{text_content, Token};
pub use tokenizer::{HighlightError, Tokenizer};

use serde::Deserialize;

/// Language names that mean "no highlighting"
const PLAIN_LANGUAGES: &[&str] = &["text", "plain", "plaintext", "txt"];

/// Highlighting options, usually read from the `[highlight]` config table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightOptions {
    /// Fall back to plain text when a language has no grammar
    pub ignore_missing_grammar: bool,

    /// Prefix prepended to every emitted class name
    pub class_prefix: String,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            ignore_missing_grammar: true,
            class_prefix: String::new(),
        }
    }
}

/// Tokenizes code and splits it into lines
#[derive(Debug, Clone)]
pub struct CodeFormatter {
    tokenizer: Tokenizer,
    ignore_missing_grammar: bool,
}

impl Default for CodeFormatter {
    fn default() -> Self {
        Self::new(&HighlightOptions::default())
    }
}

impl CodeFormatter {
    pub fn new(options: &HighlightOptions) -> Self {
        Self {
            tokenizer: Tokenizer::new(options.class_prefix.clone()),
            ignore_missing_grammar: options.ignore_missing_grammar,
        }
    }

    /// Format one code block
    ///
    /// `language` of `None`, empty, or a plain-text alias skips the
    /// tokenizer. A language without a grammar yields plain lines when
    /// missing grammars are ignored and an error otherwise. `highlight`
    /// is a spec like `"1,4-6"`.
    pub fn format(
        &self,
        code: &str,
        language: Option<&str>,
        highlight: Option<&str>,
    ) -> Result<Vec<Line>, HighlightError> {
        let tokens = match language.map(str::trim).filter(|lang| !is_plain(lang)) {
            None => vec![Token::text(code)],
            Some(lang) => match self.tokenizer.tokenize(code, lang) {
                Ok(tokens) => tokens,
                Err(HighlightError::MissingGrammar { language }) if self.ignore_missing_grammar => {
                    log::warn!(
                        "No grammar for language '{}', rendering as plain text",
                        language
                    );
                    vec![Token::text(code)]
                }
                Err(e) => return Err(e),
            },
        };

        Ok(format_lines(tokens, highlight))
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}

fn is_plain(language: &str) -> bool {
    language.is_empty()
        || PLAIN_LANGUAGES
            .iter()
            .any(|plain| plain.eq_ignore_ascii_case(language))
}
