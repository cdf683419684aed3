//! Syntax tokenizer backed by syntect grammars
//!
//! Produces [`Token`] trees whose spans never cross a line boundary: any
//! scope still open at the end of a line is closed before the newline and
//! re-opened on the next line. Newlines are emitted as top-level text.

use super::token::Token;
use lazy_static::lazy_static;
use syntect::parsing::{
    BasicScopeStackOp, ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet,
};
use syntect::util::LinesWithEndings;
use thiserror::Error;

lazy_static! {
    /// Default syntect grammars, loaded on first use
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
}

/// Errors raised while tokenizing a code block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// No grammar is registered for the requested language
    #[error("No grammar registered for language '{language}'")]
    MissingGrammar {
        /// The language that was requested
        language: String,
    },

    /// The grammar failed while parsing the code
    #[error("Failed to tokenize {language} code: {message}")]
    Tokenize {
        /// The language being tokenized
        language: String,
        /// Underlying parser message
        message: String,
    },
}

/// Turns source code into classified token trees
#[derive(Debug, Clone)]
pub struct Tokenizer {
    syntax_set: &'static SyntaxSet,
    class_prefix: String,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new("")
    }
}

impl Tokenizer {
    /// Create a tokenizer whose class names start with `class_prefix`
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            syntax_set: &SYNTAX_SET,
            class_prefix: class_prefix.into(),
        }
    }

    /// Look up the grammar for a language name or file extension
    pub fn find_syntax(&self, language: &str) -> Option<&'static SyntaxReference> {
        let syntax_set: &'static SyntaxSet = self.syntax_set;
        syntax_set
            .find_syntax_by_token(language)
            .or_else(|| syntax_set.find_syntax_by_token(&language.to_lowercase()))
    }

    /// Whether a grammar exists for `language`
    pub fn supports(&self, language: &str) -> bool {
        self.find_syntax(language).is_some()
    }

    /// Tokenize `code` with the grammar for `language`
    pub fn tokenize(&self, code: &str, language: &str) -> Result<Vec<Token>, HighlightError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| HighlightError::MissingGrammar {
                language: language.to_string(),
            })?;

        let tokenize_error = |message: String| HighlightError::Tokenize {
            language: language.to_string(),
            message,
        };

        let mut state = ParseState::new(syntax);
        let mut stack = ScopeStack::new();
        let mut tokens = Vec::new();

        for line in LinesWithEndings::from(code) {
            let ops = state
                .parse_line(line, self.syntax_set)
                .map_err(|e| tokenize_error(e.to_string()))?;

            let body = line.strip_suffix('\n').unwrap_or(line);
            let mut builder = SpanBuilder::default();
            for scope in stack.as_slice() {
                builder.open(self.class_names(*scope));
            }

            let mut cursor = 0;
            for (position, op) in ops {
                let position = position.min(body.len());
                if position > cursor {
                    builder.text(&body[cursor..position]);
                    cursor = position;
                }
                stack
                    .apply_with_hook(&op, |basic, _| match basic {
                        BasicScopeStackOp::Push(scope) => builder.open(self.class_names(scope)),
                        BasicScopeStackOp::Pop => builder.close(),
                    })
                    .map_err(|e| tokenize_error(format!("{:?}", e)))?;
            }
            if cursor < body.len() {
                builder.text(&body[cursor..]);
            }

            tokens.extend(builder.finish());
            if body.len() < line.len() {
                tokens.push(Token::text("\n"));
            }
        }

        Ok(tokens)
    }

    /// Class names for a scope: one per scope atom, prefixed
    fn class_names(&self, scope: Scope) -> Vec<String> {
        scope
            .build_string()
            .split('.')
            .filter(|atom| !atom.is_empty())
            .map(|atom| format!("{}{}", self.class_prefix, atom))
            .collect()
    }
}

/// Builds the span tree of one line
#[derive(Default)]
struct SpanBuilder {
    root: Vec<Token>,
    open: Vec<(Vec<String>, Vec<Token>)>,
}

impl SpanBuilder {
    fn open(&mut self, class_names: Vec<String>) {
        self.open.push((class_names, Vec::new()));
    }

    /// Close the innermost span; spans without content are dropped
    fn close(&mut self) {
        if let Some((class_names, children)) = self.open.pop() {
            if !children.is_empty() {
                self.push(Token::Span {
                    class_names,
                    children,
                });
            }
        }
    }

    fn text(&mut self, value: &str) {
        self.push(Token::text(value));
    }

    fn push(&mut self, token: Token) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(token),
            None => self.root.push(token),
        }
    }

    fn finish(mut self) -> Vec<Token> {
        while !self.open.is_empty() {
            self.close();
        }
        self.root
    }
}
