//! Syntax tokens

use serde::Serialize;

/// A node of a tokenized code string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Token {
    /// Literal source text
    Text(String),

    /// A classified region that may nest further tokens
    Span {
        /// Classification, e.g. `["keyword", "control"]`
        class_names: Vec<String>,
        /// Nested tokens
        children: Vec<Token>,
    },
}

impl Token {
    /// Plain text token
    pub fn text(value: impl Into<String>) -> Self {
        Token::Text(value.into())
    }

    /// Span token
    pub fn span<S: Into<String>>(
        class_names: impl IntoIterator<Item = S>,
        children: Vec<Token>,
    ) -> Self {
        Token::Span {
            class_names: class_names.into_iter().map(Into::into).collect(),
            children,
        }
    }

    /// Append the source text covered by this token to `out`
    pub fn push_text(&self, out: &mut String) {
        match self {
            Token::Text(value) => out.push_str(value),
            Token::Span { children, .. } => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }

    /// Source text covered by this token
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    /// Whether this token or any descendant carries a class
    pub fn has_classes(&self) -> bool {
        match self {
            Token::Text(_) => false,
            Token::Span { class_names, children } => {
                !class_names.is_empty() || children.iter().any(Token::has_classes)
            }
        }
    }
}

/// Source text covered by a token sequence
pub fn text_content(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.push_text(&mut out);
    }
    out
}
