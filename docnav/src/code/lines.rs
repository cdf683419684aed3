//! Line formatting for code blocks
//!
//! Reshapes a tokenizer's flat token stream into one [`Line`] per source
//! line:
//! 1. **Split**: top-level text tokens are cut at every newline
//! 2. **Group**: tokens between newlines form a line; blank lines get an
//!    explicit break placeholder
//! 3. **Mark**: lines selected by a [`HighlightRange`] are flagged
//!
//! Spans are never looked into while splitting. Tokenizers feeding this
//! module must not emit spans whose text crosses a line boundary.

use super::range::HighlightRange;
use super::token::{text_content, Token};
use serde::Serialize;

/// A token stream element after line splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitToken {
    /// A token that lies within a single line
    Token(Token),
    /// One newline character
    Newline,
}

/// Contents of one rendered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineContent {
    /// Tokens of a non-empty line
    Tokens(Vec<Token>),
    /// Placeholder that keeps an empty line's row
    Break,
}

/// One source line of a code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub content: LineContent,
    pub highlighted: bool,
}

impl Line {
    fn with_tokens(tokens: Vec<Token>) -> Self {
        Self {
            content: LineContent::Tokens(tokens),
            highlighted: false,
        }
    }

    fn blank() -> Self {
        Self {
            content: LineContent::Break,
            highlighted: false,
        }
    }

    /// Tokens on this line (empty for a blank line)
    pub fn tokens(&self) -> &[Token] {
        match &self.content {
            LineContent::Tokens(tokens) => tokens,
            LineContent::Break => &[],
        }
    }

    /// Whether this line is the blank-line placeholder
    pub fn is_blank(&self) -> bool {
        matches!(self.content, LineContent::Break)
    }

    /// Source text of this line, without the line terminator
    pub fn text(&self) -> String {
        text_content(self.tokens())
    }
}

/// Cut top-level text tokens at newline characters
///
/// Every newline becomes its own [`SplitToken::Newline`]; the text between
/// newlines is kept unless empty, and empty text tokens are dropped. `"a\n\nb\n"` becomes `a`, newline,
/// newline, `b`, newline.
pub fn split_lines(tokens: Vec<Token>) -> Vec<SplitToken> {
    let mut out = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token {
            Token::Text(value) if value.is_empty() => {}
            Token::Text(value) if value.contains('\n') => {
                for (i, piece) in value.split('\n').enumerate() {
                    if i > 0 {
                        out.push(SplitToken::Newline);
                    }
                    if !piece.is_empty() {
                        out.push(SplitToken::Token(Token::Text(piece.to_string())));
                    }
                }
            }
            other => out.push(SplitToken::Token(other)),
        }
    }

    out
}

/// Group a split token stream into lines
///
/// Trailing tokens after the last newline form a final line; a trailing
/// newline does not produce an extra empty line.
pub fn group_lines(split: Vec<SplitToken>) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for item in split {
        match item {
            SplitToken::Token(token) => current.push(token),
            SplitToken::Newline => {
                if current.is_empty() {
                    lines.push(Line::blank());
                } else {
                    lines.push(Line::with_tokens(std::mem::take(&mut current)));
                }
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::with_tokens(current));
    }

    lines
}

/// Flag every line selected by `range`; out-of-range numbers are ignored
pub fn mark_highlighted(lines: &mut [Line], range: &HighlightRange) {
    for index in range.indices(lines.len()) {
        lines[index].highlighted = true;
    }
}

/// Run split, group and mark over a token stream
pub fn format_lines(tokens: Vec<Token>, highlight: Option<&str>) -> Vec<Line> {
    let mut lines = group_lines(split_lines(tokens));

    if let Some(spec) = highlight {
        mark_highlighted(&mut lines, &HighlightRange::parse(spec));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    #[test]
    fn test_split_preserves_newline_count() {
        let split = split_lines(vec![Token::text("a\n\nb\n")]);

        assert_eq!(
            split,
            vec![
                SplitToken::Token(Token::text("a")),
                SplitToken::Newline,
                SplitToken::Newline,
                SplitToken::Token(Token::text("b")),
                SplitToken::Newline,
            ]
        );
    }

    #[test]
    fn test_split_drops_empty_text() {
        let split = split_lines(vec![Token::text(""), Token::text("a"), Token::text("")]);
        assert_eq!(split, vec![SplitToken::Token(Token::text("a"))]);
    }

    #[test]
    fn test_split_leaves_spans_intact() {
        let span = Token::span(["string"], vec![Token::text("\"x\ny\"")]);

        let split = split_lines(vec![span.clone()]);

        assert_eq!(split, vec![SplitToken::Token(span)]);
    }

    #[test]
    fn test_group_blank_lines_get_break() {
        let lines = format_lines(vec![Token::text("a\n\nb\n")], None);

        assert_eq!(lines.len(), 3);
        assert_eq!(texts(&lines), vec!["a", "", "b"]);
        assert!(lines[1].is_blank());
        assert!(!lines[0].is_blank());
    }

    #[test]
    fn test_rejoin_reconstructs_source() {
        let source = "a\n\nb\n";
        let lines = format_lines(vec![Token::text(source)], None);

        let rejoined: String = lines.iter().map(|l| l.text() + "\n").collect();

        assert_eq!(rejoined, source);
    }

    #[test]
    fn test_trailing_tokens_without_newline_form_last_line() {
        let tokens = vec![
            Token::span(["keyword"], vec![Token::text("let")]),
            Token::text(" x\n"),
            Token::span(["keyword"], vec![Token::text("return")]),
            Token::text(" x"),
        ];

        let lines = format_lines(tokens, None);

        assert_eq!(texts(&lines), vec!["let x", "return x"]);
        assert_eq!(lines[1].tokens().len(), 2);
    }

    #[test]
    fn test_leading_newlines() {
        let lines = format_lines(vec![Token::text("\n\nx")], None);
        assert_eq!(texts(&lines), vec!["", "", "x"]);
        assert!(lines[0].is_blank() && lines[1].is_blank());
    }

    #[test]
    fn test_empty_input_has_no_lines() {
        assert!(format_lines(Vec::new(), None).is_empty());
        assert!(format_lines(vec![Token::text("")], None).is_empty());
    }

    #[test]
    fn test_highlight_marks_selected_lines() {
        let lines = format_lines(vec![Token::text("1\n2\n3\n4\n5\n")], Some("2,4-5"));

        let marked: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.highlighted)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(marked, vec![1, 3, 4]);
    }

    #[test]
    fn test_highlight_out_of_range_is_ignored() {
        let lines = format_lines(vec![Token::text("1\n2\n3\n4\n5\n")], Some("99"));
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|line| !line.highlighted));
    }

    #[test]
    fn test_highlight_blank_line() {
        let lines = format_lines(vec![Token::text("a\n\nb")], Some("2"));
        assert!(lines[1].is_blank());
        assert!(lines[1].highlighted);
    }
}
