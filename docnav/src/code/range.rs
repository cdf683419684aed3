//! Highlight range specifications
//!
//! A spec is a comma-separated list of 1-based line numbers and inclusive
//! ranges, e.g. `"2,4-6,9"`. Pieces that do not parse are skipped.

use std::ops::RangeInclusive;

/// A set of 1-based line numbers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightRange {
    ranges: Vec<RangeInclusive<usize>>,
}

impl HighlightRange {
    /// Parse a highlight spec, ignoring malformed pieces
    ///
    /// A piece is either a positive integer or `a-b` with `1 <= a <= b`.
    /// Whitespace around pieces and around the hyphen is allowed.
    pub fn parse(spec: &str) -> Self {
        let ranges = spec
            .split(',')
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .filter_map(|piece| {
                let range = Self::parse_piece(piece);
                if range.is_none() {
                    log::debug!("Ignoring malformed highlight range '{}'", piece);
                }
                range
            })
            .collect();

        Self { ranges }
    }

    fn parse_piece(piece: &str) -> Option<RangeInclusive<usize>> {
        let (start, end) = match piece.split_once('-') {
            Some((start, end)) => (
                start.trim().parse::<usize>().ok()?,
                end.trim().parse::<usize>().ok()?,
            ),
            None => {
                let line = piece.parse::<usize>().ok()?;
                (line, line)
            }
        };

        (start >= 1 && start <= end).then_some(start..=end)
    }

    /// Whether 1-based `line` is in the set
    pub fn contains(&self, line: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&line))
    }

    /// Whether the spec selected no lines
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// 0-based indices of selected lines below `line_count`, ascending
    pub fn indices(&self, line_count: usize) -> Vec<usize> {
        (1..=line_count)
            .filter(|line| self.contains(*line))
            .map(|line| line - 1)
            .collect()
    }
}

impl std::str::FromStr for HighlightRange {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_lines() {
        let range = HighlightRange::parse("1,3,5");
        assert!(range.contains(1));
        assert!(range.contains(3));
        assert!(range.contains(5));
        assert!(!range.contains(2));
        assert!(!range.contains(4));
    }

    #[test]
    fn test_parse_inclusive_range() {
        let range = HighlightRange::parse("4-6");
        assert!(!range.contains(3));
        assert!(range.contains(4));
        assert!(range.contains(5));
        assert!(range.contains(6));
        assert!(!range.contains(7));
    }

    #[test]
    fn test_parse_mixed_with_whitespace() {
        let range = HighlightRange::parse(" 2 , 4 - 6,9 ");
        assert_eq!(range.indices(10), vec![1, 3, 4, 5, 8]);
    }

    #[test]
    fn test_malformed_pieces_are_ignored() {
        let range = HighlightRange::parse("abc,2,-3,4-,6-4,0,x-y,7");
        assert_eq!(range.indices(10), vec![1, 6]);
    }

    #[test]
    fn test_empty_spec() {
        assert!(HighlightRange::parse("").is_empty());
        assert!(HighlightRange::parse(" , ,").is_empty());
    }

    #[test]
    fn test_indices_clip_to_line_count() {
        let range = HighlightRange::parse("2,99");
        assert_eq!(range.indices(5), vec![1]);
        assert!(HighlightRange::parse("99").indices(5).is_empty());
    }

    #[test]
    fn test_huge_range_is_not_expanded() {
        let range = HighlightRange::parse("1-18446744073709551615");
        assert!(range.contains(1_000_000));
        assert_eq!(range.indices(3), vec![0, 1, 2]);
    }

    #[test]
    fn test_from_str() {
        let range: HighlightRange = "3".parse().unwrap();
        assert!(range.contains(3));
    }
}
