//! Position-tagged tokens shared by the JSON and expression tokenizers.

/// A classified span of source text.
///
/// `start` and `end` are inclusive byte offsets. The text itself is only
/// sliced out of the source when a parser consumes the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<K> {
    pub kind: K,
    pub start: usize,
    pub end: usize,
}

impl<K> Token<K> {
    pub fn new(kind: K, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// Source text covered by the token.
    ///
    /// Returns an empty string for the end-of-stream token, which sits past
    /// the last byte.
    pub fn lexeme<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..=self.end).unwrap_or("")
    }
}

/// Scans a number whose first byte (`-` or a digit) is at `start`.
///
/// Returns the inclusive end offset and whether a decimal point was seen.
/// Only the first `.` belongs to the number.
pub(crate) fn scan_number(bytes: &[u8], start: usize) -> (usize, bool) {
    let mut end = start;
    let mut is_float = false;
    for (pos, &byte) in bytes.iter().enumerate().skip(start + 1) {
        match byte {
            b'0'..=b'9' => {}
            b'.' if !is_float => is_float = true,
            _ => break,
        }
        end = pos;
    }
    (end, is_float)
}

/// Character starting at `offset`, for error reporting.
pub(crate) fn char_at(source: &str, offset: usize) -> char {
    source
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or('\u{FFFD}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexeme_is_inclusive() {
        let tok = Token::new((), 2, 4);
        assert_eq!(tok.lexeme("a.bcd.e"), "bcd");
    }

    #[test]
    fn test_lexeme_past_end_is_empty() {
        let tok = Token::new((), 3, 3);
        assert_eq!(tok.lexeme("abc"), "");
    }

    #[test]
    fn test_scan_number() {
        assert_eq!(scan_number(b"123,", 0), (2, false));
        assert_eq!(scan_number(b"[-1.25]", 1), (5, true));
        assert_eq!(scan_number(b"1.2.3", 0), (2, true));
        assert_eq!(scan_number(b"-", 0), (0, false));
        assert_eq!(scan_number(b"7.", 0), (1, true));
    }

    #[test]
    fn test_char_at_multibyte() {
        assert_eq!(char_at("aé", 1), 'é');
        assert_eq!(char_at("a", 5), '\u{FFFD}');
    }
}
