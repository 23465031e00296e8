//! Lexical primitives (song-filter spec §4.1): a byte cursor over the
//! input plus the handful of readers the grammar is built from. Mutates
//! the cursor only on success, mirroring the teacher's hand-rolled
//! `possibly_quoted_string`/`uri` readers in `command_parser.rs` rather
//! than a combinator-library grammar, since the parser needs the exact
//! named failures from spec §7 at each call site.

use super::error::ParseError;

const MAX_QUOTED_LEN: usize = 4096;

pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.rest().is_empty()
    }

    pub fn peek(&self) -> Option<u8> {
        self.rest().as_bytes().first().copied()
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Advance past ASCII spaces/tabs.
    pub fn skip_left_whitespace(&mut self) {
        let skip = self.rest().bytes().take_while(|b| *b == b' ' || *b == b'\t').count();
        self.advance(skip);
    }

    /// ASCII case-insensitive prefix test; consumes `literal`'s length on
    /// success and leaves the cursor untouched on failure.
    pub fn match_prefix_case_insensitive(&mut self, literal: &str) -> bool {
        let rest = self.rest();
        if rest.len() < literal.len() {
            return false;
        }
        if rest.as_bytes()[..literal.len()].eq_ignore_ascii_case(literal.as_bytes()) {
            self.advance(literal.len());
            true
        } else {
            false
        }
    }

    /// Case-sensitive prefix test; consumes `literal`'s length on success
    /// and leaves the cursor untouched on failure. Used for the `AND`
    /// keyword, which §4.4/§6's grammar spells as a literal, unlike the
    /// filter-name and operator keywords that are case-insensitive.
    pub fn match_prefix(&mut self, literal: &str) -> bool {
        if self.rest().as_bytes().starts_with(literal.as_bytes()) {
            self.advance(literal.len());
            true
        } else {
            false
        }
    }

    pub fn expect_byte(&mut self, b: u8) -> Result<(), ParseError> {
        if self.peek() == Some(b) {
            self.advance(1);
            Ok(())
        } else {
            Err(ParseError::ParenExpected(b as char))
        }
    }

    /// Reads a maximal run of `[A-Za-z_-]`.
    pub fn read_word(&mut self) -> Result<&'a str, ParseError> {
        let rest = self.rest();
        let len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic() || *b == b'_' || *b == b'-')
            .count();
        if len == 0 {
            return Err(ParseError::WordExpected);
        }
        self.advance(len);
        Ok(&rest[..len])
    }

    /// Reads a quoted string starting at the cursor: `'` or `"` opens
    /// it, `\` escapes the next byte literally (including the quote and
    /// backslash itself), and the closing quote plus any trailing
    /// whitespace are consumed on success.
    pub fn read_quoted(&mut self) -> Result<String, ParseError> {
        let Some(quote) = self.peek() else {
            return Err(ParseError::QuotedExpected);
        };
        if quote != b'\'' && quote != b'"' {
            return Err(ParseError::QuotedExpected);
        }
        let quote = quote as char;

        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        chars.next(); // skip the opening quote
        let mut closed_at = None;
        while let Some((idx, c)) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => return Err(ParseError::ClosingQuoteMissing),
                }
            } else if c == quote {
                closed_at = Some(idx + c.len_utf8());
                break;
            } else {
                out.push(c);
            }
            if out.len() > MAX_QUOTED_LEN {
                return Err(ParseError::QuotedTooLong);
            }
        }
        let Some(end) = closed_at else {
            return Err(ParseError::ClosingQuoteMissing);
        };

        self.advance(end);
        self.skip_left_whitespace();
        Ok(out)
    }

    /// Reads a maximal run of ASCII digits as an unsigned integer.
    pub fn read_decimal(&mut self) -> Result<u64, ParseError> {
        let rest = self.rest();
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        if len == 0 {
            return Err(ParseError::BadNumber);
        }
        let digits = &rest[..len];
        self.advance(len);
        digits.parse::<u64>().map_err(|_| ParseError::BadNumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_word() {
        let mut c = Cursor::new("starts_with-ish rest");
        assert_eq!(c.read_word().unwrap(), "starts_with-ish");
        assert_eq!(c.rest(), " rest");
    }

    #[test]
    fn reads_quoted_with_escapes() {
        let mut c = Cursor::new(r#""asdf\"asdf" tail"#);
        assert_eq!(c.read_quoted().unwrap(), "asdf\"asdf");
        assert_eq!(c.rest(), "tail");
    }

    #[test]
    fn unclosed_quote_fails() {
        let mut c = Cursor::new("\"unterminated");
        assert_eq!(c.read_quoted(), Err(ParseError::ClosingQuoteMissing));
    }

    #[test]
    fn too_long_quote_fails() {
        let long = "a".repeat(MAX_QUOTED_LEN + 1);
        let input = format!("\"{long}\"");
        let mut c = Cursor::new(&input);
        assert_eq!(c.read_quoted(), Err(ParseError::QuotedTooLong));
    }

    #[test]
    fn case_insensitive_prefix_only_consumes_on_match() {
        let mut c = Cursor::new("Contains_CS \"x\"");
        assert!(c.match_prefix_case_insensitive("contains_cs"));
        assert_eq!(c.rest(), " \"x\"");

        let mut c = Cursor::new("eq_ci \"x\"");
        assert!(!c.match_prefix_case_insensitive("contains_cs"));
        assert_eq!(c.rest(), "eq_ci \"x\"");
    }

    #[test]
    fn case_sensitive_prefix_rejects_wrong_case() {
        let mut c = Cursor::new("and (x)");
        assert!(!c.match_prefix("AND"));
        assert_eq!(c.rest(), "and (x)");

        let mut c = Cursor::new("AND (x)");
        assert!(c.match_prefix("AND"));
        assert_eq!(c.rest(), " (x)");
    }
}
