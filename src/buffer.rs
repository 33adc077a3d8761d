// buffer.rs

use crate::token::Token;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Segment {
    text: String,
    symbol: String,
}

/// The not-yet-submitted expression.
///
/// Each appended token is kept as one segment so the text sent to the
/// evaluator and the text on the display never drift apart; deleting a
/// constant removes the whole constant.
#[derive(Clone, Debug, Default)]
pub struct InputBuffer {
    segments: Vec<Segment>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.segments.push(Segment {
            text: token.text(),
            symbol: token.display(),
        });
    }

    /// Replace the contents with literal text, one segment per character.
    pub fn load(&mut self, text: &str) {
        self.segments.clear();
        self.segments.extend(text.chars().map(|c| Segment {
            text: c.to_string(),
            symbol: c.to_string(),
        }));
    }

    pub fn pop(&mut self) -> bool {
        self.segments.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn expression(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn display(&self) -> String {
        self.segments.iter().map(|s| s.symbol.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Constant;

    fn sym(c: char) -> Token {
        Token::symbol(c).unwrap()
    }

    #[test]
    fn test_display_is_concatenation_of_tokens() {
        let mut buffer = InputBuffer::new();
        for c in "12*(3-4)/5.5".chars() {
            buffer.push(sym(c));
        }
        assert_eq!(buffer.display(), "12*(3-4)/5.5");
        assert_eq!(buffer.expression(), "12*(3-4)/5.5");
    }

    #[test]
    fn test_constants_show_symbol_and_send_digits() {
        let mut buffer = InputBuffer::new();
        buffer.push(sym('2'));
        buffer.push(sym('*'));
        buffer.push(Token::Constant(Constant::Pi));
        assert_eq!(buffer.display(), "2*π");
        assert_eq!(buffer.expression(), "2*3.141592653589793");

        assert!(buffer.pop());
        assert_eq!(buffer.display(), "2*");
        assert_eq!(buffer.expression(), "2*");
    }

    #[test]
    fn test_pop_on_empty_is_noop() {
        let mut buffer = InputBuffer::new();
        assert!(!buffer.pop());
        assert!(!buffer.pop());
        assert!(buffer.is_empty());
        assert_eq!(buffer.display(), "");
    }

    #[test]
    fn test_load_replaces_contents() {
        let mut buffer = InputBuffer::new();
        buffer.push(Token::Constant(Constant::E));
        buffer.load("-12.5");
        assert_eq!(buffer.display(), "-12.5");
        assert_eq!(buffer.expression(), "-12.5");
        buffer.pop();
        assert_eq!(buffer.expression(), "-12.");
    }
}
