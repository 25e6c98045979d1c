// Logical inputs accepted by the calculator engine

use serde::{Deserialize, Serialize};

/// Calculator operator keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Percent,
    Power,
    Root,
}

impl Operator {
    /// Power and root fire as soon as they are pressed, against the current
    /// operand alone. Everything else waits for a second operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Power | Operator::Root)
    }

    /// Glyph written to the formula log
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
            Operator::Divide => '÷',
            Operator::Percent => '%',
            Operator::Power => '^',
            Operator::Root => '√',
        }
    }
}

/// One logical keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Digit(u8),
    DecimalPoint,
    Operator(Operator),
    Equals,
    Clear,
    Reset,
}

impl Input {
    /// Map a single character token to an input.
    /// Returns None for characters the calculator does not handle.
    pub fn from_char(key_char: char) -> Option<Self> {
        let input = match key_char {
            // Digits
            '0'..='9' => Input::Digit(key_char as u8 - b'0'),
            // Decimal point
            '.' | ',' => Input::DecimalPoint,
            // Operators
            '+' => Input::Operator(Operator::Add),
            '-' => Input::Operator(Operator::Subtract),
            '*' | 'x' | '×' => Input::Operator(Operator::Multiply),
            '/' | '÷' => Input::Operator(Operator::Divide),
            '%' => Input::Operator(Operator::Percent),
            '^' => Input::Operator(Operator::Power),
            'r' | '√' => Input::Operator(Operator::Root),
            // Evaluate (Enter key)
            '=' | '\n' | '\r' => Input::Equals,
            'C' | 'c' => Input::Clear,
            'R' => Input::Reset,
            _ => return None,
        };

        Some(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_chars() {
        assert_eq!(Input::from_char('0'), Some(Input::Digit(0)));
        assert_eq!(Input::from_char('7'), Some(Input::Digit(7)));
        assert_eq!(Input::from_char('9'), Some(Input::Digit(9)));
    }

    #[test]
    fn test_operator_chars() {
        assert_eq!(Input::from_char('x'), Some(Input::Operator(Operator::Multiply)));
        assert_eq!(Input::from_char('÷'), Some(Input::Operator(Operator::Divide)));
        assert_eq!(Input::from_char('√'), Some(Input::Operator(Operator::Root)));
        assert_eq!(Input::from_char('\n'), Some(Input::Equals));
        assert_eq!(Input::from_char('R'), Some(Input::Reset));
    }

    #[test]
    fn test_unknown_chars() {
        assert_eq!(Input::from_char('a'), None);
        assert_eq!(Input::from_char(' '), None);
        assert_eq!(Input::from_char('('), None);
    }

    #[test]
    fn test_unary_operators() {
        assert!(Operator::Power.is_unary());
        assert!(Operator::Root.is_unary());
        assert!(!Operator::Percent.is_unary());
        assert!(!Operator::Divide.is_unary());
    }
}
