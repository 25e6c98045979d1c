// Formula log shown above the result

use core::fmt::{self, Write};

use super::input::Operator;

/// Capacity of the committed transcript
pub const FORMULA_CAPACITY: usize = 256;

/// Capacity of the in-flight operand fragment (`√(√81)`, `10%`, ...)
pub const FRAGMENT_CAPACITY: usize = 96;

pub type FormulaText = heapless::String<{ FORMULA_CAPACITY + FRAGMENT_CAPACITY }>;

/// Running transcript of operands and operator glyphs.
///
/// Committed text only grows, one `operand + glyph` piece at a time. A line
/// ends with `=` or with an explicit [`FormulaLog::break_line`]; the next
/// piece after it opens a new line. When the buffer is full the oldest lines
/// are dropped.
///
/// Unary operators and percentage-of decorate the current operand before it
/// is committed. That decoration lives in a separate fragment that is shown
/// after the committed text and replaces the plain operand on commit.
#[derive(Debug, Clone, Default)]
pub struct FormulaLog {
    committed: heapless::String<FORMULA_CAPACITY>,
    fragment: heapless::String<FRAGMENT_CAPACITY>,
    /// The last committed line was abandoned without `=`
    broken: bool,
}

impl FormulaLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.fragment.is_empty()
    }

    pub fn committed(&self) -> &str {
        self.committed.as_str()
    }

    /// Whether the current operand has already been decorated
    pub fn has_fragment(&self) -> bool {
        !self.fragment.is_empty()
    }

    /// Commit the current operand followed by `symbol`.
    /// The fragment, when present, is written instead of `operand`.
    pub fn commit(&mut self, operand: &str, symbol: char) {
        let mut piece = heapless::String::<{ FRAGMENT_CAPACITY + 8 }>::new();

        if self.line_closed() {
            piece.push('\n').ok();
        }
        if self.fragment.is_empty() {
            piece.push_str(operand).ok();
        } else {
            piece.push_str(&self.fragment).ok();
        }
        piece.push(symbol).ok();

        self.fragment.clear();
        self.broken = false;
        self.append(&piece);
    }

    /// End the current line without `=`, e.g. when an error abandons it
    pub fn break_line(&mut self) {
        if !self.committed.is_empty() {
            self.broken = true;
        }
    }

    /// Swap the trailing operator glyph for `symbol`
    pub fn replace_symbol(&mut self, symbol: char) {
        if self.committed.pop().is_some() {
            let mut buf = [0u8; 4];
            self.append(symbol.encode_utf8(&mut buf));
        }
    }

    /// Decorate the current operand with a unary operator or percent sign.
    ///
    /// `argument` is the exponent for power and the degree for root.
    pub fn decorate(&mut self, operand: &str, op: Operator, argument: u32) {
        let compound = !self.fragment.is_empty();
        let mut next = heapless::String::<FRAGMENT_CAPACITY>::new();

        let written = if compound {
            write_decorated(&mut next, &self.fragment, true, op, argument)
        } else {
            write_decorated(&mut next, operand, operand.starts_with('-'), op, argument)
        };

        if written.is_err() {
            // Too deeply nested to show, fall back to the bare operand
            next.clear();
            next.push_str(operand).ok();
        }

        self.fragment = next;
    }

    pub fn clear_fragment(&mut self) {
        self.fragment.clear();
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.fragment.clear();
        self.broken = false;
    }

    /// Text handed to the formula callback
    pub fn render(&self) -> FormulaText {
        let mut text = FormulaText::new();
        text.push_str(&self.committed).ok();

        if !self.fragment.is_empty() {
            if self.line_closed() {
                text.push('\n').ok();
            }
            text.push_str(&self.fragment).ok();
        }

        text
    }

    fn line_closed(&self) -> bool {
        self.broken || self.committed.ends_with('=')
    }

    fn append(&mut self, piece: &str) {
        if piece.len() > FORMULA_CAPACITY {
            return;
        }

        while self.committed.len() + piece.len() > FORMULA_CAPACITY {
            self.evict_oldest(self.committed.len() + piece.len() - FORMULA_CAPACITY);
        }

        let piece = if self.committed.is_empty() {
            piece.trim_start_matches('\n')
        } else {
            piece
        };
        self.committed.push_str(piece).ok();
    }

    /// Drop the oldest line, or `needed` bytes from the front of a single
    /// line that fills the whole buffer.
    fn evict_oldest(&mut self, needed: usize) {
        let cut = match self.committed.find('\n') {
            Some(pos) => pos + 1,
            None => {
                let mut cut = needed.min(self.committed.len());
                while !self.committed.is_char_boundary(cut) {
                    cut += 1;
                }
                cut
            }
        };

        self.committed = heapless::String::try_from(&self.committed[cut..]).unwrap_or_default();
    }
}

fn write_decorated(
    out: &mut impl Write,
    inner: &str,
    parens: bool,
    op: Operator,
    argument: u32,
) -> fmt::Result {
    if op == Operator::Root {
        if argument != 2 {
            write!(out, "{argument}")?;
        }
        out.write_char('√')?;
    }

    if parens {
        write!(out, "({inner})")?;
    } else {
        out.write_str(inner)?;
    }

    match op {
        Operator::Power => write!(out, "^{argument}"),
        Operator::Root => Ok(()),
        other => out.write_char(other.symbol()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_pieces() {
        let mut log = FormulaLog::new();
        log.commit("2", '+');
        log.commit("3", '=');
        assert_eq!(log.render(), "2+3=");
    }

    #[test]
    fn test_new_line_after_equals() {
        let mut log = FormulaLog::new();
        log.commit("2", '+');
        log.commit("3", '=');
        log.commit("5", '×');
        assert_eq!(log.render(), "2+3=\n5×");
    }

    #[test]
    fn test_break_line() {
        let mut log = FormulaLog::new();
        log.break_line();
        log.commit("1", '+');
        assert_eq!(log.render(), "1+");

        log.break_line();
        log.decorate("9", Operator::Root, 2);
        assert_eq!(log.render(), "1+\n√9");
        assert_eq!(log.committed(), "1+");

        log.commit("3", '=');
        assert_eq!(log.render(), "1+\n√9=");
    }

    #[test]
    fn test_clear_empties_log() {
        let mut log = FormulaLog::new();
        assert!(log.is_empty());

        log.commit("2", '×');
        log.decorate("4", Operator::Power, 2);
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.render(), "");
    }

    #[test]
    fn test_replace_symbol() {
        let mut log = FormulaLog::new();
        log.commit("5", '+');
        log.replace_symbol('×');
        log.replace_symbol('-');
        assert_eq!(log.render(), "5-");
    }

    #[test]
    fn test_decorate_nesting() {
        let mut log = FormulaLog::new();
        log.decorate("81", Operator::Root, 2);
        assert_eq!(log.render(), "√81");
        log.decorate("9", Operator::Root, 2);
        assert_eq!(log.render(), "√(√81)");
        log.commit("3", '=');
        assert_eq!(log.render(), "√(√81)=");
        assert!(!log.has_fragment());
    }

    #[test]
    fn test_decorate_power_and_percent() {
        let mut log = FormulaLog::new();
        log.decorate("-3", Operator::Power, 2);
        assert_eq!(log.render(), "(-3)^2");

        let mut log = FormulaLog::new();
        log.commit("200", '+');
        log.decorate("10", Operator::Percent, 0);
        assert_eq!(log.render(), "200+10%");
    }

    #[test]
    fn test_cube_root_glyph() {
        let mut log = FormulaLog::new();
        log.decorate("27", Operator::Root, 3);
        assert_eq!(log.render(), "3√27");
    }

    #[test]
    fn test_fragment_after_closed_line() {
        let mut log = FormulaLog::new();
        log.commit("4", '=');
        log.decorate("4", Operator::Root, 2);
        assert_eq!(log.render(), "4=\n√4");
    }

    #[test]
    fn test_oldest_lines_evicted() {
        let mut log = FormulaLog::new();
        for _ in 0..100 {
            log.commit("12345", '+');
            log.commit("1", '=');
        }
        let text = log.render();
        assert!(text.len() <= FORMULA_CAPACITY);
        assert!(text.ends_with("12345+1="));
        assert!(text.starts_with("12345+1="));
    }

    #[test]
    fn test_long_line_trimmed_from_front() {
        let mut log = FormulaLog::new();
        for _ in 0..200 {
            log.commit("7", '×');
        }
        let text = log.render();
        assert!(text.len() <= FORMULA_CAPACITY);
        assert!(text.ends_with("7×"));
    }
}
