// Calculator state and its keypress transitions

use core::fmt::Write;

use log::{debug, trace, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::arithmetic::apply_with_precision;
use super::error::{CalcError, InputError};
use super::format::{ResultText, format_decimal, significant_digits};
use super::formula::{FormulaLog, FormulaText};
use super::input::{Input, Operator};
use crate::config::EngineConfig;

/// Capacity of the operand being typed (29 digits, point and sign)
const ENTRY_CAPACITY: usize = 32;

type EntryText = heapless::String<ENTRY_CAPACITY>;

/// Whether the next digit extends the current operand or starts a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryState {
    #[default]
    Fresh,
    MidEntry,
}

/// Most recent logical input class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LastAction {
    #[default]
    None,
    Digit,
    Operator(Operator),
    Equals,
    Clear,
}

/// The current operand: an exact value, or the error that replaced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Value(Decimal),
    Error(CalcError),
}

impl Operand {
    pub fn value(self) -> Option<Decimal> {
        match self {
            Operand::Value(value) => Some(value),
            Operand::Error(_) => None,
        }
    }

    pub fn error(self) -> Option<CalcError> {
        match self {
            Operand::Value(_) => None,
            Operand::Error(error) => Some(error),
        }
    }
}

impl Default for Operand {
    fn default() -> Self {
        Operand::Value(Decimal::ZERO)
    }
}

/// Coarse view of the state for collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Entering,
    AwaitingOperand,
    ShowingResult,
    Error,
}

/// Texts produced by one transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub formula: FormulaText,
    pub result: ResultText,
}

/// What survives a process restart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub value: Decimal,
    pub last_action: LastAction,
}

/// Complete arithmetic and entry state of the calculator.
///
/// Transitions are exposed through [`CalcState::step`], which leaves `self`
/// untouched and returns the next state with the texts to display.
#[derive(Debug, Clone, Default)]
pub struct CalcState {
    accumulator: Decimal,
    current: Operand,
    entry: EntryText,
    entry_state: EntryState,
    pending: Option<Operator>,
    /// An operand was completed since the pending operator was set
    operand_ready: bool,
    last_action: LastAction,
    formula: FormulaLog,
}

impl CalcState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state from a snapshot. A snapshot taken mid-entry resumes
    /// typing into the same operand.
    pub fn restore(snapshot: &Snapshot) -> Self {
        let mut state = Self::default();
        if snapshot.last_action == LastAction::Digit {
            state.entry_state = EntryState::MidEntry;
        }

        state.set_value(snapshot.value);
        state.last_action = snapshot.last_action;
        state
    }

    pub fn snapshot(&self) -> Snapshot {
        match self.current {
            Operand::Value(value) => Snapshot {
                value,
                last_action: self.last_action,
            },
            Operand::Error(_) => Snapshot {
                value: Decimal::ZERO,
                last_action: LastAction::Clear,
            },
        }
    }

    /// Apply one input and return the resulting state and display texts
    pub fn step(&self, input: Input, config: &EngineConfig) -> Result<(Self, Output), InputError> {
        let mut next = self.clone();
        next.apply(input, config)?;
        let output = next.render(config);

        Ok((next, output))
    }

    /// Replace the current operand without any entry-state transition.
    /// The value counts as a completed operand, like typed digits.
    pub fn set_value(&mut self, value: Decimal) {
        self.current = Operand::Value(value);
        self.operand_ready = true;
        self.last_action = LastAction::Digit;
        self.formula.clear_fragment();

        // Mid-entry, further digits extend the textual form of the new value
        self.entry.clear();
        if self.entry_state == EntryState::MidEntry && write!(&mut self.entry, "{value}").is_err() {
            self.entry.clear();
            self.entry_state = EntryState::Fresh;
        }
    }

    /// Formula and result texts for the current state
    pub fn render(&self, config: &EngineConfig) -> Output {
        let result = match self.current {
            Operand::Error(error) => {
                let mut text = ResultText::new();
                write!(&mut text, "{error}").ok();
                text
            }
            Operand::Value(_)
                if self.entry_state == EntryState::MidEntry
                    && significant_digits(&self.entry) <= config.max_display_digits =>
            {
                // Show what was typed, including a trailing point or zeros
                ResultText::try_from(self.entry.as_str()).unwrap_or_default()
            }
            Operand::Value(value) => format_decimal(value, config.max_display_digits),
        };

        Output {
            formula: self.formula.render(),
            result,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.current.error().is_some() {
            return Phase::Error;
        }

        match self.entry_state {
            EntryState::MidEntry => Phase::Entering,
            EntryState::Fresh if self.last_action == LastAction::Equals || self.operand_ready => {
                Phase::ShowingResult
            }
            EntryState::Fresh if self.pending.is_some() => Phase::AwaitingOperand,
            EntryState::Fresh => Phase::Initial,
        }
    }

    pub fn current(&self) -> Operand {
        self.current
    }

    pub fn accumulator(&self) -> Decimal {
        self.accumulator
    }

    pub fn pending(&self) -> Option<Operator> {
        self.pending
    }

    pub fn entry_state(&self) -> EntryState {
        self.entry_state
    }

    pub fn last_action(&self) -> LastAction {
        self.last_action
    }

    pub fn formula(&self) -> &FormulaLog {
        &self.formula
    }

    fn apply(&mut self, input: Input, config: &EngineConfig) -> Result<(), InputError> {
        match input {
            Input::Digit(digit) => self.digit(digit)?,
            Input::DecimalPoint => self.decimal_point(),
            Input::Operator(op) if op.is_unary() => self.unary(op, config),
            Input::Operator(op) => self.binary(op, config),
            Input::Equals => self.equals(config),
            Input::Clear => self.clear(),
            Input::Reset => self.reset(),
        }

        Ok(())
    }

    fn digit(&mut self, digit: u8) -> Result<(), InputError> {
        if digit > 9 {
            return Err(InputError::InvalidDigit(digit));
        }

        self.recover();

        match self.entry_state {
            EntryState::Fresh => self.start_entry(),
            // Leading zeros collapse
            EntryState::MidEntry if self.entry == "0" => self.entry.clear(),
            EntryState::MidEntry => {}
        }

        self.push_entry(char::from(b'0' + digit));
        self.last_action = LastAction::Digit;

        Ok(())
    }

    fn decimal_point(&mut self) {
        self.recover();

        if self.entry_state == EntryState::Fresh {
            self.start_entry();
        }
        if self.entry.is_empty() {
            self.push_entry('0');
        }
        if !self.entry.contains('.') {
            self.push_entry('.');
        }

        self.last_action = LastAction::Digit;
    }

    /// Power and root: evaluated right away against the current operand
    fn unary(&mut self, op: Operator, config: &EngineConfig) {
        let Some(value) = self.current.value() else {
            trace!("ignoring {op:?} in error state");
            return;
        };

        let argument = match op {
            Operator::Power => config.power_exponent,
            _ => config.root_degree,
        };

        let text = self.operand_text(config);
        self.formula.decorate(&text, op, argument);

        let result = apply_with_precision(value, op, Decimal::from(argument), config.max_fraction_digits);
        self.set_result(result);

        self.finish_operand();
        self.operand_ready = true;
        self.last_action = LastAction::Operator(op);
    }

    fn binary(&mut self, op: Operator, config: &EngineConfig) {
        let Some(value) = self.current.value() else {
            trace!("ignoring {op:?} in error state");
            return;
        };

        match self.pending {
            // Percent of the accumulator, completing the queued operation's operand
            Some(queued) if op == Operator::Percent && queued != Operator::Percent && self.operand_ready => {
                let text = self.operand_text(config);
                self.formula.decorate(&text, op, 0);

                let result =
                    apply_with_precision(self.accumulator, op, value, config.max_fraction_digits);
                self.set_result(result);

                self.finish_operand();
                self.last_action = LastAction::Operator(op);
                return;
            }
            // Chained evaluation, strictly left to right
            Some(queued) if self.operand_ready => {
                let text = self.operand_text(config);
                self.formula.commit(&text, op.symbol());
                self.evaluate(queued, value, config);
            }
            // No operand since the last operator: the new one replaces it
            Some(_) => self.formula.replace_symbol(op.symbol()),
            None => {
                let text = self.operand_text(config);
                self.formula.commit(&text, op.symbol());
                self.accumulator = value;
            }
        }

        if self.current.error().is_none() {
            self.pending = Some(op);
        }

        self.finish_operand();
        self.operand_ready = false;
        self.last_action = LastAction::Operator(op);
    }

    fn equals(&mut self, config: &EngineConfig) {
        let Some(value) = self.current.value() else {
            trace!("ignoring equals in error state");
            return;
        };

        match self.pending.take() {
            Some(queued) => {
                let text = self.operand_text(config);
                self.formula.commit(&text, '=');
                self.evaluate(queued, value, config);
            }
            None if self.last_action == LastAction::Equals => {
                trace!("nothing left to evaluate");
                return;
            }
            None => {
                let text = self.operand_text(config);
                self.formula.commit(&text, '=');
                self.accumulator = value;
            }
        }

        self.finish_operand();
        self.operand_ready = false;
        self.last_action = LastAction::Equals;
    }

    /// Clear the operand being entered. Twice in a row resets everything.
    fn clear(&mut self) {
        if self.last_action == LastAction::Clear {
            debug!("second clear, resetting");
            self.reset();
            return;
        }

        if self.current.error().is_some() {
            self.accumulator = Decimal::ZERO;
            self.pending = None;
            self.formula.break_line();
        }

        self.current = Operand::Value(Decimal::ZERO);
        self.finish_operand();
        self.formula.clear_fragment();
        self.operand_ready = false;
        self.last_action = LastAction::Clear;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    /// `accumulator = accumulator <queued> value`, the result becoming the
    /// current operand as well
    fn evaluate(&mut self, queued: Operator, value: Decimal, config: &EngineConfig) {
        debug!("evaluating {} {:?} {}", self.accumulator, queued, value);

        let result = apply_with_precision(self.accumulator, queued, value, config.max_fraction_digits);
        self.set_result(result);

        if let Operand::Value(result) = self.current {
            self.accumulator = result;
        }
    }

    fn set_result(&mut self, result: Result<Decimal, CalcError>) {
        match result {
            Ok(value) => self.current = Operand::Value(value),
            Err(error) => {
                warn!("calculation failed: {error}");
                self.current = Operand::Error(error);
                self.pending = None;
            }
        }
    }

    /// Leave an error behind before a new operand starts
    fn recover(&mut self) {
        if self.current.error().is_some() {
            self.accumulator = Decimal::ZERO;
            self.pending = None;
            self.current = Operand::Value(Decimal::ZERO);
            self.finish_operand();
            self.formula.clear_fragment();
            self.formula.break_line();
            self.operand_ready = false;
        }
    }

    fn start_entry(&mut self) {
        self.entry.clear();
        self.entry_state = EntryState::MidEntry;
        self.formula.clear_fragment();
    }

    fn finish_operand(&mut self) {
        self.entry.clear();
        self.entry_state = EntryState::Fresh;
    }

    /// Append to the typed operand. Characters that would overflow the
    /// buffer or make the value inexact are dropped.
    fn push_entry(&mut self, ch: char) {
        let mut candidate = self.entry.clone();
        if candidate.push(ch).is_err() {
            trace!("entry full, dropping {ch:?}");
            return;
        }

        match parse_entry(&candidate) {
            Some(value) => {
                self.entry = candidate;
                self.current = Operand::Value(value);
                self.operand_ready = true;
            }
            None => trace!("{candidate} is not representable, dropping {ch:?}"),
        }
    }

    /// Current operand as written into the formula
    fn operand_text(&self, config: &EngineConfig) -> ResultText {
        match (self.entry_state, self.current) {
            (EntryState::MidEntry, _) => {
                ResultText::try_from(self.entry.trim_end_matches('.')).unwrap_or_default()
            }
            (EntryState::Fresh, Operand::Value(value)) => format_decimal(value, config.max_display_digits),
            (EntryState::Fresh, Operand::Error(_)) => ResultText::new(),
        }
    }
}

fn parse_entry(text: &str) -> Option<Decimal> {
    let digits = text.strip_suffix('.').unwrap_or(text);
    Decimal::from_str_exact(digits).ok()
}
