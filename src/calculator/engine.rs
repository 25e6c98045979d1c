// Mutable holder driving the calculator state and its display callbacks

use log::{error, trace};
use rust_decimal::Decimal;

use super::error::{CalcError, InputError};
use super::format::ResultText;
use super::formula::FormulaText;
use super::input::{Input, Operator};
use super::state::{CalcState, Output, Phase, Snapshot};
use crate::config::EngineConfig;

/// Receiver of the two display texts
pub trait DisplaySink {
    fn formula_changed(&mut self, text: &str);

    fn result_changed(&mut self, text: &str);
}

/// Discards every update
impl DisplaySink for () {
    fn formula_changed(&mut self, _text: &str) {}

    fn result_changed(&mut self, _text: &str) {}
}

/// A pair of callbacks: `(on_formula_changed, on_result_changed)`
impl<F, R> DisplaySink for (F, R)
where
    F: FnMut(&str),
    R: FnMut(&str),
{
    fn formula_changed(&mut self, text: &str) {
        (self.0)(text)
    }

    fn result_changed(&mut self, text: &str) {
        (self.1)(text)
    }
}

impl<S> DisplaySink for &mut S
where
    S: DisplaySink + ?Sized,
{
    fn formula_changed(&mut self, text: &str) {
        (**self).formula_changed(text)
    }

    fn result_changed(&mut self, text: &str) {
        (**self).result_changed(text)
    }
}

/// Calculator engine.
///
/// Each input runs to completion and reports the new formula and result
/// text to the sink before returning. Arithmetic errors never surface as
/// `Err`: they become the result text until the next digit or clear.
pub struct CalculatorEngine<S = ()> {
    state: CalcState,
    config: EngineConfig,
    sink: S,
}

impl CalculatorEngine<()> {
    /// Engine without a display, read through the accessors
    pub fn headless() -> Self {
        Self::new(())
    }
}

impl Default for CalculatorEngine<()> {
    fn default() -> Self {
        Self::headless()
    }
}

impl<S: DisplaySink> CalculatorEngine<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, EngineConfig::default())
    }

    pub fn with_config(sink: S, config: EngineConfig) -> Self {
        Self {
            state: CalcState::new(),
            config: config.sanitized(),
            sink,
        }
    }

    /// Handle one logical input
    pub fn input(&mut self, input: Input) -> Result<(), InputError> {
        trace!("input {input:?}");

        let (state, output) = self.state.step(input, &self.config)?;
        self.state = state;
        self.emit(&output);

        Ok(())
    }

    /// Handle a single character token, see [`Input::from_char`].
    /// Returns true if the display was updated.
    pub fn handle_key(&mut self, key_char: char) -> bool {
        match Input::from_char(key_char) {
            Some(input) => self.input(input).is_ok(),
            None => {
                trace!("unmapped key {key_char:?}");
                false
            }
        }
    }

    pub fn digit(&mut self, digit: u8) -> Result<(), InputError> {
        self.input(Input::Digit(digit))
    }

    pub fn decimal_point(&mut self) {
        self.accept(Input::DecimalPoint);
    }

    pub fn operator(&mut self, op: Operator) {
        self.accept(Input::Operator(op));
    }

    pub fn equals(&mut self) {
        self.accept(Input::Equals);
    }

    /// Clear the current entry; a second consecutive clear resets
    pub fn clear(&mut self) {
        self.accept(Input::Clear);
    }

    pub fn reset(&mut self) {
        self.accept(Input::Reset);
    }

    /// Replace the current operand, e.g. when restoring a saved value
    pub fn set_value(&mut self, value: Decimal) {
        self.state.set_value(value);
        self.refresh();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.state = CalcState::restore(snapshot);
        self.refresh();
    }

    /// Re-send the current texts to the sink
    pub fn refresh(&mut self) {
        let output = self.state.render(&self.config);
        self.emit(&output);
    }

    pub fn state(&self) -> &CalcState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Exact value of the current operand, None in error state
    pub fn result(&self) -> Option<Decimal> {
        self.state.current().value()
    }

    pub fn error(&self) -> Option<CalcError> {
        self.state.current().error()
    }

    pub fn formula_text(&self) -> FormulaText {
        self.state.render(&self.config).formula
    }

    pub fn result_text(&self) -> ResultText {
        self.state.render(&self.config).result
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Inputs other than digits cannot be rejected
    fn accept(&mut self, input: Input) {
        if let Err(e) = self.input(input) {
            error!("rejected {input:?}: {e}");
        }
    }

    fn emit(&mut self, output: &Output) {
        self.sink.formula_changed(&output.formula);
        self.sink.result_changed(&output.result);
    }
}
