//! Keypress-driven calculator with exact decimal arithmetic.
//!
//! Digits, operators, equals and clear arrive one at a time. After each of
//! them the engine reports a formula line and a result line:
//!
//! - binary operators (`+ - × ÷ %`) are evaluated eagerly, left to right,
//!   as soon as the next operator or equals completes their right operand
//! - power and root act on the current operand the moment they are pressed
//! - percent following another operator takes a percentage of the left operand
//! - errors (division by zero, invalid roots, overflow) replace the result
//!   until the next digit or clear

pub mod arithmetic;
mod engine;
mod error;
pub mod format;
pub mod formula;
mod input;
mod state;

pub use arithmetic::apply;
pub use engine::{CalculatorEngine, DisplaySink};
pub use error::{CalcError, InputError};
pub use format::format_decimal;
pub use formula::FormulaLog;
pub use input::{Input, Operator};
pub use state::{CalcState, EntryState, LastAction, Operand, Output, Phase, Snapshot};
