#![cfg_attr(not(test), no_std)]

mod calculator;
pub mod config;

pub use calculator::*;
pub use config::EngineConfig;
pub use rust_decimal::Decimal;
