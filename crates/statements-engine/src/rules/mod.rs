//! The seven rule families.
//!
//! Each evaluator is a pure function returning one [`RuleOutcome`]; the
//! engine concatenates the outcomes in a fixed order (profitability,
//! liquidity, efficiency, stability, cash flow, growth, income composition),
//! which decides what survives the output truncation. Message wording is
//! load-bearing: the contradiction reconciler matches on substrings of these
//! templates.

pub mod cash_flow;
pub mod efficiency;
pub mod growth;
pub mod income_composition;
pub mod liquidity;
pub mod profitability;
pub mod stability;

pub use analysis_core::RuleOutcome;
