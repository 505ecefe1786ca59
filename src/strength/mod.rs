//! Password strength meter
//!
//! Each rule pairs a pattern with the requirement shown to the user; the
//! meter reports the weighted share of rules met.

mod meter;
mod rules;

pub use meter::{
    PasswordMeter, RuleResult, StrengthReport, StrengthTier, evaluate, render_feedback,
};
pub use rules::{Rule, RuleSet, RulesError};
