//! Form convenience behaviors
//!
//! This library provides three independent page behaviors behind an
//! explicit [`Page`] abstraction:
//!
//! - **Address autofill**: on blur of the CEP field, resolves the postal
//!   code through ViaCEP and fills street, neighborhood, city and state.
//! - **Typewriter**: reveals a title's `data-fulltext` one character at a
//!   time.
//! - **Password meter**: checks a rule set on every keystroke and drives a
//!   requirements list and a progress bar.
//!
//! # Features
//!
//! - `tracing` (default): Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `FORM_ASSIST_LOOKUP_URL`: lookup service base URL
//! - `FORM_ASSIST_TYPEWRITER_SPEED_MS`: delay between typed characters
//! - `FORM_ASSIST_RULES_PATH`: password rule file replacing the built-in rules
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use form_assist::{EventBus, FormAssist, FormEvent, MemoryPage, Settings};
//!
//! # async fn run() -> Result<(), form_assist::ConfigError> {
//! let page = Arc::new(
//!     MemoryPage::new()
//!         .with_value("cep", "01310-100")
//!         .with_element("rua")
//!         .with_element("numero"),
//! );
//! let bus = EventBus::new();
//!
//! let mut form = FormAssist::from_settings(page.clone(), &Settings::from_env())?;
//! form.initialize(&bus);
//!
//! bus.emit(FormEvent::blur("cep"));
//! # Ok(())
//! # }
//! ```

// Internal modules
mod config;
mod events;
mod form;
mod page;
mod postal;
mod strength;
mod typewriter;

// Public API
pub use config::{ConfigError, Settings};
pub use events::{Component, EventBus, FormEvent};
pub use form::{FormAssist, Mounted};
pub use page::{Element, MemoryPage, Mutation, Page, ids};
pub use postal::{
    Address, AddressAutofill, AddressLookup, AutofillOutcome, DEFAULT_LOOKUP_URL,
    LOOKUP_FAILED_MESSAGE, LookupError, LookupOutcome, NOT_FOUND_MESSAGE, PostalCode,
    ViaCepClient, decode_response,
};
pub use strength::{
    PasswordMeter, Rule, RuleResult, RuleSet, RulesError, StrengthReport, StrengthTier, evaluate,
    render_feedback,
};
pub use typewriter::{CURSOR_CLASS, DEFAULT_SPEED, Typewriter, frames};

pub mod env {
    //! Environment variable names read by [`Settings::from_env`](crate::Settings::from_env).
    pub use crate::config::{LOOKUP_URL_VAR, RULES_PATH_VAR, TYPEWRITER_SPEED_VAR};
}
