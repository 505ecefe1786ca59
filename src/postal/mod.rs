//! Postal-code address autofill
//!
//! Normalizes the CEP field, resolves it through a lookup service and
//! copies the answer into the address fields.

mod autofill;
mod client;
mod code;

pub use autofill::{AddressAutofill, AutofillOutcome, LOOKUP_FAILED_MESSAGE, NOT_FOUND_MESSAGE};
pub use client::{
    Address, AddressLookup, DEFAULT_LOOKUP_URL, LookupError, LookupOutcome, ViaCepClient,
    decode_response,
};
pub use code::PostalCode;
