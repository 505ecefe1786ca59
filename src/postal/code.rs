//! Postal code (CEP) normalization.

use std::fmt;

const CEP_DIGITS: usize = 8;

/// An 8-digit Brazilian postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

impl PostalCode {
    /// Strips every non-digit from `input` and accepts the result iff it
    /// is exactly 8 digits long.
    pub fn parse(input: &str) -> Option<Self> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        (digits.len() == CEP_DIGITS).then_some(Self(digits))
    }

    /// The bare 8 digits, as sent to the lookup service.
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", &self.0[..5], &self.0[5..])
    }
}
