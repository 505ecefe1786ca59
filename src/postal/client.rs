//! Postal-code lookup service client.

use std::future::Future;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::PostalCode;

/// Default base URL of the lookup service.
pub const DEFAULT_LOOKUP_URL: &str = "https://viacep.com.br/ws";

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Lookup service answered with status {0}")]
    Status(u16),
    #[error("Lookup response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid lookup base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Address fields as the service names them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Address {
    pub logradouro: String,
    pub complemento: String,
    pub bairro: String,
    pub localidade: String,
    pub uf: String,
    pub ibge: String,
    pub ddd: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(Address),
    /// The service does not know the code.
    NotFound,
}

/// Resolves a postal code to an address.
pub trait AddressLookup: Send + Sync {
    fn lookup(
        &self,
        code: &PostalCode,
    ) -> impl Future<Output = Result<LookupOutcome, LookupError>> + Send;
}

/// Decodes a response body. The `erro` flag has been sent both as
/// `true` and as `"true"`.
pub fn decode_response(body: &str) -> Result<LookupOutcome, LookupError> {
    let json: Value = serde_json::from_str(body)?;
    let not_found = match json.get("erro") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "true",
        _ => false,
    };
    if not_found {
        return Ok(LookupOutcome::NotFound);
    }
    Ok(LookupOutcome::Found(serde_json::from_value(json)?))
}

/// HTTP client for the ViaCEP service (`GET {base}/{cep}/json/`).
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    client: Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: &str) -> Result<Self, LookupError> {
        Url::parse(base_url).map_err(|e| LookupError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, code: &PostalCode) -> String {
        format!("{}/{}/json/", self.base_url, code.digits())
    }
}

impl Default for ViaCepClient {
    fn default() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_LOOKUP_URL.to_string(),
        }
    }
}

impl AddressLookup for ViaCepClient {
    async fn lookup(&self, code: &PostalCode) -> Result<LookupOutcome, LookupError> {
        let url = self.endpoint(code);

        #[cfg(feature = "tracing")]
        tracing::debug!("Looking up CEP {} at {}", code, url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        decode_response(&body)
    }
}
