//! Address autofill: fills the address fields from the CEP field on blur.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Address, AddressLookup, LookupOutcome, PostalCode};
use crate::events::{self, Component, EventBus, FormEvent};
use crate::page::{Page, ids};

pub const NOT_FOUND_MESSAGE: &str = "CEP não encontrado. Verifique o número.";
pub const LOOKUP_FAILED_MESSAGE: &str = "Não foi possível consultar o CEP. Tente novamente.";

const ADDRESS_FIELDS: [&str; 4] = [ids::RUA, ids::BAIRRO, ids::CIDADE, ids::UF];

/// What a single blur on the CEP field led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutofillOutcome {
    Filled,
    NotFound,
    /// The input was not 8 digits; no request was made.
    Cleared,
    /// The lookup failed in transport; fields are untouched.
    Failed,
}

pub struct AddressAutofill<P, L> {
    page: Arc<P>,
    lookup: Arc<L>,
    token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl<P, L> AddressAutofill<P, L>
where
    P: Page + 'static,
    L: AddressLookup + 'static,
{
    pub fn new(page: Arc<P>, lookup: L) -> Self {
        Self {
            page,
            lookup: Arc::new(lookup),
            token: CancellationToken::new(),
            listener: None,
        }
    }

    /// Handles one blur of the CEP field inline.
    pub async fn handle_blur(&self) -> AutofillOutcome {
        autofill(self.page.as_ref(), self.lookup.as_ref()).await
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}

impl<P, L> Component for AddressAutofill<P, L>
where
    P: Page + 'static,
    L: AddressLookup + 'static,
{
    fn initialize(&mut self, bus: &EventBus) -> bool {
        if !self.page.has_element(ids::CEP) {
            return false;
        }
        if self.listener.is_some() {
            return true;
        }

        self.token = CancellationToken::new();
        let page = self.page.clone();
        let lookup = self.lookup.clone();
        self.listener = Some(events::listen(bus, self.token.clone(), move |event| {
            let page = page.clone();
            let lookup = lookup.clone();
            async move {
                if event == FormEvent::blur(ids::CEP) {
                    // Each blur gets its own request; a late answer overwrites
                    // an earlier one.
                    tokio::spawn(async move {
                        autofill(page.as_ref(), lookup.as_ref()).await;
                    });
                }
            }
        }));
        true
    }

    fn teardown(&mut self) {
        self.token.cancel();
        self.listener = None;
    }
}

impl<P, L> Drop for AddressAutofill<P, L> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn autofill<P, L>(page: &P, lookup: &L) -> AutofillOutcome
where
    P: Page + ?Sized,
    L: AddressLookup,
{
    let raw = page.value(ids::CEP).unwrap_or_default();
    let Some(code) = PostalCode::parse(&raw) else {
        clear_address(page);
        return AutofillOutcome::Cleared;
    };

    match lookup.lookup(&code).await {
        Ok(LookupOutcome::Found(address)) => {
            fill_address(page, &address);
            AutofillOutcome::Filled
        }
        Ok(LookupOutcome::NotFound) => {
            #[cfg(feature = "tracing")]
            tracing::info!("CEP {} not found", code);
            page.alert(NOT_FOUND_MESSAGE);
            clear_address(page);
            AutofillOutcome::NotFound
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::error!("CEP lookup failed for {}: {}", code, _e);
            page.alert(LOOKUP_FAILED_MESSAGE);
            AutofillOutcome::Failed
        }
    }
}

fn fill_address<P: Page + ?Sized>(page: &P, address: &Address) {
    page.set_value(ids::RUA, &address.logradouro);
    page.set_value(ids::BAIRRO, &address.bairro);
    page.set_value(ids::CIDADE, &address.localidade);
    page.set_value(ids::UF, &address.uf);
    page.focus(ids::NUMERO);
}

fn clear_address<P: Page + ?Sized>(page: &P) {
    for id in ADDRESS_FIELDS {
        page.set_value(id, "");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MemoryPage;
    use crate::postal::LookupError;
    use std::sync::Mutex;

    /// Lookup double that answers with a canned result and records codes.
    struct StubLookup {
        answer: fn() -> Result<LookupOutcome, LookupError>,
        calls: Mutex<Vec<String>>,
    }

    impl StubLookup {
        fn new(answer: fn() -> Result<LookupOutcome, LookupError>) -> Self {
            Self {
                answer,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl AddressLookup for Arc<StubLookup> {
        async fn lookup(&self, code: &PostalCode) -> Result<LookupOutcome, LookupError> {
            self.calls.lock().unwrap().push(code.digits().to_string());
            (self.answer)()
        }
    }

    fn paulista() -> Result<LookupOutcome, LookupError> {
        Ok(LookupOutcome::Found(Address {
            logradouro: "Avenida Paulista".to_string(),
            bairro: "Bela Vista".to_string(),
            localidade: "São Paulo".to_string(),
            uf: "SP".to_string(),
            ..Address::default()
        }))
    }

    fn not_found() -> Result<LookupOutcome, LookupError> {
        Ok(LookupOutcome::NotFound)
    }

    fn unavailable() -> Result<LookupOutcome, LookupError> {
        Err(LookupError::Status(503))
    }

    fn address_page(cep: &str) -> Arc<MemoryPage> {
        Arc::new(
            MemoryPage::new()
                .with_value(ids::CEP, cep)
                .with_value(ids::RUA, "old street")
                .with_value(ids::BAIRRO, "old hood")
                .with_value(ids::CIDADE, "old city")
                .with_value(ids::UF, "XX")
                .with_element(ids::NUMERO),
        )
    }

    #[tokio::test]
    async fn test_found_fills_fields_and_focuses_number() {
        let page = address_page("01310-100");
        let stub = Arc::new(StubLookup::new(paulista));
        let autofill = AddressAutofill::new(page.clone(), stub.clone());

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::Filled);
        assert_eq!(page.value(ids::RUA).as_deref(), Some("Avenida Paulista"));
        assert_eq!(page.value(ids::BAIRRO).as_deref(), Some("Bela Vista"));
        assert_eq!(page.value(ids::CIDADE).as_deref(), Some("São Paulo"));
        assert_eq!(page.value(ids::UF).as_deref(), Some("SP"));
        assert!(page.is_focused(ids::NUMERO));
        assert_eq!(*stub.calls.lock().unwrap(), vec!["01310100".to_string()]);
        assert!(page.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_alerts_and_clears() {
        let page = address_page("99999999");
        let autofill = AddressAutofill::new(page.clone(), Arc::new(StubLookup::new(not_found)));

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::NotFound);
        for id in ADDRESS_FIELDS {
            assert_eq!(page.value(id).as_deref(), Some(""), "field {id} not cleared");
        }
        assert_eq!(page.alerts(), vec![NOT_FOUND_MESSAGE.to_string()]);
        assert!(!page.is_focused(ids::NUMERO));
    }

    #[tokio::test]
    async fn test_short_code_clears_without_request() {
        let page = address_page("123");
        let stub = Arc::new(StubLookup::new(paulista));
        let autofill = AddressAutofill::new(page.clone(), stub.clone());

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::Cleared);
        assert!(stub.calls.lock().unwrap().is_empty());
        assert_eq!(page.value(ids::RUA).as_deref(), Some(""));
        assert!(page.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_code_clears_without_request() {
        let page = address_page("");
        let stub = Arc::new(StubLookup::new(paulista));
        let autofill = AddressAutofill::new(page.clone(), stub.clone());

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::Cleared);
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_notifies_and_keeps_fields() {
        let page = address_page("01310100");
        let autofill = AddressAutofill::new(page.clone(), Arc::new(StubLookup::new(unavailable)));

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::Failed);
        assert_eq!(page.alerts(), vec![LOOKUP_FAILED_MESSAGE.to_string()]);
        assert_eq!(page.value(ids::RUA).as_deref(), Some("old street"));
    }

    #[tokio::test]
    async fn test_partial_page_fills_what_exists() {
        let page = Arc::new(
            MemoryPage::new()
                .with_value(ids::CEP, "01310100")
                .with_element(ids::CIDADE),
        );
        let autofill = AddressAutofill::new(page.clone(), Arc::new(StubLookup::new(paulista)));

        assert_eq!(autofill.handle_blur().await, AutofillOutcome::Filled);
        assert_eq!(page.value(ids::CIDADE).as_deref(), Some("São Paulo"));
        assert!(page.value(ids::RUA).is_none());
        assert_eq!(page.focused(), None);
    }

    #[tokio::test]
    async fn test_initialize_requires_cep_field() {
        let page = Arc::new(MemoryPage::new().with_element(ids::RUA));
        let mut autofill = AddressAutofill::new(page, Arc::new(StubLookup::new(paulista)));
        let bus = EventBus::new();

        assert!(!autofill.initialize(&bus));
        assert!(!autofill.is_active());
        assert_eq!(bus.emit(FormEvent::blur(ids::CEP)), 0);
    }

    #[tokio::test]
    async fn test_blur_survives_event_burst() {
        let page = address_page("01310-100");
        let stub = Arc::new(StubLookup::new(paulista));
        let mut autofill = AddressAutofill::new(page.clone(), stub.clone());
        let bus = EventBus::new();
        assert!(autofill.initialize(&bus));

        bus.emit(FormEvent::blur(ids::CEP));
        for _ in 0..64 {
            bus.emit(FormEvent::input(ids::PASSWORD_FIELD));
        }

        for _ in 0..100 {
            if page.is_focused(ids::NUMERO) {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(*stub.calls.lock().unwrap(), vec!["01310100".to_string()]);
        assert_eq!(page.value(ids::RUA).as_deref(), Some("Avenida Paulista"));
        autofill.teardown();
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent() {
        let page = address_page("01310100");
        let mut autofill = AddressAutofill::new(page, Arc::new(StubLookup::new(paulista)));
        let bus = EventBus::new();

        assert!(autofill.initialize(&bus));
        assert!(autofill.is_active());
        autofill.teardown();
        autofill.teardown();
        assert!(!autofill.is_active());
    }
}
