//! All three behaviors mounted on one page.

use std::sync::Arc;

use crate::config::{ConfigError, Settings};
use crate::events::{Component, EventBus};
use crate::page::Page;
use crate::postal::{AddressAutofill, AddressLookup, ViaCepClient};
use crate::strength::PasswordMeter;
use crate::typewriter::Typewriter;

/// Which components found their elements on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mounted {
    pub autofill: bool,
    pub typewriter: bool,
    pub meter: bool,
}

pub struct FormAssist<P, L> {
    pub autofill: AddressAutofill<P, L>,
    pub typewriter: Typewriter<P>,
    pub meter: PasswordMeter<P>,
}

impl<P: Page + 'static> FormAssist<P, ViaCepClient> {
    /// Builds the components from `settings`, talking to the configured
    /// lookup service.
    pub fn from_settings(page: Arc<P>, settings: &Settings) -> Result<Self, ConfigError> {
        let lookup = settings.lookup_client()?;
        Self::with_lookup(page, lookup, settings)
    }
}

impl<P, L> FormAssist<P, L>
where
    P: Page + 'static,
    L: AddressLookup + 'static,
{
    pub fn with_lookup(page: Arc<P>, lookup: L, settings: &Settings) -> Result<Self, ConfigError> {
        let rules = settings.rule_set()?;
        Ok(Self {
            autofill: AddressAutofill::new(page.clone(), lookup),
            typewriter: Typewriter::new(page.clone()).with_speed(settings.typewriter_speed),
            meter: PasswordMeter::new(page).with_rules(rules),
        })
    }

    /// The page-load hook: initializes every component whose elements exist.
    pub fn initialize(&mut self, bus: &EventBus) -> Mounted {
        let mounted = Mounted {
            autofill: self.autofill.initialize(bus),
            typewriter: self.typewriter.initialize(bus),
            meter: self.meter.initialize(bus),
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Form components mounted: {:?}", mounted);

        mounted
    }

    pub fn teardown(&mut self) {
        self.autofill.teardown();
        self.typewriter.teardown();
        self.meter.teardown();
    }
}
