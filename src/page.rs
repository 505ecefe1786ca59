//! Page abstraction.
//!
//! Components never touch a global document. They hold a [`Page`] and
//! address elements by id; every mutation aimed at a missing element is a
//! no-op that returns `false`, so a page may carry any subset of the
//! features.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Element identifiers the components read and write.
pub mod ids {
    pub const CEP: &str = "cep";
    pub const RUA: &str = "rua";
    pub const BAIRRO: &str = "bairro";
    pub const CIDADE: &str = "cidade";
    pub const UF: &str = "uf";
    pub const NUMERO: &str = "numero";

    pub const ANIMATED_TITLE: &str = "animated-title";
    pub const FULLTEXT_ATTRIBUTE: &str = "data-fulltext";

    pub const PASSWORD_FIELD: &str = "password-field";
    pub const PASSWORD_REQUIREMENTS: &str = "password-requirements";
    pub const PASSWORD_PROGRESS: &str = "password-progress";
}

/// The slice of a document the components need.
pub trait Page: Send + Sync {
    fn has_element(&self, id: &str) -> bool;

    /// Current form value, `None` if the element is absent.
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str) -> bool;

    fn focus(&self, id: &str) -> bool;
    fn is_focused(&self, id: &str) -> bool;

    fn attribute(&self, id: &str, name: &str) -> Option<String>;

    fn inner_html(&self, id: &str) -> Option<String>;
    fn set_inner_html(&self, id: &str, html: &str) -> bool;
    fn append_text(&self, id: &str, text: &str) -> bool;

    fn add_class(&self, id: &str, class: &str) -> bool;
    fn remove_class(&self, id: &str, class: &str) -> bool;
    fn has_class(&self, id: &str, class: &str) -> bool;
    /// Replaces the whole class list with the whitespace-separated `classes`.
    fn set_class_name(&self, id: &str, classes: &str) -> bool;

    fn style(&self, id: &str, property: &str) -> Option<String>;
    fn set_style(&self, id: &str, property: &str, value: &str) -> bool;

    /// Shows a blocking user-facing message.
    fn alert(&self, message: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub value: String,
    pub inner_html: String,
    pub classes: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub style: HashMap<String, String>,
}

/// One observable change made through a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Value { id: String, value: String },
    InnerHtml { id: String, html: String },
    Focus(String),
    ClassList { id: String, classes: String },
    Style { id: String, property: String, value: String },
    Alert(String),
}

#[derive(Debug, Default)]
struct PageState {
    elements: HashMap<String, Element>,
    focused: Option<String>,
    alerts: Vec<String>,
    journal: Vec<Mutation>,
}

/// An in-memory page with a mutation journal.
#[derive(Debug, Default)]
pub struct MemoryPage {
    state: RwLock<PageState>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(self, id: &str) -> Self {
        self.insert_element(id);
        self
    }

    pub fn with_value(self, id: &str, value: &str) -> Self {
        self.write()
            .elements
            .entry(id.to_string())
            .or_default()
            .value = value.to_string();
        self
    }

    pub fn with_attribute(self, id: &str, name: &str, value: &str) -> Self {
        self.write()
            .elements
            .entry(id.to_string())
            .or_default()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn insert_element(&self, id: &str) {
        self.write().elements.entry(id.to_string()).or_default();
    }

    pub fn remove_element(&self, id: &str) {
        let mut state = self.write();
        state.elements.remove(id);
        if state.focused.as_deref() == Some(id) {
            state.focused = None;
        }
    }

    /// Moves focus away from `id` if it holds it.
    pub fn blur(&self, id: &str) {
        let mut state = self.write();
        if state.focused.as_deref() == Some(id) {
            state.focused = None;
        }
    }

    pub fn focused(&self) -> Option<String> {
        self.read().focused.clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.read().alerts.clone()
    }

    pub fn journal(&self) -> Vec<Mutation> {
        self.read().journal.clone()
    }

    /// Returns the journal recorded so far and starts a fresh one.
    pub fn take_journal(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.write().journal)
    }

    /// Returns the alerts shown so far and forgets them.
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut self.write().alerts)
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.read().elements.get(id).cloned()
    }

    pub fn classes(&self, id: &str) -> Vec<String> {
        self.read()
            .elements
            .get(id)
            .map(|e| e.classes.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, PageState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PageState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<F>(&self, id: &str, f: F) -> bool
    where
        F: FnOnce(&mut Element) -> Mutation,
    {
        let mut state = self.write();
        let Some(element) = state.elements.get_mut(id) else {
            return false;
        };
        let mutation = f(element);
        state.journal.push(mutation);
        true
    }
}

impl Page for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        self.read().elements.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.read().elements.get(id).map(|e| e.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.mutate(id, |e| {
            e.value = value.to_string();
            Mutation::Value {
                id: id.to_string(),
                value: value.to_string(),
            }
        })
    }

    fn focus(&self, id: &str) -> bool {
        let mut state = self.write();
        if !state.elements.contains_key(id) {
            return false;
        }
        state.focused = Some(id.to_string());
        state.journal.push(Mutation::Focus(id.to_string()));
        true
    }

    fn is_focused(&self, id: &str) -> bool {
        self.read().focused.as_deref() == Some(id)
    }

    fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.read()
            .elements
            .get(id)
            .and_then(|e| e.attributes.get(name).cloned())
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.read().elements.get(id).map(|e| e.inner_html.clone())
    }

    fn set_inner_html(&self, id: &str, html: &str) -> bool {
        self.mutate(id, |e| {
            e.inner_html = html.to_string();
            Mutation::InnerHtml {
                id: id.to_string(),
                html: html.to_string(),
            }
        })
    }

    fn append_text(&self, id: &str, text: &str) -> bool {
        self.mutate(id, |e| {
            e.inner_html.push_str(text);
            Mutation::InnerHtml {
                id: id.to_string(),
                html: e.inner_html.clone(),
            }
        })
    }

    fn add_class(&self, id: &str, class: &str) -> bool {
        self.mutate(id, |e| {
            if !e.classes.iter().any(|c| c == class) {
                e.classes.push(class.to_string());
            }
            Mutation::ClassList {
                id: id.to_string(),
                classes: e.classes.join(" "),
            }
        })
    }

    fn remove_class(&self, id: &str, class: &str) -> bool {
        self.mutate(id, |e| {
            e.classes.retain(|c| c != class);
            Mutation::ClassList {
                id: id.to_string(),
                classes: e.classes.join(" "),
            }
        })
    }

    fn has_class(&self, id: &str, class: &str) -> bool {
        self.read()
            .elements
            .get(id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    fn set_class_name(&self, id: &str, classes: &str) -> bool {
        self.mutate(id, |e| {
            e.classes = classes.split_whitespace().map(str::to_string).collect();
            Mutation::ClassList {
                id: id.to_string(),
                classes: e.classes.join(" "),
            }
        })
    }

    fn style(&self, id: &str, property: &str) -> Option<String> {
        self.read()
            .elements
            .get(id)
            .and_then(|e| e.style.get(property).cloned())
    }

    fn set_style(&self, id: &str, property: &str, value: &str) -> bool {
        self.mutate(id, |e| {
            e.style.insert(property.to_string(), value.to_string());
            Mutation::Style {
                id: id.to_string(),
                property: property.to_string(),
                value: value.to_string(),
            }
        })
    }

    fn alert(&self, message: &str) {
        let mut state = self.write();
        state.alerts.push(message.to_string());
        state.journal.push(Mutation::Alert(message.to_string()));
    }
}
