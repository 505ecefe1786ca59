//! Password strength meter - evaluation, feedback markup and the page component.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::RuleSet;
use crate::events::{self, Component, EventBus, FormEvent};
use crate::page::{Page, ids};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthTier {
    Weak,
    Medium,
    Strong,
}

impl StrengthTier {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= 80 {
            StrengthTier::Strong
        } else if percentage >= 50 {
            StrengthTier::Medium
        } else {
            StrengthTier::Weak
        }
    }

    /// Progress bar color class.
    pub fn css_class(self) -> &'static str {
        match self {
            StrengthTier::Weak => "bg-danger",
            StrengthTier::Medium => "bg-warning",
            StrengthTier::Strong => "bg-success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    pub description: String,
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthReport {
    pub results: Vec<RuleResult>,
    pub percentage: u8,
}

impl StrengthReport {
    pub fn satisfied(&self) -> usize {
        self.results.iter().filter(|r| r.met).count()
    }

    pub fn tier(&self) -> StrengthTier {
        StrengthTier::from_percentage(self.percentage)
    }
}

/// Checks every rule in order and weighs the ones met.
///
/// # Returns
/// A `StrengthReport` whose percentage is the rounded share of the total
/// weight carried by satisfied rules.
pub fn evaluate(rules: &RuleSet, password: &SecretString) -> StrengthReport {
    let pwd = password.expose_secret();
    let mut met_weight: u64 = 0;

    let results = rules
        .iter()
        .map(|rule| {
            let met = rule.is_met(pwd);
            if met {
                met_weight += u64::from(rule.weight());
            }
            RuleResult {
                description: rule.description().to_string(),
                met,
            }
        })
        .collect();

    let percentage = (met_weight as f64 / rules.total_weight() as f64 * 100.0).round() as u8;

    StrengthReport {
        results,
        percentage,
    }
}

/// One `<li>` per rule, in rule order.
pub fn render_feedback(report: &StrengthReport) -> String {
    let mut html = String::new();
    for result in &report.results {
        let (class, icon) = if result.met {
            ("text-success", "fa-check-circle")
        } else {
            ("text-muted", "fa-times-circle")
        };
        html.push_str(&format!(
            r#"<li class="{}"><i class="fas {} me-2"></i> {}</li>"#,
            class,
            icon,
            escape_html(&result.description)
        ));
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub struct PasswordMeter<P> {
    page: Arc<P>,
    rules: Arc<RuleSet>,
    token: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl<P: Page + 'static> PasswordMeter<P> {
    pub fn new(page: Arc<P>) -> Self {
        Self {
            page,
            rules: Arc::new(RuleSet::default()),
            token: CancellationToken::new(),
            listener: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    /// Re-evaluates the current field value and redraws feedback and bar.
    /// `None` if the page lacks the meter's elements.
    pub fn refresh(&self) -> Option<StrengthReport> {
        refresh(self.page.as_ref(), &self.rules)
    }

    pub fn toggle_requirements(&self) {
        toggle_requirements(self.page.as_ref());
    }

    pub fn is_active(&self) -> bool {
        self.listener.is_some()
    }
}

impl<P: Page + 'static> Component for PasswordMeter<P> {
    fn initialize(&mut self, bus: &EventBus) -> bool {
        if !has_meter_elements(self.page.as_ref()) {
            return false;
        }
        if self.listener.is_some() {
            return true;
        }

        self.token = CancellationToken::new();
        let page = self.page.clone();
        let rules = self.rules.clone();
        self.listener = Some(events::listen(bus, self.token.clone(), move |event| {
            let page = page.clone();
            let rules = rules.clone();
            async move {
                if event.target() != ids::PASSWORD_FIELD {
                    return;
                }
                match event {
                    FormEvent::Input(_) => {
                        refresh(page.as_ref(), &rules);
                    }
                    FormEvent::Focus(_) | FormEvent::Blur(_) => toggle_requirements(page.as_ref()),
                }
            }
        }));

        // Reflect a pre-filled value right away.
        refresh(self.page.as_ref(), &self.rules);
        toggle_requirements(self.page.as_ref());
        true
    }

    fn teardown(&mut self) {
        self.token.cancel();
        self.listener = None;
    }
}

impl<P> Drop for PasswordMeter<P> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn has_meter_elements<P: Page + ?Sized>(page: &P) -> bool {
    page.has_element(ids::PASSWORD_FIELD) && page.has_element(ids::PASSWORD_REQUIREMENTS)
}

fn refresh<P: Page + ?Sized>(page: &P, rules: &RuleSet) -> Option<StrengthReport> {
    if !has_meter_elements(page) {
        return None;
    }
    let password = SecretString::new(page.value(ids::PASSWORD_FIELD).unwrap_or_default().into());
    let report = evaluate(rules, &password);

    page.set_inner_html(ids::PASSWORD_REQUIREMENTS, &render_feedback(&report));

    let tier = report.tier();
    page.set_style(
        ids::PASSWORD_PROGRESS,
        "width",
        &format!("{}%", report.percentage),
    );
    page.set_class_name(
        ids::PASSWORD_PROGRESS,
        &format!("progress-bar {}", tier.css_class()),
    );

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Password strength {}% ({:?}), {}/{} rules met",
        report.percentage,
        tier,
        report.satisfied(),
        report.results.len()
    );

    Some(report)
}

fn toggle_requirements<P: Page + ?Sized>(page: &P) {
    let visible = page.is_focused(ids::PASSWORD_FIELD)
        || page
            .value(ids::PASSWORD_FIELD)
            .is_some_and(|v| !v.is_empty());
    page.set_style(
        ids::PASSWORD_REQUIREMENTS,
        "display",
        if visible { "block" } else { "none" },
    );
}
