//! Password rule sets
//!
//! Handles the built-in rule list and loading substitutes from files.

use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Rules file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read rules file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Rules file line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("Rules file line {line}: invalid pattern: {source}")]
    InvalidPattern {
        line: usize,
        #[source]
        source: regex::Error,
    },
    #[error("Rule set is empty")]
    NoRules,
    #[error("Rule weights add up to zero")]
    ZeroWeight,
}

/// A requirement a password either meets or not.
#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    description: String,
    weight: u32,
}

impl Rule {
    pub fn new(pattern: &str, description: &str, weight: u32) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            description: description.to_string(),
            weight,
        })
    }

    pub fn is_met(&self, password: &str) -> bool {
        self.pattern.is_match(password)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Ordered, non-empty list of rules with a positive total weight.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

const BUILTIN_RULES: [(&str, &str); 5] = [
    (".{8,}", "Pelo menos 8 caracteres"),
    ("[A-Z]", "Pelo menos 1 letra maiúscula"),
    ("[a-z]", "Pelo menos 1 letra minúscula"),
    ("[0-9]", "Pelo menos 1 número"),
    ("[^A-Za-z0-9]", "Pelo menos 1 símbolo (ex: !, @, #)"),
];

impl Default for RuleSet {
    fn default() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(pattern, description)| {
                Rule::new(pattern, description, 1).expect("built-in rule patterns are valid")
            })
            .collect();
        Self { rules }
    }
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Result<Self, RulesError> {
        if rules.is_empty() {
            return Err(RulesError::NoRules);
        }
        if rules.iter().all(|r| r.weight == 0) {
            return Err(RulesError::ZeroWeight);
        }
        Ok(Self { rules })
    }

    /// Parses one rule per line as `weight<TAB>pattern<TAB>description`.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn parse(content: &str) -> Result<Self, RulesError> {
        let mut rules = Vec::new();
        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw.trim_end_matches('\r');
            if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
                continue;
            }

            let mut fields = trimmed.splitn(3, '\t');
            let (Some(weight), Some(pattern), Some(description)) =
                (fields.next(), fields.next(), fields.next())
            else {
                return Err(RulesError::Malformed {
                    line,
                    reason: "expected weight, pattern and description separated by tabs"
                        .to_string(),
                });
            };

            let weight: u32 = weight.trim().parse().map_err(|_| RulesError::Malformed {
                line,
                reason: format!("invalid weight '{}'", weight.trim()),
            })?;
            let description = description.trim();
            if description.is_empty() {
                return Err(RulesError::Malformed {
                    line,
                    reason: "empty description".to_string(),
                });
            }

            let rule = Rule::new(pattern, description, weight)
                .map_err(|source| RulesError::InvalidPattern { line, source })?;
            rules.push(rule);
        }
        Self::new(rules)
    }

    /// Loads a rule set from `path`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - A line is malformed or holds an invalid pattern
    /// - No rules remain, or all weights are zero
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Rule set loading FAILED: FileNotFound {:?}", path);
            return Err(RulesError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let rules = Self::parse(&content)?;

        #[cfg(feature = "tracing")]
        tracing::info!("Rule set loaded: {} rules from {:?}", rules.len(), path);

        Ok(rules)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.rules.iter().map(|r| u64::from(r.weight)).sum()
    }
}
