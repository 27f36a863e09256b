//! Rule templates.
//!
//! A template is a list of skeleton rules containing `$name` placeholders.
//! Instantiation substitutes every placeholder in the pattern, the endpoint
//! name and the default values, yielding independent concrete rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::routing::error::ConfigurationError;
use crate::routing::rule::{Endpoint, Rule};

/// A parameterized family of rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub rules: Vec<Rule>,
}

/// A template together with the values to substitute into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub template: RuleTemplate,
    pub values: BTreeMap<String, String>,
}

impl RuleTemplate {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Defer instantiation with a single substitution.
    pub fn with(&self, placeholder: impl Into<String>, value: impl Into<String>) -> Instance {
        Instance {
            template: self.clone(),
            values: BTreeMap::from([(placeholder.into(), value.into())]),
        }
    }

    /// Produce concrete rules.
    ///
    /// Every placeholder named in `values` must occur somewhere in the
    /// skeleton, and no placeholder may remain afterwards.
    pub fn instantiate(
        &self,
        values: &BTreeMap<String, String>,
    ) -> Result<Vec<Rule>, ConfigurationError> {
        for placeholder in values.keys() {
            let used = self.rules.iter().any(|rule| {
                texts(rule).any(|text| substitute(text, placeholder, "").1)
            });
            if !used {
                return Err(ConfigurationError::MissingPlaceholder {
                    placeholder: placeholder.clone(),
                });
            }
        }

        self.rules
            .iter()
            .map(|rule| {
                let rule = apply(rule, values);
                let unresolved = texts(&rule)
                    .find(|text| has_placeholder(text))
                    .map(str::to_string);
                match unresolved {
                    Some(text) => Err(ConfigurationError::UnresolvedPlaceholder { text }),
                    None => Ok(rule),
                }
            })
            .collect()
    }
}

impl Instance {
    pub fn instantiate(&self) -> Result<Vec<Rule>, ConfigurationError> {
        self.template.instantiate(&self.values)
    }
}

fn texts(rule: &Rule) -> impl Iterator<Item = &str> {
    std::iter::once(rule.pattern.as_str())
        .chain(std::iter::once(rule.endpoint.name()))
        .chain(rule.defaults.values().map(String::as_str))
}

fn apply(rule: &Rule, values: &BTreeMap<String, String>) -> Rule {
    let replace = |text: &str| {
        values
            .iter()
            .fold(text.to_string(), |acc, (name, value)| substitute(&acc, name, value).0)
    };

    let endpoint = match &rule.endpoint {
        Endpoint::Named(name) => Endpoint::Named(replace(name)),
        Endpoint::Bound { handler, method } => Endpoint::Bound {
            handler: handler.clone(),
            method: replace(method),
        },
    };

    Rule {
        pattern: replace(&rule.pattern),
        endpoint,
        methods: rule.methods.clone(),
        defaults: rule
            .defaults
            .iter()
            .map(|(key, value)| (key.clone(), replace(value)))
            .collect(),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace `$name` (not followed by an identifier character) with `value`.
/// Returns the new text and whether anything was replaced.
fn substitute(text: &str, name: &str, value: &str) -> (String, bool) {
    let token = format!("${name}");
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut replaced = false;

    while let Some(at) = rest.find(&token) {
        let after = &rest[at + token.len()..];
        out.push_str(&rest[..at]);
        if after.chars().next().is_some_and(is_ident_char) {
            out.push_str(&token);
        } else {
            out.push_str(value);
            replaced = true;
        }
        rest = after;
    }
    out.push_str(rest);
    (out, replaced)
}

fn has_placeholder(text: &str) -> bool {
    text.split('$')
        .skip(1)
        .any(|after| after.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_'))
}
