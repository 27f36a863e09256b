//! Rules and endpoint identity.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameters extracted from a path, merged with rule defaults.
pub type ParamMap = BTreeMap<String, String>;

/// Name of a collaborator able to execute named operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a rule dispatches to.
///
/// Rules start out `Named`; an endpoint group binds them to its handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Named(String),
    Bound { handler: HandlerRef, method: String },
}

impl Endpoint {
    /// The operation name, bound or not.
    pub fn name(&self) -> &str {
        match self {
            Endpoint::Named(name) => name,
            Endpoint::Bound { method, .. } => method,
        }
    }

    pub fn handler(&self) -> Option<&HandlerRef> {
        match self {
            Endpoint::Named(_) => None,
            Endpoint::Bound { handler, .. } => Some(handler),
        }
    }
}

impl From<&str> for Endpoint {
    fn from(name: &str) -> Self {
        Endpoint::Named(name.to_string())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Named(name) => f.write_str(name),
            Endpoint::Bound { handler, method } => write!(f, "{handler}.{method}"),
        }
    }
}

/// A path pattern bound to methods, an endpoint and default parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub endpoint: Endpoint,
    #[serde(default = "default_methods")]
    pub methods: BTreeSet<String>,
    #[serde(default)]
    pub defaults: ParamMap,
}

fn default_methods() -> BTreeSet<String> {
    BTreeSet::from(["GET".to_string()])
}

impl Rule {
    /// Create a rule accepting `GET` only.
    pub fn new(pattern: impl Into<String>, endpoint: impl Into<Endpoint>) -> Self {
        Self {
            pattern: pattern.into(),
            endpoint: endpoint.into(),
            methods: default_methods(),
            defaults: ParamMap::new(),
        }
    }

    /// Replace the accepted methods.
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.methods = methods
            .into_iter()
            .map(|m| m.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    /// Add a default parameter.
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name.into(), value.into());
        self
    }

    /// Methods as matched: upper-cased, with `HEAD` implied by `GET`.
    pub(crate) fn effective_methods(&self) -> BTreeSet<String> {
        let mut methods: BTreeSet<String> =
            self.methods.iter().map(|m| m.to_ascii_uppercase()).collect();
        if methods.contains("GET") {
            methods.insert("HEAD".to_string());
        }
        methods
    }
}
