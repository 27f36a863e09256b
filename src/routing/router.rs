//! Route map construction and dispatch.
//!
//! # Responsibilities
//! - Flatten a [`RouteTable`] into compiled rules
//! - Reject ambiguous tables at build time
//! - Resolve `(method, path)` to a handler call, 405 or 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks); changing the
//!   routes means building a new map
//! - Rules sharing a path shape form one route; a method may appear at most
//!   once per route
//! - Routes are tried most-specific first (literal beats variable at the first
//!   differing segment), then in declaration order
//! - The first route whose shape matches decides the outcome; no backtracking
//! - Explicit `NotFound` / `MethodNotAllowed` rather than a silent default

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::routing::compose::{RouteTable, RuleFactory};
use crate::routing::error::ConfigurationError;
use crate::routing::matcher::{split_path, CompiledRule};
use crate::routing::pattern::{Pattern, Shape};
use crate::routing::rule::{HandlerRef, ParamMap};

/// A resolved handler call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    pub handler: HandlerRef,
    /// Operation to run: the `method_name` parameter when present, otherwise
    /// the endpoint name.
    pub method_name: String,
    /// Endpoint name as declared on the rule.
    pub endpoint: String,
    pub params: ParamMap,
}

/// Outcome of resolving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    Matched(Dispatch),
    MethodNotAllowed { allowed: BTreeSet<String> },
    NotFound,
}

impl Resolution {
    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Matched(_) => "matched",
            Resolution::MethodNotAllowed { .. } => "method_not_allowed",
            Resolution::NotFound => "not_found",
        }
    }
}

/// Rules sharing one path shape.
#[derive(Debug)]
struct Route {
    pattern: Pattern,
    rules: Vec<usize>,
}

/// Flattened, validated, immutable rule set.
#[derive(Debug)]
pub struct RouteMap {
    rules: Vec<CompiledRule>,
    routes: Vec<Route>,
}

impl RouteMap {
    /// Build a map from a route table.
    pub fn build(table: &RouteTable) -> Result<Self, ConfigurationError> {
        let mut rules = Vec::new();
        for rule in table.rules()? {
            rules.push(CompiledRule::compile(rule)?);
        }

        let mut routes: Vec<Route> = Vec::new();
        let mut by_shape: HashMap<Shape, usize> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            let slot = *by_shape.entry(rule.pattern().shape()).or_insert_with(|| {
                routes.push(Route {
                    pattern: rule.pattern().clone(),
                    rules: Vec::new(),
                });
                routes.len() - 1
            });

            let route = &mut routes[slot];
            for &other in &route.rules {
                let existing = &rules[other];
                if let Some(method) = existing.methods().intersection(rule.methods()).next() {
                    return Err(ConfigurationError::DuplicateRule {
                        pattern: rule.pattern().to_string(),
                        method: method.clone(),
                        first: format!("{} {}", existing.pattern(), existing.rule().endpoint),
                        second: format!("{} {}", rule.pattern(), rule.rule().endpoint),
                    });
                }
            }
            route.rules.push(index);
        }

        // Stable: equally specific routes keep declaration order.
        routes.sort_by_key(|route| route.pattern.specificity());

        tracing::info!(
            rules = rules.len(),
            routes = routes.len(),
            "Route map built"
        );

        Ok(Self { rules, routes })
    }

    /// Expanded rules in declaration order.
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Handlers referenced by any rule.
    pub fn handlers(&self) -> BTreeSet<&HandlerRef> {
        self.rules.iter().map(CompiledRule::handler).collect()
    }

    /// Resolve a request.
    pub fn resolve(&self, method: &str, path: &str) -> Resolution {
        let segments = split_path(path);

        for route in &self.routes {
            let Some(first) = route.rules.first() else {
                continue;
            };
            if self.rules[*first].match_path(&segments).is_none() {
                continue;
            }

            let chosen = route
                .rules
                .iter()
                .map(|&index| &self.rules[index])
                .find(|rule| rule.allows(method));

            return match chosen {
                Some(rule) => {
                    // Variable names may differ between rules of one shape.
                    let bound = rule.match_path(&segments).unwrap_or_default();
                    let params = rule.merge_defaults(bound);
                    let method_name = params
                        .get("method_name")
                        .cloned()
                        .unwrap_or_else(|| rule.endpoint().to_string());
                    Resolution::Matched(Dispatch {
                        handler: rule.handler().clone(),
                        method_name,
                        endpoint: rule.endpoint().to_string(),
                        params,
                    })
                }
                None => Resolution::MethodNotAllowed {
                    allowed: route
                        .rules
                        .iter()
                        .flat_map(|&index| self.rules[index].methods().iter().cloned())
                        .collect(),
                },
            };
        }

        Resolution::NotFound
    }
}
