//! Rule matching logic.
//!
//! # Responsibilities
//! - Split a request path into segments
//! - Match segments against a compiled pattern (structure only)
//! - Combine structure, method and defaults into a parameter map
//!
//! # Design Decisions
//! - Literal segments are case-sensitive; methods are not
//! - A variable binds exactly one non-empty segment, never a `/`
//! - Interior empty segments (`//`) are kept and can only fail to match
//! - Segment counts must be equal (no optional or trailing segments)

use std::collections::BTreeSet;

use crate::routing::error::ConfigurationError;
use crate::routing::pattern::{Pattern, Segment};
use crate::routing::rule::{HandlerRef, ParamMap, Rule};

/// Split a request path on `/`.
///
/// One leading and one trailing slash are dropped; anything else is kept,
/// so `/a//b` yields `["a", "", "b"]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

/// A fully expanded rule with its pattern parsed and its handler resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule {
    rule: Rule,
    pattern: Pattern,
    methods: BTreeSet<String>,
    handler: HandlerRef,
}

impl CompiledRule {
    /// Compile an expanded rule. The rule must already be bound to a handler.
    pub fn compile(rule: Rule) -> Result<Self, ConfigurationError> {
        let pattern = Pattern::parse(&rule.pattern)?;
        let methods = rule.effective_methods();
        if methods.is_empty() {
            return Err(ConfigurationError::EmptyMethods {
                pattern: rule.pattern.clone(),
            });
        }
        let handler = rule
            .endpoint
            .handler()
            .cloned()
            .ok_or_else(|| ConfigurationError::UnboundEndpoint {
                pattern: rule.pattern.clone(),
                endpoint: rule.endpoint.name().to_string(),
            })?;

        Ok(Self {
            rule,
            pattern,
            methods,
            handler,
        })
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Operation name of the bound endpoint.
    pub fn endpoint(&self) -> &str {
        self.rule.endpoint.name()
    }

    /// Accepted methods, upper-case, `HEAD` included when `GET` is.
    pub fn methods(&self) -> &BTreeSet<String> {
        &self.methods
    }

    pub fn allows(&self, method: &str) -> bool {
        self.methods.contains(&method.to_ascii_uppercase())
    }

    /// Match path structure only, returning the bound variables.
    pub fn match_path(&self, segments: &[&str]) -> Option<ParamMap> {
        let expected = self.pattern.segments();
        if expected.len() != segments.len() {
            return None;
        }

        let mut params = ParamMap::new();
        for (pattern_segment, value) in expected.iter().zip(segments) {
            match pattern_segment {
                Segment::Literal(text) if text == value => {}
                Segment::Literal(_) => return None,
                Segment::Variable(_) if value.is_empty() => return None,
                Segment::Variable(name) => {
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }
        Some(params)
    }

    /// Full match: method must be accepted; defaults are laid over the path
    /// bindings and win on a name clash.
    pub fn matches(&self, method: &str, segments: &[&str]) -> Option<ParamMap> {
        if !self.allows(method) {
            return None;
        }
        let bound = self.match_path(segments)?;
        Some(self.merge_defaults(bound))
    }

    pub(crate) fn merge_defaults(&self, bound: ParamMap) -> ParamMap {
        let mut params = bound;
        params.extend(self.rule.defaults.clone());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::rule::Endpoint;

    fn bound(rule: Rule) -> CompiledRule {
        let rule = Rule {
            endpoint: Endpoint::Bound {
                handler: HandlerRef::new("DNSHandler"),
                method: rule.endpoint.name().to_string(),
            },
            ..rule
        };
        CompiledRule::compile(rule).unwrap()
    }

    #[test]
    fn test_split_path() {
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
        assert_eq!(split_path("/v1/dns/"), vec!["v1", "dns"]);
        assert_eq!(split_path("/a//b"), vec!["a", "", "b"]);
        assert_eq!(split_path("//a"), vec!["", "a"]);
    }

    #[test]
    fn test_matches_binds_and_merges_defaults() {
        let rule = bound(
            Rule::new("/<string:provider>/zones/<zone_id>/records", "extract_zone_id_and_invoke")
                .with_default("method_name", "list_records"),
        );
        let params = rule
            .matches("get", &split_path("/route53/zones/Z1/records"))
            .unwrap();
        assert_eq!(params["provider"], "route53");
        assert_eq!(params["zone_id"], "Z1");
        assert_eq!(params["method_name"], "list_records");
    }

    #[test]
    fn test_method_must_be_allowed() {
        let rule = bound(Rule::new("/<provider>/zones", "create_zone").methods(["POST"]));
        assert!(rule.match_path(&["aws", "zones"]).is_some());
        assert!(rule.matches("GET", &["aws", "zones"]).is_none());
        assert!(rule.matches("POST", &["aws", "zones"]).is_some());
    }

    #[test]
    fn test_structure_is_exact() {
        let rule = bound(Rule::new("/<provider>/zones", "list"));
        assert!(rule.match_path(&["aws", "Zones"]).is_none());
        assert!(rule.match_path(&["aws"]).is_none());
        assert!(rule.match_path(&["aws", "zones", "extra"]).is_none());
        assert!(rule.match_path(&["", "zones"]).is_none());
    }

    #[test]
    fn test_default_wins_over_path_binding() {
        let rule = bound(
            Rule::new("/<provider>/<method_name>", "invoke_method")
                .methods(["POST"])
                .with_default("method_name", "fixed"),
        );
        let params = rule.matches("POST", &["ec2", "ex_stop_node"]).unwrap();
        assert_eq!(params["method_name"], "fixed");
        assert_eq!(params["provider"], "ec2");
    }

    #[test]
    fn test_path_binding_kept_without_default() {
        let rule = bound(
            Rule::new("/<provider>/<method_name>", "invoke_method").methods(["POST"]),
        );
        let params = rule.matches("POST", &["ec2", "ex_stop_node"]).unwrap();
        assert_eq!(params["method_name"], "ex_stop_node");
    }

    #[test]
    fn test_compile_requires_handler() {
        let err = CompiledRule::compile(Rule::new("/providers", "providers")).unwrap_err();
        assert!(matches!(err, ConfigurationError::UnboundEndpoint { .. }));
    }

    #[test]
    fn test_compile_rejects_empty_methods() {
        let rule = Rule {
            methods: BTreeSet::new(),
            ..Rule::new("/", Endpoint::Bound {
                handler: HandlerRef::new("ApplicationHandler"),
                method: "index".into(),
            })
        };
        let err = CompiledRule::compile(rule).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyMethods { .. }));
    }
}
