//! Route composition.
//!
//! # Data Flow
//! ```text
//! Rule / Instance (template + values)
//!     → EndpointGroup (prefix + handler binding)
//!     → Submount (prefix only, nests arbitrarily)
//!     → RouteTable (root rules + mounts)
//!     → flat, ordered Vec<Rule>
//! ```
//!
//! Every layer is plain data and expands through [`RuleFactory`]. Expansion
//! is pure: equal inputs give equal rule lists, in declaration order.

use serde::{Deserialize, Serialize};

use crate::routing::error::ConfigurationError;
use crate::routing::pattern::join;
use crate::routing::rule::{Endpoint, HandlerRef, Rule};
use crate::routing::template::Instance;

/// Anything that expands into concrete rules.
pub trait RuleFactory {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError>;
}

impl RuleFactory for Rule {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        Ok(vec![self.clone()])
    }
}

impl RuleFactory for Instance {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        self.instantiate()
    }
}

/// A member of an endpoint group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Member {
    Rule(Rule),
    Template(Instance),
}

impl From<Rule> for Member {
    fn from(rule: Rule) -> Self {
        Member::Rule(rule)
    }
}

impl From<Instance> for Member {
    fn from(instance: Instance) -> Self {
        Member::Template(instance)
    }
}

impl RuleFactory for Member {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        match self {
            Member::Rule(rule) => rule.rules(),
            Member::Template(instance) => instance.rules(),
        }
    }
}

/// Binds a prefix and a handler to an ordered list of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointGroup {
    pub prefix: String,
    pub handler: HandlerRef,
    pub members: Vec<Member>,
}

impl EndpointGroup {
    pub fn new<I, M>(prefix: impl Into<String>, handler: HandlerRef, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Member>,
    {
        Self {
            prefix: prefix.into(),
            handler,
            members: members.into_iter().map(Into::into).collect(),
        }
    }
}

impl RuleFactory for EndpointGroup {
    /// Prefix every member path and bind every endpoint to this group's handler.
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        let mut expanded = Vec::new();
        for member in &self.members {
            for rule in member.rules()? {
                let endpoint = match rule.endpoint {
                    Endpoint::Named(method) => Endpoint::Bound {
                        handler: self.handler.clone(),
                        method,
                    },
                    Endpoint::Bound { handler, .. } => {
                        return Err(ConfigurationError::AlreadyBound {
                            pattern: rule.pattern,
                            handler: handler.to_string(),
                        });
                    }
                };
                expanded.push(Rule {
                    pattern: join(&self.prefix, &rule.pattern),
                    endpoint,
                    ..rule
                });
            }
        }
        Ok(expanded)
    }
}

/// Something that can be mounted under a prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mount {
    Group(EndpointGroup),
    Submount(Submount),
    Rule(Rule),
}

impl From<EndpointGroup> for Mount {
    fn from(group: EndpointGroup) -> Self {
        Mount::Group(group)
    }
}

impl From<Submount> for Mount {
    fn from(submount: Submount) -> Self {
        Mount::Submount(submount)
    }
}

impl From<Rule> for Mount {
    fn from(rule: Rule) -> Self {
        Mount::Rule(rule)
    }
}

impl RuleFactory for Mount {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        match self {
            Mount::Group(group) => group.rules(),
            Mount::Submount(submount) => submount.rules(),
            Mount::Rule(rule) => rule.rules(),
        }
    }
}

/// Groups children under a shared prefix without binding a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submount {
    pub prefix: String,
    pub children: Vec<Mount>,
}

impl Submount {
    pub fn new<I, M>(prefix: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Mount>,
    {
        Self {
            prefix: prefix.into(),
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}

impl RuleFactory for Submount {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        let mut expanded = Vec::new();
        for child in &self.children {
            for rule in child.rules()? {
                expanded.push(Rule {
                    pattern: join(&self.prefix, &rule.pattern),
                    ..rule
                });
            }
        }
        Ok(expanded)
    }
}

/// The whole composition tree: root rules followed by mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
    pub root: Vec<Rule>,
    pub mounts: Vec<Mount>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, rule: Rule) -> Self {
        self.root.push(rule);
        self
    }

    pub fn mount(mut self, mount: impl Into<Mount>) -> Self {
        self.mounts.push(mount.into());
        self
    }
}

impl RuleFactory for RouteTable {
    fn rules(&self) -> Result<Vec<Rule>, ConfigurationError> {
        let mut expanded: Vec<Rule> = self.root.clone();
        for mount in &self.mounts {
            expanded.extend(mount.rules()?);
        }
        Ok(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::template::RuleTemplate;

    fn compute() -> EndpointGroup {
        let list = RuleTemplate::new(vec![Rule::new("/<string:provider>/$objects", "invoke_method")
            .with_default("method_name", "list_$objects")]);
        EndpointGroup::new(
            "/compute/",
            HandlerRef::new("ComputeHandler"),
            vec![
                Member::from(Rule::new("/providers", "providers")),
                Member::from(list.with("objects", "nodes")),
            ],
        )
    }

    #[test]
    fn test_group_prefixes_and_binds() {
        let rules = compute().rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern, "/compute/providers");
        assert_eq!(
            rules[0].endpoint,
            Endpoint::Bound {
                handler: HandlerRef::new("ComputeHandler"),
                method: "providers".into(),
            }
        );
        assert_eq!(rules[1].pattern, "/compute/<string:provider>/nodes");
        assert_eq!(rules[1].defaults["method_name"], "list_nodes");
    }

    #[test]
    fn test_group_expansion_is_pure() {
        let group = compute();
        assert_eq!(group.rules().unwrap(), group.rules().unwrap());
        assert_eq!(group.rules().unwrap(), compute().rules().unwrap());
    }

    #[test]
    fn test_group_rejects_bound_member() {
        let group = EndpointGroup::new(
            "/dns",
            HandlerRef::new("DNSHandler"),
            vec![Rule::new(
                "/",
                Endpoint::Bound {
                    handler: HandlerRef::new("ApplicationHandler"),
                    method: "index".into(),
                },
            )],
        );
        assert!(matches!(
            group.rules(),
            Err(ConfigurationError::AlreadyBound { .. })
        ));
    }

    #[test]
    fn test_submounts_nest() {
        let inner = Submount::new("beta/", vec![compute()]);
        let outer = Submount::new("/v1", vec![Mount::from(inner)]);
        let patterns: Vec<_> = outer
            .rules()
            .unwrap()
            .into_iter()
            .map(|r| r.pattern)
            .collect();
        assert_eq!(
            patterns,
            vec![
                "/v1/beta/compute/providers",
                "/v1/beta/compute/<string:provider>/nodes",
            ]
        );
    }

    #[test]
    fn test_table_keeps_declaration_order() {
        let index = Rule::new(
            "/",
            Endpoint::Bound {
                handler: HandlerRef::new("ApplicationHandler"),
                method: "index".into(),
            },
        );
        let table = RouteTable::new()
            .root(index)
            .mount(Submount::new("/v1", vec![compute()]));
        let patterns: Vec<_> = table
            .rules()
            .unwrap()
            .into_iter()
            .map(|r| r.pattern)
            .collect();
        assert_eq!(
            patterns,
            vec!["/", "/v1/compute/providers", "/v1/compute/<string:provider>/nodes"]
        );
    }

    #[test]
    fn test_table_round_trips_through_toml() {
        let table = RouteTable::new().mount(Submount::new("/v1", vec![compute()]));
        let text = toml::to_string(&table).unwrap();
        let parsed: RouteTable = toml::from_str(&text).unwrap();
        assert_eq!(parsed.rules().unwrap(), table.rules().unwrap());
    }
}
