//! Request and response shapes exchanged with the control-plane adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Capability every change set and stack set is submitted with. Templates are
/// trusted to create named IAM resources.
pub const CAPABILITY_NAMED_IAM: &str = "CAPABILITY_NAMED_IAM";

/// One template parameter, in CloudFormation's own JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "ParameterKey")]
    pub key: String,
    #[serde(rename = "ParameterValue")]
    pub value: String,
}

impl Parameter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered template parameters, fixed once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(Vec<Parameter>);

impl ParameterSet {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Parameter>> for ParameterSet {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }
}

impl<'a> IntoIterator for &'a ParameterSet {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSetType {
    Create,
    Update,
}

impl ChangeSetType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeSetType::Create => "CREATE",
            ChangeSetType::Update => "UPDATE",
        }
    }
}

impl fmt::Display for ChangeSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetRequest {
    pub stack_name: String,
    pub change_set_name: String,
    pub template_url: String,
    pub parameters: ParameterSet,
    pub capabilities: Vec<String>,
    pub change_set_type: ChangeSetType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSetDescription {
    pub status: String,
    pub status_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSummary {
    pub name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEvent {
    pub event_id: String,
    pub logical_resource_id: String,
    pub resource_status: String,
    pub reason: Option<String>,
}

/// One page of a paginated listing plus the token for the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    pub fn with_next(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSetRequest {
    pub name: String,
    pub description: Option<String>,
    pub template_url: String,
    pub parameters: ParameterSet,
    pub capabilities: Vec<String>,
    pub execution_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSetSummary {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSetOperationSummary {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackInstanceSummary {
    pub account: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_json_shape() {
        let params = ParameterSet::new(vec![Parameter::new("Env", "prod")]);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"[{"ParameterKey":"Env","ParameterValue":"prod"}]"#);
    }

    #[test]
    fn test_parameter_set_keeps_order() {
        let parsed: ParameterSet = serde_json::from_str(
            r#"[{"ParameterKey":"B","ParameterValue":"2"},{"ParameterKey":"A","ParameterValue":"1"}]"#,
        )
        .unwrap();
        let keys: Vec<&str> = parsed.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn test_change_set_type_names() {
        assert_eq!(ChangeSetType::Create.to_string(), "CREATE");
        assert_eq!(ChangeSetType::Update.as_str(), "UPDATE");
    }
}
