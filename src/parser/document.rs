use crate::Parameters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The serialized form of a behavior tree, as read by [`crate::load`] and
/// written by [`crate::BehaviorTree::dump`].
///
/// Nodes are stored flat, keyed by id, and refer to each other by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub properties: Parameters,
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeData>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Redundant with the key in [`TreeData::nodes`], but editors write it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The registered node type
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub properties: Parameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl TreeData {
    pub fn from_json(src: &str) -> serde_json::Result<Self> {
        serde_json::from_str(src)
    }

    pub fn from_yaml(src: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(src)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}
